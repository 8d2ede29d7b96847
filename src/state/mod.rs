use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use teloxide::types::MessageId;
use tokio::sync::Mutex;

use crate::api::SimulatorApi;
use crate::quiz::{Clock, QuizSession};

/// A running quiz in one chat, together with the message that shows it.
pub struct ActiveSession {
    pub session: QuizSession,
    pub message_id: Option<MessageId>,
}

pub type SharedSession = Arc<Mutex<ActiveSession>>;

pub struct BotState {
    pub api: Arc<dyn SimulatorApi>,
    pub clock: Arc<dyn Clock>,
    pub sessions: Mutex<HashMap<i64, SharedSession>>,
    pub tick_period: Duration,
}

impl BotState {
    pub fn new(api: Arc<dyn SimulatorApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            sessions: Mutex::new(HashMap::new()),
            tick_period: Duration::from_secs(1),
        }
    }

    pub async fn session(&self, chat_id: i64) -> Option<SharedSession> {
        self.sessions.lock().await.get(&chat_id).cloned()
    }

    /// Puts a new session in place for the chat. Any previous session is
    /// handed back so the caller can tear it down.
    pub async fn insert_session(&self, chat_id: i64, session: ActiveSession) -> (SharedSession, Option<SharedSession>) {
        let shared = Arc::new(Mutex::new(session));
        let previous = self.sessions.lock().await.insert(chat_id, shared.clone());
        (shared, previous)
    }

    /// Removes the chat's session only if it is still the given one, so a
    /// late countdown cannot evict a newer session.
    pub async fn remove_session_if(&self, chat_id: i64, session: &SharedSession) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&chat_id) {
            Some(current) if Arc::ptr_eq(current, session) => {
                sessions.remove(&chat_id);
                true
            }
            _ => false,
        }
    }

    pub async fn remove_session(&self, chat_id: i64) -> Option<SharedSession> {
        self.sessions.lock().await.remove(&chat_id)
    }
}
