use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::api::SimulatorApi;
use crate::error::QuizError;
use crate::types::{Answer, Question, Scenario, Submission, SubmissionResult};

mod clock;
pub use clock::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    TimedOut,
    Completed,
    Submitted,
}

impl Phase {
    pub fn is_pending_submission(self) -> bool {
        matches!(self, Phase::TimedOut | Phase::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing selected, or the session no longer takes answers.
    Rejected,
    /// Moved on; carries the new question index.
    Next(usize),
    /// The last question was answered and the session wants submitting.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u64),
    Expired,
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(SubmissionResult),
    AlreadySubmitted,
}

/// One candidate's run through a scenario.
pub struct QuizSession {
    scenario: Scenario,
    questions: Vec<Question>,
    current: usize,
    remaining_secs: u64,
    selected: Option<String>,
    answers: Vec<Answer>,
    phase: Phase,
    clock: Arc<dyn Clock>,
    started: Instant,
    started_at: DateTime<Utc>,
    timer: Option<TimerHandle>,
}

/// Fetches the scenario and its questions together and starts a session.
/// Nothing is created if either request fails.
pub async fn load_session(
    api: &dyn SimulatorApi,
    scenario_id: &str,
    clock: Arc<dyn Clock>,
) -> Result<QuizSession, QuizError> {
    let (scenario, questions) = tokio::try_join!(
        api.get_scenario(scenario_id),
        api.get_questions(scenario_id)
    )?;
    log::info!(
        "Loaded scenario {} ({}) with {} questions",
        scenario.id,
        scenario.title,
        questions.len()
    );
    QuizSession::start(scenario, questions, clock)
}

impl QuizSession {
    pub fn start(
        scenario: Scenario,
        questions: Vec<Question>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionSet(scenario.id));
        }
        if scenario.time_limit == 0 {
            return Err(QuizError::InvalidScenario(format!(
                "scenario {} has no time limit",
                scenario.id
            )));
        }
        if let Some(q) = questions.iter().find(|q| q.options.is_empty()) {
            return Err(QuizError::InvalidScenario(format!(
                "question {} has no options",
                q.question_id
            )));
        }

        let started = clock.now();
        Ok(Self {
            remaining_secs: scenario.time_limit_secs(),
            scenario,
            questions,
            current: 0,
            selected: None,
            answers: Vec::new(),
            phase: Phase::Active,
            clock,
            started,
            started_at: Utc::now(),
            timer: None,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// "Question 2 of 5"
    pub fn progress(&self) -> String {
        format!("Question {} of {}", self.current + 1, self.questions.len())
    }

    /// Remaining time as `m:ss`.
    pub fn format_remaining(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    /// Hands the session the countdown it is responsible for stopping.
    /// A session that is already submitted stops it straight away.
    pub fn attach_timer(&mut self, handle: TimerHandle) {
        if self.phase == Phase::Submitted {
            handle.cancel();
            return;
        }
        if let Some(old) = self.timer.replace(handle) {
            old.cancel();
        }
    }

    /// Releases the countdown without submitting. Used on teardown.
    pub fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    pub fn select_option(&mut self, option: &str) -> bool {
        if self.phase != Phase::Active || !self.current_question().has_option(option) {
            return false;
        }
        self.selected = Some(option.to_string());
        true
    }

    pub fn advance(&mut self) -> Advance {
        if self.phase != Phase::Active {
            return Advance::Rejected;
        }
        let Some(answer) = self.selected.take() else {
            return Advance::Rejected;
        };

        self.answers.push(Answer {
            question_id: self.current_question().question_id.clone(),
            answer,
        });

        if self.is_last_question() {
            self.phase = Phase::Completed;
            Advance::Finished
        } else {
            self.current += 1;
            Advance::Next(self.current)
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::Active || self.remaining_secs == 0 {
            return Tick::Idle;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            log::info!(
                "Time is up for scenario {} after {} answers",
                self.scenario.id,
                self.answers.len()
            );
            self.phase = Phase::TimedOut;
            Tick::Expired
        } else {
            Tick::Running(self.remaining_secs)
        }
    }

    /// Whole seconds of clock time since the session started.
    pub fn elapsed_secs(&self) -> u64 {
        self.clock
            .now()
            .saturating_duration_since(self.started)
            .as_secs()
    }

    pub fn submission(&self) -> Submission {
        Submission {
            scenario_id: self.scenario.id.clone(),
            answers: self.answers.clone(),
            time_taken: self.elapsed_secs(),
        }
    }

    /// Sends the answers collected so far. Runs at most once successfully;
    /// later calls are no-ops. A failed attempt leaves the session as it
    /// was so it can be retried with the same answers.
    pub async fn submit(&mut self, api: &dyn SimulatorApi) -> Result<SubmitOutcome, QuizError> {
        if self.phase == Phase::Submitted {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }

        let submission = self.submission();
        match api.submit(&submission).await {
            Ok(result) => {
                log::info!(
                    "Scenario {} submitted: {} answers in {}s",
                    submission.scenario_id,
                    submission.answers.len(),
                    submission.time_taken
                );
                self.phase = Phase::Submitted;
                self.selected = None;
                self.stop_timer();
                Ok(SubmitOutcome::Submitted(result))
            }
            Err(e) => {
                log::warn!(
                    "Submission for scenario {} failed: {}",
                    submission.scenario_id,
                    e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn scenario(time_limit: u32, total: u32) -> Scenario {
        Scenario {
            id: "s1".to_string(),
            title: "First week".to_string(),
            time_limit,
            total_questions: total,
            description: None,
            difficulty: None,
        }
    }

    fn question(id: &str) -> Question {
        Question {
            question_id: id.to_string(),
            question_text: format!("Prompt {}", id),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            hint: None,
        }
    }

    fn session(n: usize) -> (QuizSession, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let questions = (1..=n).map(|i| question(&format!("q{}", i))).collect();
        let session = QuizSession::start(scenario(1, n as u32), questions, clock.clone()).unwrap();
        (session, clock)
    }

    #[test]
    fn start_rejects_empty_question_set() {
        let clock = Arc::new(ManualClock::new());
        let err = QuizSession::start(scenario(1, 0), vec![], clock).err().unwrap();
        assert!(matches!(err, QuizError::EmptyQuestionSet(id) if id == "s1"));
    }

    #[test]
    fn start_rejects_zero_time_limit() {
        let clock = Arc::new(ManualClock::new());
        let err = QuizSession::start(scenario(0, 1), vec![question("q1")], clock)
            .err()
            .unwrap();
        assert!(matches!(err, QuizError::InvalidScenario(_)));
    }

    #[test]
    fn start_initializes_countdown_from_minutes() {
        let (s, _) = session(3);
        assert_eq!(s.remaining_secs(), 60);
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().is_empty());
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.format_remaining(), "1:00");
        assert_eq!(s.progress(), "Question 1 of 3");
    }

    #[test]
    fn advance_without_selection_changes_nothing() {
        let (mut s, _) = session(2);
        assert_eq!(s.advance(), Advance::Rejected);
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().is_empty());
    }

    #[test]
    fn reselection_keeps_last_choice() {
        let (mut s, _) = session(2);
        assert!(s.select_option("A"));
        assert!(s.select_option("C"));
        assert!(!s.select_option("not an option"));
        assert_eq!(s.selected(), Some("C"));

        assert_eq!(s.advance(), Advance::Next(1));
        assert_eq!(s.answers()[0].answer, "C");
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn answering_last_question_completes() {
        let (mut s, _) = session(2);
        s.select_option("A");
        assert_eq!(s.advance(), Advance::Next(1));
        s.select_option("B");
        assert_eq!(s.advance(), Advance::Finished);
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.current_index(), 1);

        // No more answers once completed.
        assert!(!s.select_option("A"));
        assert_eq!(s.advance(), Advance::Rejected);
        assert_eq!(s.answers().len(), 2);
    }

    #[test]
    fn countdown_expires_once_and_never_goes_negative() {
        let (mut s, _) = session(3);
        let mut last = s.remaining_secs();
        for _ in 0..59 {
            match s.tick() {
                Tick::Running(left) => {
                    assert!(left < last);
                    last = left;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(s.tick(), Tick::Expired);
        assert_eq!(s.remaining_secs(), 0);
        assert_eq!(s.phase(), Phase::TimedOut);
        assert_eq!(s.tick(), Tick::Idle);
        assert_eq!(s.remaining_secs(), 0);
    }

    #[test]
    fn ticks_stop_counting_after_completion() {
        let (mut s, _) = session(1);
        s.select_option("A");
        assert_eq!(s.advance(), Advance::Finished);
        assert_eq!(s.tick(), Tick::Idle);
        assert_eq!(s.remaining_secs(), 60);
    }

    #[test]
    fn submission_uses_clock_time_not_countdown() {
        let (mut s, clock) = session(2);
        s.tick();
        s.tick();
        clock.advance(Duration::from_millis(7_900));
        s.select_option("B");
        s.advance();

        let submission = s.submission();
        assert_eq!(submission.time_taken, 7);
        assert_eq!(submission.scenario_id, "s1");
        assert_eq!(
            submission.answers,
            vec![Answer {
                question_id: "q1".to_string(),
                answer: "B".to_string()
            }]
        );
    }

    #[test]
    fn attached_timer_is_replaced_and_cancelled() {
        let (mut s, _) = session(1);
        let first_cancelled = Arc::new(AtomicBool::new(false));
        let second_cancelled = Arc::new(AtomicBool::new(false));
        let flag = first_cancelled.clone();
        s.attach_timer(TimerHandle::new(move || flag.store(true, Ordering::SeqCst)));
        let flag = second_cancelled.clone();
        s.attach_timer(TimerHandle::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(first_cancelled.load(Ordering::SeqCst));
        assert!(!second_cancelled.load(Ordering::SeqCst));

        drop(s);
        assert!(second_cancelled.load(Ordering::SeqCst));
    }
}
