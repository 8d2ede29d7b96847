use serde::{Deserialize, Serialize};
use serde_json::Value;

mod scenario;
pub use scenario::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Question {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn option_at(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub answer: String,
}

/// Body of `POST /simulator/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub scenario_id: String,
    pub answers: Vec<Answer>,
    pub time_taken: u64,
}

/// Whatever the scoring service sends back. The shape is owned by the
/// service, so it stays as raw JSON and only a few well-known fields are
/// peeked at for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionResult(pub Value);

impl SubmissionResult {
    pub fn score(&self) -> Option<f64> {
        self.0.get("score").and_then(Value::as_f64)
    }

    pub fn feedback(&self) -> Option<&str> {
        self.0.get("feedback").and_then(Value::as_str)
    }

    pub fn summary(&self) -> String {
        match (self.score(), self.feedback()) {
            (Some(score), Some(feedback)) => format!("Score: {}\n{}", score, feedback),
            (Some(score), None) => format!("Score: {}", score),
            (None, Some(feedback)) => feedback.to_string(),
            (None, None) => "Your answers were recorded.".to_string(),
        }
    }
}
