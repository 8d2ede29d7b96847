use std::fmt;

#[derive(Debug)]
pub enum QuizError {
    HttpError(reqwest::Error),
    Status { status: u16, body: String },
    SerdeError(serde_json::Error),
    EmptyQuestionSet(String),
    InvalidScenario(String),
    Config(String),
}

impl QuizError {
    /// Failures talking to the simulator service. Worth a retry.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            QuizError::HttpError(_) | QuizError::Status { .. } | QuizError::SerdeError(_)
        )
    }
}

impl std::error::Error for QuizError {}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::HttpError(e) => write!(f, "HTTP error: {}", e),
            QuizError::Status { status, body } => {
                write!(f, "Simulator service returned {}: {}", status, body)
            }
            QuizError::SerdeError(e) => write!(f, "Serialization error: {}", e),
            QuizError::EmptyQuestionSet(id) => write!(f, "Scenario {} has no questions", id),
            QuizError::InvalidScenario(msg) => write!(f, "Invalid scenario: {}", msg),
            QuizError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl From<reqwest::Error> for QuizError {
    fn from(err: reqwest::Error) -> Self {
        QuizError::HttpError(err)
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::SerdeError(err)
    }
}
