use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::QuizError;
use crate::types::{Question, Scenario, ScenarioSummary, Submission, SubmissionResult};

/// The simulator service the quiz runs against.
#[async_trait]
pub trait SimulatorApi: Send + Sync {
    async fn list_scenarios(&self) -> Result<Vec<ScenarioSummary>, QuizError>;
    async fn get_scenario(&self, scenario_id: &str) -> Result<Scenario, QuizError>;
    async fn get_questions(&self, scenario_id: &str) -> Result<Vec<Question>, QuizError>;
    async fn submit(&self, submission: &Submission) -> Result<SubmissionResult, QuizError>;
    async fn results(&self) -> Result<Value, QuizError>;
}

pub struct HttpSimulatorApi {
    client: Client,
    base_url: Url,
}

impl HttpSimulatorApi {
    pub fn new(config: &Config) -> Result<Self, QuizError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| QuizError::Config("SIMULATOR_API_TOKEN is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let base_url = Url::parse(config.api_url.trim())
            .map_err(|e| QuizError::Config(format!("SIMULATOR_API_URL is not a valid URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(QuizError::Config(format!("SIMULATOR_API_URL cannot be used as a base: {}", base_url)));
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
        })
    }

    /// Appends each segment percent-encoded, so a segment never turns into
    /// extra path components, a query or a fragment.
    fn url(&self, segments: &[&str]) -> Result<Url, QuizError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| QuizError::Config(format!("{} cannot be used as a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, QuizError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuizError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl SimulatorApi for HttpSimulatorApi {
    async fn list_scenarios(&self) -> Result<Vec<ScenarioSummary>, QuizError> {
        let url = self.url(&["simulator", "scenarios"])?;
        self.send(self.client.get(url)).await
    }

    async fn get_scenario(&self, scenario_id: &str) -> Result<Scenario, QuizError> {
        let url = self.url(&["simulator", "scenarios", scenario_segment(scenario_id)?])?;
        self.send(self.client.get(url)).await
    }

    async fn get_questions(&self, scenario_id: &str) -> Result<Vec<Question>, QuizError> {
        let url = self.url(&[
            "simulator",
            "scenarios",
            scenario_segment(scenario_id)?,
            "questions",
        ])?;
        self.send(self.client.get(url)).await
    }

    async fn submit(&self, submission: &Submission) -> Result<SubmissionResult, QuizError> {
        log::info!(
            "Submitting {} answers for scenario {}",
            submission.answers.len(),
            submission.scenario_id
        );
        let url = self.url(&["simulator", "submit"])?;
        self.send(self.client.post(url).json(submission)).await
    }

    async fn results(&self) -> Result<Value, QuizError> {
        let url = self.url(&["simulator", "results"])?;
        self.send(self.client.get(url)).await
    }
}

// `.` and `..` get dropped or resolved during URL handling, so they can
// never name a scenario.
fn scenario_segment(scenario_id: &str) -> Result<&str, QuizError> {
    match scenario_id {
        "" | "." | ".." => Err(QuizError::InvalidScenario(format!(
            "{:?} is not a scenario id",
            scenario_id
        ))),
        id => Ok(id),
    }
}
