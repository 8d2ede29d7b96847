use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(alias = "scenario_id", deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    /// Minutes.
    pub time_limit: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl Scenario {
    pub fn time_limit_secs(&self) -> u64 {
        u64::from(self.time_limit) * 60
    }
}

/// One entry of the scenario listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    #[serde(alias = "id", deserialize_with = "string_or_number")]
    pub scenario_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    pub total_questions: u32,
    pub time_limit: u32,
}

impl ScenarioSummary {
    pub fn difficulty_marker(&self) -> &'static str {
        match self.difficulty.to_lowercase().as_str() {
            "easy" => "🟢",
            "medium" => "🟡",
            "hard" => "🔴",
            _ => "⚪",
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
