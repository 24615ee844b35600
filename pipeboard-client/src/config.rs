/// Configuration for the board client, read from environment variables
/// with documented fallbacks when a value is missing or malformed.
use pipeboard_core::types::Stage;
use std::env;

pub const ENV_API_URL: &str = "PIPEBOARD_API_URL";
pub const ENV_STAGES: &str = "PIPEBOARD_STAGES";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

fn fallback_stages() -> Vec<Stage> {
    [(1, "New"), (2, "Qualified"), (3, "Proposition"), (4, "Won")]
        .into_iter()
        .map(|(stage_id, name)| Stage { stage_id, name: name.to_string() })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub stages: Vec<Stage>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            stages: fallback_stages(),
        }
    }
}

impl Config {
    /// Read `PIPEBOARD_API_URL` and `PIPEBOARD_STAGES` from the process
    /// environment. `PIPEBOARD_STAGES` must be a JSON array, for example:
    /// `[{"name":"New","stageId":1},{"name":"Qualified","stageId":2}]`.
    pub fn from_env() -> Self {
        Self::from_values(env::var(ENV_API_URL).ok(), env::var(ENV_STAGES).ok())
    }

    pub fn from_values(api_url: Option<String>, stages_json: Option<String>) -> Self {
        let api_base_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let stages = match stages_json {
            Some(raw) => parse_stages(&raw).unwrap_or_else(|| {
                log::warn!("[config] {} invalid, using fallback stages", ENV_STAGES);
                fallback_stages()
            }),
            None => fallback_stages(),
        };
        Self { api_base_url, stages }
    }
}

/// Accepts `stageId` as either a number or a numeric string.
fn parse_stages(raw: &str) -> Option<Vec<Stage>> {
    let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
    let entries = parsed.as_array()?;
    let mut stages = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.get("name")?.as_str()?;
        let raw_id = entry.get("stageId")?;
        let stage_id = match raw_id.as_i64() {
            Some(n) => n,
            None => raw_id.as_str()?.parse().ok()?,
        };
        stages.push(Stage { stage_id, name: name.to_string() });
    }
    Some(stages)
}
