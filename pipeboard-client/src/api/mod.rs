pub mod http;

use pipeboard_core::types::{Lead, LeadForm};

/// Abstract remote lead store.
/// Implementations: HttpLeadStore (REST), in-memory fakes in tests.
#[allow(async_fn_in_trait)]
pub trait LeadStore {
    /// All leads currently in the stage named `stage_name`, in remote order.
    async fn list_leads(&self, stage_name: &str) -> Result<Vec<Lead>, RequestError>;

    /// Create a lead; the remote store assigns and returns its id.
    async fn create_lead(&self, form: &LeadForm) -> Result<i64, RequestError>;

    /// Partial update; `None` fields are left untouched remotely.
    async fn update_lead(&self, id: i64, form: &LeadForm) -> Result<(), RequestError>;

    async fn delete_lead(&self, id: i64) -> Result<(), RequestError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(String),
}
