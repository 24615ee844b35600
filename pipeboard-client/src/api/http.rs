/// REST implementation of the lead store.
///
/// Every request carries the stored bearer token when one exists. A 401
/// response clears the token and fires the registered unauthorized hook
/// (the login-redirect seam) before surfacing as `RequestError::Unauthorized`.
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pipeboard_core::types::{Lead, LeadForm};
use serde::Deserialize;
use std::sync::Arc;

use super::{LeadStore, RequestError};
use crate::session::TokenStore;

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

pub struct HttpLeadStore {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

#[derive(Deserialize)]
struct CreatedLead {
    id: i64,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpLeadStore {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            on_unauthorized: None,
        }
    }

    /// Called whenever a request comes back 401, after the stored token has
    /// been cleared. The presentation layer routes to its login surface here.
    pub fn set_unauthorized_hook(&mut self, hook: UnauthorizedHook) {
        self.on_unauthorized = Some(hook);
    }

    /// Authenticate and persist the returned bearer token.
    pub async fn login(&self, username: &str, api_key: &str) -> Result<(), RequestError> {
        let body = serde_json::json!({ "username": username, "api_key": api_key });
        let resp = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp, "Login failed".to_string()).await);
        }
        let login: LoginResponse = resp
            .json()
            .await
            .map_err(|e| RequestError::Decode(e.to_string()))?;
        self.tokens.save(&login.token);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, RequestError> {
        let req = match self.tokens.get() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send().await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.tokens.clear();
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(RequestError::Unauthorized);
        }
        Ok(resp)
    }
}

/// Build a status error from a non-success response, preferring the body's
/// `{"error": ...}` message over the fallback.
async fn status_error(resp: reqwest::Response, fallback: String) -> RequestError {
    let status = resp.status().as_u16();
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or(fallback);
    RequestError::Status { status, message }
}

impl LeadStore for HttpLeadStore {
    async fn list_leads(&self, stage_name: &str) -> Result<Vec<Lead>, RequestError> {
        let stage = utf8_percent_encode(stage_name, NON_ALPHANUMERIC);
        let resp = self
            .send(self.http.get(self.url(&format!("/crm/leads?stage={}", stage))))
            .await?;
        if !resp.status().is_success() {
            let fallback = format!(
                "Failed to fetch leads for stage \"{}\" (HTTP {})",
                stage_name,
                resp.status().as_u16()
            );
            return Err(status_error(resp, fallback).await);
        }
        resp.json().await.map_err(|e| RequestError::Decode(e.to_string()))
    }

    async fn create_lead(&self, form: &LeadForm) -> Result<i64, RequestError> {
        let resp = self
            .send(self.http.post(self.url("/crm/leads")).json(form))
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp, "Failed to create lead".to_string()).await);
        }
        let created: CreatedLead = resp
            .json()
            .await
            .map_err(|e| RequestError::Decode(e.to_string()))?;
        Ok(created.id)
    }

    async fn update_lead(&self, id: i64, form: &LeadForm) -> Result<(), RequestError> {
        let resp = self
            .send(self.http.put(self.url(&format!("/crm/leads/{}", id))).json(form))
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp, "Failed to update lead".to_string()).await);
        }
        Ok(())
    }

    async fn delete_lead(&self, id: i64) -> Result<(), RequestError> {
        let resp = self
            .send(self.http.delete(self.url(&format!("/crm/leads/{}", id))))
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp, "Failed to delete lead".to_string()).await);
        }
        Ok(())
    }
}
