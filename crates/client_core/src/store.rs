//! Remote store access: one HTTP round trip per operation, no retries, no
//! local cache. The controller owns all snapshot mutation.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use shared::{
    domain::{Todo, TodoId},
    error::ApiError,
    protocol::{CreateTodoRequest, TodoDraft, TodoPatch},
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("todo {0} does not exist")]
    NotFound(TodoId),
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos owned by the current session, newest first.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    /// Inserts a fresh record with `completed = false`; returns the stored
    /// row including the server-assigned id and timestamp.
    async fn create(&self, draft: &TodoDraft) -> Result<Todo, StoreError>;

    /// Applies the patch to the identified record; returns the updated row.
    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError>;

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError>;

    /// Convenience wrapper over `update` with a completed-only patch.
    async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<Todo, StoreError> {
        self.update(id, &TodoPatch::completed(completed)).await
    }
}

/// Store client speaking the remote table's REST surface: `GET/POST /todos`,
/// `PATCH/DELETE /todos/{id}`, bearer-token session auth.
#[derive(Debug)]
pub struct HttpTodoStore {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpTodoStore {
    pub fn new(server_url: &str, access_token: Option<String>) -> Result<Self, StoreError> {
        let parsed = Url::parse(server_url).map_err(|err| StoreError::InvalidUrl {
            url: server_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl {
                url: server_url.to_string(),
                reason: "url cannot serve as a base".to_string(),
            });
        }

        Ok(Self {
            http: Client::new(),
            base_url: server_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: &TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Maps a non-success response to `StoreError`, preferring the store's own
/// error body when it parses.
async fn reject(response: Response, id: Option<&TodoId>) -> StoreError {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return StoreError::NotFound(id.clone());
        }
    }

    let message = match response.json::<ApiError>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_string(),
    };
    StoreError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl TodoStore for HttpTodoStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        tracing::debug!("store: list todos");
        let response = self
            .authorize(self.http.get(self.todos_url()))
            .query(&[("order", "created_at.desc")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(reject(response, None).await);
        }
        Ok(response.json().await?)
    }

    async fn create(&self, draft: &TodoDraft) -> Result<Todo, StoreError> {
        tracing::debug!(title_len = draft.title.len(), "store: create todo");
        let response = self
            .authorize(self.http.post(self.todos_url()))
            .json(&CreateTodoRequest::from(draft))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(reject(response, None).await);
        }
        Ok(response.json().await?)
    }

    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError> {
        tracing::debug!(todo_id = %id, "store: update todo");
        let response = self
            .authorize(self.http.patch(self.todo_url(id)))
            .json(patch)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(reject(response, Some(id)).await);
        }
        Ok(response.json().await?)
    }

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError> {
        tracing::debug!(todo_id = %id, "store: delete todo");
        let response = self
            .authorize(self.http.delete(self.todo_url(id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(reject(response, Some(id)).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
