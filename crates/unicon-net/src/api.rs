//! Client for the UNICON REST API.
//!
//! Only the shape the offline core depends on is modelled here: the sync
//! endpoint that replays queued actions, plus the direct post/message submits
//! the composers attempt first. Success is any 2xx response; everything else
//! is a typed status error so callers can decide whether to queue.

use serde::Serialize;

use unicon_shared::{MessageDraft, PostDraft, QueuedAction};

use crate::error::{NetError, Result};

/// HTTP client bound to one API base URL (e.g. `http://host:8080/api`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replay a previously queued action against the sync endpoint.
    ///
    /// The bearer token is passed in by the caller, which reads it from the
    /// durable store at call time.
    pub async fn replay(&self, action: &QueuedAction, token: Option<&str>) -> Result<()> {
        self.post_json("/sync", action, token).await
    }

    /// Direct (live) submit of a forum post.
    pub async fn create_post(&self, draft: &PostDraft, token: Option<&str>) -> Result<()> {
        self.post_json("/posts", draft, token).await
    }

    /// Direct (live) submit of a direct message.
    pub async fn send_message(&self, draft: &MessageDraft, token: Option<&str>) -> Result<()> {
        self.post_json("/messages", draft, token).await
    }

    async fn post_json<T>(&self, path: &str, body: &T, token: Option<&str>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NetError::Status(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicon_shared::ActionKind;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_action() -> QueuedAction {
        QueuedAction {
            id: "1700000000000".into(),
            kind: ActionKind::Post,
            payload: serde_json::json!({ "body": "offline post" }),
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn replay_sends_bearer_and_action_body() {
        let server = MockServer::start().await;
        let action = sample_action();

        Mock::given(method("POST"))
            .and(path("/api/sync"))
            .and(header("authorization", "Bearer jwt-abc"))
            .and(body_json(&action))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(format!("{}/api", server.uri()));
        api.replay(&action, Some("jwt-abc")).await.unwrap();
    }

    #[tokio::test]
    async fn replay_non_success_is_a_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/sync"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = ApiClient::new(format!("{}/api", server.uri()));
        let err = api.replay(&sample_action(), None).await.unwrap_err();
        assert!(matches!(
            err,
            NetError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[tokio::test]
    async fn create_post_hits_posts_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/posts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(format!("{}/api/", server.uri()));
        let draft = PostDraft {
            body: "hello campus".into(),
            community_id: None,
        };
        api.create_post(&draft, None).await.unwrap();
    }
}
