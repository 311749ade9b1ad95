//! Typed HTTP client for the Storyforge persistence API.
//!
//! Every call is a single request with no retries. Failures are mapped onto
//! [`StoryError`] so callers can branch on [`storyforge_core::ErrorKind`]:
//! - 401 becomes [`StoryError::Unauthorized`]; the caller should drop its token.
//! - 404 becomes [`StoryError::NotFound`].
//! - 400 becomes [`StoryError::InvalidInput`] carrying the server's message.
//! - Transport failures and any other non-2xx status become [`StoryError::TransientNetwork`].

use api_shared::auth::ANON_KEY_HEADER;
use api_shared::{
    ErrorRes, GetStoryRes, HealthRes, ListStoriesRes, SessionRes, SignInReq, SignupReq, SuccessRes,
    User, UserRes,
};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use storyforge_core::{Story, StoryError, StoryMeta, StoryResult};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct StoryClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl StoryClient {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        debug!(url = %base_url, "Created story client");
        Self {
            client: Client::new(),
            base_url,
            token: None,
        }
    }

    /// Attaches a session token to every authenticated call.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/stories/{id}` with the id percent-encoded as a single path segment.
    fn story_url(&self, story_id: &str) -> StoryResult<Url> {
        let bad_url = || StoryError::InvalidInput(format!("bad server URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| bad_url())?;
        url.path_segments_mut()
            .map_err(|()| bad_url())?
            .pop_if_empty()
            .push("stories")
            .push(story_id);
        Ok(url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn health(&self) -> StoryResult<HealthRes> {
        send(self.client.get(self.url("/health"))).await
    }

    /// Creates an account. `anon_key` is sent in the `apikey` header when given.
    pub async fn signup(&self, req: &SignupReq, anon_key: Option<&str>) -> StoryResult<User> {
        let mut builder = self.client.post(self.url("/signup")).json(req);
        if let Some(key) = anon_key {
            builder = builder.header(ANON_KEY_HEADER, key);
        }
        let res: UserRes = send(builder).await?;
        Ok(res.user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> StoryResult<SessionRes> {
        let req = SignInReq {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        send(self.client.post(self.url("/sessions")).json(&req)).await
    }

    pub async fn sign_out(&self) -> StoryResult<()> {
        let _: SuccessRes = send(self.authed(self.client.delete(self.url("/sessions")))).await?;
        Ok(())
    }

    /// The user owning the current token.
    pub async fn whoami(&self) -> StoryResult<User> {
        let res: UserRes = send(self.authed(self.client.get(self.url("/sessions")))).await?;
        Ok(res.user)
    }

    /// Saves `story`, overwriting any previous version on the server.
    pub async fn save(&self, story: &Story) -> StoryResult<()> {
        let _: SuccessRes =
            send(self.authed(self.client.post(self.url("/stories")).json(story))).await?;
        Ok(())
    }

    pub async fn list(&self) -> StoryResult<Vec<StoryMeta>> {
        let res: ListStoriesRes = send(self.authed(self.client.get(self.url("/stories")))).await?;
        Ok(res.stories)
    }

    pub async fn load(&self, story_id: &str) -> StoryResult<Story> {
        let url = self.story_url(story_id)?;
        let res: GetStoryRes = send(self.authed(self.client.get(url))).await?;
        Ok(res.story)
    }

    pub async fn delete(&self, story_id: &str) -> StoryResult<()> {
        let url = self.story_url(story_id)?;
        let _: SuccessRes = send(self.authed(self.client.delete(url))).await?;
        Ok(())
    }
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> StoryResult<T> {
    let response = builder.send().await.map_err(|e| {
        error!(error = ?e, "HTTP request failed");
        StoryError::TransientNetwork(format!("Request failed: {e}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_for_status(status, &body));
    }

    response.json().await.map_err(|e| {
        error!(error = ?e, "Failed to parse response");
        StoryError::TransientNetwork(format!("Failed to parse JSON: {e}"))
    })
}

/// Maps a non-2xx response onto a [`StoryError`], preferring the server's `{error}` message.
pub fn error_for_status(status: StatusCode, body: &str) -> StoryError {
    let message = serde_json::from_str::<ErrorRes>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_owned());
    debug!(status = %status, error = %message, "API error");

    match status {
        StatusCode::UNAUTHORIZED => StoryError::Unauthorized(message),
        StatusCode::NOT_FOUND => StoryError::NotFound(message),
        StatusCode::BAD_REQUEST => StoryError::InvalidInput(message),
        _ => StoryError::TransientNetwork(format!("{status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_rest::identity::InMemoryIdentity;
    use api_rest::store::{InMemoryKv, StoryRepository};
    use api_rest::AppState;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use storyforge_core::{ErrorKind, Position, StoryNode};

    #[test]
    fn status_mapping() {
        let err = error_for_status(StatusCode::UNAUTHORIZED, r#"{"error":"Unauthorized"}"#);
        assert!(matches!(&err, StoryError::Unauthorized(m) if m == "Unauthorized"));
        assert_eq!(err.kind(), ErrorKind::Auth);

        let err = error_for_status(StatusCode::NOT_FOUND, r#"{"error":"Story not found"}"#);
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = error_for_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Email, password, and name are required"}"#,
        );
        assert_eq!(err.kind(), ErrorKind::UserInput);

        let err = error_for_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.kind(), ErrorKind::TransientNetwork);
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn story_urls_encode_the_id() {
        let client = StoryClient::new("http://localhost:3000/");
        assert_eq!(
            client.story_url("chapter 1?draft").expect("url").as_str(),
            "http://localhost:3000/stories/chapter%201%3Fdraft"
        );
        assert_eq!(
            client.story_url("a/b#1").expect("url").as_str(),
            "http://localhost:3000/stories/a%2Fb%231"
        );

        let nested = StoryClient::new("http://example.com/api");
        assert_eq!(
            nested.story_url("s1").expect("url").as_str(),
            "http://example.com/api/stories/s1"
        );
    }

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let state = AppState::new(
            StoryRepository::new(Arc::new(InMemoryKv::new())),
            Arc::new(InMemoryIdentity::new()),
            None,
        );
        tokio::spawn(api_rest::serve_listener(listener, state));
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn round_trip_against_live_server() {
        let base = spawn_server().await;
        let anon = StoryClient::new(&base);
        assert!(api_shared::HealthService::is_healthy(
            &anon.health().await.expect("health")
        ));

        let unauthorized = anon.list().await.expect_err("no token");
        assert_eq!(unauthorized.kind(), ErrorKind::Auth);

        anon.signup(
            &SignupReq {
                email: "author@example.com".into(),
                password: "quill-and-ink".into(),
                name: "Author".into(),
            },
            None,
        )
        .await
        .expect("signup");
        let session = anon
            .sign_in("author@example.com", "quill-and-ink")
            .await
            .expect("sign in");
        let client = StoryClient::new(&base).with_token(Some(session.access_token));

        let now = Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap();
        let story = Story::new("story-1", now).with_nodes(
            vec![StoryNode::new("n1", "Opening", "Hello.", Position::new(400.0, 200.0)).as_start()],
            now,
        );
        client.save(&story).await.expect("save");
        assert_eq!(client.list().await.expect("list").len(), 1);
        assert_eq!(client.load("story-1").await.expect("load"), story);

        for id in ["chapter 1?draft", "a/b", "x#1"] {
            let odd = Story {
                id: id.to_owned(),
                ..story.clone()
            };
            client.save(&odd).await.expect("save odd id");
            assert_eq!(client.load(id).await.expect("load odd id").id, id);
            client.delete(id).await.expect("delete odd id");
        }
        assert_eq!(client.list().await.expect("list").len(), 1);

        client.delete("story-1").await.expect("delete");
        let missing = client.load("story-1").await.expect_err("gone");
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        assert_eq!(client.whoami().await.expect("whoami").email, "author@example.com");
        client.sign_out().await.expect("sign out");
        assert_eq!(
            client.list().await.expect_err("revoked").kind(),
            ErrorKind::Auth
        );
    }
}
