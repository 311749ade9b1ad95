//! # API REST
//!
//! REST persistence service for Storyforge.
//!
//! Handles:
//! - HTTP endpoints with axum (stories, signup, sessions, health)
//! - Bearer-token authentication through an [`identity::IdentityProvider`]
//! - Story storage through a [`store::KvStore`]
//! - OpenAPI document generation with utoipa
//!
//! Uses `api-shared` for request/response bodies so the CLI client and this server agree on
//! the wire format.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod identity;
pub mod store;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use api_shared::auth::ANON_KEY_HEADER;
use api_shared::{
    bearer_token, validate_anon_key, AuthError, ErrorRes, GetStoryRes, HealthRes, HealthService,
    ListStoriesRes, SessionRes, SignInReq, SignupReq, SuccessRes, User, UserRes,
};
use storyforge_core::{Choice, Position, Story, StoryMeta, StoryNode};
use storyforge_types::{EmailAddress, NonEmptyText};

use config::ServerConfig;
use identity::{IdentityError, IdentityProvider, InMemoryIdentity};
use store::{InMemoryKv, JsonFileKv, KvStore, StoreError, StoreResult, StoryRepository};

/// Shared state for every request handler.
#[derive(Clone)]
pub struct AppState {
    stories: StoryRepository,
    identity: Arc<dyn IdentityProvider>,
    anon_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        stories: StoryRepository,
        identity: Arc<dyn IdentityProvider>,
        anon_key: Option<&str>,
    ) -> Self {
        Self {
            stories,
            identity,
            anon_key: anon_key.map(Arc::from),
        }
    }
}

/// Builds the state described by `cfg`: a JSON file store when a data file is configured,
/// otherwise an in-memory store, plus the development identity provider.
pub async fn build_state(cfg: &ServerConfig) -> StoreResult<AppState> {
    let kv: Arc<dyn KvStore> = match cfg.data_file() {
        Some(path) => Arc::new(JsonFileKv::open(path).await?),
        None => {
            tracing::warn!("no data file configured; stories are kept in memory only");
            Arc::new(InMemoryKv::new())
        }
    };
    Ok(AppState::new(
        StoryRepository::new(kv),
        Arc::new(InMemoryIdentity::new()),
        cfg.anon_key(),
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        signup,
        create_session,
        current_session,
        delete_session,
        save_story,
        list_stories,
        get_story,
        delete_story,
    ),
    components(schemas(
        HealthRes,
        SuccessRes,
        ErrorRes,
        ListStoriesRes,
        GetStoryRes,
        SignupReq,
        SignInReq,
        SessionRes,
        User,
        UserRes,
        Story,
        StoryMeta,
        StoryNode,
        Choice,
        Position,
    ))
)]
pub struct ApiDoc;

/// Assembles the router with request tracing and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/signup", post(signup))
        .route(
            "/sessions",
            get(current_session)
                .post(create_session)
                .delete(delete_session),
        )
        .route("/stories", get(list_stories).post(save_story))
        .route("/stories/:id", get(get_story).delete(delete_story))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the REST server until the listener fails.
///
/// # Errors
/// Returns an error if the store cannot be opened or the address cannot be bound.
pub async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;

    tracing::info!("++ Starting Storyforge REST on {}", cfg.rest_addr());
    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    serve_listener(listener, state).await
}

/// Serves the router on an already bound listener.
pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    state: AppState,
) -> anyhow::Result<()> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

/// Failure of a handler, rendered as `{ "error": ... }` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    BadRequest(String),
    NotFound(&'static str),
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Auth(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.to_owned()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.to_owned()),
        };
        (status, Json(ErrorRes { error })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Resolves the bearer token on the request to a user.
async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    operation: &str,
) -> Result<User, ApiError> {
    let token = bearer_token(authorization(headers)).map_err(ApiError::Auth)?;
    state.identity.user_for_token(token).await.map_err(|e| {
        tracing::warn!("Auth error in {}: {}", operation, e);
        ApiError::Auth(AuthError::Invalid)
    })
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitors and the CLI.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

/// Serves the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupReq,
    responses(
        (status = 200, description = "Account created and confirmed", body = UserRes),
        (status = 400, description = "Missing or invalid fields", body = ErrorRes),
        (status = 401, description = "Anonymous key missing or wrong", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create an account.
///
/// Accounts are confirmed immediately. When the server has an anonymous key configured the
/// request must present it in the `apikey` header.
async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SignupReq>,
) -> ApiResult<UserRes> {
    let presented = headers.get(ANON_KEY_HEADER).and_then(|v| v.to_str().ok());
    validate_anon_key(presented, state.anon_key.as_deref()).map_err(ApiError::Auth)?;

    if req.is_incomplete() {
        return Err(ApiError::BadRequest(
            "Email, password, and name are required".into(),
        ));
    }
    let email = EmailAddress::parse(&req.email).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let name = NonEmptyText::new(&req.name).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    match state.identity.create_user(&email, &req.password, &name).await {
        Ok(user) => Ok(Json(UserRes { user })),
        Err(e) if e.is_client_error() => {
            tracing::info!("Signup error: {}", e);
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(e) => {
            tracing::error!("Signup exception: {:?}", e);
            Err(ApiError::Internal("Internal server error during signup"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/sessions",
    request_body = SignInReq,
    responses(
        (status = 200, description = "Session issued", body = SessionRes),
        (status = 400, description = "Invalid credentials", body = ErrorRes)
    )
)]
/// Sign in with email and password.
async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<SignInReq>,
) -> ApiResult<SessionRes> {
    let invalid = || ApiError::BadRequest(IdentityError::InvalidCredentials.to_string());
    let email = EmailAddress::parse(&req.email).map_err(|_| invalid())?;

    match state.identity.sign_in(&email, &req.password).await {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            tracing::info!("Sign in error: {}", e);
            Err(invalid())
        }
    }
}

#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "User owning the bearer token", body = UserRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Look up the user behind the presented session token.
async fn current_session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<UserRes> {
    let user = authenticate(&state, &headers, "current session").await?;
    Ok(Json(UserRes { user }))
}

#[utoipa::path(
    delete,
    path = "/sessions",
    responses(
        (status = 200, description = "Session revoked", body = SuccessRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Sign out, revoking the presented session token.
async fn delete_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<SuccessRes> {
    let token = bearer_token(authorization(&headers)).map_err(ApiError::Auth)?;
    state.identity.sign_out(token).await.map_err(|e| {
        tracing::warn!("Auth error in sign out: {}", e);
        ApiError::Auth(AuthError::Invalid)
    })?;
    Ok(Json(SuccessRes::ok()))
}

#[utoipa::path(
    post,
    path = "/stories",
    request_body = Story,
    responses(
        (status = 200, description = "Story saved", body = SuccessRes),
        (status = 400, description = "Story has a non-finite scene position", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Save (create or overwrite) a story owned by the caller.
///
/// Last write wins. The caller's story list entry is added or refreshed in place.
async fn save_story(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(story): Json<Story>,
) -> ApiResult<SuccessRes> {
    let user = authenticate(&state, &headers, "save story").await?;
    match state.stories.save(&user.id, &story).await {
        Ok(()) => Ok(Json(SuccessRes::ok())),
        Err(StoreError::InvalidStory(e)) => {
            tracing::warn!("Rejected story {}: {}", story.id, e);
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(e) => {
            tracing::error!("Save story exception: {:?}", e);
            Err(ApiError::Internal("Internal server error while saving story"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/stories",
    responses(
        (status = 200, description = "Caller's stories, oldest first", body = ListStoriesRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List the caller's stories without their scene bodies.
async fn list_stories(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ListStoriesRes> {
    let user = authenticate(&state, &headers, "get stories").await?;
    match state.stories.list(&user.id).await {
        Ok(stories) => Ok(Json(ListStoriesRes { stories })),
        Err(e) => {
            tracing::error!("Get stories exception: {:?}", e);
            Err(ApiError::Internal("Internal server error while fetching stories"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/stories/{id}",
    params(("id" = String, Path, description = "Story id")),
    responses(
        (status = 200, description = "The story", body = GetStoryRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes),
        (status = 404, description = "Story not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Fetch one of the caller's stories.
async fn get_story(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<GetStoryRes> {
    let user = authenticate(&state, &headers, "get story").await?;
    match state.stories.get(&user.id, &id).await {
        Ok(Some(story)) => Ok(Json(GetStoryRes { story })),
        Ok(None) => Err(ApiError::NotFound("Story not found")),
        Err(e) => {
            tracing::error!("Get story exception: {:?}", e);
            Err(ApiError::Internal("Internal server error while fetching story"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/stories/{id}",
    params(("id" = String, Path, description = "Story id")),
    responses(
        (status = 200, description = "Story deleted (or never existed)", body = SuccessRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Delete one of the caller's stories and its list entry.
async fn delete_story(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<SuccessRes> {
    let user = authenticate(&state, &headers, "delete story").await?;
    match state.stories.delete(&user.id, &id).await {
        Ok(()) => Ok(Json(SuccessRes::ok())),
        Err(e) => {
            tracing::error!("Delete story exception: {:?}", e);
            Err(ApiError::Internal("Internal server error while deleting story"))
        }
    }
}
