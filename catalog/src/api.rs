use crate::catalog::Catalog;
use crate::config::Listener as ListenerConfig;
use crate::errors::CatalogError;
use crate::guard;
use crate::model::{Person, Resource, ResourceKind};
use crate::users::{User, UserError, UserRepository};
use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use http::StatusCode;
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::request::Parts;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum CatalogApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Resolves `user_id` on behalf of `current`, who must be allowed to see it.
    async fn visible_user(&self, current: &User, user_id: u64) -> Result<User, ApiError> {
        if !current.can_view(user_id) {
            return Err(CatalogError::Forbidden.into());
        }
        Ok(self.users.get_by_id(user_id).await?)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/people", get(people))
        .route("/people/random", get(random_person))
        .route("/users/{user_id}", get(user))
        .route("/users/{user_id}/{kind}", get(user_resources))
        .route("/users/{user_id}/{kind}/{resource_id}", get(user_resource))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn serve(listener: ListenerConfig, state: AppState) -> Result<(), CatalogApiError> {
    let app = router(state);

    let addr = format!("{}:{}", listener.host, listener.port);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Catalog API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}

/// The user owning the bearer token of the request.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        state
            .users
            .find_by_token(token)
            .await
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

async fn health() -> &'static str {
    "ok\n"
}

async fn people(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(state.catalog.get_people().await?))
}

async fn random_person(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Person>, ApiError> {
    state
        .catalog
        .get_random_person()
        .await?
        .map(Json)
        .ok_or(ApiError::NoPeople)
}

async fn user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<u64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.visible_user(&current, user_id).await?))
}

async fn user_resources(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path((user_id, kind)): Path<(u64, ResourceKind)>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let user = state.visible_user(&current, user_id).await?;
    let resources = state
        .catalog
        .get_person_resources(user.external_id, kind)
        .await?;
    Ok(Json(resources))
}

async fn user_resource(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path((user_id, kind, resource_id)): Path<(u64, ResourceKind, u64)>,
) -> Result<Json<Resource>, ApiError> {
    let user = state.visible_user(&current, user_id).await?;
    let person = state.catalog.get_person_by_id(user.external_id).await?;
    guard::authorize(&person, kind.relation(), resource_id)?;
    Ok(Json(state.catalog.get_resource(kind, resource_id).await?))
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("missing or invalid bearer token")]
    Unauthenticated,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error("no people available")]
    NoPeople,
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Catalog(CatalogError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Catalog(CatalogError::UpstreamRequestFailed(_)) => StatusCode::BAD_GATEWAY,
            ApiError::User(UserError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::NoPeople => StatusCode::NOT_FOUND,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}
