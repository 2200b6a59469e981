use std::sync::Arc;

use adopet::workflows::adoption::{
    status_for, AuthError, Credential, ErrorKind, Identity, IdentityProvider, UserId,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::infra::{DirectoryError, InMemoryUserDirectory, Registration};

pub(crate) fn user_router(directory: Arc<InMemoryUserDirectory>) -> Router {
    Router::new()
        .route("/api/v1/users", post(register_handler))
        .route(
            "/api/v1/users/:user_id",
            get(profile_handler).patch(edit_handler),
        )
        .route("/api/v1/me", get(current_user_handler))
        .with_state(directory)
}

impl DirectoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::MissingField(_) | DirectoryError::MalformedBody(_) => {
                ErrorKind::Validation
            }
            DirectoryError::EmailTaken => ErrorKind::Conflict,
            DirectoryError::NotFound(_) => ErrorKind::NotFound,
            DirectoryError::NotAccountHolder => ErrorKind::Forbidden,
            DirectoryError::Auth(AuthError::Unavailable(_)) | DirectoryError::Unavailable => {
                ErrorKind::Internal
            }
            DirectoryError::Auth(_) => ErrorKind::Auth,
        }
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let payload = json!({ "message": self.to_string() });
        (status_for(self.kind()), Json(payload)).into_response()
    }
}

fn registration(
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Registration, DirectoryError> {
    payload
        .map(|Json(registration)| registration)
        .map_err(|rejection| DirectoryError::MalformedBody(rejection.body_text()))
}

fn resolve_caller(
    directory: &InMemoryUserDirectory,
    headers: &HeaderMap,
) -> Result<Option<Identity>, DirectoryError> {
    match Credential::from_headers(headers)? {
        Some(credential) => Ok(Some(directory.resolve(&credential)?)),
        None => Ok(None),
    }
}

pub(crate) async fn register_handler(
    State(directory): State<Arc<InMemoryUserDirectory>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, DirectoryError> {
    let (token, user) = directory.register(registration(payload)?)?;
    info!(user_id = %user.id, "user registered");
    let payload = json!({
        "message": "Registration complete",
        "token": token,
        "user": user,
    });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn profile_handler(
    State(directory): State<Arc<InMemoryUserDirectory>>,
    Path(user_id): Path<String>,
) -> Result<Response, DirectoryError> {
    let user = directory.profile(&UserId(user_id))?;
    Ok(Json(json!({ "user": user })).into_response())
}

/// Edit the caller's own profile.
pub(crate) async fn edit_handler(
    State(directory): State<Arc<InMemoryUserDirectory>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, DirectoryError> {
    let caller = resolve_caller(&directory, &headers)?.ok_or(AuthError::MissingCredential)?;
    let user_id = UserId(user_id);
    if caller.id != user_id {
        return Err(DirectoryError::NotAccountHolder);
    }

    let user = directory.update(&user_id, registration(payload)?)?;
    info!(user_id = %user.id, "user profile updated");
    let payload = json!({ "message": "Profile updated", "user": user });
    Ok(Json(payload).into_response())
}

/// Returns the caller, or `null` when the request carries no credential.
pub(crate) async fn current_user_handler(
    State(directory): State<Arc<InMemoryUserDirectory>>,
    headers: HeaderMap,
) -> Result<Response, DirectoryError> {
    let user = resolve_caller(&directory, &headers)?;
    Ok(Json(user).into_response())
}
