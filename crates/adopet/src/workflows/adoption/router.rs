use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{Identity, PetSubmission};
use super::identity::{AuthError, Credential, IdentityProvider};
use super::repository::PetStore;
use super::service::{AdoptionError, AdoptionService, ErrorKind};
use super::validation::ValidationError;

/// Shared handles for the adoption routes.
pub struct AdoptionState<S, P> {
    pub service: Arc<AdoptionService<S>>,
    pub identities: Arc<P>,
}

impl<S, P> AdoptionState<S, P> {
    pub fn new(service: Arc<AdoptionService<S>>, identities: Arc<P>) -> Self {
        Self {
            service,
            identities,
        }
    }
}

impl<S, P> Clone for AdoptionState<S, P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            identities: Arc::clone(&self.identities),
        }
    }
}

/// Router builder exposing the pet listing and adoption endpoints.
pub fn adoption_router<S, P>(state: AdoptionState<S, P>) -> Router
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/pets",
            get(list_handler::<S, P>).post(create_handler::<S, P>),
        )
        .route(
            "/api/v1/pets/:pet_id",
            get(get_handler::<S, P>)
                .patch(update_handler::<S, P>)
                .delete(delete_handler::<S, P>),
        )
        .route(
            "/api/v1/pets/:pet_id/schedule",
            patch(schedule_handler::<S, P>),
        )
        .route(
            "/api/v1/pets/:pet_id/conclude",
            patch(conclude_handler::<S, P>),
        )
        .route("/api/v1/me/pets", get(owner_pets_handler::<S, P>))
        .route("/api/v1/me/adoptions", get(adoptions_handler::<S, P>))
        .with_state(state)
}

/// Resolve the caller behind the request's bearer credential.
pub fn authenticate<P>(identities: &P, headers: &HeaderMap) -> Result<Identity, AdoptionError>
where
    P: IdentityProvider + ?Sized,
{
    let credential = Credential::from_headers(headers)?.ok_or(AuthError::MissingCredential)?;
    Ok(identities.resolve(&credential)?)
}

/// Unwrap a JSON body, reporting decode failures as validation errors so they
/// share the `{"message"}` payload of every other failure.
pub fn decode_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ValidationError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::InvalidId => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AdoptionError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind());
        if status.is_server_error() {
            error!(error = %self, "adoption request failed");
        }
        let payload = json!({ "message": self.to_string() });
        (status, Json(payload)).into_response()
    }
}

pub(crate) async fn create_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    headers: HeaderMap,
    payload: Result<Json<PetSubmission>, JsonRejection>,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let owner = authenticate(state.identities.as_ref(), &headers)?;
    let submission = decode_body(payload)?;
    let pet = state.service.create(&owner, submission)?;
    let payload = json!({ "message": "Pet listed successfully", "pet": pet });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn list_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let pets = state.service.list_all()?;
    Ok(Json(json!({ "pets": pets })).into_response())
}

pub(crate) async fn owner_pets_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    headers: HeaderMap,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let caller = authenticate(state.identities.as_ref(), &headers)?;
    let pets = state.service.list_by_owner(&caller)?;
    Ok(Json(json!({ "pets": pets })).into_response())
}

pub(crate) async fn adoptions_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    headers: HeaderMap,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let caller = authenticate(state.identities.as_ref(), &headers)?;
    let pets = state.service.list_by_adopter(&caller)?;
    Ok(Json(json!({ "pets": pets })).into_response())
}

pub(crate) async fn get_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    Path(pet_id): Path<String>,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let pet = state.service.get(&pet_id)?;
    Ok(Json(json!({ "pet": pet })).into_response())
}

pub(crate) async fn delete_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let caller = authenticate(state.identities.as_ref(), &headers)?;
    state.service.delete(&caller, &pet_id)?;
    Ok(Json(json!({ "message": "Pet removed successfully" })).into_response())
}

pub(crate) async fn update_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    payload: Result<Json<PetSubmission>, JsonRejection>,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let caller = authenticate(state.identities.as_ref(), &headers)?;
    let submission = decode_body(payload)?;
    let pet = state.service.update(&caller, &pet_id, submission)?;
    let payload = json!({ "message": "Pet updated successfully", "pet": pet });
    Ok(Json(payload).into_response())
}

pub(crate) async fn schedule_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let caller = authenticate(state.identities.as_ref(), &headers)?;
    let confirmation = state.service.schedule_visit(&caller, &pet_id)?;
    Ok(Json(confirmation).into_response())
}

pub(crate) async fn conclude_handler<S, P>(
    State(state): State<AdoptionState<S, P>>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<Response, AdoptionError>
where
    S: PetStore + 'static,
    P: IdentityProvider + 'static,
{
    let caller = authenticate(state.identities.as_ref(), &headers)?;
    let pet = state.service.conclude_adoption(&caller, &pet_id)?;
    let payload = json!({ "message": "Adoption concluded successfully", "pet": pet });
    Ok(Json(payload).into_response())
}
