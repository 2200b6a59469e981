use std::sync::Arc;

use adopet::workflows::adoption::{
    authenticate, AdoptionError, ImageRef, ImageStore, ImageStoreError, ImageUpload,
    ListingGuard, ValidationError,
};
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::infra::{InMemoryImageStore, InMemoryUserDirectory};

#[derive(Clone)]
pub(crate) struct ImageRoutesState {
    pub(crate) images: Arc<InMemoryImageStore>,
    pub(crate) identities: Arc<InMemoryUserDirectory>,
    pub(crate) guard: Arc<ListingGuard>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadParams {
    pub(crate) file_name: String,
}

/// Request bodies are capped at the configured image limit.
pub(crate) fn image_router(state: ImageRoutesState) -> Router {
    let limit = state.guard.max_image_bytes();
    Router::new()
        .route("/api/v1/images", post(upload_handler))
        .route("/api/v1/images/:reference", get(download_handler))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Store the raw request body and hand back the reference to cite in listings.
pub(crate) async fn upload_handler(
    State(state): State<ImageRoutesState>,
    headers: HeaderMap,
    params: Result<Query<UploadParams>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AdoptionError> {
    authenticate(state.identities.as_ref(), &headers)?;
    let Query(params) = params.map_err(|_| ValidationError::MissingField("file_name"))?;
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ValidationError::UploadTooLarge {
                limit: state.guard.max_image_bytes(),
            }
        } else {
            ValidationError::MalformedBody(rejection.body_text())
        }
    })?;
    state.guard.upload(&params.file_name, body.len())?;

    let reference = state.images.store(ImageUpload {
        file_name: params.file_name,
        bytes: body.to_vec(),
    })?;
    let payload = json!({ "image": reference });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn download_handler(
    State(state): State<ImageRoutesState>,
    Path(reference): Path<String>,
) -> Result<Response, AdoptionError> {
    let reference = ImageRef(reference);
    let bytes = state
        .images
        .load(&reference)?
        .ok_or_else(|| ImageStoreError::NotFound(reference.as_str().to_string()))?;
    let mime = mime_guess::from_path(reference.as_str()).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}
