//! Request handlers for the four database endpoints.

use axum::extract::{Multipart, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use pictdb::{Error, ListMode, MAX_PIC_ID, Resolution};
use serde::Deserialize;

use crate::AppState;

/// Engine error carried to the client as `500` with an `ERROR:` body.
pub(crate) struct EngineError(Error);

impl From<Error> for EngineError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("ERROR: {}\n", self.0),
        )
            .into_response()
    }
}

/// Truncates a client-supplied picture id at the 127-byte limit.
fn truncate_id(id: &str) -> &str {
    if id.len() <= MAX_PIC_ID {
        return id;
    }
    let mut cut = MAX_PIC_ID;
    while !id.is_char_boundary(cut) {
        cut -= 1;
    }
    &id[..cut]
}

/// `302 Found` back to the landing page after a mutation.
fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/index.html")]).into_response()
}

pub(crate) async fn list(State(state): State<AppState>) -> Response {
    let db = state.db.lock().await;
    (
        [(header::CONTENT_TYPE, "application/json")],
        db.list(ListMode::Json),
    )
        .into_response()
}

#[derive(Deserialize)]
pub(crate) struct ReadParams {
    pict_id: Option<String>,
    res: Option<String>,
}

pub(crate) async fn read(
    State(state): State<AppState>,
    Query(params): Query<ReadParams>,
) -> Result<Response, EngineError> {
    let pict_id = params
        .pict_id
        .filter(|id| !id.is_empty())
        .ok_or(Error::NotEnoughArguments)?;
    let res: Resolution = params.res.as_deref().unwrap_or("orig").parse()?;

    let mut db = state.db.lock().await;
    let bytes = db.read(&pict_id, res, &state.codec)?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

pub(crate) async fn insert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, EngineError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidArgument(e.to_string()))?
    {
        // The uploaded part's file name is the picture id.
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let pict_id = truncate_id(&name).to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        let mut db = state.db.lock().await;
        db.insert(&bytes, &pict_id, &state.codec)?;
        return Ok(redirect_home());
    }
    Err(Error::NotEnoughArguments.into())
}

#[derive(Deserialize)]
pub(crate) struct DeleteParams {
    pict_id: Option<String>,
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Response, EngineError> {
    let pict_id = params
        .pict_id
        .filter(|id| !id.is_empty())
        .ok_or(Error::NotEnoughArguments)?;

    let mut db = state.db.lock().await;
    db.delete(&pict_id)?;
    Ok(redirect_home())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_truncation_respects_limit() {
        let long = "a".repeat(300);
        assert_eq!(truncate_id(&long).len(), MAX_PIC_ID);
        assert_eq!(truncate_id("pic1"), "pic1");
    }
}
