//! Download endpoints reading from per-session serve folders.

use super::common::{dir_exists, is_missing};
use crate::error::{ApiError, ApiResult};
use crate::metrics::FILES_DOWNLOADED;
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use parcel_core::{DOWNLOAD_CONTENT_TYPE, SERVE_EXTENSION, SessionId};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::Path as FsPath;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Characters escaped in the `filename*` parameter.
const FILENAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// GET /d/{id}/{file_name}
///
/// Streams the file as `application/pgp-encrypted` with an attachment
/// disposition carrying the requested name.
pub async fn download_file(
    State(state): State<AppState>,
    Path((session, file_name)): Path<(String, String)>,
) -> ApiResult<Response> {
    let session = SessionId::from(session);
    let path = state.layout.serve_file(&session, &file_name);
    let not_found = || ApiError::NotFound(format!("file '{file_name}' in '{session}'"));

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if is_missing(&e) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    FILES_DOWNLOADED.inc();
    tracing::info!(session = %session, file = %file_name, size = metadata.len(), "Serving download");

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, DOWNLOAD_CONTENT_TYPE.to_string()),
            (CONTENT_LENGTH, metadata.len().to_string()),
            (CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        body,
    )
        .into_response())
}

/// HEAD|OPTIONS /d/{id}
///
/// Lists the `*.gpg` files of the session's serve folder, sorted by name.
pub async fn list_files(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let session = SessionId::from(session);
    let serve_dir = state.layout.serve_dir(&session);
    if !dir_exists(&serve_dir).await? {
        return Err(ApiError::NotFound(format!("download folder '{session}'")));
    }

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(&serve_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let servable = FsPath::new(&name)
            .extension()
            .is_some_and(|ext| ext == SERVE_EXTENSION);
        if servable && entry.file_type().await?.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(Json(names))
}

/// Listing handler mounted when browsing is switched off.
pub async fn list_files_disabled() -> ApiResult<Json<Vec<String>>> {
    Err(ApiError::Forbidden("file browsing is disabled".to_string()))
}

/// Build an attachment disposition with an ASCII fallback and an RFC 5987
/// encoded name.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, FILENAME_ESCAPE);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
