//! Upload endpoints writing into per-session drop folders.

use super::common::dir_exists;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{BYTES_UPLOADED, FILES_UPLOADED, UPLOADS_RENAMED, record_upload_error};
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use parcel_core::naming::{alternate_file_name, check_file_name};
use parcel_core::{SessionId, UPLOAD_BUFFER_SIZE, UPLOAD_FIELD};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path as FsPath;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// One stored upload.
#[derive(Debug, Serialize)]
pub struct StoredFile {
    /// File name sent by the client.
    pub name: String,
    /// Name the file was written under.
    pub stored_as: String,
    /// Bytes written.
    pub size: u64,
}

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub files: Vec<StoredFile>,
}

/// HEAD /upload/{id}
///
/// 200 when the drop folder for the session exists, 404 otherwise.
pub async fn probe_upload(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<StatusCode> {
    let session = SessionId::from(session);
    if dir_exists(&state.layout.drop_dir(&session)).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound(format!("upload folder '{session}'")))
    }
}

/// POST /upload/{id}
///
/// Streams every file part of the `files` field into the session's drop
/// folder. Existing files are never overwritten: a colliding upload is stored
/// under an alternate name. Each stored file is registered for notification.
pub async fn upload_files(
    State(state): State<AppState>,
    Path(session): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        record_upload_error("not_multipart");
        ApiError::BadRequest(e.body_text())
    })?;

    let session = SessionId::from(session);
    let drop_dir = state.layout.drop_dir(&session);
    if !dir_exists(&drop_dir).await? {
        record_upload_error("missing_folder");
        return Err(ApiError::BadRequest(format!(
            "upload folder '{session}' does not exist"
        )));
    }

    let mut stored = Vec::new();
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        check_file_name(&name).inspect_err(|_| record_upload_error("invalid_name"))?;

        let (stored_as, file) = create_target(&drop_dir, &name).await?;
        let size = write_field(&mut field, file).await.inspect_err(|e| {
            tracing::warn!(session = %session, file = %stored_as, error = %e, "Upload interrupted");
            record_upload_error("write");
        })?;

        FILES_UPLOADED.inc();
        BYTES_UPLOADED.inc_by(size);
        state.notifier.register(&session, &stored_as);
        tracing::info!(session = %session, file = %stored_as, size, "Stored upload");

        stored.push(StoredFile {
            name,
            stored_as,
            size,
        });
    }

    Ok(Json(UploadResponse {
        status: "ok",
        files: stored,
    }))
}

/// Create the target file without replacing anything already on disk.
///
/// Returns the name the file was created under.
async fn create_target(dir: &FsPath, name: &str) -> ApiResult<(String, File)> {
    match create_new(&dir.join(name)).await {
        Ok(file) => return Ok((name.to_owned(), file)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => {
            record_upload_error("create");
            return Err(e.into());
        }
    }

    let alternate = alternate_file_name(name);
    let file = create_new(&dir.join(&alternate))
        .await
        .inspect_err(|_| record_upload_error("create"))?;
    UPLOADS_RENAMED.inc();
    tracing::debug!(original = %name, stored_as = %alternate, "Name taken, using alternate");
    Ok((alternate, file))
}

async fn create_new(path: &FsPath) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path).await
}

async fn write_field(field: &mut Field<'_>, file: File) -> ApiResult<u64> {
    let mut writer = BufWriter::with_capacity(UPLOAD_BUFFER_SIZE, file);
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await? {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}
