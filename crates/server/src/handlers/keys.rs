//! Public key listing.

use super::common::dir_exists;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use futures::future::try_join_all;
use parcel_core::PUBLIC_KEY_SUFFIX;

/// GET /keys
///
/// Returns the text of every `*.public.asc` file in the keys directory,
/// ordered by file name. A missing keys directory yields an empty list.
pub async fn get_keys(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let keys_dir = state.layout.keys_dir();
    if !dir_exists(&keys_dir).await? {
        tracing::debug!(path = %keys_dir.display(), "Keys directory missing");
        return Ok(Json(Vec::new()));
    }

    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(&keys_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let is_key = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(PUBLIC_KEY_SUFFIX));
        if is_key && entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let keys = try_join_all(paths.iter().map(tokio::fs::read_to_string)).await?;
    Ok(Json(keys))
}
