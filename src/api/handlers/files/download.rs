use crate::api::error::AppError;
use crate::services::identity::Identity;
use crate::utils::validation::parse_json_body;
use axum::{Extension, Json, body::Bytes, extract::State};

use super::types::*;

#[utoipa::path(
    post,
    path = "/download",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Presigned download URL", body = DownloadResponse),
        (status = 400, description = "fileName missing"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<crate::AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<DownloadResponse>, AppError> {
    let req: DownloadRequest = parse_json_body(&body)?;

    let link = state
        .file_service
        .download(&identity, &req.file_name)
        .await?;

    Ok(Json(DownloadResponse {
        download_url: link.download_url,
        file_name: link.file_name,
        content_type: link.content_type,
        expires_at: link.expires_at,
    }))
}
