use crate::api::error::AppError;
use crate::models::DEFAULT_FILE_NAME;
use crate::services::file_service::UploadRequest;
use crate::services::identity::Identity;
use crate::utils::validation::header_or;
use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};

use super::types::*;

#[utoipa::path(
    post,
    path = "/files",
    request_body(content = Vec<u8>, description = "Raw file bytes", content_type = "application/octet-stream"),
    params(
        ("file-name" = Option<String>, Header, description = "Original file name"),
        ("content-type" = Option<String>, Header, description = "MIME type of the payload")
    ),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Storage failure")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let file_name = header_or(&headers, "file-name", DEFAULT_FILE_NAME);
    let content_type = header_or(
        &headers,
        header::CONTENT_TYPE.as_str(),
        mime::APPLICATION_OCTET_STREAM.as_ref(),
    );

    let record = state
        .file_service
        .upload(
            &identity,
            UploadRequest {
                file_name,
                content_type,
                data: body,
            },
        )
        .await?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        file_id: record.file_id,
        file_name: record.file_name,
    }))
}
