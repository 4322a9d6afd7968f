use crate::api::error::AppError;
use crate::services::identity::Identity;
use crate::utils::validation::parse_json_body;
use axum::{Extension, Json, body::Bytes, extract::State};

use super::types::*;

#[utoipa::path(
    post,
    path = "/delete",
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 400, description = "fileId missing"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "files"
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<DeleteResponse>, AppError> {
    // Role check precedes body validation
    state.file_service.authorize_delete(&identity)?;
    let req: DeleteRequest = parse_json_body(&body)?;

    state.file_service.delete(&identity, &req.file_id).await?;

    Ok(Json(DeleteResponse {
        message: "File deleted successfully".to_string(),
        file_id: req.file_id,
    }))
}
