use crate::api::error::AppError;
use crate::models::FileRecord;
use crate::services::identity::Identity;
use axum::{Extension, Json, extract::State};

#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "Every stored file", body = Vec<FileRecord>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "files"
)]
pub async fn list_files(
    State(state): State<crate::AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let files = state.file_service.list(&identity).await?;
    Ok(Json(files))
}
