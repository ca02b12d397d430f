use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::handlers::error::acquire_error;
use crate::models::WorkbenchView;
use crate::services::metrics::record_acquisition;
use crate::services::{AcquireError, RawFile};
use crate::startup::AppState;

const FILE_FIELD: &str = "file";

/// Accept one image under the `file` field and make it the current selection.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<WorkbenchView>, AppError> {
    let raw = match read_file_field(&mut multipart, state.acquirer.max_bytes()).await {
        Ok(raw) => raw,
        Err(e) => {
            record_acquisition("rejected");
            return Err(e);
        }
    };
    let file_name = raw.file_name.clone();

    let image = state.acquirer.acquire(raw).map_err(|e| {
        tracing::warn!(error = %e, "Rejected image upload");
        record_acquisition("rejected");
        acquire_error(e)
    })?;
    record_acquisition("accepted");

    let mut bench = state.workbench.lock().await;
    let image_id = bench.select_image(image, file_name);
    tracing::info!(%image_id, "Image selected");

    Ok(Json(bench.view()))
}

/// Clear the image and any result.
pub async fn reset_image(State(state): State<AppState>) -> Json<WorkbenchView> {
    let mut bench = state.workbench.lock().await;
    bench.reset();
    Json(bench.view())
}

async fn read_file_field(multipart: &mut Multipart, limit: usize) -> Result<RawFile, AppError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, limit))?;

        let Some(field) = field else {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Missing multipart field '{}'",
                FILE_FIELD
            )));
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit))?;

        return Ok(RawFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

/// A body cut off by the request size limit is an oversized upload, not a
/// read failure.
fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", limit))
    } else {
        acquire_error(AcquireError::Read(err.body_text()))
    }
}
