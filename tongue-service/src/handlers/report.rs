use axum::{extract::State, http::header, response::IntoResponse};
use service_core::error::AppError;

use crate::handlers::error::workbench_error;
use crate::models::WorkbenchError;
use crate::services::render_report;
use crate::startup::AppState;

/// The current diagnosis as a Markdown report.
pub async fn get_report(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bench = state.workbench.lock().await;
    if !bench.is_logged_in() {
        return Err(workbench_error(WorkbenchError::LoginRequired));
    }

    let result = bench
        .result()
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No diagnosis available")))?;

    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_report(result),
    ))
}
