use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::handlers::diagnosis::run_diagnosis;
use crate::models::WorkbenchView;
use crate::startup::AppState;

/// Set the login flag. An image already waiting is diagnosed right away.
pub async fn login(State(state): State<AppState>) -> Result<Json<WorkbenchView>, AppError> {
    state.sessions.log_in().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to persist login flag");
        AppError::InternalError(e)
    })?;

    let awaiting = {
        let mut bench = state.workbench.lock().await;
        bench.log_in();
        bench.awaits_diagnosis()
    };
    tracing::info!(awaiting, "Logged in");

    if awaiting {
        // The outcome, failure included, is recorded on the workbench; login
        // itself has succeeded either way.
        if let Err(e) = run_diagnosis(&state).await {
            tracing::warn!(error = %e, "Diagnosis after login did not complete");
        }
    }

    Ok(Json(state.workbench.lock().await.view()))
}

/// Clear the login flag and hide the result.
pub async fn logout(State(state): State<AppState>) -> Result<Json<WorkbenchView>, AppError> {
    state.sessions.log_out().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to clear login flag");
        AppError::InternalError(e)
    })?;

    let mut bench = state.workbench.lock().await;
    bench.log_out();
    tracing::info!("Logged out");

    Ok(Json(bench.view()))
}
