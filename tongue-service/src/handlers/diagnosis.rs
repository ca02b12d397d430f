use axum::{extract::State, Json};
use service_core::error::AppError;
use std::time::Instant;

use crate::handlers::error::{diagnosis_error, workbench_error, DIAGNOSIS_FAILED_MESSAGE};
use crate::models::{DiagnosisTicket, WorkbenchView};
use crate::services::metrics::{record_diagnosis, record_provider_error};
use crate::startup::AppState;

pub async fn start_diagnosis(
    State(state): State<AppState>,
) -> Result<Json<WorkbenchView>, AppError> {
    run_diagnosis(&state).await.map(Json)
}

/// Diagnose the current image and store the outcome on the workbench.
///
/// The provider call runs on its own task, so a dropped request still
/// clears the in-flight marker.
pub(crate) async fn run_diagnosis(state: &AppState) -> Result<WorkbenchView, AppError> {
    let ticket = state
        .workbench
        .lock()
        .await
        .begin_diagnosis()
        .map_err(workbench_error)?;

    let task_state = state.clone();
    tokio::spawn(async move { complete_diagnosis(task_state, ticket).await })
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Diagnosis task failed: {}", e)))?
}

async fn complete_diagnosis(
    state: AppState,
    ticket: DiagnosisTicket,
) -> Result<WorkbenchView, AppError> {
    let provider = state.provider.as_ref();
    let image_id = ticket.image_id;
    let started = Instant::now();

    tracing::info!(%image_id, provider = provider.name(), model = provider.model(), "Starting diagnosis");
    let outcome = provider.diagnose(&ticket.image).await;
    let elapsed = started.elapsed().as_secs_f64();

    match &outcome {
        Ok(result) => {
            record_diagnosis(provider.name(), provider.model(), "success", elapsed);
            tracing::info!(
                %image_id,
                syndrome = %result.syndrome.name,
                unrecognizable = result.is_unrecognizable(),
                elapsed_secs = elapsed,
                "Diagnosis completed"
            );
        }
        Err(e) => {
            record_diagnosis(provider.name(), provider.model(), "error", elapsed);
            record_provider_error(provider.name(), e.kind());
            tracing::error!(%image_id, error = %e, error_type = e.kind(), "Diagnosis failed");
        }
    }

    let mut bench = state.workbench.lock().await;
    let applied = bench.finish_diagnosis(
        ticket,
        outcome
            .as_ref()
            .map(Clone::clone)
            .map_err(|_| DIAGNOSIS_FAILED_MESSAGE.to_string()),
    );

    if !applied {
        tracing::info!(%image_id, "Image changed during diagnosis; outcome discarded");
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Image changed while the diagnosis was running"
        )));
    }

    match outcome {
        Ok(_) => Ok(bench.view()),
        Err(e) => Err(diagnosis_error(&e)),
    }
}
