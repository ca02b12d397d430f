use axum::{extract::State, Json};

use crate::models::WorkbenchView;
use crate::startup::AppState;

pub async fn get_workbench(State(state): State<AppState>) -> Json<WorkbenchView> {
    Json(state.workbench.lock().await.view())
}
