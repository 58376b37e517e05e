use axum::extract::State;

use crate::collector::api::error::ApiResult;
use crate::collector::server::AppState;

use super::templates::{DashboardTemplate, UnitRow};

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardTemplate> {
    let units = state.store.list().await?;
    Ok(DashboardTemplate {
        units: units.iter().map(UnitRow::from).collect(),
    })
}
