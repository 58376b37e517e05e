use utoipa::OpenApi;

use super::api::bots::{BotQuery, StatusResponse};
use super::api::error::ErrorResponse;
use crate::telemetry::{UnitFields, UnitRecord, UnitUpdate};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::bots::root,
        super::api::bots::update_bot,
        super::api::bots::get_bot,
        super::api::bots::list_bots,
    ),
    components(
        schemas(
            UnitFields,
            UnitUpdate,
            UnitRecord,
            BotQuery,
            StatusResponse,
            ErrorResponse,
        )
    ),
    info(
        title = "Bot Telemetry Collector API",
        description = "Latest-state store for field unit telemetry",
        version = "0.1.0"
    ),
    tags(
        (name = "bots", description = "Unit telemetry ingestion and lookup")
    )
)]
pub struct ApiDoc;
