use askama::Template;
use askama_web::WebTemplate;

use crate::telemetry::UnitRecord;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub units: Vec<UnitRow>,
}

/// Display strings for one fleet table row.
pub struct UnitRow {
    pub mac: String,
    pub status: String,
    pub status_color: String,
    pub watchdog: String,
    pub watchdog_color: String,
    pub position: String,
    pub accuracy: String,
    pub heartbeat: String,
    pub history_len: usize,
}

impl From<&UnitRecord> for UnitRow {
    fn from(record: &UnitRecord) -> Self {
        let fields = &record.fields;
        UnitRow {
            mac: record.mac.clone(),
            status: fields.status_string.clone().unwrap_or_else(|| "-".into()),
            status_color: css_color(fields.status_color.as_deref()),
            watchdog: fields.watchdog_string.clone().unwrap_or_else(|| "-".into()),
            watchdog_color: css_color(fields.watchdog_color.as_deref()),
            position: fields
                .position()
                .map(|[x, y]| format!("{:.3}, {:.3}", x, y))
                .unwrap_or_else(|| "-".into()),
            accuracy: match (fields.gps_hacc, fields.gps_hacc_status.as_deref()) {
                (Some(hacc), Some(status)) => format!("{:.2} ({})", hacc, status),
                (Some(hacc), None) => format!("{:.2}", hacc),
                (None, Some(status)) => status.to_string(),
                (None, None) => "-".into(),
            },
            heartbeat: fields
                .heartbeat_timestamp
                .clone()
                .unwrap_or_else(|| "-".into()),
            history_len: record.historical_positions.len(),
        }
    }
}

/// Units report colors as opaque strings; only plain names and hex codes
/// make it into the style attribute.
fn css_color(color: Option<&str>) -> String {
    match color {
        Some(c) if !c.is_empty() && c.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '#') => {
            c.to_string()
        }
        _ => "inherit".to_string(),
    }
}
