use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::history::Position;

macro_rules! unit_fields {
    ($($(#[$meta:meta])* $name:ident: $ty:ty,)*) => {
        /// Partial view of a unit's telemetry. Every field is optional and
        /// absent fields are left out of the JSON entirely.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
        pub struct UnitFields {
            $(
                $(#[$meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $name: Option<$ty>,
            )*
        }

        impl UnitFields {
            pub fn is_empty(&self) -> bool {
                true $(&& self.$name.is_none())*
            }

            /// Overwrites every field that is present in `other`; fields absent
            /// from `other` keep their current value.
            pub fn merge_from(&mut self, other: &UnitFields) {
                $(
                    if let Some(value) = &other.$name {
                        self.$name = Some(value.clone());
                    }
                )*
            }
        }
    };
}

unit_fields! {
    compass_angle: f64,
    compass_timestamp: String,
    compass_drdy_error_flag: i64,
    compass_slow_read_flag: i64,
    gps_now_x: f64,
    gps_now_y: f64,
    gps_timestamp: String,
    gps_avg_read_time: f64,
    gps_max_read_time: f64,
    gps_hacc: f64,
    gps_hacc_status: String,
    gps_count: i64,
    gps_satellites_used: i64,
    gps_pdop: f64,
    heartbeat_timestamp: String,
    /// Heartbeat period, truncated to whole seconds.
    heartbeat_period: i64,
    /// Seconds between the two most recent beats, truncated.
    heartbeat_delta: i64,
    status_string: String,
    status_color: String,
    watchdog_string: String,
    watchdog_color: String,
    route_timestamp: String,
    route_now_x: f64,
    route_now_y: f64,
    route_hacc: f64,
    route_tgt_x: f64,
    route_tgt_y: f64,
    route_tgt_heading: f64,
    route_topspeed: f64,
    route_measured_speed: f64,
}

impl UnitFields {
    /// The reported GPS position, only when both coordinates are present.
    pub fn position(&self) -> Option<Position> {
        match (self.gps_now_x, self.gps_now_y) {
            (Some(x), Some(y)) => Some([x, y]),
            _ => None,
        }
    }
}

/// Body of `POST /bot/update`: the unit identifier plus any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UnitUpdate {
    pub mac: String,
    #[serde(flatten)]
    pub fields: UnitFields,
}

/// Latest known state of a unit as stored by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UnitRecord {
    pub mac: String,
    #[serde(flatten)]
    pub fields: UnitFields,
    #[serde(default)]
    #[schema(value_type = Vec<Vec<f64>>)]
    pub historical_positions: Vec<Position>,
}

impl UnitRecord {
    pub fn new(mac: impl Into<String>) -> Self {
        UnitRecord {
            mac: mac.into(),
            fields: UnitFields::default(),
            historical_positions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_absent_fields() {
        let mut stored = UnitFields {
            compass_angle: Some(90.0),
            gps_hacc_status: Some("GOOD".into()),
            ..Default::default()
        };
        let incoming = UnitFields {
            compass_angle: Some(180.0),
            heartbeat_period: Some(1),
            ..Default::default()
        };

        stored.merge_from(&incoming);

        assert_eq!(stored.compass_angle, Some(180.0));
        assert_eq!(stored.gps_hacc_status.as_deref(), Some("GOOD"));
        assert_eq!(stored.heartbeat_period, Some(1));
    }

    #[test]
    fn empty_detection() {
        assert!(UnitFields::default().is_empty());
        let fields = UnitFields {
            route_topspeed: Some(1.5),
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }

    #[test]
    fn position_requires_both_coordinates() {
        let only_x = UnitFields {
            gps_now_x: Some(1.0),
            ..Default::default()
        };
        assert_eq!(only_x.position(), None);

        let both = UnitFields {
            gps_now_x: Some(1.0),
            gps_now_y: Some(2.0),
            ..Default::default()
        };
        assert_eq!(both.position(), Some([1.0, 2.0]));
    }

    #[test]
    fn update_parses_flat_body() {
        let update: UnitUpdate = serde_json::from_value(json!({
            "mac": "AA:BB",
            "gps_now_x": 10.0,
            "gps_now_y": 20.0,
            "gps_count": 4
        }))
        .unwrap();

        assert_eq!(update.mac, "AA:BB");
        assert_eq!(update.fields.position(), Some([10.0, 20.0]));
        assert_eq!(update.fields.gps_count, Some(4));
        assert_eq!(update.fields.compass_angle, None);
    }

    #[test]
    fn record_omits_absent_fields() {
        let mut record = UnitRecord::new("AA:BB");
        record.fields.gps_now_x = Some(10.0);
        record.fields.gps_now_y = Some(20.0);
        record.historical_positions = vec![[10.0, 20.0]];

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "mac": "AA:BB",
                "gps_now_x": 10.0,
                "gps_now_y": 20.0,
                "historical_positions": [[10.0, 20.0]]
            })
        );
    }
}
