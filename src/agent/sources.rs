use log::warn;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::telemetry::UnitFields;

use super::error::{SourceError, SourceKind};
use super::liveness::{unix_seconds, LivenessReader, LivenessSample};

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationReading {
    pub angle: f64,
    pub timestamp: String,
    pub drdy_error_flag: i64,
    pub slow_read_flag: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionReading {
    pub x: f64,
    pub y: f64,
    pub timestamp: String,
    pub avg_read_time: f64,
    pub max_read_time: f64,
    pub hacc: f64,
    pub hacc_status: String,
    pub count: i64,
    pub satellites_used: Option<i64>,
    pub pdop: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LivenessReading {
    pub timestamp: String,
    pub period: i64,
    pub delta: i64,
}

impl From<&LivenessSample> for LivenessReading {
    fn from(sample: &LivenessSample) -> Self {
        LivenessReading {
            timestamp: unix_seconds(&sample.timestamp),
            period: sample.period as i64,
            delta: sample.delta as i64,
        }
    }
}

impl OrientationReading {
    pub fn apply(self, fields: &mut UnitFields) {
        fields.compass_angle = Some(self.angle);
        fields.compass_timestamp = Some(self.timestamp);
        fields.compass_drdy_error_flag = Some(self.drdy_error_flag);
        fields.compass_slow_read_flag = Some(self.slow_read_flag);
    }
}

impl PositionReading {
    pub fn apply(self, fields: &mut UnitFields) {
        fields.gps_now_x = Some(self.x);
        fields.gps_now_y = Some(self.y);
        fields.gps_timestamp = Some(self.timestamp);
        fields.gps_avg_read_time = Some(self.avg_read_time);
        fields.gps_max_read_time = Some(self.max_read_time);
        fields.gps_hacc = Some(self.hacc);
        fields.gps_hacc_status = Some(self.hacc_status);
        fields.gps_count = Some(self.count);
        fields.gps_satellites_used = self.satellites_used;
        fields.gps_pdop = self.pdop;
    }
}

impl LivenessReading {
    pub fn apply(self, fields: &mut UnitFields) {
        fields.heartbeat_timestamp = Some(self.timestamp);
        fields.heartbeat_period = Some(self.period);
        fields.heartbeat_delta = Some(self.delta);
    }
}

fn split(content: &str) -> Vec<&str> {
    content.trim().split(',').map(str::trim).collect()
}

fn field<T: FromStr>(kind: SourceKind, name: &'static str, raw: &str) -> Result<T, SourceError> {
    raw.parse().map_err(|_| SourceError::InvalidField {
        kind,
        field: name,
        value: raw.to_string(),
    })
}

/// A float field that must be finite; `nan` and `inf` parse as `f64` but are
/// not sensor values.
fn real(kind: SourceKind, name: &'static str, raw: &str) -> Result<f64, SourceError> {
    let value: f64 = field(kind, name, raw)?;
    if !value.is_finite() {
        return Err(SourceError::InvalidField {
            kind,
            field: name,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

/// `angle,timestamp,drdy_error_flag,slow_read_flag`
pub fn parse_orientation(content: &str) -> Result<OrientationReading, SourceError> {
    const KIND: SourceKind = SourceKind::Orientation;
    let parts = split(content);
    if parts.len() != 4 {
        return Err(SourceError::FieldCount {
            kind: KIND,
            expected: "exactly 4",
            found: parts.len(),
        });
    }
    Ok(OrientationReading {
        angle: real(KIND, "angle", parts[0])?,
        timestamp: parts[1].to_string(),
        drdy_error_flag: field(KIND, "drdy_error_flag", parts[2])?,
        slow_read_flag: field(KIND, "slow_read_flag", parts[3])?,
    })
}

/// `x,y,timestamp,avg_read_time,max_read_time,hacc,hacc_status,count[,satellites_used[,pdop]]`
pub fn parse_position(content: &str) -> Result<PositionReading, SourceError> {
    const KIND: SourceKind = SourceKind::Position;
    let parts = split(content);
    if parts.len() < 8 {
        return Err(SourceError::FieldCount {
            kind: KIND,
            expected: "at least 8",
            found: parts.len(),
        });
    }
    Ok(PositionReading {
        x: real(KIND, "x", parts[0])?,
        y: real(KIND, "y", parts[1])?,
        timestamp: parts[2].to_string(),
        avg_read_time: real(KIND, "avg_read_time", parts[3])?,
        max_read_time: real(KIND, "max_read_time", parts[4])?,
        hacc: real(KIND, "hacc", parts[5])?,
        hacc_status: parts[6].to_string(),
        count: field(KIND, "count", parts[7])?,
        satellites_used: parts
            .get(8)
            .map(|raw| field(KIND, "satellites_used", raw))
            .transpose()?,
        pdop: parts
            .get(9)
            .map(|raw| real(KIND, "pdop", raw))
            .transpose()?,
    })
}

/// `timestamp,period,delta`; period and delta are truncated to whole seconds.
pub fn parse_liveness(content: &str) -> Result<LivenessReading, SourceError> {
    const KIND: SourceKind = SourceKind::Liveness;
    let parts = split(content);
    if parts.len() != 3 {
        return Err(SourceError::FieldCount {
            kind: KIND,
            expected: "exactly 3",
            found: parts.len(),
        });
    }
    let period = real(KIND, "period", parts[1])?;
    let delta = real(KIND, "delta", parts[2])?;
    Ok(LivenessReading {
        timestamp: parts[0].to_string(),
        period: period as i64,
        delta: delta as i64,
    })
}

/// Polls the sensor status files and the heartbeat handoff. Each group is
/// read independently: a missing source is skipped silently and a broken one
/// is logged and skipped, so a read never fails as a whole.
pub struct SensorSourceReader {
    orientation: PathBuf,
    position: PathBuf,
    liveness: LivenessReader,
}

impl SensorSourceReader {
    pub fn new(orientation: PathBuf, position: PathBuf, liveness: LivenessReader) -> Self {
        Self {
            orientation,
            position,
            liveness,
        }
    }

    pub async fn read(&self) -> UnitFields {
        let mut fields = UnitFields::default();

        if let Some(reading) =
            read_group(SourceKind::Orientation, &self.orientation, parse_orientation).await
        {
            reading.apply(&mut fields);
        }

        if let Some(reading) =
            read_group(SourceKind::Position, &self.position, parse_position).await
        {
            reading.apply(&mut fields);
        }

        match self.liveness.latest().await {
            Ok(Some(reading)) => reading.apply(&mut fields),
            Ok(None) => {}
            Err(e) => warn!("Skipping liveness data: {}", e),
        }

        fields
    }
}

async fn read_group<T>(
    kind: SourceKind,
    path: &Path,
    parse: fn(&str) -> Result<T, SourceError>,
) -> Option<T> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(source) => {
            let e = SourceError::Io {
                kind,
                path: path.to_path_buf(),
                source,
            };
            warn!("Skipping {} data: {}", kind, e);
            return None;
        }
    };

    match parse(&content) {
        Ok(reading) => Some(reading),
        Err(e) => {
            warn!("Skipping {} data: {}", kind, e);
            None
        }
    }
}
