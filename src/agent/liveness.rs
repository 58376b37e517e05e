use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::sync::watch;

use super::config::{LivenessConfig, LivenessMode};
use super::error::{HeartbeatError, SourceError, SourceKind};
use super::sources::{parse_liveness, LivenessReading};

/// One heartbeat as produced by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivenessSample {
    pub timestamp: DateTime<Utc>,
    /// Seconds until the next beat.
    pub period: f64,
    /// Seconds since the previous beat, 0.0 on the first one.
    pub delta: f64,
}

impl LivenessSample {
    /// `timestamp,period,delta` as stored in the liveness file.
    pub fn to_line(&self) -> String {
        format!(
            "{},{:.2},{:.2}",
            unix_seconds(&self.timestamp),
            self.period,
            self.delta
        )
    }
}

pub fn unix_seconds(timestamp: &DateTime<Utc>) -> String {
    format!("{:.6}", timestamp.timestamp_micros() as f64 / 1_000_000.0)
}

/// Producer half of the heartbeat handoff. There is exactly one per
/// supervisory cycle, owned by the heartbeat scheduler.
#[derive(Debug)]
pub enum LivenessWriter {
    Channel(watch::Sender<Option<LivenessSample>>),
    File(PathBuf),
}

/// Consumer half of the heartbeat handoff, owned by the sensor reader.
#[derive(Debug)]
pub enum LivenessReader {
    Channel(watch::Receiver<Option<LivenessSample>>),
    File(PathBuf),
}

pub fn handoff(config: &LivenessConfig, path: PathBuf) -> (LivenessWriter, LivenessReader) {
    match config.mode {
        LivenessMode::Channel => {
            let (tx, rx) = watch::channel(None);
            (LivenessWriter::Channel(tx), LivenessReader::Channel(rx))
        }
        LivenessMode::File => (LivenessWriter::File(path.clone()), LivenessReader::File(path)),
    }
}

impl LivenessWriter {
    pub async fn publish(&self, sample: &LivenessSample) -> Result<(), HeartbeatError> {
        match self {
            LivenessWriter::Channel(tx) => {
                tx.send_replace(Some(*sample));
                Ok(())
            }
            LivenessWriter::File(path) => {
                let err = |source| HeartbeatError::Publish {
                    path: path.clone(),
                    source,
                };
                // Readers never observe a half-written line.
                let tmp = path.with_extension("tmp");
                tokio::fs::write(&tmp, sample.to_line())
                    .await
                    .map_err(err)?;
                tokio::fs::rename(&tmp, path).await.map_err(err)
            }
        }
    }
}

impl LivenessReader {
    /// The most recent beat, or `None` if nothing has been published yet.
    pub async fn latest(&self) -> Result<Option<LivenessReading>, SourceError> {
        match self {
            LivenessReader::Channel(rx) => {
                let latest = *rx.borrow();
                Ok(latest.as_ref().map(LivenessReading::from))
            }
            LivenessReader::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(content) => parse_liveness(&content).map(Some),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(source) => Err(SourceError::Io {
                    kind: SourceKind::Liveness,
                    path: path.clone(),
                    source,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample() -> LivenessSample {
        LivenessSample {
            timestamp: Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap(),
            period: 0.75,
            delta: 1.004,
        }
    }

    #[test]
    fn line_format() {
        assert_eq!(sample().to_line(), "1700000000.250000,0.75,1.00");
    }

    #[tokio::test]
    async fn channel_handoff_delivers_latest() {
        let (writer, reader) = handoff(&LivenessConfig::default(), PathBuf::new());
        assert!(reader.latest().await.unwrap().is_none());

        writer.publish(&sample()).await.unwrap();
        let reading = reader.latest().await.unwrap().unwrap();
        assert_eq!(reading.timestamp, "1700000000.250000");
        assert_eq!(reading.period, 0);
        assert_eq!(reading.delta, 1);
    }

    #[tokio::test]
    async fn file_handoff_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heartbeat.txt");
        let config = LivenessConfig {
            mode: LivenessMode::File,
            path: path.clone(),
        };
        let (writer, reader) = handoff(&config, path.clone());
        assert!(reader.latest().await.unwrap().is_none());

        writer.publish(&sample()).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1700000000.250000,0.75,1.00"
        );
        let reading = reader.latest().await.unwrap().unwrap();
        assert_eq!(reading, LivenessReading::from(&sample()));
    }

    #[tokio::test]
    async fn file_publish_fails_without_directory() {
        let dir = tempdir().unwrap();
        let writer = LivenessWriter::File(dir.path().join("missing").join("heartbeat.txt"));
        assert!(matches!(
            writer.publish(&sample()).await,
            Err(HeartbeatError::Publish { .. })
        ));
    }
}
