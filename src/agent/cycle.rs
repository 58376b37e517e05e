use log::warn;
use std::time::Duration;

use super::sources::SensorSourceReader;
use super::uploader::TelemetryUploader;

/// The read → upload half of the agent, repeated on a fixed cadence.
pub struct SensorCycle {
    reader: SensorSourceReader,
    uploader: TelemetryUploader,
    period: Duration,
}

impl SensorCycle {
    pub fn new(reader: SensorSourceReader, uploader: TelemetryUploader, period: Duration) -> Self {
        Self {
            reader,
            uploader,
            period,
        }
    }

    /// Returns true when a record was read and accepted by the collector.
    pub async fn run_once(&self) -> bool {
        let fields = self.reader.read().await;
        if fields.is_empty() {
            warn!("No sensor data available to send for {}", self.uploader.mac());
            return false;
        }
        self.uploader.upload(&fields).await
    }

    pub async fn run(self) {
        loop {
            self.run_once().await;
            tokio::time::sleep(self.period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::LivenessConfig;
    use crate::agent::liveness::handoff;
    use crate::collector::store::UnitStore;
    use crate::collector::{router, AppState, MemoryStore};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn empty_read_skips_upload() {
        let dir = tempdir().unwrap();
        let (_writer, liveness) = handoff(&LivenessConfig::default(), PathBuf::new());
        let reader = SensorSourceReader::new(
            dir.path().join("compass.txt"),
            dir.path().join("gps.txt"),
            liveness,
        );
        // Nothing listens here; an attempted upload would fail the same way,
        // but the empty read must short-circuit before any request is made.
        let uploader = TelemetryUploader::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "AA:BB".into(),
            Duration::from_millis(50),
        );
        let cycle = SensorCycle::new(reader, uploader, Duration::from_secs(1));

        assert!(!cycle.run_once().await);
    }

    #[tokio::test]
    async fn cycle_keeps_running_after_failed_uploads() {
        let dir = tempdir().unwrap();
        let gps = dir.path().join("gps.txt");
        std::fs::write(&gps, "10.0,20.0,t,0.1,0.4,0.02,GOOD,3").unwrap();
        let (_writer, liveness) = handoff(&LivenessConfig::default(), PathBuf::new());
        let reader = SensorSourceReader::new(dir.path().join("compass.txt"), gps, liveness);

        // Reserve a port, then leave it closed while the first cycles run.
        let addr = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let uploader = TelemetryUploader::new(
            reqwest::Client::new(),
            &format!("http://{}", addr),
            "AA:BB".into(),
            Duration::from_millis(500),
        );
        let cycle = SensorCycle::new(reader, uploader, Duration::from_millis(100));
        let task = tokio::spawn(cycle.run());

        tokio::time::sleep(Duration::from_millis(350)).await;

        let store = Arc::new(MemoryStore::new());
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let state = AppState::new(store.clone());
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        let mut stored = None;
        for _ in 0..100 {
            stored = store.fetch("AA:BB").await.unwrap();
            if stored.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        task.abort();

        let record = stored.expect("no upload reached the collector");
        assert_eq!(record.fields.position(), Some([10.0, 20.0]));
        assert_eq!(record.historical_positions.first(), Some(&[10.0, 20.0]));
    }
}
