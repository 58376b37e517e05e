use log::{error, info};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::config::AgentConfig;
use super::cycle::SensorCycle;
use super::heartbeat::HeartbeatScheduler;
use super::liveness::handoff;
use super::sources::SensorSourceReader;
use super::uploader::TelemetryUploader;

/// Runs the heartbeat and the sensor cycle side by side, forever. If either
/// task ends, both are torn down and rebuilt after the restart delay.
pub struct AgentLoop {
    config: AgentConfig,
    uploader: TelemetryUploader,
}

impl AgentLoop {
    pub fn new(config: AgentConfig, mac: String) -> Self {
        let uploader = TelemetryUploader::new(
            reqwest::Client::new(),
            &config.collector.url,
            mac,
            config.collector.timeout,
        );
        Self { config, uploader }
    }

    fn spawn_tasks(&self) -> (JoinHandle<()>, JoinHandle<()>) {
        let sources = &self.config.sources;
        let (writer, liveness) = handoff(&self.config.liveness, self.config.liveness_path());

        let heartbeat = HeartbeatScheduler::new(
            sources.alert_level_path(),
            writer,
            self.config.timing.heartbeat_fallback,
        );
        let reader = SensorSourceReader::new(
            sources.orientation_path(),
            sources.position_path(),
            liveness,
        );
        let cycle = SensorCycle::new(
            reader,
            self.uploader.clone(),
            self.config.timing.sensor_period,
        );

        (tokio::spawn(heartbeat.run()), tokio::spawn(cycle.run()))
    }

    pub async fn run(self) {
        info!(
            "Starting telemetry agent for {} -> {}",
            self.uploader.mac(),
            self.config.collector.url
        );
        supervise(self.config.timing.restart_delay, || self.spawn_tasks()).await
    }
}

pub async fn supervise<F>(restart_delay: Duration, mut spawn_tasks: F)
where
    F: FnMut() -> (JoinHandle<()>, JoinHandle<()>),
{
    loop {
        let (mut heartbeat, mut sensors) = spawn_tasks();

        let (task, result) = tokio::select! {
            result = &mut heartbeat => ("heartbeat", result),
            result = &mut sensors => ("sensor cycle", result),
        };
        heartbeat.abort();
        sensors.abort();

        match result {
            Ok(()) => error!("Error in main loop: {} task exited", task),
            Err(e) if e.is_panic() => error!("Error in main loop: {} task panicked", task),
            Err(e) => error!("Error in main loop: {} task failed: {}", task, e),
        }

        info!("Restarting agent tasks in {:?}", restart_delay);
        tokio::time::sleep(restart_delay).await;
    }
}
