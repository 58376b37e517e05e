use chrono::{DateTime, Utc};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::HeartbeatError;
use super::liveness::{LivenessSample, LivenessWriter};

/// Swarm alert severity. Higher severity means a faster heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AlertLevel {
    Nominal,
    Elevated,
    High,
    Critical,
}

impl From<i64> for AlertLevel {
    fn from(level: i64) -> Self {
        match level {
            1 => AlertLevel::Elevated,
            2 => AlertLevel::High,
            3 => AlertLevel::Critical,
            _ => AlertLevel::Nominal,
        }
    }
}

impl AlertLevel {
    pub fn heartbeat_period(self) -> Duration {
        match self {
            AlertLevel::Nominal => Duration::from_millis(1000),
            AlertLevel::Elevated => Duration::from_millis(750),
            AlertLevel::High => Duration::from_millis(500),
            AlertLevel::Critical => Duration::from_millis(250),
        }
    }
}

/// Reads the first comma separated token of the alert file. Anything missing
/// or unparsable counts as level 0.
pub async fn read_alert_level(path: &Path) -> i64 {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => content
            .trim()
            .split(',')
            .next()
            .and_then(|token| token.trim().parse().ok())
            .unwrap_or(0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => {
            error!("Error reading alert level {}: {}", path.display(), e);
            0
        }
    }
}

/// Publishes a liveness beat on an adaptive cadence driven by the alert level.
pub struct HeartbeatScheduler {
    alert_level: PathBuf,
    writer: LivenessWriter,
    fallback: Duration,
    previous: Option<DateTime<Utc>>,
    level: AlertLevel,
}

impl HeartbeatScheduler {
    pub fn new(alert_level: PathBuf, writer: LivenessWriter, fallback: Duration) -> Self {
        Self {
            alert_level,
            writer,
            fallback,
            previous: None,
            level: AlertLevel::Nominal,
        }
    }

    /// Builds the beat for `now` without committing it.
    pub fn sample(&self, now: DateTime<Utc>, period: Duration) -> LivenessSample {
        let delta = self
            .previous
            .map(|prev| (now - prev).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0)
            .unwrap_or(0.0);
        LivenessSample {
            timestamp: now,
            period: period.as_secs_f64(),
            delta,
        }
    }

    /// Publishes one beat and returns how long to wait before the next one.
    pub async fn tick(&mut self) -> Result<Duration, HeartbeatError> {
        let level = AlertLevel::from(read_alert_level(&self.alert_level).await);
        if level != self.level {
            info!(
                "Alert level changed from {} to {}, heartbeat period now {:?}",
                self.level,
                level,
                level.heartbeat_period()
            );
            self.level = level;
        }

        let period = level.heartbeat_period();
        let now = Utc::now();
        let sample = self.sample(now, period);
        self.writer.publish(&sample).await?;
        self.previous = Some(now);

        Ok(period)
    }

    pub async fn run(mut self) {
        loop {
            let wait = match self.tick().await {
                Ok(period) => period,
                Err(e) => {
                    error!("Error generating heartbeat: {}", e);
                    self.fallback
                }
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::LivenessConfig;
    use crate::agent::liveness::handoff;
    use crate::agent::sources::parse_liveness;
    use chrono::TimeDelta;
    use tempfile::tempdir;

    #[test]
    fn period_is_a_function_of_alert_level() {
        let period = |level: i64| AlertLevel::from(level).heartbeat_period();
        assert_eq!(period(1), Duration::from_millis(750));
        assert_eq!(period(2), Duration::from_millis(500));
        assert_eq!(period(3), Duration::from_millis(250));
        for other in [0, 4, -1, 99] {
            assert_eq!(period(other), Duration::from_secs(1));
        }
    }

    #[tokio::test]
    async fn alert_level_file_parsing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alert_level.txt");

        assert_eq!(read_alert_level(&path).await, 0);

        std::fs::write(&path, "2,swarm-7,extra\n").unwrap();
        assert_eq!(read_alert_level(&path).await, 2);

        std::fs::write(&path, " 3 ").unwrap();
        assert_eq!(read_alert_level(&path).await, 3);

        std::fs::write(&path, "high").unwrap();
        assert_eq!(read_alert_level(&path).await, 0);

        std::fs::write(&path, "").unwrap();
        assert_eq!(read_alert_level(&path).await, 0);
    }

    #[test]
    fn first_delta_is_zero() {
        let (writer, _reader) = handoff(&LivenessConfig::default(), PathBuf::new());
        let mut scheduler =
            HeartbeatScheduler::new(PathBuf::from("/nonexistent"), writer, Duration::from_secs(1));
        let now = Utc::now();

        let first = scheduler.sample(now, Duration::from_millis(500));
        assert_eq!(first.delta, 0.0);
        assert_eq!(first.period, 0.5);

        scheduler.previous = Some(now);
        let second = scheduler.sample(now + TimeDelta::milliseconds(1250), Duration::from_secs(1));
        assert_eq!(second.delta, 1.25);
    }

    #[tokio::test]
    async fn tick_follows_alert_level_and_publishes() {
        let dir = tempdir().unwrap();
        let alert = dir.path().join("alert_level.txt");
        std::fs::write(&alert, "3").unwrap();

        let (writer, reader) = handoff(&LivenessConfig::default(), PathBuf::new());
        let mut scheduler = HeartbeatScheduler::new(alert.clone(), writer, Duration::from_secs(1));

        assert_eq!(scheduler.tick().await.unwrap(), Duration::from_millis(250));
        let first = reader.latest().await.unwrap().unwrap();
        assert_eq!(first.period, 0);
        assert_eq!(first.delta, 0);

        std::fs::write(&alert, "0").unwrap();
        assert_eq!(scheduler.tick().await.unwrap(), Duration::from_secs(1));
        assert_eq!(reader.latest().await.unwrap().unwrap().period, 1);
    }

    #[tokio::test]
    async fn failed_publish_keeps_previous_beat() {
        let dir = tempdir().unwrap();
        let writer = LivenessWriter::File(dir.path().join("missing").join("heartbeat.txt"));
        let mut scheduler =
            HeartbeatScheduler::new(dir.path().join("alert.txt"), writer, Duration::from_secs(1));

        assert!(scheduler.tick().await.is_err());
        assert!(scheduler.previous.is_none());
    }

    #[tokio::test]
    async fn run_recovers_after_failed_publish() {
        let dir = tempdir().unwrap();
        let beat_dir = dir.path().join("realtime");
        let beat = beat_dir.join("heartbeat.txt");
        let scheduler = HeartbeatScheduler::new(
            dir.path().join("alert.txt"),
            LivenessWriter::File(beat.clone()),
            Duration::from_millis(50),
        );
        let task = tokio::spawn(scheduler.run());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!beat.exists());
        std::fs::create_dir(&beat_dir).unwrap();

        let mut content = None;
        for _ in 0..100 {
            if let Ok(line) = std::fs::read_to_string(&beat) {
                content = Some(line);
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        task.abort();

        let reading = parse_liveness(&content.expect("no beat after recovery")).unwrap();
        assert_eq!(reading.period, 1);
        assert_eq!(reading.delta, 0);
    }
}
