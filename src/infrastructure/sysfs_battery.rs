// Battery capability backed by /sys/class/power_supply
use crate::application::sensor_feed::{FeedKind, FeedSink, SensorCapability, SensorError, Subscription};
use crate::domain::battery::BatterySnapshot;
use crate::domain::observed::FeedUpdate;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SysfsBattery {
    root: PathBuf,
    poll_interval: Duration,
}

impl SysfsBattery {
    pub fn new(root: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            root: root.into(),
            poll_interval,
        }
    }

    /// First supply whose `type` is `Battery`.
    pub fn find_battery(&self) -> Option<PathBuf> {
        let entries = std::fs::read_dir(&self.root).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| read_trimmed(&p.join("type")).is_ok_and(|t| t == "Battery"))
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }

    pub fn read_snapshot(dir: &Path) -> Result<BatterySnapshot, SensorError> {
        let status = read_trimmed(&dir.join("status")).unwrap_or_default();
        let charging = matches!(status.as_str(), "Charging" | "Full");

        let (now, full, rate) = match (
            read_number(dir, "energy_now"),
            read_number(dir, "energy_full"),
        ) {
            (Some(now), Some(full)) => (Some(now), Some(full), read_number(dir, "power_now")),
            _ => (
                read_number(dir, "charge_now"),
                read_number(dir, "charge_full"),
                read_number(dir, "current_now"),
            ),
        };

        let level_fraction = match read_number(dir, "capacity") {
            Some(capacity) => capacity / 100.0,
            None => match (now, full) {
                (Some(now), Some(full)) if full > 0.0 => now / full,
                _ => {
                    return Err(SensorError::Parse {
                        what: "battery level",
                        value: dir.display().to_string(),
                    });
                }
            },
        };

        let mut charging_time = f64::INFINITY;
        let mut discharging_time = f64::INFINITY;
        if status == "Full" {
            charging_time = 0.0;
        } else if let (Some(now), Some(full), Some(rate)) = (now, full, rate)
            && rate > 0.0
        {
            if charging {
                charging_time = (full - now).max(0.0) / rate * 3600.0;
            } else {
                discharging_time = now / rate * 3600.0;
            }
        }

        Ok(BatterySnapshot::from_platform(
            level_fraction,
            charging,
            charging_time,
            discharging_time,
        ))
    }
}

#[async_trait]
impl SensorCapability for SysfsBattery {
    fn kind(&self) -> FeedKind {
        FeedKind::Battery
    }

    async fn subscribe(&self, sink: FeedSink) -> Result<Option<Subscription>, SensorError> {
        let Some(dir) = self.find_battery() else {
            tracing::debug!(root = %self.root.display(), "no battery power supply found");
            return Ok(None);
        };

        let initial = Self::read_snapshot(&dir)?;
        tracing::info!(
            battery = %dir.display(),
            level = initial.level,
            charging = initial.charging,
            "battery detected"
        );
        sink.publish(FeedUpdate::Battery(initial.clone()));

        let poll_interval = self.poll_interval;
        let closer = sink.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.tick().await;
            let mut last = initial;

            loop {
                interval.tick().await;
                let snapshot = match Self::read_snapshot(&dir) {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!(error = %e, "battery poll failed");
                        continue;
                    }
                };

                // Only charging-state and level changes are notifications
                let charging_changed = snapshot.charging != last.charging;
                let level_changed = level_hundredths(snapshot.level) != level_hundredths(last.level);
                if !charging_changed && !level_changed {
                    continue;
                }

                tracing::debug!(
                    level = snapshot.level,
                    charging = snapshot.charging,
                    "battery changed"
                );
                if !sink.publish(FeedUpdate::Battery(snapshot.clone())) {
                    break;
                }
                last = snapshot;
            }
        });

        Ok(Some(Subscription::from_task(FeedKind::Battery, closer, handle)))
    }
}

fn read_trimmed(path: &Path) -> Result<String, SensorError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| SensorError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Levels are compared at 0.01% so ratio-derived readings still notify.
fn level_hundredths(level: f64) -> i64 {
    (level * 100.0).round() as i64
}

fn read_number(dir: &Path, name: &str) -> Option<f64> {
    read_trimmed(&dir.join(name)).ok()?.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::battery::TimeEstimate;
    use std::fs;

    fn supply(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (file, content) in files {
            fs::write(dir.join(file), format!("{}\n", content)).unwrap();
        }
        dir
    }

    #[test]
    fn test_find_battery_skips_mains() {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "AC", &[("type", "Mains"), ("online", "1")]);
        let bat = supply(root.path(), "BAT0", &[("type", "Battery"), ("capacity", "50")]);

        let battery = SysfsBattery::new(root.path(), Duration::from_secs(1));
        assert_eq!(battery.find_battery(), Some(bat));
    }

    #[test]
    fn test_read_discharging_energy_battery() {
        let root = tempfile::tempdir().unwrap();
        let dir = supply(
            root.path(),
            "BAT0",
            &[
                ("type", "Battery"),
                ("status", "Discharging"),
                ("capacity", "42"),
                ("energy_now", "21000000"),
                ("energy_full", "50000000"),
                ("power_now", "10500000"),
            ],
        );

        let snapshot = SysfsBattery::read_snapshot(&dir).unwrap();
        assert!((snapshot.level - 42.0).abs() < 1e-9);
        assert!(!snapshot.charging);
        assert_eq!(snapshot.discharging_time, TimeEstimate::Seconds(7200));
        assert_eq!(snapshot.charging_time, TimeEstimate::Unknown);
    }

    #[test]
    fn test_read_charging_charge_battery_without_capacity() {
        let root = tempfile::tempdir().unwrap();
        let dir = supply(
            root.path(),
            "BAT1",
            &[
                ("type", "Battery"),
                ("status", "Charging"),
                ("charge_now", "1000000"),
                ("charge_full", "4000000"),
                ("current_now", "1500000"),
            ],
        );

        let snapshot = SysfsBattery::read_snapshot(&dir).unwrap();
        assert!((snapshot.level - 25.0).abs() < 1e-9);
        assert!(snapshot.charging);
        assert_eq!(snapshot.charging_time, TimeEstimate::Seconds(7200));
        assert_eq!(snapshot.discharging_time, TimeEstimate::Unknown);
    }

    #[test]
    fn test_full_battery_reports_zero_charging_time() {
        let root = tempfile::tempdir().unwrap();
        let dir = supply(
            root.path(),
            "BAT0",
            &[("type", "Battery"), ("status", "Full"), ("capacity", "100")],
        );

        let snapshot = SysfsBattery::read_snapshot(&dir).unwrap();
        assert!(snapshot.charging);
        assert_eq!(snapshot.charging_time, TimeEstimate::Seconds(0));
    }

    #[test]
    fn test_missing_level_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = supply(root.path(), "BAT0", &[("type", "Battery"), ("status", "Unknown")]);
        assert!(SysfsBattery::read_snapshot(&dir).is_err());
    }

    #[tokio::test]
    async fn test_subscribe_without_battery_is_absent() {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "AC", &[("type", "Mains")]);
        let (sink, mut rx) = FeedSink::channel();

        let battery = SysfsBattery::new(root.path(), Duration::from_secs(1));
        assert!(battery.subscribe(sink).await.unwrap().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_subscribe_emits_initial_and_level_changes() {
        let root = tempfile::tempdir().unwrap();
        let dir = supply(
            root.path(),
            "BAT0",
            &[("type", "Battery"), ("status", "Discharging"), ("capacity", "80")],
        );
        let (sink, mut rx) = FeedSink::channel();

        let battery = SysfsBattery::new(root.path(), Duration::from_millis(20));
        let subscription = battery.subscribe(sink).await.unwrap().unwrap();

        match rx.recv().await {
            Some(FeedUpdate::Battery(snapshot)) => assert_eq!(snapshot.level, 80.0),
            other => panic!("unexpected update: {:?}", other),
        }

        fs::write(dir.join("capacity"), "79\n").unwrap();
        let update = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        match update {
            Some(FeedUpdate::Battery(snapshot)) => assert_eq!(snapshot.level, 79.0),
            other => panic!("unexpected update: {:?}", other),
        }

        subscription.cancel();
    }

    #[tokio::test]
    async fn test_energy_ratio_crossing_critical_level_is_published() {
        let root = tempfile::tempdir().unwrap();
        let dir = supply(
            root.path(),
            "BAT0",
            &[
                ("type", "Battery"),
                ("status", "Discharging"),
                ("energy_now", "2040"),
                ("energy_full", "10000"),
            ],
        );
        let (sink, mut rx) = FeedSink::channel();

        let battery = SysfsBattery::new(root.path(), Duration::from_millis(20));
        let subscription = battery.subscribe(sink).await.unwrap().unwrap();

        match rx.recv().await {
            Some(FeedUpdate::Battery(snapshot)) => assert!((snapshot.level - 20.4).abs() < 1e-9),
            other => panic!("unexpected update: {:?}", other),
        }

        fs::write(dir.join("energy_now"), "1960\n").unwrap();
        let update = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        match update {
            Some(FeedUpdate::Battery(snapshot)) => {
                assert!((snapshot.level - 19.6).abs() < 1e-9);
                assert!(snapshot.level < 20.0);
            }
            other => panic!("unexpected update: {:?}", other),
        }

        subscription.cancel();
    }

    #[test]
    fn test_level_hundredths() {
        assert_eq!(level_hundredths(20.4), 2040);
        assert_eq!(level_hundredths(19.6), 1960);
        assert_eq!(level_hundredths(19.999), 2000);
    }
}
