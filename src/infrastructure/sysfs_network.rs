// Network capability backed by /sys/class/net and a TCP round-trip probe
use crate::application::sensor_feed::{FeedKind, FeedSink, SensorCapability, SensorError, Subscription};
use crate::domain::network::{EffectiveType, NetworkSnapshot};
use crate::domain::observed::FeedUpdate;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// RTT is rounded to this granularity so probe jitter does not look like a change.
const RTT_GRANULARITY_MS: f64 = 25.0;

#[derive(Debug, Clone)]
pub struct SysfsNetwork {
    root: PathBuf,
    interface: Option<String>,
    probe_addr: Option<String>,
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl SysfsNetwork {
    pub fn new(
        root: impl Into<PathBuf>,
        interface: Option<String>,
        probe_addr: Option<String>,
        probe_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            root: root.into(),
            interface,
            probe_addr,
            probe_timeout,
            poll_interval,
        }
    }

    /// The configured interface, or the first non-loopback interface that is up.
    pub fn select_interface(&self) -> Option<String> {
        if let Some(name) = &self.interface {
            return self.root.join(name).is_dir().then(|| name.clone());
        }

        let entries = std::fs::read_dir(&self.root).ok()?;
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name != "lo")
            .filter(|name| read_trimmed(&self.root.join(name).join("operstate")).as_deref() == Some("up"))
            .collect();
        names.sort();
        names.into_iter().next()
    }

    pub fn connection_type(dir: &Path) -> &'static str {
        if dir.join("wireless").is_dir() {
            return "wifi";
        }
        let uevent = read_trimmed(&dir.join("uevent")).unwrap_or_default();
        let devtype = uevent
            .lines()
            .find_map(|line| line.strip_prefix("DEVTYPE="))
            .unwrap_or_default();
        match devtype {
            "wlan" => "wifi",
            "wwan" => "cellular",
            _ => "ethernet",
        }
    }

    fn downlink_mbps(dir: &Path) -> Option<f64> {
        read_trimmed(&dir.join("speed"))?
            .parse::<f64>()
            .ok()
            .filter(|speed| *speed > 0.0)
    }

    pub async fn read_snapshot(&self) -> NetworkSnapshot {
        let Some(interface) = self.select_interface() else {
            return NetworkSnapshot::from_platform(Some("none"), None, None, None);
        };
        let dir = self.root.join(&interface);
        let downlink = Self::downlink_mbps(&dir);

        let rtt = match &self.probe_addr {
            Some(addr) => match probe_rtt(addr, self.probe_timeout).await {
                Ok(rtt) => Some(rtt),
                Err(e) => {
                    tracing::debug!(addr = %addr, error = %e, "rtt probe failed");
                    None
                }
            },
            None => None,
        };

        let effective_type = EffectiveType::classify(rtt, downlink);
        NetworkSnapshot::new(
            Self::connection_type(&dir).to_string(),
            effective_type,
            downlink.unwrap_or(0.0),
            rtt.unwrap_or(0.0),
        )
    }
}

#[async_trait]
impl SensorCapability for SysfsNetwork {
    fn kind(&self) -> FeedKind {
        FeedKind::Network
    }

    async fn subscribe(&self, sink: FeedSink) -> Result<Option<Subscription>, SensorError> {
        if !self.root.is_dir() {
            tracing::debug!(root = %self.root.display(), "no network information available");
            return Ok(None);
        }

        let initial = self.read_snapshot().await;
        tracing::info!(
            connection = %initial.connection_type,
            effective_type = %initial.effective_type,
            "network detected"
        );
        sink.publish(FeedUpdate::Network(initial.clone()));

        let network = Arc::new(self.clone());
        let closer = sink.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(network.poll_interval);
            interval.tick().await;
            let mut last = initial;

            loop {
                interval.tick().await;
                let snapshot = network.read_snapshot().await;
                if snapshot == last {
                    continue;
                }
                tracing::debug!(
                    connection = %snapshot.connection_type,
                    effective_type = %snapshot.effective_type,
                    rtt_ms = snapshot.rtt_ms,
                    "network changed"
                );
                if !sink.publish(FeedUpdate::Network(snapshot.clone())) {
                    break;
                }
                last = snapshot;
            }
        });

        Ok(Some(Subscription::from_task(FeedKind::Network, closer, handle)))
    }
}

/// Time a TCP connect to `addr`, rounded to the RTT granularity.
pub async fn probe_rtt(addr: &str, timeout: Duration) -> Result<f64, SensorError> {
    let started = Instant::now();
    match tokio::time::timeout(timeout, tokio::net::TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => {
            let elapsed = started.elapsed().as_secs_f64() * 1000.0;
            Ok((elapsed / RTT_GRANULARITY_MS).round() * RTT_GRANULARITY_MS)
        }
        Ok(Err(source)) => Err(SensorError::Io {
            path: addr.to_string(),
            source,
        }),
        Err(_) => Err(SensorError::Timeout(timeout.as_millis() as u64)),
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn interface(root: &Path, name: &str, operstate: &str, extra: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("operstate"), format!("{}\n", operstate)).unwrap();
        for (file, content) in extra {
            fs::write(dir.join(file), format!("{}\n", content)).unwrap();
        }
        dir
    }

    fn network(root: &Path, probe_addr: Option<String>) -> SysfsNetwork {
        SysfsNetwork::new(
            root,
            None,
            probe_addr,
            Duration::from_secs(1),
            Duration::from_millis(20),
        )
    }

    #[test]
    fn test_select_first_up_interface() {
        let root = tempfile::tempdir().unwrap();
        interface(root.path(), "lo", "unknown", &[]);
        interface(root.path(), "eth0", "down", &[]);
        interface(root.path(), "wlan0", "up", &[]);

        assert_eq!(network(root.path(), None).select_interface().as_deref(), Some("wlan0"));
    }

    #[test]
    fn test_configured_interface_wins() {
        let root = tempfile::tempdir().unwrap();
        interface(root.path(), "eth0", "up", &[]);
        interface(root.path(), "wwan0", "down", &[]);

        let mut net = network(root.path(), None);
        net.interface = Some("wwan0".to_string());
        assert_eq!(net.select_interface().as_deref(), Some("wwan0"));

        net.interface = Some("missing0".to_string());
        assert!(net.select_interface().is_none());
    }

    #[test]
    fn test_connection_type_detection() {
        let root = tempfile::tempdir().unwrap();
        let wifi = interface(root.path(), "wlp2s0", "up", &[]);
        fs::create_dir_all(wifi.join("wireless")).unwrap();
        let wwan = interface(root.path(), "wwan0", "up", &[("uevent", "INTERFACE=wwan0\nDEVTYPE=wwan")]);
        let eth = interface(root.path(), "eth0", "up", &[("uevent", "INTERFACE=eth0")]);

        assert_eq!(SysfsNetwork::connection_type(&wifi), "wifi");
        assert_eq!(SysfsNetwork::connection_type(&wwan), "cellular");
        assert_eq!(SysfsNetwork::connection_type(&eth), "ethernet");
    }

    #[tokio::test]
    async fn test_snapshot_from_link_speed() {
        let root = tempfile::tempdir().unwrap();
        interface(root.path(), "eth0", "up", &[("speed", "1000")]);

        let snapshot = network(root.path(), None).read_snapshot().await;
        assert_eq!(snapshot.connection_type, "ethernet");
        assert_eq!(snapshot.downlink_mbps, 1000.0);
        assert_eq!(snapshot.rtt_ms, 0.0);
        assert_eq!(snapshot.effective_type, EffectiveType::FourG);
    }

    #[tokio::test]
    async fn test_snapshot_without_interface_up() {
        let root = tempfile::tempdir().unwrap();
        interface(root.path(), "eth0", "down", &[]);

        let snapshot = network(root.path(), None).read_snapshot().await;
        assert_eq!(snapshot.connection_type, "none");
        assert_eq!(snapshot.effective_type, EffectiveType::Unknown);
    }

    #[tokio::test]
    async fn test_probe_rtt_against_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let rtt = probe_rtt(&addr, Duration::from_secs(1)).await.unwrap();
        assert!(rtt >= 0.0);
        assert_eq!(rtt % RTT_GRANULARITY_MS, 0.0);
    }

    #[tokio::test]
    async fn test_missing_sysfs_is_absent() {
        let root = tempfile::tempdir().unwrap();
        let net = network(&root.path().join("does-not-exist"), None);
        let (sink, _rx) = FeedSink::channel();
        assert!(net.subscribe(sink).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subscribe_emits_on_change() {
        let root = tempfile::tempdir().unwrap();
        let eth = interface(root.path(), "eth0", "up", &[("speed", "100")]);
        let (sink, mut rx) = FeedSink::channel();

        let subscription = network(root.path(), None).subscribe(sink).await.unwrap().unwrap();
        match rx.recv().await {
            Some(FeedUpdate::Network(snapshot)) => assert_eq!(snapshot.downlink_mbps, 100.0),
            other => panic!("unexpected update: {:?}", other),
        }

        fs::write(eth.join("operstate"), "down\n").unwrap();
        let update = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        match update {
            Some(FeedUpdate::Network(snapshot)) => assert_eq!(snapshot.connection_type, "none"),
            other => panic!("unexpected update: {:?}", other),
        }

        subscription.cancel();
    }
}
