//! Polling session controller.
//!
//! Owns the lifecycle of a recurring log fetch against one selected device
//! and one filter configuration. Every parameter change bumps a generation
//! counter, aborts the pending timer, and issues an immediate fetch under
//! the new generation; fetch completions tagged with a superseded
//! generation are dropped, so stale results can never clobber a newer
//! selection. Consumers observe the session through a `watch` channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bridge::Bridge;
use crate::classify::classify_snapshot;
use crate::error::{CoreError, Result};
use crate::types::{ClassifiedLine, Device, FilterConfig};

/// Default wall-clock gap between scheduled fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No device selected.
    Idle,
    /// Timer armed, fetches ticking.
    Running,
    /// Timer suspended; device, filter, and generation retained.
    Paused,
}

/// Published view of the session at one instant.
///
/// The line buffer is replaced wholesale by each applied fetch; it always
/// reflects the last applied fetch of the current generation, never a
/// merge of generations.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub device_id: Option<String>,
    pub filter: FilterConfig,
    pub paused: bool,
    /// A fetch is in flight.
    pub loading: bool,
    pub generation: u64,
    pub lines: Arc<Vec<ClassifiedLine>>,
    /// Most recent transient fetch error, cleared by the next success.
    pub last_error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn phase(&self) -> SessionPhase {
        if self.device_id.is_none() {
            SessionPhase::Idle
        } else if self.paused {
            SessionPhase::Paused
        } else {
            SessionPhase::Running
        }
    }
}

struct Inner {
    device_id: Option<String>,
    filter: FilterConfig,
    paused: bool,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    lines: Arc<Vec<ClassifiedLine>>,
    last_error: Option<String>,
    loading: bool,
    fetched_at: Option<DateTime<Utc>>,
}

/// Log polling session bound to a bridge.
///
/// All mutating entry points are synchronous and must be called from within
/// a tokio runtime (fetches run as spawned tasks).
pub struct LogSession<B: Bridge> {
    bridge: Arc<B>,
    interval: Duration,
    state: Arc<Mutex<Inner>>,
    tx: watch::Sender<Snapshot>,
}

impl<B: Bridge> LogSession<B> {
    pub fn new(bridge: Arc<B>) -> Self {
        Self::with_interval(bridge, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(bridge: Arc<B>, interval: Duration) -> Self {
        let inner = Inner {
            device_id: None,
            filter: FilterConfig::default(),
            paused: false,
            generation: 0,
            timer: None,
            lines: Arc::new(Vec::new()),
            last_error: None,
            loading: false,
            fetched_at: None,
        };
        let (tx, _) = watch::channel(snapshot_of(&inner));

        Self {
            bridge,
            interval,
            state: Arc::new(Mutex::new(inner)),
            tx,
        }
    }

    /// Subscribe to session snapshots. The receiver always holds the
    /// latest published state.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        snapshot_of(&self.state.lock().unwrap())
    }

    pub fn phase(&self) -> SessionPhase {
        self.snapshot().phase()
    }

    /// Bind the session to a device. Restarts the loop: generation bump,
    /// timer cancel, immediate fetch, re-arm (unless paused).
    pub fn select_device(&self, id: impl Into<String>) {
        let mut inner = self.state.lock().unwrap();
        let device = Some(id.into());
        self.restart(&mut inner, device, None);
    }

    /// Replace the filter configuration atomically. Debounce-free: the new
    /// parameters take effect with an immediate fetch.
    pub fn set_filter(&self, filter: FilterConfig) {
        let mut inner = self.state.lock().unwrap();
        let device = inner.device_id.clone();
        self.restart(&mut inner, device, Some(filter));
    }

    /// Suspend polling, retaining device, filter, and generation.
    /// Idempotent: a second pause is a no-op.
    pub fn pause(&self) {
        let mut inner = self.state.lock().unwrap();
        if inner.paused {
            return;
        }
        cancel_timer(&mut inner);
        inner.paused = true;
        publish(&self.tx, &inner);
    }

    /// Resume polling: one immediate fetch, then the timer re-arms from
    /// now rather than the original schedule. No-op when not paused.
    pub fn resume(&self) {
        let mut inner = self.state.lock().unwrap();
        if !inner.paused {
            return;
        }
        inner.paused = false;
        if inner.device_id.is_some() {
            self.spawn_fetch(&mut inner);
            self.arm_timer(&mut inner);
        }
        publish(&self.tx, &inner);
    }

    /// One fetch at the current generation, outside the timer cadence.
    ///
    /// May race a scheduled fetch of the same generation; completions apply
    /// in arrival order and the last response wins. No ordering between the
    /// two is guaranteed.
    pub fn manual_refresh(&self) -> Result<()> {
        let mut inner = self.state.lock().unwrap();
        if inner.device_id.is_none() {
            return Err(CoreError::NoDeviceSelected);
        }
        self.spawn_fetch(&mut inner);
        publish(&self.tx, &inner);
        Ok(())
    }

    /// Clear the device-side log buffer, then reset the local buffer.
    ///
    /// The local buffer is only reset after the bridge confirms: a failed
    /// clear surfaces [`CoreError::ClearFailed`] and leaves it untouched.
    pub async fn clear(&self) -> Result<()> {
        let device = self
            .state
            .lock()
            .unwrap()
            .device_id
            .clone()
            .ok_or(CoreError::NoDeviceSelected)?;

        if let Err(e) = self.bridge.clear_log(&device).await {
            return Err(CoreError::ClearFailed {
                device,
                message: e.to_string(),
            });
        }

        let mut inner = self.state.lock().unwrap();
        inner.lines = Arc::new(Vec::new());
        inner.fetched_at = Some(Utc::now());
        publish(&self.tx, &inner);
        Ok(())
    }

    /// Reconcile the selection against a fresh registry snapshot.
    ///
    /// Policy: when the selected device is no longer reported, the
    /// selection is cleared and the session idles. It is never silently
    /// reassigned to another device.
    pub fn sync_devices(&self, devices: &[Device]) {
        let mut inner = self.state.lock().unwrap();
        let Some(selected) = inner.device_id.clone() else {
            return;
        };
        if devices.iter().any(|d| d.id == selected) {
            return;
        }

        warn!(device = %selected, "selected device no longer reported; clearing selection");
        inner.generation += 1;
        cancel_timer(&mut inner);
        inner.device_id = None;
        inner.lines = Arc::new(Vec::new());
        inner.last_error = Some(format!("device {} disconnected", selected));
        inner.loading = false;
        publish(&self.tx, &inner);
    }

    /// Tear the session down: the timer is cancelled deterministically and
    /// no further scheduled fetch fires. Also runs on drop.
    pub fn dispose(&self) {
        let mut inner = self.state.lock().unwrap();
        cancel_timer(&mut inner);
    }

    /// Shared restart path for device and filter changes.
    fn restart(&self, inner: &mut Inner, device: Option<String>, filter: Option<FilterConfig>) {
        inner.generation += 1;
        cancel_timer(inner);
        inner.device_id = device;
        if let Some(filter) = filter {
            inner.filter = filter;
        }
        // The buffer may only ever hold lines of the current generation.
        inner.lines = Arc::new(Vec::new());
        inner.last_error = None;
        inner.fetched_at = None;
        inner.loading = false;

        if inner.device_id.is_some() {
            self.spawn_fetch(inner);
            if !inner.paused {
                self.arm_timer(inner);
            }
        }
        publish(&self.tx, inner);
    }

    /// Spawn one fetch task for the session's current parameters.
    fn spawn_fetch(&self, inner: &mut Inner) {
        let Some(device) = inner.device_id.clone() else {
            return;
        };
        inner.loading = true;
        spawn_fetch_task(
            Arc::clone(&self.bridge),
            Arc::clone(&self.state),
            self.tx.clone(),
            device,
            inner.filter,
            inner.generation,
        );
    }

    /// Arm the recurring timer. Each tick spawns an independent fetch task
    /// so aborting the timer never waits on bridge I/O.
    fn arm_timer(&self, inner: &mut Inner) {
        let bridge = Arc::clone(&self.bridge);
        let state = Arc::clone(&self.state);
        let tx = self.tx.clone();
        let interval = self.interval;

        inner.timer = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let params = {
                    let mut inner = state.lock().unwrap();
                    match inner.device_id.clone() {
                        Some(device) if !inner.paused => {
                            inner.loading = true;
                            Some((device, inner.filter, inner.generation))
                        }
                        _ => None,
                    }
                };
                // Backstop: mutation paths abort this task before state
                // changes, so a mismatch here means the session idled.
                let Some((device, filter, generation)) = params else {
                    break;
                };

                spawn_fetch_task(
                    Arc::clone(&bridge),
                    Arc::clone(&state),
                    tx.clone(),
                    device,
                    filter,
                    generation,
                );
            }
        }));
    }
}

impl<B: Bridge> Drop for LogSession<B> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.state.lock() {
            cancel_timer(&mut inner);
        }
    }
}

fn cancel_timer(inner: &mut Inner) {
    if let Some(handle) = inner.timer.take() {
        handle.abort();
    }
}

fn snapshot_of(inner: &Inner) -> Snapshot {
    Snapshot {
        device_id: inner.device_id.clone(),
        filter: inner.filter,
        paused: inner.paused,
        loading: inner.loading,
        generation: inner.generation,
        lines: Arc::clone(&inner.lines),
        last_error: inner.last_error.clone(),
        fetched_at: inner.fetched_at,
    }
}

fn publish(tx: &watch::Sender<Snapshot>, inner: &Inner) {
    let _ = tx.send(snapshot_of(inner));
}

fn spawn_fetch_task<B: Bridge>(
    bridge: Arc<B>,
    state: Arc<Mutex<Inner>>,
    tx: watch::Sender<Snapshot>,
    device: String,
    filter: FilterConfig,
    generation: u64,
) {
    tokio::spawn(async move {
        let result = bridge
            .get_log(&device, filter.window.lines(), filter.floor.bridge_token())
            .await;
        apply_fetch(&state, &tx, generation, result);
    });
}

/// Apply a fetch completion: drop it if its generation is stale, otherwise
/// replace the buffer (success) or record the transient error (failure).
/// Serialized through the state lock, so concurrent completions never
/// interleave partial writes.
fn apply_fetch(
    state: &Mutex<Inner>,
    tx: &watch::Sender<Snapshot>,
    generation: u64,
    result: Result<String>,
) {
    let mut inner = state.lock().unwrap();
    if generation != inner.generation {
        debug!(
            stale = generation,
            current = inner.generation,
            "dropping superseded fetch result"
        );
        return;
    }

    inner.loading = false;
    match result {
        Ok(text) => {
            inner.lines = Arc::new(classify_snapshot(&text));
            inner.last_error = None;
            inner.fetched_at = Some(Utc::now());
        }
        Err(e) => {
            // Non-fatal: the timer provides the retry cadence.
            warn!(error = %e, "log fetch failed; retrying next tick");
            inner.last_error = Some(e.to_string());
        }
    }
    publish(tx, &inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConnectionStatus, Severity, WindowSize};
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, Ordering};

    type LogCall = (String, u32, Option<&'static str>);

    /// Scripted bridge: records calls, answers after a per-filterspec
    /// delay so tests can interleave slow and fast completions.
    struct MockBridge {
        calls: Mutex<Vec<LogCall>>,
        delays: Mutex<HashMap<Option<&'static str>, Duration>>,
        fail_next_fetch: AtomicBool,
        fail_clear: AtomicBool,
    }

    impl MockBridge {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                delays: Mutex::new(HashMap::new()),
                fail_next_fetch: AtomicBool::new(false),
                fail_clear: AtomicBool::new(false),
            })
        }

        fn set_delay(&self, filter: Option<&'static str>, delay: Duration) {
            self.delays.lock().unwrap().insert(filter, delay);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn calls(&self) -> Vec<LogCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Bridge for MockBridge {
        fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>>> + Send {
            async move { Ok(Vec::new()) }
        }

        fn get_log(
            &self,
            device_id: &str,
            lines: u32,
            filter: Option<&'static str>,
        ) -> impl Future<Output = Result<String>> + Send {
            let device = device_id.to_string();
            async move {
                self.calls.lock().unwrap().push((device, lines, filter));
                let delay = self
                    .delays
                    .lock()
                    .unwrap()
                    .get(&filter)
                    .copied()
                    .unwrap_or(Duration::from_millis(10));
                tokio::time::sleep(delay).await;

                if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
                    return Err(CoreError::BridgeUnavailable("mock bridge down".into()));
                }
                Ok(format!(
                    "01-01 00:00:00.000 I/mock(1): window={} filter={:?}",
                    lines, filter
                ))
            }
        }

        fn clear_log(&self, _device_id: &str) -> impl Future<Output = Result<()>> + Send {
            async move {
                if self.fail_clear.load(Ordering::SeqCst) {
                    Err(CoreError::CommandFailed("logcat -c rejected".into()))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn filter(floor: Severity, window: u32) -> FilterConfig {
        FilterConfig::new(floor, WindowSize::new(window).unwrap())
    }

    fn buffer_text(session: &LogSession<MockBridge>) -> String {
        session
            .snapshot()
            .lines
            .iter()
            .map(|l| l.raw.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn settle() {
        // Virtual time: lets spawned fetches run and their delays elapse.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_device_fetches_immediately_without_filter_token() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        session.select_device("emulator-5554");
        settle().await;

        // Default floor is Verbose: lines=100, no filterspec.
        assert_eq!(bridge.calls(), vec![("emulator-5554".into(), 100, None)]);
        assert!(buffer_text(&session).contains("window=100"));
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_strictly_increases() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        let g0 = session.snapshot().generation;
        session.select_device("A");
        let g1 = session.snapshot().generation;
        session.set_filter(filter(Severity::Error, 200));
        let g2 = session.snapshot().generation;
        session.select_device("B");
        let g3 = session.snapshot().generation;

        assert!(g0 < g1 && g1 < g2 && g2 < g3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_result_dropped() {
        let bridge = MockBridge::new();
        // The Info-floor fetch answers long after the Error-floor one.
        bridge.set_delay(Some("*:I"), Duration::from_millis(500));
        bridge.set_delay(Some("*:E"), Duration::from_millis(10));

        let session = LogSession::new(Arc::clone(&bridge));
        session.set_filter(filter(Severity::Info, 100));
        session.select_device("A");

        // Mid-cycle filter change: pending timer cancelled, generation
        // bumped, immediate fetch with the new parameters.
        session.set_filter(filter(Severity::Error, 200));
        settle().await;
        assert!(buffer_text(&session).contains("window=200"));

        // The old fetch completes now, tagged with the prior generation.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(buffer_text(&session).contains("window=200"));
        assert!(!buffer_text(&session).contains("window=100"));

        let calls = bridge.calls();
        assert_eq!(calls[0], ("A".into(), 100, Some("*:I")));
        assert_eq!(calls[1], ("A".into(), 200, Some("*:E")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_polls_at_interval() {
        let bridge = MockBridge::new();
        let session =
            LogSession::with_interval(Arc::clone(&bridge), Duration::from_secs(2));

        session.select_device("A");
        settle().await;
        assert_eq!(bridge.call_count(), 1);

        tokio::time::sleep(Duration::from_millis(6100)).await;
        // Immediate fetch plus ticks at 2s, 4s, 6s.
        assert_eq!(bridge.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_is_idempotent_and_stops_fetching() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        session.select_device("A");
        settle().await;
        let before = bridge.call_count();

        session.pause();
        session.pause();
        assert_eq!(session.phase(), SessionPhase::Paused);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(bridge.call_count(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_fetches_once_and_rearms_from_now() {
        let bridge = MockBridge::new();
        let session =
            LogSession::with_interval(Arc::clone(&bridge), Duration::from_secs(2));

        session.select_device("A");
        settle().await;
        session.pause();
        tokio::time::sleep(Duration::from_secs(10)).await;
        let paused_count = bridge.call_count();

        session.resume();
        settle().await;
        // Exactly one immediate fetch at resume.
        assert_eq!(bridge.call_count(), paused_count + 1);
        assert_eq!(session.phase(), SessionPhase::Running);

        // Next tick comes one full interval after the resume.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(bridge.call_count(), paused_count + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_requires_selection() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        assert!(matches!(
            session.manual_refresh(),
            Err(CoreError::NoDeviceSelected)
        ));
        assert_eq!(bridge.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_fetches_outside_cadence() {
        let bridge = MockBridge::new();
        let session =
            LogSession::with_interval(Arc::clone(&bridge), Duration::from_secs(2));

        session.select_device("A");
        settle().await;
        let before = bridge.call_count();

        session.manual_refresh().unwrap();
        settle().await;
        assert_eq!(bridge.call_count(), before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_failure_leaves_buffer_untouched() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        session.select_device("A");
        settle().await;
        session.pause();
        let before = buffer_text(&session);
        assert!(!before.is_empty());

        bridge.fail_clear.store(true, Ordering::SeqCst);
        let err = session.clear().await.unwrap_err();
        assert!(matches!(err, CoreError::ClearFailed { .. }));
        assert_eq!(buffer_text(&session), before);

        bridge.fail_clear.store(false, Ordering::SeqCst);
        session.clear().await.unwrap();
        assert!(session.snapshot().lines.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_is_transient() {
        let bridge = MockBridge::new();
        let session =
            LogSession::with_interval(Arc::clone(&bridge), Duration::from_secs(2));

        bridge.fail_next_fetch.store(true, Ordering::SeqCst);
        session.select_device("A");
        settle().await;

        let snap = session.snapshot();
        assert!(snap.last_error.is_some());
        assert!(snap.lines.is_empty());
        assert_eq!(session.phase(), SessionPhase::Running);

        // The next scheduled tick succeeds and clears the error.
        tokio::time::sleep(Duration::from_millis(2100)).await;
        let snap = session.snapshot();
        assert!(snap.last_error.is_none());
        assert!(!snap.lines.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_device_clears_selection() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        session.select_device("A");
        settle().await;

        let remaining = vec![Device {
            id: "B".to_string(),
            model: None,
            status: ConnectionStatus::Ready,
        }];
        session.sync_devices(&remaining);

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.snapshot().lines.is_empty());

        let count = bridge.call_count();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(bridge.call_count(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_devices_keeps_present_selection() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        session.select_device("A");
        settle().await;
        let generation = session.snapshot().generation;

        session.sync_devices(&[Device {
            id: "A".to_string(),
            model: None,
            status: ConnectionStatus::Ready,
        }]);

        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.snapshot().generation, generation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_timer() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));

        session.select_device("A");
        settle().await;
        let count = bridge.call_count();

        session.dispose();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(bridge.call_count(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_observe_replacement_buffers() {
        let bridge = MockBridge::new();
        let session = LogSession::new(Arc::clone(&bridge));
        let mut rx = session.subscribe();

        session.select_device("A");
        settle().await;

        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.device_id.as_deref(), Some("A"));
        assert_eq!(snap.lines.len(), 1);
        assert_eq!(snap.lines[0].severity, Some(Severity::Info));
    }
}
