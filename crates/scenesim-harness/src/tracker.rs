//! Resource and performance trackers.
//!
//! Neither measures the host. The resource tracker counts registry
//! instances; the performance tracker synthesizes plausible samples from a
//! seeded generator and the live instance count.

use chrono::{DateTime, Utc};
use scenesim_data::SeededGenerator;
use scenesim_driver::InstanceRegistry;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

/// Estimated memory held by one driver instance, in megabytes.
pub const MEMORY_PER_INSTANCE_MB: f64 = 50.0;
/// Baseline memory reported with no instances alive, in megabytes.
pub const BASE_MEMORY_MB: f64 = 128.0;
/// Target frame time at 60 fps, in milliseconds.
pub const TARGET_FRAME_TIME_MS: f64 = 16.67;
/// Default performance sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
/// Shortest sampling interval; shorter requests are raised to this.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

// ==================== Resource Tracker ====================

/// Registry state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub browser_instances: usize,
    pub timestamp: DateTime<Utc>,
}

/// What changed between start and stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Instances created since tracking started.
    pub browser_instances: usize,
    pub memory_estimate_mb: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: Duration,
}

/// Counts driver instances created during a tracked window.
#[derive(Debug)]
pub struct ResourceTracker {
    registry: InstanceRegistry,
    start: Option<(ResourceSnapshot, Instant)>,
    usage: Option<ResourceUsage>,
}

impl ResourceTracker {
    pub fn new(registry: InstanceRegistry) -> Self {
        Self {
            registry,
            start: None,
            usage: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }

    fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            browser_instances: self.registry.count(),
            timestamp: Utc::now(),
        }
    }

    /// Record the starting instance count. Restarts a running window.
    pub fn start_tracking(&mut self) {
        let snapshot = self.snapshot();
        debug!(instances = snapshot.browser_instances, "Resource tracking started");
        self.start = Some((snapshot, Instant::now()));
        self.usage = None;
    }

    /// Close the window and compute usage. A no-op without a prior start.
    pub fn stop_tracking(&mut self) -> Option<&ResourceUsage> {
        let (start, started) = self.start.take()?;
        let end = self.snapshot();
        let created = end
            .browser_instances
            .saturating_sub(start.browser_instances);
        let usage = ResourceUsage {
            browser_instances: created,
            memory_estimate_mb: created as f64 * MEMORY_PER_INSTANCE_MB,
            start_time: start.timestamp,
            end_time: end.timestamp,
            duration: started.elapsed(),
        };
        info!(
            instances = usage.browser_instances,
            memory_mb = usage.memory_estimate_mb,
            "Resource tracking stopped"
        );
        self.usage = Some(usage);
        self.usage.as_ref()
    }

    /// Usage from the last completed window.
    pub fn get_usage(&self) -> Option<&ResourceUsage> {
        self.usage.as_ref()
    }
}

// ==================== Performance Tracker ====================

/// One synthetic sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub frame_time_ms: f64,
}

/// Raw series plus means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInfo {
    pub samples: Vec<PerformanceSample>,
    pub average_cpu_percent: f64,
    pub average_memory_mb: f64,
    pub average_frame_time_ms: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
}

struct Sampler {
    generator: SeededGenerator,
    registry: InstanceRegistry,
}

impl Sampler {
    /// Draws: cpu, frame time.
    fn sample(&mut self) -> PerformanceSample {
        let instances = self.registry.count() as f64;
        PerformanceSample {
            timestamp: Utc::now(),
            cpu_percent: self.generator.random_float(5.0, 35.0) + 5.0 * instances,
            memory_mb: BASE_MEMORY_MB + MEMORY_PER_INSTANCE_MB * instances,
            frame_time_ms: TARGET_FRAME_TIME_MS + self.generator.random_float(-2.0, 2.0),
        }
    }
}

/// Samples synthetic CPU, memory and frame time on a fixed interval.
#[derive(Debug)]
pub struct PerformanceTracker {
    registry: InstanceRegistry,
    seed: u32,
    sample_interval: Duration,
    samples: Arc<Mutex<Vec<PerformanceSample>>>,
    running: Option<(oneshot::Sender<()>, JoinHandle<()>)>,
    start_time: Option<DateTime<Utc>>,
    started: Option<Instant>,
    end_time: Option<DateTime<Utc>>,
    duration: Option<Duration>,
}

impl PerformanceTracker {
    pub fn new(registry: InstanceRegistry, seed: u32) -> Self {
        Self::with_interval(registry, seed, DEFAULT_SAMPLE_INTERVAL)
    }

    /// A tracker sampling every `sample_interval`, raised to at least
    /// [`MIN_SAMPLE_INTERVAL`].
    pub fn with_interval(registry: InstanceRegistry, seed: u32, sample_interval: Duration) -> Self {
        if sample_interval < MIN_SAMPLE_INTERVAL {
            warn!(requested = ?sample_interval, "Sampling interval too short, using minimum");
        }
        let sample_interval = sample_interval.max(MIN_SAMPLE_INTERVAL);
        Self {
            registry,
            seed,
            sample_interval,
            samples: Arc::new(Mutex::new(Vec::new())),
            running: None,
            start_time: None,
            started: None,
            end_time: None,
            duration: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.running.is_some()
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// Start the sampling loop. The first sample is taken immediately.
    ///
    /// Must be called from within a Tokio runtime. Does nothing while
    /// already tracking.
    pub fn start_tracking(&mut self) {
        if self.running.is_some() {
            return;
        }

        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.start_time = Some(Utc::now());
        self.started = Some(Instant::now());
        self.end_time = None;
        self.duration = None;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let samples = self.samples.clone();
        let mut sampler = Sampler {
            generator: SeededGenerator::new(self.seed),
            registry: self.registry.clone(),
        };
        let period = self.sample_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let sample = sampler.sample();
                        trace!(cpu = sample.cpu_percent, frame = sample.frame_time_ms, "Performance sample");
                        samples
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(sample);
                    }
                }
            }
        });

        debug!(interval = ?period, "Performance tracking started");
        self.running = Some((stop_tx, handle));
    }

    /// Stop sampling and finalize the duration. A no-op when not tracking.
    pub async fn stop_tracking(&mut self) -> Option<PerformanceInfo> {
        let (stop_tx, handle) = self.running.take()?;
        // The loop may already have exited; either way it is done after this.
        let _ = stop_tx.send(());
        if let Err(e) = handle.await {
            error!(error = %e, "Performance sampling task failed");
        }

        self.end_time = Some(Utc::now());
        self.duration = self.started.map(|started| started.elapsed());
        let info = self.get_info();
        info!(
            samples = info.samples.len(),
            avg_cpu = info.average_cpu_percent,
            avg_frame_ms = info.average_frame_time_ms,
            "Performance tracking stopped"
        );
        Some(info)
    }

    /// Samples collected so far and their means.
    pub fn get_info(&self) -> PerformanceInfo {
        let samples = self
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let cpu: Vec<f64> = samples.iter().map(|s| s.cpu_percent).collect();
        let memory: Vec<f64> = samples.iter().map(|s| s.memory_mb).collect();
        let frame: Vec<f64> = samples.iter().map(|s| s.frame_time_ms).collect();
        PerformanceInfo {
            average_cpu_percent: Self::calculate_average(&cpu),
            average_memory_mb: Self::calculate_average(&memory),
            average_frame_time_ms: Self::calculate_average(&frame),
            samples,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
        }
    }

    /// Arithmetic mean; zero for an empty slice.
    pub fn calculate_average(values: &[f64]) -> f64 {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }
}

impl Drop for PerformanceTracker {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.running.take() {
            handle.abort();
        }
    }
}
