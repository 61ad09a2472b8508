use std::collections::HashMap;
use std::time::Instant;

/// Observer for crop-loop events.
///
/// Keeps the use case free of output concerns so the CLI, tests, and any
/// embedding application can each decide what to do with them.
pub trait PipelineLogger: Send {
    /// Called after every completed frame with the running frame count.
    fn frame_done(&mut self, frames: u64);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-frame count (e.g. accepted detections, written crops).
    fn metric(&mut self, name: &str, value: f64);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events. Used by tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame_done(&mut self, _frames: u64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
}

/// Running count and sum of one stage's timings or one metric's values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aggregate {
    pub count: u64,
    pub total: f64,
}

impl Aggregate {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Logs progress through the `log` facade every `throttle_frames` frames and
/// keeps per-stage and per-metric aggregates for the summary printed at exit.
///
/// Only aggregates are stored, so memory stays constant however long the
/// loop runs.
pub struct StdoutPipelineLogger {
    throttle_frames: u64,
    timings: HashMap<String, Aggregate>,
    metrics: HashMap<String, Aggregate>,
    start_time: Instant,
    frames: u64,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: u64) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames;
        let mut lines = vec![format!(
            "Crop summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        for (stage, agg) in stages {
            let total_ms = agg.total;
            let avg_ms = agg.mean();
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut metrics: Vec<_> = self.metrics.iter().collect();
        metrics.sort_by(|a, b| a.0.cmp(b.0));
        for (name, agg) in metrics {
            lines.push(format!(
                "  {name}: total {:.0}, avg {:.1}",
                agg.total,
                agg.mean()
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.2} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<Aggregate> {
        self.timings.get(stage).copied()
    }

    pub fn metrics_for(&self, name: &str) -> Option<Aggregate> {
        self.metrics.get(name).copied()
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn frame_done(&mut self, frames: u64) {
        self.frames = frames;
        if frames % self.throttle_frames == 0 {
            let written = self.metrics.get("written").map_or(0.0, |agg| agg.total);
            log::info!("Processed {frames} frames, {written:.0} crops saved");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        record(&mut self.timings, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        record(&mut self.metrics, name, value);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

fn record(map: &mut HashMap<String, Aggregate>, key: &str, value: f64) {
    match map.get_mut(key) {
        Some(agg) => agg.record(value),
        None => {
            let mut agg = Aggregate::default();
            agg.record(value);
            map.insert(key.to_string(), agg);
        }
    }
}
