use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::artifact::domain::artifact_counter::ArtifactCounter;
use crate::artifact::domain::artifact_writer::ArtifactWriter;
use crate::capture::domain::frame_decoder::FrameDecoder;
use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::box_mapper::BoxMapper;
use crate::detection::domain::detection_filter::DetectionFilter;
use crate::inference::domain::inference_client::InferenceClient;
use crate::inference::domain::tensor::Tensor;
use crate::pipeline::loop_state::{LoopState, PipelineError, Termination};
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::frame::Frame;
use crate::shared::region::CropRect;

/// Longest single sleep while throttling, so cancellation stays responsive.
const THROTTLE_SLICE: Duration = Duration::from_millis(100);

/// Continuous face-crop pipeline: fetch → decode → infer → filter → map → write.
///
/// Frames are processed one at a time and independently. Fetch, decode and
/// inference failures end the run; a failed crop only skips that crop.
pub struct CropFacesUseCase {
    source: Box<dyn FrameSource>,
    decoder: Box<dyn FrameDecoder>,
    client: Box<dyn InferenceClient>,
    filter: DetectionFilter,
    mapper: BoxMapper,
    writer: Box<dyn ArtifactWriter>,
    counter: ArtifactCounter,
    logger: Box<dyn PipelineLogger>,
    config: PipelineConfig,
    frames: u64,
    size_warned: bool,
}

impl CropFacesUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        decoder: Box<dyn FrameDecoder>,
        client: Box<dyn InferenceClient>,
        filter: DetectionFilter,
        mapper: BoxMapper,
        writer: Box<dyn ArtifactWriter>,
        counter: ArtifactCounter,
        logger: Box<dyn PipelineLogger>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            decoder,
            client,
            filter,
            mapper,
            writer,
            counter,
            logger,
            config,
            frames: 0,
            size_warned: false,
        }
    }

    /// Index the next successful crop will be saved under.
    pub fn counter(&self) -> ArtifactCounter {
        self.counter
    }

    /// Frames fully processed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs until the loop terminates, honouring the throttle interval.
    pub fn run(&mut self) -> Termination {
        log::info!("Starting crop loop at artifact {}", self.counter.current());
        loop {
            let started = Instant::now();
            if let LoopState::Terminated(reason) = self.step() {
                log::info!("closing... ({reason})");
                self.logger.summary();
                return reason;
            }
            self.throttle(started);
        }
    }

    /// Processes one frame and reports whether the loop may continue.
    pub fn step(&mut self) -> LoopState {
        if self.config.cancelled.load(Ordering::Relaxed) {
            return LoopState::Terminated(Termination::Cancelled);
        }
        if let Some(limit) = self.config.max_frames {
            if self.frames >= limit {
                return LoopState::Terminated(Termination::FrameLimitReached(limit));
            }
        }

        let index = self.frames;
        let t0 = Instant::now();
        let encoded = match self.source.fetch() {
            Ok(encoded) => encoded,
            Err(e) => return fail(PipelineError::Fetch(e)),
        };
        let t1 = Instant::now();
        let frame = match self.decoder.decode(&encoded, index) {
            Ok(frame) => frame,
            Err(source) => return fail(PipelineError::Decode { index, source }),
        };
        drop(encoded);
        self.check_size(&frame);

        let t2 = Instant::now();
        let raw = match self.client.infer(&Tensor::from_frame(&frame)) {
            Ok(raw) => raw,
            Err(e) => return fail(PipelineError::Inference(e)),
        };
        let t3 = Instant::now();
        if let Some(score) = raw.top_score() {
            log::debug!("Frame {index}: first confidence {score:.3}");
        }

        let detections = self.filter.filter(&raw);
        let mut written = 0usize;
        for detection in &detections {
            let [v0, v1, v2, v3] = detection.bbox;
            log::debug!("rect: {v0} {v1} {v2} {v3}");
            let rect = self.mapper.map(detection.bbox, frame.width(), frame.height());
            if self.persist(&frame, &rect) {
                written += 1;
            }
        }
        let t4 = Instant::now();

        self.logger.timing("fetch", ms(t1 - t0));
        self.logger.timing("decode", ms(t2 - t1));
        self.logger.timing("infer", ms(t3 - t2));
        self.logger.timing("write", ms(t4 - t3));
        self.logger.metric("accepted", detections.len() as f64);
        self.logger.metric("written", written as f64);
        self.logger
            .metric("skipped", (detections.len() - written) as f64);

        self.frames += 1;
        self.logger.frame_done(self.frames);
        LoopState::Running
    }

    /// Writes one crop. The counter only moves when the write succeeds.
    fn persist(&mut self, frame: &Frame, rect: &CropRect) -> bool {
        match self.writer.write(self.counter.current(), frame, rect) {
            Ok(path) => {
                self.counter.commit();
                log::info!(
                    "Saved {}x{} face {rect} to {}",
                    rect.width(),
                    rect.height(),
                    path.display()
                );
                true
            }
            Err(e) => {
                log::warn!("Skipping face {rect}: {e}");
                false
            }
        }
    }

    fn check_size(&mut self, frame: &Frame) {
        if self.size_warned {
            return;
        }
        if let Some((w, h)) = self.config.expected_size {
            if (frame.width(), frame.height()) != (w, h) {
                log::warn!(
                    "Frame is {}x{}, expected {w}x{h}; using the decoded size",
                    frame.width(),
                    frame.height()
                );
                self.size_warned = true;
            }
        }
    }

    fn throttle(&self, started: Instant) {
        let deadline = started + self.config.throttle;
        loop {
            let now = Instant::now();
            if now >= deadline || self.config.cancelled.load(Ordering::Relaxed) {
                return;
            }
            std::thread::sleep((deadline - now).min(THROTTLE_SLICE));
        }
    }
}

fn fail(error: PipelineError) -> LoopState {
    log::error!("{error}");
    LoopState::Terminated(Termination::Failed(error))
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::domain::artifact_writer::ArtifactError;
    use crate::capture::domain::frame_source::EncodedFrame;
    use crate::inference::domain::raw_detections::RawDetections;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    /// Serves a fixed number of frames, then fails.
    struct StubSource {
        remaining: usize,
        fetches: Arc<Mutex<usize>>,
    }

    impl FrameSource for StubSource {
        fn fetch(&mut self) -> Result<EncodedFrame, Box<dyn std::error::Error>> {
            *self.fetches.lock().unwrap() += 1;
            if self.remaining == 0 {
                return Err("stream closed".into());
            }
            self.remaining -= 1;
            Ok(EncodedFrame::new(vec![0xff, 0xd8]))
        }
    }

    /// Produces a blank frame of fixed size regardless of input.
    struct StubDecoder {
        width: u32,
        height: u32,
        fail: bool,
    }

    impl FrameDecoder for StubDecoder {
        fn decode(
            &self,
            _encoded: &EncodedFrame,
            index: u64,
        ) -> Result<Frame, Box<dyn std::error::Error>> {
            if self.fail {
                return Err("corrupt jpeg".into());
            }
            let len = (self.width * self.height * 3) as usize;
            Ok(Frame::new(vec![0; len], self.width, self.height, index))
        }
    }

    /// Replays queued results, recording the shapes it was called with.
    struct StubClient {
        results: VecDeque<Result<RawDetections, String>>,
        shapes: Arc<Mutex<Vec<Vec<i64>>>>,
    }

    impl InferenceClient for StubClient {
        fn infer(
            &mut self,
            tensor: &Tensor<'_>,
        ) -> Result<RawDetections, Box<dyn std::error::Error>> {
            self.shapes.lock().unwrap().push(tensor.shape().to_vec());
            match self.results.pop_front() {
                Some(Ok(raw)) => Ok(raw),
                Some(Err(e)) => Err(e.into()),
                None => Ok(RawDetections::default()),
            }
        }
    }

    /// Records writes; fails for the indices listed in `fail_calls`
    /// (counting calls from 0).
    struct StubWriter {
        fail_calls: Vec<usize>,
        calls: Arc<Mutex<Vec<(u64, CropRect)>>>,
        saved: Arc<Mutex<Vec<u64>>>,
    }

    impl ArtifactWriter for StubWriter {
        fn write(
            &self,
            index: u64,
            _frame: &Frame,
            rect: &CropRect,
        ) -> Result<PathBuf, ArtifactError> {
            let mut calls = self.calls.lock().unwrap();
            let call = calls.len();
            calls.push((index, *rect));
            if self.fail_calls.contains(&call) {
                return Err(ArtifactError::Open {
                    path: PathBuf::from(format!("image{index:05}.jpg")),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                });
            }
            self.saved.lock().unwrap().push(index);
            Ok(PathBuf::from(format!("image{index:05}.jpg")))
        }
    }

    // --- Helpers ---

    fn detections(faces: &[(usize, [f32; 4])]) -> RawDetections {
        let mut raw = RawDetections {
            scores: vec![0.05; 100],
            classes: vec![1.0; 100],
            boxes: vec![0.0; 400],
            num_detections: None,
        };
        for &(slot, bbox) in faces {
            raw.scores[slot] = 0.91;
            raw.boxes[slot * 4..slot * 4 + 4].copy_from_slice(&bbox);
        }
        raw
    }

    struct Harness {
        fetches: Arc<Mutex<usize>>,
        shapes: Arc<Mutex<Vec<Vec<i64>>>>,
        calls: Arc<Mutex<Vec<(u64, CropRect)>>>,
        saved: Arc<Mutex<Vec<u64>>>,
        cancelled: Arc<AtomicBool>,
    }

    fn build(
        frames: usize,
        results: Vec<Result<RawDetections, String>>,
        fail_calls: Vec<usize>,
        decoder_fails: bool,
        max_frames: Option<u64>,
    ) -> (CropFacesUseCase, Harness) {
        let harness = Harness {
            fetches: Arc::new(Mutex::new(0)),
            shapes: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            saved: Arc::new(Mutex::new(Vec::new())),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        let config = PipelineConfig {
            throttle: Duration::ZERO,
            max_frames,
            expected_size: Some((1640, 1232)),
            cancelled: harness.cancelled.clone(),
        };
        let uc = CropFacesUseCase::new(
            Box::new(StubSource {
                remaining: frames,
                fetches: harness.fetches.clone(),
            }),
            Box::new(StubDecoder {
                width: 1640,
                height: 1232,
                fail: decoder_fails,
            }),
            Box::new(StubClient {
                results: results.into(),
                shapes: harness.shapes.clone(),
            }),
            DetectionFilter::default(),
            BoxMapper::default(),
            Box::new(StubWriter {
                fail_calls,
                calls: harness.calls.clone(),
                saved: harness.saved.clone(),
            }),
            ArtifactCounter::default(),
            Box::new(NullPipelineLogger),
            config,
        );
        (uc, harness)
    }

    // --- Tests ---

    #[test]
    fn test_single_face_is_written_at_mapped_rect() {
        let (mut uc, h) = build(
            1,
            vec![Ok(detections(&[(3, [0.1, 0.2, 0.3, 0.4])]))],
            vec![],
            false,
            None,
        );

        assert!(uc.step().is_running());

        let calls = h.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (index, rect) = calls[0];
        assert_eq!(index, 0);
        assert_eq!((rect.x0, rect.y0), (164, 246));
        assert_eq!(uc.counter().current(), 1);
        assert_eq!(uc.frames(), 1);
    }

    #[test]
    fn test_tensor_shape_matches_frame() {
        let (mut uc, h) = build(1, vec![], vec![], false, None);
        uc.step();
        assert_eq!(*h.shapes.lock().unwrap(), vec![vec![1, 1640, 1232, 3]]);
    }

    #[test]
    fn test_failed_write_keeps_counter_and_continues() {
        let faces = [(0, [0.1; 4]), (1, [0.2; 4]), (2, [0.3; 4])];
        let (mut uc, h) = build(
            2,
            vec![Ok(detections(&faces)), Ok(detections(&faces[..1]))],
            vec![1],
            false,
            None,
        );

        assert!(uc.step().is_running());
        assert!(uc.step().is_running());

        // call 1 failed, so index 1 was retried by the next crop
        let indices: Vec<u64> = h.calls.lock().unwrap().iter().map(|c| c.0).collect();
        assert_eq!(indices, vec![0, 1, 1, 2]);
        assert_eq!(*h.saved.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(uc.counter().current(), 3);
    }

    #[test]
    fn test_inference_error_terminates_without_further_fetches() {
        let (mut uc, h) = build(
            5,
            vec![Ok(detections(&[])), Err("transport is closing".to_string())],
            vec![],
            false,
            None,
        );

        let termination = uc.run();

        assert!(matches!(
            termination,
            Termination::Failed(PipelineError::Inference(_))
        ));
        assert_eq!(*h.fetches.lock().unwrap(), 2);
        assert_eq!(uc.frames(), 1);
    }

    #[test]
    fn test_fetch_error_terminates() {
        let (mut uc, h) = build(0, vec![], vec![], false, None);
        let termination = uc.run();
        assert!(matches!(
            termination,
            Termination::Failed(PipelineError::Fetch(_))
        ));
        assert_eq!(*h.fetches.lock().unwrap(), 1);
        assert!(h.shapes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_terminates_before_inference() {
        let (mut uc, h) = build(3, vec![], vec![], true, None);
        let termination = uc.run();
        assert!(matches!(
            termination,
            Termination::Failed(PipelineError::Decode { index: 0, .. })
        ));
        assert_eq!(*h.fetches.lock().unwrap(), 1);
        assert!(h.shapes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_frame_limit_stops_cleanly() {
        let (mut uc, h) = build(10, vec![], vec![], false, Some(3));
        let termination = uc.run();
        assert!(matches!(termination, Termination::FrameLimitReached(3)));
        assert_eq!(*h.fetches.lock().unwrap(), 3);
    }

    #[test]
    fn test_cancel_stops_before_next_fetch() {
        let (mut uc, h) = build(10, vec![], vec![], false, None);
        assert!(uc.step().is_running());
        h.cancelled.store(true, Ordering::Relaxed);

        let termination = uc.run();
        assert!(matches!(termination, Termination::Cancelled));
        assert_eq!(*h.fetches.lock().unwrap(), 1);
    }

    #[test]
    fn test_frames_without_faces_write_nothing() {
        let (mut uc, h) = build(2, vec![], vec![], false, Some(2));
        uc.run();
        assert!(h.calls.lock().unwrap().is_empty());
        assert_eq!(uc.counter().current(), 0);
        assert_eq!(uc.frames(), 2);
    }

    #[test]
    fn test_throttle_spaces_iterations() {
        let (mut uc, _h) = build(2, vec![], vec![], false, Some(2));
        uc.config.throttle = Duration::from_millis(30);
        let started = Instant::now();
        uc.run();
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
