mod settings;

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use facecrop_core::artifact::domain::artifact_counter::ArtifactCounter;
use facecrop_core::artifact::infrastructure::jpeg_artifact_writer::JpegArtifactWriter;
use facecrop_core::capture::infrastructure::grpc_frame_source::GrpcFrameSource;
use facecrop_core::capture::infrastructure::jpeg_frame_decoder::JpegFrameDecoder;
use facecrop_core::detection::domain::box_mapper::{BoxLayout, BoxMapper};
use facecrop_core::detection::domain::detection_filter::DetectionFilter;
use facecrop_core::inference::infrastructure::grpc_prediction_client::GrpcPredictionClient;
use facecrop_core::pipeline::crop_faces_use_case::CropFacesUseCase;
use facecrop_core::pipeline::pipeline_config::PipelineConfig;
use facecrop_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facecrop_core::shared::constants::DETECTION_SLOTS;
use facecrop_core::transport::grpc_channel::ChannelOptions;

use settings::Settings;

/// Grace period after Ctrl-C before a hung network call is abandoned.
const FORCE_EXIT_AFTER: Duration = Duration::from_secs(30);

/// Crop faces from a network camera using a remote face detector.
///
/// Every flag overrides the matching key of the --config file, which in turn
/// overrides the built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "facecrop", version)]
struct Cli {
    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum milliseconds between frames (0 = no throttle).
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// TensorFlow Serving address (host:port).
    #[arg(long)]
    serving_addr: Option<String>,

    /// Model name on the serving host.
    #[arg(long)]
    model: Option<String>,

    /// Model signature name.
    #[arg(long)]
    signature: Option<String>,

    /// Model version.
    #[arg(long)]
    model_version: Option<i64>,

    /// Name of the model's image input.
    #[arg(long)]
    input_name: Option<String>,

    /// Name of the detection scores output.
    #[arg(long)]
    scores_output: Option<String>,

    /// Name of the detection classes output.
    #[arg(long)]
    classes_output: Option<String>,

    /// Name of the detection boxes output.
    #[arg(long)]
    boxes_output: Option<String>,

    /// Name of the detection count output.
    #[arg(long)]
    num_output: Option<String>,

    /// Camera frame service address (host:port).
    #[arg(long)]
    frames_addr: Option<String>,

    /// Expected frame width in pixels.
    #[arg(long)]
    frame_width: Option<u32>,

    /// Expected frame height in pixels.
    #[arg(long)]
    frame_height: Option<u32>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f32>,

    /// Box interpretation: legacy, extent or corners.
    #[arg(long)]
    box_layout: Option<BoxLayout>,

    /// Directory crops are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Per-call deadline in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Connection deadline in milliseconds.
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Maximum gRPC message size in bytes.
    #[arg(long)]
    max_message_size: Option<usize>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let settings = apply_overrides(cli, base);
    validate(&settings)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(cancelled.clone())?;

    let options = ChannelOptions {
        call_timeout: settings.timeout_ms.map(Duration::from_millis),
        connect_timeout: settings.connect_timeout_ms.map(Duration::from_millis),
        max_message_size: settings.max_message_size,
    };

    log::info!(
        "Connecting to face detector at {} (model {})",
        settings.serving_addr,
        settings.model.name
    );
    let client = GrpcPredictionClient::connect(
        &settings.serving_addr,
        &options,
        settings.model.clone(),
        settings.outputs.clone(),
    )?;

    log::info!("Connecting to camera at {}", settings.frames_addr);
    let source = GrpcFrameSource::connect(&settings.frames_addr, &options)?;

    let writer = JpegArtifactWriter::new(&settings.output_dir);
    let counter = ArtifactCounter::resume_after(writer.highest_existing_index()?);
    let filter = DetectionFilter::new(settings.confidence, DETECTION_SLOTS);
    let mapper = BoxMapper::new(settings.box_layout);
    log::info!(
        "Writing crops to {} from index {}, confidence >= {}, {} boxes",
        writer.dir().display(),
        counter.current(),
        filter.min_score(),
        mapper.layout()
    );

    let config = PipelineConfig {
        throttle: Duration::from_millis(settings.throttle_ms),
        max_frames: settings.max_frames,
        expected_size: Some((settings.frame_width, settings.frame_height)),
        cancelled,
    };

    let mut use_case = CropFacesUseCase::new(
        Box::new(source),
        Box::new(JpegFrameDecoder::new()),
        Box::new(client),
        filter,
        mapper,
        Box::new(writer),
        counter,
        Box::new(StdoutPipelineLogger::default()),
        config,
    );

    let termination = use_case.run();
    if termination.is_failure() {
        return Err(termination.to_string().into());
    }
    log::info!(
        "Crops written to {} (next index {})",
        settings.output_dir.display(),
        use_case.counter().current()
    );
    Ok(())
}

/// First Ctrl-C asks the loop to stop after the current frame. If a network
/// call is still blocked after the grace period the process exits anyway.
fn install_interrupt_handler(cancelled: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        log::warn!("Interrupt received, finishing current frame...");
        std::thread::spawn(|| {
            std::thread::sleep(FORCE_EXIT_AFTER);
            eprintln!("Error: shutdown timed out");
            process::exit(1);
        });
    })
}

fn apply_overrides(cli: Cli, mut settings: Settings) -> Settings {
    if let Some(v) = cli.throttle_ms {
        settings.throttle_ms = v;
    }
    if let Some(v) = cli.serving_addr {
        settings.serving_addr = v;
    }
    if let Some(v) = cli.model {
        settings.model.name = v;
    }
    if let Some(v) = cli.signature {
        settings.model.signature_name = v;
    }
    if let Some(v) = cli.model_version {
        settings.model.version = v;
    }
    if let Some(v) = cli.input_name {
        settings.model.input_name = v;
    }
    if let Some(v) = cli.scores_output {
        settings.outputs.scores = v;
    }
    if let Some(v) = cli.classes_output {
        settings.outputs.classes = v;
    }
    if let Some(v) = cli.boxes_output {
        settings.outputs.boxes = v;
    }
    if let Some(v) = cli.num_output {
        settings.outputs.num_detections = (!v.is_empty()).then_some(v);
    }
    if let Some(v) = cli.frames_addr {
        settings.frames_addr = v;
    }
    if let Some(v) = cli.frame_width {
        settings.frame_width = v;
    }
    if let Some(v) = cli.frame_height {
        settings.frame_height = v;
    }
    if let Some(v) = cli.confidence {
        settings.confidence = v;
    }
    if let Some(v) = cli.box_layout {
        settings.box_layout = v;
    }
    if let Some(v) = cli.output_dir {
        settings.output_dir = v;
    }
    if cli.timeout_ms.is_some() {
        settings.timeout_ms = cli.timeout_ms;
    }
    if cli.connect_timeout_ms.is_some() {
        settings.connect_timeout_ms = cli.connect_timeout_ms;
    }
    if let Some(v) = cli.max_message_size {
        settings.max_message_size = v;
    }
    if cli.max_frames.is_some() {
        settings.max_frames = cli.max_frames;
    }
    settings
}

fn validate(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&settings.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            settings.confidence
        )
        .into());
    }
    let names = [
        ("serving address", &settings.serving_addr),
        ("frames address", &settings.frames_addr),
        ("model name", &settings.model.name),
        ("signature name", &settings.model.signature_name),
        ("input name", &settings.model.input_name),
        ("scores output", &settings.outputs.scores),
        ("classes output", &settings.outputs.classes),
        ("boxes output", &settings.outputs.boxes),
    ];
    for (label, value) in names {
        if value.trim().is_empty() {
            return Err(format!("The {label} must not be empty").into());
        }
    }
    if settings.frame_width == 0 || settings.frame_height == 0 {
        return Err(format!(
            "Frame size must be non-zero, got {}x{}",
            settings.frame_width, settings.frame_height
        )
        .into());
    }
    if settings.max_message_size == 0 {
        return Err("Max message size must be greater than zero".into());
    }
    if settings.max_frames == Some(0) {
        return Err("Max frames must be greater than zero".into());
    }
    if !settings.output_dir.is_dir() {
        return Err(format!(
            "Output directory not found: {}",
            settings.output_dir.display()
        )
        .into());
    }
    Ok(())
}
