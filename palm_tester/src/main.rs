mod overlay;

use anyhow::{Context, Result};
use clap::Parser;
use palm_vision::{
    FrameSummary, PipelineConfig, PipelineWorker, RowOrder, SampleRegion, SegmentationPipeline,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "palm_tester")]
#[command(author, version, about = "Segments hands in still frames and counts fingers", long_about = None)]
struct Args {
    /// Frames to segment, processed in order
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Image to take the calibration patch from (default: the first frame)
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Calibration patch as x,y,width,height
    #[arg(long, value_parser = parse_region, default_value = "0,0,20,20")]
    region: SampleRegion,

    /// JSON pipeline config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skin threshold in [0, 1]
    #[arg(long)]
    threshold: Option<f32>,

    /// Treat row 0 of each frame as the bottom of the picture
    #[arg(long)]
    bottom_up: bool,

    #[arg(long)]
    show_first_pass: bool,

    #[arg(long)]
    show_second_pass: bool,

    #[arg(long)]
    show_contour: bool,

    /// Directory for annotated frames
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Score each frame against this finger count
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=5))]
    expect_fingers: Option<u8>,

    /// Print one JSON summary per frame
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    frame: &'a str,
    finger_count: usize,
    #[serde(flatten)]
    summary: FrameSummary,
}

#[derive(Serialize)]
struct Accuracy {
    frames_tested: usize,
    successful_frames: usize,
    percentage: f64,
}

fn parse_region(raw: &str) -> std::result::Result<SampleRegion, String> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid region '{raw}': {e}"))?;
    match parts.as_slice() {
        &[x, y, width, height] => Ok(SampleRegion::new(x, y, width, height)),
        _ => Err(format!("expected x,y,width,height, got '{raw}'")),
    }
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            PipelineConfig::from_json_str(&json)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if args.bottom_up {
        config.row_order = RowOrder::BottomUp;
    }
    config.display.show_first_pass |= args.show_first_pass;
    config.display.show_second_pass |= args.show_second_pass;
    config.display.show_contour |= args.show_contour;
    config.validate()?;
    Ok(config)
}

fn load_rgb(path: &Path) -> Result<image::RgbImage> {
    Ok(image::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .to_rgb8())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // --- 1. Argument Parsing & Setup ---
    let args = Args::parse();
    let config = load_config(&args)?;
    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    // --- 2. Calibration ---
    let calibration_path = args.calibration.as_ref().unwrap_or(&args.frames[0]);
    let calibration_frame = load_rgb(calibration_path)?;
    let samples = args.region.sample(&calibration_frame)?;
    info!(
        path = %calibration_path.display(),
        colors = samples.len(),
        "sampled calibration patch"
    );

    // --- 3. Pipeline Initialization ---
    let row_order = config.row_order;
    let pipeline = SegmentationPipeline::new(config, &samples)
        .context("calibration patch is not usable; move it over the hand")?;
    let worker = PipelineWorker::spawn(pipeline, 4);

    // --- 4. Main Processing Loop ---
    let mut successful_frames = 0;
    for path in &args.frames {
        let frame = load_rgb(path)?;
        let report = worker.process_frame(frame).await?;
        let fingers = overlay::finger_count(&report.fingertips);

        if args.expect_fingers.is_some_and(|n| n as usize == report.fingertips.len()) {
            successful_frames += 1;
        }

        // --- 5. Reporting ---
        let name = path.display().to_string();
        if args.json {
            let output = FrameOutput {
                frame: &name,
                finger_count: fingers,
                summary: report.summary(),
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            println!(
                "{name}: {fingers} finger(s){}",
                if report.closed_fist { " (closed fist)" } else { "" }
            );
        }

        // --- 6. Visualization ---
        if let Some(dir) = &args.output_dir {
            let mut annotated = report.frame;
            overlay::draw_hand_model(&mut annotated, &report.hand, &report.fingertips, row_order);
            let file_name = path
                .file_name()
                .with_context(|| format!("{} has no file name", path.display()))?;
            let target = dir.join(file_name).with_extension("png");
            annotated
                .save(&target)
                .with_context(|| format!("writing {}", target.display()))?;
        }
    }

    worker.shutdown().await?;

    // --- 7. Finger Accuracy ---
    if args.expect_fingers.is_some() {
        let frames_tested = args.frames.len();
        let accuracy = Accuracy {
            frames_tested,
            successful_frames,
            percentage: successful_frames as f64 / frames_tested as f64 * 100.0,
        };
        if args.json {
            println!("{}", serde_json::to_string(&accuracy)?);
        } else {
            println!(
                "--- Results ---\nFrames tested: {}\nSuccessful frames: {}\nPercentage successful: {:.1}",
                accuracy.frames_tested, accuracy.successful_frames, accuracy.percentage
            );
        }
    }

    Ok(())
}
