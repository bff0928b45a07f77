use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use glyphform::{
    Dimensions, Engine, EngineConfig, Painter, PerformanceMode, RasterPainter, TextPainter,
    TickOutcome, sampler,
};

#[derive(Parser, Debug)]
#[command(name = "glyphform", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animation state at a single point in time as text.
    Frame(FrameArgs),
    /// Render a full reveal cycle as numbered text or PNG frames.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image (PNG, JPEG, WebP, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Point in the timeline, in milliseconds since animation start.
    #[arg(long)]
    at_ms: u64,

    /// Grid width in cells.
    #[arg(long, default_value_t = 60)]
    width: u32,

    /// Grid height in cells.
    #[arg(long, default_value_t = 45)]
    height: u32,

    /// Seed for the stochastic phase rules.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Performance mode (governs the simulated frame rate).
    #[arg(long, value_enum, default_value_t = PerformanceMode::Balanced)]
    mode: PerformanceMode,

    /// Engine configuration JSON; takes precedence over the grid/seed/mode
    /// flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image (PNG, JPEG, WebP, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for numbered frames.
    #[arg(long)]
    out_dir: PathBuf,

    /// Grid width in cells.
    #[arg(long, default_value_t = 60)]
    width: u32,

    /// Grid height in cells.
    #[arg(long, default_value_t = 45)]
    height: u32,

    /// Font size in pixels (PNG output only).
    #[arg(long, default_value_t = 10.0)]
    font_size: f32,

    /// Seed for the stochastic phase rules.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Performance mode (governs the simulated frame rate).
    #[arg(long, value_enum, default_value_t = PerformanceMode::Balanced)]
    mode: PerformanceMode,

    /// Engine configuration JSON; takes precedence over the grid/seed/mode
    /// flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Monospace TTF/OTF font; when given, frames are rasterized to PNG
    /// instead of text.
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => run_frame(args),
        Command::Render(args) => run_render(args),
    }
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing '{}'", path.display()))
}

fn build_engine(
    in_path: &Path,
    config_path: Option<&Path>,
    width: u32,
    height: u32,
    font_size: f32,
    seed: u64,
    mode: PerformanceMode,
) -> anyhow::Result<Engine> {
    let image = sampler::load_image(in_path)
        .with_context(|| format!("loading '{}'", in_path.display()))?;
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => EngineConfig {
            dimensions: Dimensions::new(width, height, font_size)?,
            performance_mode: mode,
            seed,
            ..EngineConfig::default()
        },
    };
    // The CLI drives exactly one cycle on a simulated clock.
    config.auto_start = true;
    config.looping = false;
    config.responsive = false;
    Ok(Engine::new(image, config)?)
}

fn run_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(
        &args.in_path,
        args.config.as_deref(),
        args.width,
        args.height,
        10.0,
        args.seed,
        args.mode,
    )?;
    let mut painter = TextPainter::new();

    let step = engine.performance_mode().frame_interval();
    let mut now = Duration::ZERO;
    let at = Duration::from_millis(args.at_ms);
    loop {
        engine.tick(now, &mut painter)?;
        if now >= at {
            break;
        }
        now = (now + step).min(at);
    }

    let frame = painter
        .last_frame()
        .context("no frame painted; timeline produced no output")?;
    match args.out {
        Some(path) => {
            fs::write(&path, frame).with_context(|| format!("writing '{}'", path.display()))?
        }
        None => print!("{frame}"),
    }
    Ok(())
}

fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(
        &args.in_path,
        args.config.as_deref(),
        args.width,
        args.height,
        args.font_size,
        args.seed,
        args.mode,
    )?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating '{}'", args.out_dir.display()))?;

    let mut raster = match &args.font {
        Some(font_path) => {
            let bytes = fs::read(font_path)
                .with_context(|| format!("reading font '{}'", font_path.display()))?;
            Some(RasterPainter::from_font_bytes(&bytes)?)
        }
        None => None,
    };
    let mut text = TextPainter::new();

    let step = engine.performance_mode().frame_interval();
    let mut now = Duration::ZERO;
    let mut frame_no = 0u64;
    loop {
        let painter: &mut dyn Painter = match raster.as_mut() {
            Some(r) => r,
            None => &mut text,
        };
        let outcome = engine.tick(now, painter)?;

        if matches!(outcome, TickOutcome::Painted | TickOutcome::Completed) {
            write_frame(&args.out_dir, frame_no, raster.as_ref(), &text)?;
            frame_no += 1;
        }
        if outcome == TickOutcome::Completed {
            break;
        }
        now += step;
    }

    eprintln!("wrote {frame_no} frames to {}", args.out_dir.display());
    Ok(())
}

fn write_frame(
    out_dir: &Path,
    frame_no: u64,
    raster: Option<&RasterPainter>,
    text: &TextPainter,
) -> anyhow::Result<()> {
    match raster {
        Some(r) => {
            let frame = r.frame().context("raster painter produced no frame")?;
            let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
                .context("raster frame has inconsistent dimensions")?;
            let path = out_dir.join(format!("frame_{frame_no:05}.png"));
            img.save(&path)
                .with_context(|| format!("writing '{}'", path.display()))?;
        }
        None => {
            let frame = text.last_frame().context("no text frame painted")?;
            let path = out_dir.join(format!("frame_{frame_no:05}.txt"));
            fs::write(&path, frame).with_context(|| format!("writing '{}'", path.display()))?;
        }
    }
    Ok(())
}
