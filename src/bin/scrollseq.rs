use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use scrollseq::{
    CpuSurface, ElementBox, FrameEngine, FsFetcher, LayoutSample, Loader, SequenceConfig,
    StaticLayoutHost,
};

#[derive(Parser, Debug)]
#[command(name = "scrollseq", version)]
struct Cli {
    /// Log verbosity written to stderr. `RUST_LOG`, when set, takes precedence.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame shown at one scroll offset as a PNG.
    Frame(FrameArgs),
    /// Render evenly spaced scroll offsets across the whole range, one PNG per step.
    Scrub(ScrubArgs),
    /// Print the sequence length and offset -> frame table as JSON.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Sequence config JSON. Frame URLs resolve relative to its directory.
    #[arg(long)]
    config: PathBuf,

    /// Surface size in CSS pixels, as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size)]
    surface: (f64, f64),

    /// Height of the scene element in CSS pixels.
    #[arg(long)]
    scene_height: f64,

    /// Device pixels per CSS pixel.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Loader worker threads (default: one per core).
    #[arg(long)]
    threads: Option<usize>,

    /// Seconds to wait for frame loads before drawing with whatever arrived.
    #[arg(long, default_value_t = 60)]
    load_timeout: u64,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Scroll offset in CSS pixels.
    #[arg(long)]
    scroll: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ScrubArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of offsets to render.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    steps: u32,

    /// Output directory for `step_NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Sequence config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Height of the scene element in CSS pixels.
    #[arg(long)]
    scene_height: f64,

    /// Number of evenly spaced offsets in the table.
    #[arg(long, default_value_t = 11, value_parser = clap::value_parser!(u32).range(2..))]
    samples: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn log_filter(level: LogLevel) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.directive()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Scrub(args) => cmd_scrub(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| -> Result<f64, String> {
        let n: f64 = v
            .trim()
            .parse()
            .map_err(|e| format!("invalid dimension '{v}': {e}"))?;
        if !n.is_finite() || n <= 0.0 {
            return Err(format!("dimension must be > 0, got '{v}'"));
        }
        Ok(n)
    };
    Ok((parse(w)?, parse(h)?))
}

fn scene_host(
    config: &SequenceConfig,
    surface: (f64, f64),
    scene_height: f64,
) -> StaticLayoutHost {
    StaticLayoutHost::new()
        .with_element(
            config.surface_selector.clone(),
            ElementBox::new(surface.0, surface.1),
        )
        .with_element(
            config.scene_selector.clone(),
            ElementBox::new(surface.0, scene_height),
        )
}

/// Load every frame, then attach the engine to a fresh CPU surface.
fn prepare(args: &SceneArgs) -> anyhow::Result<(FrameEngine, CpuSurface)> {
    let config = SequenceConfig::from_json_path(&args.config)?;
    let root = args.config.parent().unwrap_or_else(|| Path::new("."));
    let host = scene_host(&config, args.surface, args.scene_height)
        .with_device_pixel_ratio(args.dpr);

    let mut engine = FrameEngine::new(config)?;
    let loader = Loader::new(args.threads)?;
    engine.start_loading(&loader, Arc::new(FsFetcher::new(root)))?;
    let report = engine.wait_for_loads(Duration::from_secs(args.load_timeout));
    let p = report.progress;
    eprintln!("loaded {}/{} frames ({} failed)", p.loaded, p.total, p.failed);

    let mut surface = CpuSurface::new();
    engine.attach(&host, &mut surface);
    if engine.layout().is_none() {
        anyhow::bail!(
            "could not lay out a {}x{} surface",
            args.surface.0,
            args.surface.1
        );
    }
    Ok((engine, surface))
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir '{}'", dir.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (mut engine, mut surface) = prepare(&args.scene)?;
    engine.on_scroll(args.scroll, &mut surface);

    if let Some(parent) = args.out.parent() {
        ensure_dir(parent)?;
    }
    surface.save_png(&args.out)?;

    let index = engine
        .current_frame_index()
        .map_or_else(|| "none".to_string(), |i| i.to_string());
    eprintln!("wrote {} (frame {index})", args.out.display());
    Ok(())
}

fn cmd_scrub(args: ScrubArgs) -> anyhow::Result<()> {
    let (mut engine, mut surface) = prepare(&args.scene)?;
    let layout = *engine.layout().context("engine has no layout after attach")?;
    ensure_dir(&args.out_dir)?;

    for (step, offset) in scrub_offsets(&layout, args.steps).into_iter().enumerate() {
        engine.on_scroll(offset, &mut surface);
        let out = args.out_dir.join(format!("step_{step:04}.png"));
        surface.save_png(&out)?;
        tracing::info!(step, offset, frame = ?engine.current_frame_index(), "wrote step");
    }

    let stats = engine.stats();
    eprintln!(
        "wrote {} steps to {} ({} draws, {} clears, {} skipped)",
        args.steps,
        args.out_dir.display(),
        stats.draws,
        stats.clears,
        stats.skipped
    );
    Ok(())
}

/// `steps` offsets from the start of the range up to (not including) its end.
fn scrub_offsets(layout: &LayoutSample, steps: u32) -> Vec<f64> {
    let span = layout.animation_distance;
    (0..steps)
        .map(|i| span * f64::from(i) / f64::from(steps))
        .collect()
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let config = SequenceConfig::from_json_path(&args.config)?;
    let host = scene_host(&config, (1.0, 1.0), args.scene_height);
    let layout = scrollseq::sample(&host, &config)?;
    let len = config.sequence_len();

    let last = f64::from(args.samples - 1);
    let table: Vec<_> = (0..args.samples)
        .map(|i| {
            let offset = layout.animation_distance * f64::from(i) / last;
            serde_json::json!({
                "offset": offset,
                "index": scrollseq::frame_index(offset, &layout, len),
            })
        })
        .collect();

    let out = serde_json::json!({
        "forward_len": config.forward_len(),
        "sequence_len": len,
        "concat_reverse": config.concat_reverse,
        "animation_distance": layout.animation_distance,
        "padding_start": layout.padding_start,
        "table": table,
    });
    let text = serde_json::to_string_pretty(&out).context("serialize inspect output")?;
    println!("{text}");
    Ok(())
}
