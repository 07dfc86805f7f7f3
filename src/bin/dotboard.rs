use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use dotboard::{
    AnsiSink, Config, ConfigWatcher, Controller, DisplaySink, NullSink, PngSink, Renderer,
    RunLimits, SvgTextRenderer, SystemClock, write_png,
};

#[derive(Parser, Debug)]
#[command(name = "dotboard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the display loop.
    Run(RunArgs),
    /// Start the configured apps, let them warm up and write one PNG.
    Snapshot(SnapshotArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Configuration JSON. Reloaded when it changes.
    #[arg(long, default_value = Config::DEFAULT_PATH)]
    config: PathBuf,

    /// Where frames go.
    #[arg(long, value_enum, default_value_t = SinkChoice::Ansi)]
    sink: SinkChoice,

    /// Output PNG path for `--sink png`.
    #[arg(long, default_value = "dotboard.png")]
    out: PathBuf,

    /// Seconds between PNG writes for `--sink png`.
    #[arg(long, default_value_t = 1.0)]
    png_interval: f64,

    /// Upper bound on frames per second.
    #[arg(long, default_value_t = 60)]
    max_fps: u32,

    /// Exit after this many frames.
    #[arg(long)]
    frames: Option<u64>,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Configuration JSON.
    #[arg(long, default_value = Config::DEFAULT_PATH)]
    config: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Seconds to run before capturing.
    #[arg(long, default_value_t = 3.0)]
    warmup: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkChoice {
    Ansi,
    Png,
    Null,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Snapshot(args) => cmd_snapshot(args),
    }
}

fn seconds(value: f64, flag: &str) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid --{flag} '{value}'"))
}

fn build_renderer(config: &Config) -> anyhow::Result<Renderer> {
    let text = Arc::new(SvgTextRenderer::new());
    tracing::debug!(faces = text.face_count(), "system fonts loaded");
    Ok(Renderer::new(config, Arc::new(SystemClock), text)?)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config);
    let sink: Box<dyn DisplaySink> = match args.sink {
        SinkChoice::Ansi => Box::new(AnsiSink::stdout()),
        SinkChoice::Png => Box::new(PngSink::new(
            &args.out,
            seconds(args.png_interval, "png-interval")?,
        )),
        SinkChoice::Null => Box::new(NullSink),
    };
    let renderer = build_renderer(&config)?;
    let mut controller = Controller::new(config, renderer, sink, Arc::new(SystemClock))
        .with_watcher(ConfigWatcher::new(&args.config));

    controller.run(RunLimits {
        max_fps: Some(args.max_fps),
        frames: args.frames,
        duration: None,
    })?;
    controller.shutdown();
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let config = Config::try_load(&args.config)?;
    let mut renderer = build_renderer(&config)?;

    let warmup = seconds(args.warmup, "warmup")?;
    let started = std::time::Instant::now();
    let mut frame = renderer.get_frame()?;
    while started.elapsed() < warmup {
        std::thread::sleep(Duration::from_millis(20));
        frame = renderer.get_frame()?;
    }
    renderer.shutdown();

    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
