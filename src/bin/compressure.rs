use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "compressure", version)]
struct Cli {
    /// More log output: `-v` for debug, `-vv` for trace. Default is info.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty manifest.
    Init(StorageArgs),
    /// Transcode, slice, sequence and concatenate two sources (requires `ffmpeg` on PATH).
    Run(RunArgs),
    /// List artifacts recorded in the manifest.
    Manifest(StorageArgs),
}

#[derive(Args, Debug)]
struct StorageArgs {
    /// Manifest JSON path.
    #[arg(long, default_value = compressure::DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Directory for transcoded videos and slices.
    #[arg(long, default_value = compressure::DEFAULT_WORKDIR)]
    workdir: PathBuf,
}

impl StorageArgs {
    fn into_config(self) -> compressure::StorageConfig {
        compressure::StorageConfig {
            manifest_path: self.manifest,
            workdir: self.workdir,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Source played forward.
    #[arg(short, long)]
    forward: PathBuf,

    /// Source played backward.
    #[arg(short, long)]
    backward: PathBuf,

    /// Frames per superframe slice.
    #[arg(long, default_value_t = compressure::DEFAULT_SUPERFRAME_SIZE)]
    superframe_size: u32,

    /// Timeline frequency.
    #[arg(long, default_value_t = compressure::DEFAULT_FREQUENCY)]
    frequency: f64,

    /// Output length in superframes.
    #[arg(long, default_value_t = compressure::DEFAULT_N_SUPERFRAMES)]
    n_superframes: usize,

    /// Timeline waveform (`sinusoid` or `compound-sinusoid`).
    #[arg(long, default_value = "sinusoid")]
    waveform: compressure::Waveform,

    /// Output video path.
    #[arg(short, long, default_value = compressure::DEFAULT_OUT_PATH)]
    out: PathBuf,

    /// Keyframe interval for the transcode.
    #[arg(short, long, default_value_t = compressure::DEFAULT_GOP_SIZE)]
    gop_size: u32,

    /// Encoder name.
    #[arg(long, default_value = compressure::DEFAULT_ENCODER)]
    encoder: String,

    /// Encoder option overrides as alternating keys and values.
    #[arg(long, num_args = 1.., value_name = "KEY VALUE")]
    encoder_config: Vec<String>,

    /// Print the resolved run configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,

    #[command(flatten)]
    storage: StorageArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Run(args) => cmd_run(args),
        Command::Manifest(args) => cmd_manifest(args),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::INFO,
        (false, 1) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_init(args: StorageArgs) -> anyhow::Result<()> {
    let store = compressure::ManifestStore::create(&args.manifest)?;
    println!("created manifest {}", store.path().display());
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let encoder = compressure::EncoderConfig::from_user_options(
        &args.encoder,
        args.encoder_config.as_slice(),
    )?;
    let config = compressure::RunConfig {
        forward: args.forward,
        backward: args.backward,
        superframe_size: args.superframe_size,
        frequency: args.frequency,
        n_superframes: args.n_superframes,
        waveform: args.waveform,
        keyframe_interval: args.gop_size,
        encoder,
        out_path: args.out,
        storage: args.storage.into_config(),
    };
    config.validate()?;

    if args.dump_config {
        let json = serde_json::to_string_pretty(&config).context("serialize run config")?;
        println!("{json}");
        return Ok(());
    }

    let mut app = compressure::Compressure::open(config.storage.clone())?;
    let report = app.run(&config)?;

    println!(
        "wrote {} ({} slices, ring of {}, cache {} hit(s) / {} miss(es))",
        report.out_path.display(),
        report.frames.len(),
        report.ring_len,
        report.cache.hits,
        report.cache.misses
    );
    Ok(())
}

fn cmd_manifest(args: StorageArgs) -> anyhow::Result<()> {
    let store = compressure::ManifestStore::load(&args.manifest)?;
    if store.is_empty() {
        println!("{}: no artifacts", store.path().display());
        return Ok(());
    }
    for record in store.records() {
        let slices = if record.slices.is_empty() {
            String::new()
        } else {
            format!(" ({} slices)", record.slices.len())
        };
        println!(
            "{}  {:<9}  {}{}",
            record.fingerprint,
            record.kind.label(),
            record.output_path.display(),
            slices
        );
    }
    Ok(())
}
