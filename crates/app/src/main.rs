mod pipeline;

use clap::Parser;
use std::path::PathBuf;

use nv_flow::KvConfig;

#[derive(Parser, Debug)]
#[command(name = "navrx")]
#[command(about = "GNSS SDR front end: configuration-driven signal conditioning")]
struct Cli {
    /// Receiver configuration file (key=value lines, # comments)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Input IQ capture file (little-endian, layout per configured item type)
    #[arg(short = 'f', long)]
    file: PathBuf,

    /// Write the conditioned stream to this file
    #[arg(short = 'w', long)]
    write: Option<PathBuf>,

    /// Configuration role prefix for the conditioning stage
    #[arg(long, default_value = "SignalConditioner")]
    role: String,

    /// Print statistics
    #[arg(long)]
    stats: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => match KvConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => KvConfig::new(),
    };

    if cli.verbose {
        log::info!("navrx starting");
        log::info!("conditioner role: {}", cli.role);
        log::info!("input: {}", cli.file.display());
    }

    if let Err(e) = pipeline::run_file(
        &config,
        &cli.role,
        &cli.file,
        cli.write.as_deref(),
        cli.stats,
    ) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
