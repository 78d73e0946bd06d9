use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use colddeadhands_core::{run, GeneratorSettings};

#[derive(Debug, Parser)]
#[command(
    name = "ColdDeadHands-CLI",
    version,
    about = "Generates the BL2 Cold Dead Hands mod file"
)]
struct Args {
    /// Directory holding the JSON data tables.
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// Directory holding rarity.txt, bosses.txt and mod.txt.
    #[arg(long, default_value = "templates")]
    templates: PathBuf,

    /// Directory the mod file is written to.
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Also write a generation log next to the mod file.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG` when it is set and parses, otherwise `info`.
fn env_filter(var: Option<&str>) -> EnvFilter {
    var.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings = GeneratorSettings {
        data_path: args.data,
        template_path: args.templates,
        output_path: args.output,
        debug: args.debug,
    };

    debug!(?settings, "Starting generation");
    if let Err(err) = run(settings) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
