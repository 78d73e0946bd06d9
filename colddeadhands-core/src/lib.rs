use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub mod assign;
pub mod balanced;
pub mod data;
pub mod directives;
pub mod generate;
pub mod hotfix;
pub mod number;
pub mod rarity;
pub mod template;

#[cfg(test)]
mod property_tests;

pub use data::GameData;
pub use generate::{generate, GeneratedMod, Templates};
pub use template::TemplateError;

pub const MOD_NAME: &str = "BL2 Cold Dead Hands";
pub const MOD_VERSION: &str = "1.0.0-prerelease";

/// Name of the generated mod file.
pub fn output_file_name() -> String {
    format!("{}-source.txt", MOD_NAME)
}

pub const DEBUG_LOG_NAME: &str = "generation_log.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub data_path: PathBuf,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub debug: bool,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("template {template}: {source}")]
    Template {
        template: String,
        #[source]
        source: TemplateError,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("hotfix '{0}' registered twice")]
    DuplicateDirective(String),
    #[error("no hotfix named '{0}'")]
    UnknownDirective(String),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

pub fn run(settings: GeneratorSettings) -> Result<()> {
    for (what, path) in [
        ("Data", &settings.data_path),
        ("Template", &settings.template_path),
    ] {
        if !path.is_dir() {
            return Err(GeneratorError::Config(format!(
                "{} directory does not exist: {}",
                what,
                path.display()
            )));
        }
    }

    info!(path = %settings.data_path.display(), "Loading data tables");
    let data = GameData::load(&settings.data_path)?;
    let templates = Templates::load(&settings.template_path)?;

    // Render everything before touching the output so a failure never leaves
    // a partial mod file behind.
    let generated = generate(&data, &templates)?;

    if !settings.output_path.exists() {
        fs::create_dir_all(&settings.output_path)?;
    }
    let out_file = settings.output_path.join(output_file_name());
    fs::write(&out_file, &generated.text)?;
    info!("Wrote mod file to: {}", out_file.display());

    if settings.debug {
        let log_path = settings.output_path.join(DEBUG_LOG_NAME);
        fs::write(&log_path, &generated.report)?;
        info!("Wrote generation log to: {}", log_path.display());
    }

    Ok(())
}
