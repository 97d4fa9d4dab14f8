use clgen::core::io::artifact::ArtifactError;
use clgen::core::io::binary_file::BinaryFileError;
use clgen::core::io::configuration_set::ConfigurationSetError;
use clgen::exploration::md_settings::MdSettingsError;
use clgen::exploration::report::TrustLevelError;
use clgen::workflow::config::WorkflowConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("MD settings error: {0}")]
    MdSettings(#[from] MdSettingsError),

    #[error("Trust level error: {0}")]
    TrustLevel(#[from] TrustLevelError),

    #[error(transparent)]
    BinaryFile(#[from] BinaryFileError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    WorkflowConfig(#[from] WorkflowConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn configuration_set(path: PathBuf, source: ConfigurationSetError) -> Self {
        CliError::FileParsing {
            path,
            source: source.into(),
        }
    }
}
