use crate::cli::WorkflowArgs;
use crate::config::PartialInputConfig;
use crate::error::{CliError, Result};
use clgen::workflow::config::{WorkflowConfig, WorkflowSettings};
use std::path::Path;
use tracing::{debug, info, warn};

fn load_settings(path: &Path) -> Result<WorkflowSettings> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(WorkflowSettings::from_path(path)?)
    } else {
        Ok(PartialInputConfig::from_file(path)?.workflow_settings())
    }
}

pub fn run(args: WorkflowArgs) -> Result<()> {
    let settings = load_settings(&args.config)?;
    let config = WorkflowConfig::from_settings(&settings);
    info!(
        "Resolved {} general and {} storage settings.",
        config.general().len(),
        config.storage().len()
    );

    if config.host().is_none() {
        warn!("No workflow `host` configured.");
    }
    if config.bucket_name().is_none() {
        debug!("No storage `bucket_name` configured.");
    }

    let shown = if args.show_secrets {
        config
    } else {
        config.redacted()
    };
    let json = serde_json::to_string_pretty(&shown)
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to render configuration: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SETTINGS: &str = r#"
        [workflow_config]
        host = "https://127.0.0.1:2746"
        token = "abc"
        s3_endpoint = "127.0.0.1:9000"
        s3_secret_key = "hidden"

        [workflow_s3_config]
        bucket_name = "clgen"
    "#;

    #[test]
    fn toml_input_routes_storage_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.toml");
        std::fs::write(&path, SETTINGS).unwrap();

        let config = WorkflowConfig::from_settings(&load_settings(&path).unwrap());
        assert_eq!(config.host(), Some("https://127.0.0.1:2746"));
        assert_eq!(config.storage_endpoint(), Some("127.0.0.1:9000"));
        assert_eq!(config.secret_key(), Some("hidden"));
        assert_eq!(config.bucket_name(), Some("clgen"));
        assert!(!config.general().contains_key("s3_endpoint"));
    }

    #[test]
    fn json_input_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"workflow_config": {"namespace": "argo", "s3_access_key": "k"}}"#,
        )
        .unwrap();

        let config = WorkflowConfig::from_settings(&load_settings(&path).unwrap());
        assert_eq!(config.namespace(), Some("argo"));
        assert_eq!(config.access_key(), Some("k"));
    }

    #[test]
    fn unknown_sections_in_toml_input_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.toml");
        std::fs::write(&path, "[workflow]\nhost = \"x\"\n").unwrap();
        assert!(matches!(
            load_settings(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn run_succeeds_with_and_without_secrets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.toml");
        std::fs::write(&path, SETTINGS).unwrap();
        for show_secrets in [false, true] {
            let args = WorkflowArgs {
                config: path.clone(),
                show_secrets,
            };
            assert!(run(args).is_ok());
        }
    }
}
