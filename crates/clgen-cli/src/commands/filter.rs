use crate::cli::FilterArgs;
use crate::config::PartialInputConfig;
use crate::error::{CliError, Result};
use clgen::core::io::traits::DataFile;
use clgen::core::models::frame::ConfigurationSet;
use tracing::{info, warn};

pub fn run(args: FilterArgs) -> Result<()> {
    let partial_config = PartialInputConfig::from_file(&args.config)?;
    let filters = partial_config.build_filters();
    if filters.is_empty() {
        warn!("No [[filters]] configured; every frame will be kept.");
    }

    info!("Loading configurations from {:?}", &args.input);
    let confs = ConfigurationSet::read_from_path(&args.input)
        .map_err(|e| CliError::configuration_set(args.input.clone(), e))?;

    let kept = filters.check(&confs);
    kept.write_to_path(&args.output)
        .map_err(|e| CliError::configuration_set(args.output.clone(), e))?;

    println!(
        "Kept {} of {} frames, written to: {}",
        kept.len(),
        confs.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use clgen::core::models::frame::Frame;
    use nalgebra::{Matrix3, Point3};
    use tempfile::tempdir;

    fn dimer(separation: f64) -> Frame {
        Frame::new(
            vec![Point3::origin(), Point3::new(separation, 0.0, 0.0)],
            Matrix3::from_diagonal_element(10.0),
            vec![0, 0],
        )
    }

    #[test]
    fn drops_frames_with_overlapping_atoms() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("input.toml");
        let input = dir.path().join("confs.json");
        let output = dir.path().join("kept.json");
        std::fs::write(&config, "[[filters]]\ntype = \"distance\"\n").unwrap();

        let mut confs = ConfigurationSet::new(vec!["O".to_string()]);
        confs.push(dimer(1.2));
        confs.push(dimer(0.2));
        confs.push(dimer(3.0));
        confs.write_to_path(&input).unwrap();

        let cli = Cli::parse_from([
            "clgen",
            "filter",
            "-c",
            config.to_str().unwrap(),
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        let Commands::Filter(args) = cli.command else {
            panic!("Expected filter subcommand");
        };
        run(args).unwrap();

        let kept = ConfigurationSet::read_from_path(&output).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.frames[0], confs.frames[0]);
        assert_eq!(kept.frames[1], confs.frames[2]);
    }

    #[test]
    fn missing_input_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("input.toml");
        std::fs::write(&config, "").unwrap();
        let args = FilterArgs {
            config,
            input: dir.path().join("missing.json"),
            output: dir.path().join("out.json"),
        };
        assert!(matches!(run(args), Err(CliError::FileParsing { .. })));
    }
}
