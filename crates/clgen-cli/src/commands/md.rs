use crate::cli::MdArgs;
use crate::config::PartialInputConfig;
use crate::error::Result;
use tracing::info;

pub fn run(args: MdArgs) -> Result<()> {
    let mut partial_config = PartialInputConfig::from_file(&args.config)?;
    partial_config.apply_set_values(&args.set_values)?;

    let settings = partial_config.build_md_settings()?;
    info!(
        "Built {} settings: {} steps, dumping every {} ({} frames).",
        settings.ens,
        settings.nsteps,
        settings.trj_freq,
        settings.num_dumped_frames()
    );

    let json = settings.to_json_string()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!("MD settings written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use clgen::exploration::md_settings::{Ensemble, MdSettings};
    use tempfile::tempdir;

    #[test]
    fn writes_settings_with_overrides() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("input.toml");
        let output = dir.path().join("md.json");
        std::fs::write(
            &config,
            "[md]\nensemble = \"nvt\"\ndt = 0.001\nnsteps = 100\ntrj-freq = 10\ntemps = [300.0]\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "clgen",
            "md",
            "-c",
            config.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-S",
            "md.nsteps=400",
        ]);
        let Commands::Md(args) = cli.command else {
            panic!("Expected md subcommand");
        };
        run(args).unwrap();

        let settings = MdSettings::from_json_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(settings.ens, Ensemble::Nvt);
        assert_eq!(settings.nsteps, 400);
        assert_eq!(settings.temps, Some(vec![300.0]));
    }
}
