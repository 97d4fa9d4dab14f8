use crate::cli::ReportArgs;
use crate::config::PartialInputConfig;
use crate::error::{CliError, Result};
use crate::progress::file_progress_bar;
use clgen::core::io::artifact::dump_object_to_file;
use clgen::core::io::traits::DataFile;
use clgen::core::models::model_devi::ModelDevi;
use clgen::exploration::report::ExplorationReport;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct TrajectoryCandidates {
    model_devi: PathBuf,
    frames: Vec<usize>,
}

/// What `report -o` writes: the summary plus the picked frames per trajectory.
#[derive(Debug, Serialize)]
struct ReportSummary {
    converged: bool,
    num_frames: usize,
    accurate_ratio: f64,
    candidate_ratio: f64,
    failed_ratio: f64,
    candidates: Vec<TrajectoryCandidates>,
}

fn read_model_devis(paths: &[PathBuf]) -> Result<Vec<ModelDevi>> {
    let pb = file_progress_bar(paths.len() as u64, "Parsing model deviations");
    let parsed = paths
        .par_iter()
        .map(|path| {
            let devi = ModelDevi::read_from_path(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            });
            pb.inc(1);
            devi
        })
        .collect::<Result<Vec<_>>>();
    pb.finish_and_clear();
    parsed
}

fn write_summary(path: &Path, summary: &ReportSummary) -> Result<()> {
    dump_object_to_file(summary, path)?;
    println!("Candidate selection written to: {}", path.display());
    Ok(())
}

pub fn run(args: ReportArgs) -> Result<()> {
    let mut partial_config = PartialInputConfig::from_file(&args.config)?;
    partial_config.apply_set_values(&args.set_values)?;
    let setup = partial_config.build_report(args.max_candidates, args.conv_accuracy)?;
    let mut report = setup.report;

    info!("Reading {} model-deviation file(s)...", args.model_devi.len());
    let model_devis = read_model_devis(&args.model_devi)?;
    for (path, devi) in args.model_devi.iter().zip(&model_devis) {
        if devi.is_empty() {
            warn!("{:?} holds no frames.", path);
        }
    }
    report.record(&model_devis)?;

    println!("{}", report.print_header());
    println!(
        "{}",
        report.print(args.stage, args.stage_index, args.iteration)
    );

    let converged = report.converged();
    info!(
        "{} frames: {} accurate, {} candidate, {} failed.",
        report.num_frames(),
        report.num_accurate(),
        report.num_candidates(),
        report.num_failed()
    );
    if converged {
        println!("Exploration converged.");
    } else if report.no_candidate() {
        warn!("Exploration is not converged but no candidate was found.");
        println!("Exploration not converged; no candidates found.");
    } else {
        println!("Exploration not converged.");
    }

    let candidate_ids = report.get_candidate_ids(setup.max_candidates);
    let num_selected: usize = candidate_ids.iter().map(Vec::len).sum();
    println!(
        "Selected {} of {} candidate frame(s).",
        num_selected,
        report.num_candidates()
    );

    if let Some(output) = &args.output {
        let summary = ReportSummary {
            converged,
            num_frames: report.num_frames(),
            accurate_ratio: report.accurate_ratio(),
            candidate_ratio: report.candidate_ratio(),
            failed_ratio: report.failed_ratio(),
            candidates: args
                .model_devi
                .iter()
                .cloned()
                .zip(candidate_ids)
                .map(|(model_devi, frames)| TrajectoryCandidates { model_devi, frames })
                .collect(),
        };
        write_summary(output, &summary)?;
    }
    Ok(())
}
