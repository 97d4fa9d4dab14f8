pub mod defaults;

use crate::error::{CliError, Result};
use clgen::exploration::filter::{
    BoxLengthFilter, BoxSkewnessConfFilter, ConfFilters, DistanceConfFilter,
};
use clgen::exploration::md_settings::{Ensemble, MdSettings, MdSettingsBuilder};
use clgen::exploration::report::{CandidateSelection, ExplorationReportTrustLevels, TrustLevels};
use clgen::workflow::config::{ConfigMap, WorkflowSettings};
use defaults::DefaultsConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialMdConfig {
    ensemble: Option<String>,
    dt: Option<f64>,
    nsteps: Option<u64>,
    #[serde(rename = "trj-freq")]
    trj_freq: Option<u64>,
    temps: Option<Vec<f64>>,
    press: Option<Vec<f64>>,
    #[serde(rename = "tau-t")]
    tau_t: Option<f64>,
    #[serde(rename = "tau-p")]
    tau_p: Option<f64>,
    #[serde(rename = "pka-e")]
    pka_e: Option<f64>,
    neidelay: Option<u32>,
    #[serde(rename = "no-pbc")]
    no_pbc: Option<bool>,
    #[serde(rename = "use-clusters")]
    use_clusters: Option<bool>,
    #[serde(rename = "relative-epsilon")]
    relative_epsilon: Option<f64>,
    #[serde(rename = "relative-v-epsilon")]
    relative_v_epsilon: Option<f64>,
    #[serde(rename = "ele-temp-f")]
    ele_temp_f: Option<f64>,
    #[serde(rename = "ele-temp-a")]
    ele_temp_a: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialTrustLevels {
    #[serde(rename = "level-f-lo")]
    level_f_lo: Option<f64>,
    #[serde(rename = "level-f-hi")]
    level_f_hi: Option<f64>,
    #[serde(rename = "level-v-lo")]
    level_v_lo: Option<f64>,
    #[serde(rename = "level-v-hi")]
    level_v_hi: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialExplorationConfig {
    #[serde(rename = "conv-accuracy")]
    conv_accuracy: Option<f64>,
    #[serde(rename = "max-candidates")]
    max_candidates: Option<usize>,
    #[serde(rename = "trust-levels")]
    trust_levels: Option<PartialTrustLevels>,
    selection: Option<CandidateSelection>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialFilterConfig {
    Distance {
        #[serde(rename = "custom-safe-dist", default)]
        custom_safe_dist: HashMap<String, f64>,
        #[serde(rename = "safe-dist-ratio")]
        safe_dist_ratio: Option<f64>,
    },
    BoxSkewness {
        theta: Option<f64>,
    },
    BoxLength {
        #[serde(rename = "length-ratio")]
        length_ratio: Option<f64>,
    },
}

/// Everything needed to drive one exploration stage, as read from the input file.
#[derive(Debug, Clone)]
pub struct ReportSetup {
    pub report: ExplorationReportTrustLevels,
    pub max_candidates: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialInputConfig {
    md: Option<PartialMdConfig>,
    exploration: Option<PartialExplorationConfig>,
    #[serde(default)]
    filters: Vec<PartialFilterConfig>,
    workflow_config: Option<ConfigMap>,
    workflow_s3_config: Option<ConfigMap>,
}

impl PartialInputConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn build_md_settings(&self) -> Result<MdSettings> {
        let md = self
            .md
            .as_ref()
            .ok_or_else(|| CliError::Config("`md` section is required.".to_string()))?;
        let ensemble_name = md
            .ensemble
            .as_deref()
            .ok_or_else(|| CliError::Config("`md.ensemble` is required.".to_string()))?;

        let mut builder = MdSettingsBuilder::new().ensemble(Ensemble::from_str(ensemble_name)?);
        if let Some(dt) = md.dt {
            builder = builder.dt(dt);
        }
        if let Some(nsteps) = md.nsteps {
            builder = builder.nsteps(nsteps);
        }
        if let Some(freq) = md.trj_freq {
            builder = builder.trj_freq(freq);
        }
        if let Some(temps) = md.temps.clone() {
            builder = builder.temps(temps);
        }
        if let Some(press) = md.press.clone() {
            builder = builder.press(press);
        }
        if let Some(tau) = md.tau_t {
            builder = builder.tau_t(tau);
        }
        if let Some(tau) = md.tau_p {
            builder = builder.tau_p(tau);
        }
        if let Some(energy) = md.pka_e {
            builder = builder.pka_e(energy);
        }
        if let Some(delay) = md.neidelay {
            builder = builder.neidelay(delay);
        }
        if let Some(eps) = md.relative_epsilon {
            builder = builder.relative_epsilon(eps);
        }
        if let Some(eps) = md.relative_v_epsilon {
            builder = builder.relative_v_epsilon(eps);
        }
        if let Some(temp) = md.ele_temp_f {
            builder = builder.ele_temp_f(temp);
        }
        if let Some(temp) = md.ele_temp_a {
            builder = builder.ele_temp_a(temp);
        }
        builder = builder
            .no_pbc(md.no_pbc.unwrap_or(false))
            .use_clusters(md.use_clusters.unwrap_or(false));

        Ok(builder.build()?)
    }

    /// Builds the trust-level report; CLI values take precedence over the file.
    pub fn build_report(
        &self,
        cli_max_candidates: Option<usize>,
        cli_conv_accuracy: Option<f64>,
    ) -> Result<ReportSetup> {
        let defaults = DefaultsConfig::default();
        let exploration = self.exploration.clone().unwrap_or_default();
        let partial_levels = exploration.trust_levels.ok_or_else(|| {
            CliError::Config("`exploration.trust-levels` section is required.".to_string())
        })?;

        let level_f_lo = partial_levels.level_f_lo.ok_or_else(|| {
            CliError::Config("`exploration.trust-levels.level-f-lo` is required.".to_string())
        })?;
        let level_f_hi = partial_levels.level_f_hi.ok_or_else(|| {
            CliError::Config("`exploration.trust-levels.level-f-hi` is required.".to_string())
        })?;
        let mut trust_levels = TrustLevels::new(level_f_lo, level_f_hi)?;
        trust_levels = match (partial_levels.level_v_lo, partial_levels.level_v_hi) {
            (Some(lo), Some(hi)) => trust_levels.with_virial(lo, hi)?,
            (None, None) => trust_levels,
            _ => {
                return Err(CliError::Config(
                    "`level-v-lo` and `level-v-hi` must be given together.".to_string(),
                ));
            }
        };

        let conv_accuracy = cli_conv_accuracy
            .or(exploration.conv_accuracy)
            .unwrap_or(defaults.conv_accuracy);
        let selection = exploration.selection.unwrap_or(defaults.selection);
        let report = ExplorationReportTrustLevels::new(trust_levels, conv_accuracy, selection)?;

        Ok(ReportSetup {
            report,
            max_candidates: cli_max_candidates.or(exploration.max_candidates),
        })
    }

    pub fn build_filters(&self) -> ConfFilters {
        let defaults = DefaultsConfig::default();
        let mut filters = ConfFilters::new();
        for partial in &self.filters {
            match partial.clone() {
                PartialFilterConfig::Distance {
                    custom_safe_dist,
                    safe_dist_ratio,
                } => {
                    filters.add(DistanceConfFilter::new(
                        custom_safe_dist,
                        safe_dist_ratio.unwrap_or(defaults.safe_dist_ratio),
                    ));
                }
                PartialFilterConfig::BoxSkewness { theta } => {
                    filters.add(BoxSkewnessConfFilter::new(
                        theta.unwrap_or(defaults.skewness_theta),
                    ));
                }
                PartialFilterConfig::BoxLength { length_ratio } => {
                    filters.add(BoxLengthFilter::new(
                        length_ratio.unwrap_or(defaults.length_ratio),
                    ));
                }
            }
        }
        debug!("Built {} configuration filters.", filters.len());
        filters
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            workflow_config: self.workflow_config.clone(),
            workflow_s3_config: self.workflow_s3_config.clone(),
        }
    }

    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "md.ensemble" => {
                    self.md.get_or_insert_with(Default::default).ensemble =
                        Some(value_str.to_string());
                }
                "md.dt" => {
                    self.md.get_or_insert_with(Default::default).dt =
                        Some(parse_value(key, value_str)?);
                }
                "md.nsteps" => {
                    self.md.get_or_insert_with(Default::default).nsteps =
                        Some(parse_value(key, value_str)?);
                }
                "md.trj-freq" => {
                    self.md.get_or_insert_with(Default::default).trj_freq =
                        Some(parse_value(key, value_str)?);
                }
                "exploration.conv-accuracy" => {
                    self.exploration
                        .get_or_insert_with(Default::default)
                        .conv_accuracy = Some(parse_value(key, value_str)?);
                }
                "exploration.max-candidates" => {
                    self.exploration
                        .get_or_insert_with(Default::default)
                        .max_candidates = Some(parse_value(key, value_str)?);
                }
                "exploration.trust-levels.level-f-lo" => {
                    self.trust_levels_mut().level_f_lo = Some(parse_value(key, value_str)?);
                }
                "exploration.trust-levels.level-f-hi" => {
                    self.trust_levels_mut().level_f_hi = Some(parse_value(key, value_str)?);
                }
                "exploration.trust-levels.level-v-lo" => {
                    self.trust_levels_mut().level_v_lo = Some(parse_value(key, value_str)?);
                }
                "exploration.trust-levels.level-v-hi" => {
                    self.trust_levels_mut().level_v_hi = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn trust_levels_mut(&mut self) -> &mut PartialTrustLevels {
        self.exploration
            .get_or_insert_with(Default::default)
            .trust_levels
            .get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}
