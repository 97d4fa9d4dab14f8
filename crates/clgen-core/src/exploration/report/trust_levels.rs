use super::{ExplorationRatios, ExplorationReport};
use crate::core::models::model_devi::ModelDevi;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error, PartialEq, Clone)]
pub enum TrustLevelError {
    #[error("Trust level '{name}' must be a non-negative number, got {value}")]
    InvalidLevel { name: &'static str, value: f64 },
    #[error("Lower {quantity} trust level {lo} exceeds the upper level {hi}")]
    InvertedLevels {
        quantity: &'static str,
        lo: f64,
        hi: f64,
    },
    #[error("Virial trust levels must be given as a pair (lo and hi)")]
    IncompleteVirialLevels,
    #[error("Convergence accuracy must lie in [0, 1], got {0}")]
    InvalidAccuracy(f64),
    #[error("Trajectory {traj} has {force} force deviations but {virial} virial deviations")]
    LengthMismatch {
        traj: usize,
        force: usize,
        virial: usize,
    },
}

/// Model-deviation thresholds that split frames into accurate, candidate and failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustLevels {
    pub level_f_lo: f64,
    pub level_f_hi: f64,
    pub level_v_lo: Option<f64>,
    pub level_v_hi: Option<f64>,
}

impl TrustLevels {
    pub fn new(level_f_lo: f64, level_f_hi: f64) -> Result<Self, TrustLevelError> {
        let levels = Self {
            level_f_lo,
            level_f_hi,
            level_v_lo: None,
            level_v_hi: None,
        };
        levels.validate()?;
        Ok(levels)
    }

    pub fn with_virial(mut self, level_v_lo: f64, level_v_hi: f64) -> Result<Self, TrustLevelError> {
        self.level_v_lo = Some(level_v_lo);
        self.level_v_hi = Some(level_v_hi);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), TrustLevelError> {
        check_level("level_f_lo", self.level_f_lo)?;
        check_level("level_f_hi", self.level_f_hi)?;
        if self.level_f_lo > self.level_f_hi {
            return Err(TrustLevelError::InvertedLevels {
                quantity: "force",
                lo: self.level_f_lo,
                hi: self.level_f_hi,
            });
        }
        match (self.level_v_lo, self.level_v_hi) {
            (None, None) => Ok(()),
            (Some(lo), Some(hi)) => {
                check_level("level_v_lo", lo)?;
                check_level("level_v_hi", hi)?;
                if lo > hi {
                    return Err(TrustLevelError::InvertedLevels {
                        quantity: "virial",
                        lo,
                        hi,
                    });
                }
                Ok(())
            }
            _ => Err(TrustLevelError::IncompleteVirialLevels),
        }
    }

    fn virial_levels(&self) -> Option<(f64, f64)> {
        self.level_v_lo.zip(self.level_v_hi)
    }
}

fn check_level(name: &'static str, value: f64) -> Result<(), TrustLevelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TrustLevelError::InvalidLevel { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameClass {
    Accurate,
    Candidate,
    Failed,
}

fn classify(devi: f64, lo: f64, hi: f64) -> FrameClass {
    if devi < lo {
        FrameClass::Accurate
    } else if devi < hi {
        FrameClass::Candidate
    } else {
        FrameClass::Failed
    }
}

/// How candidates are picked when more are available than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum CandidateSelection {
    /// Uniformly at random; a fixed seed makes the pick reproducible.
    Random { seed: Option<u64> },
    /// Largest force deviation first.
    MaxDevi,
}

impl Default for CandidateSelection {
    fn default() -> Self {
        CandidateSelection::Random { seed: None }
    }
}

/// Exploration report that classifies frames with force (and optionally
/// virial) trust levels.
///
/// A frame fails if either quantity reaches its upper level, is accurate if
/// both stay below their lower levels, and is a candidate otherwise. Without
/// virial levels or virial data the virial counts as accurate.
#[derive(Debug, Clone)]
pub struct ExplorationReportTrustLevels {
    trust_levels: TrustLevels,
    conv_accuracy: f64,
    selection: CandidateSelection,
    traj_nframes: Vec<usize>,
    traj_accu: Vec<Vec<usize>>,
    traj_fail: Vec<Vec<usize>>,
    // Candidate frame indices paired with their force deviation.
    traj_cand: Vec<Vec<(usize, f64)>>,
}

pub const DEFAULT_CONV_ACCURACY: f64 = 0.9;

impl ExplorationReportTrustLevels {
    pub fn new(
        trust_levels: TrustLevels,
        conv_accuracy: f64,
        selection: CandidateSelection,
    ) -> Result<Self, TrustLevelError> {
        trust_levels.validate()?;
        if !(0.0..=1.0).contains(&conv_accuracy) {
            return Err(TrustLevelError::InvalidAccuracy(conv_accuracy));
        }
        Ok(Self {
            trust_levels,
            conv_accuracy,
            selection,
            traj_nframes: Vec::new(),
            traj_accu: Vec::new(),
            traj_fail: Vec::new(),
            traj_cand: Vec::new(),
        })
    }

    pub fn trust_levels(&self) -> &TrustLevels {
        &self.trust_levels
    }

    /// Forgets every recorded trajectory.
    pub fn clear(&mut self) {
        self.traj_nframes.clear();
        self.traj_accu.clear();
        self.traj_fail.clear();
        self.traj_cand.clear();
    }

    /// Classifies every frame of every trajectory and appends the result.
    ///
    /// Nothing is recorded if any trajectory's force and virial arrays disagree in length.
    #[instrument(skip_all, fields(num_trajs = model_devis.len()))]
    pub fn record(&mut self, model_devis: &[ModelDevi]) -> Result<(), TrustLevelError> {
        for (traj, devi) in model_devis.iter().enumerate() {
            if let Some(virial) = &devi.max_devi_v {
                if virial.len() != devi.max_devi_f.len() {
                    return Err(TrustLevelError::LengthMismatch {
                        traj: self.traj_nframes.len() + traj,
                        force: devi.max_devi_f.len(),
                        virial: virial.len(),
                    });
                }
            }
        }
        for devi in model_devis {
            self.record_one_traj(devi);
        }
        debug!(
            "Recorded {} trajectories, {} frames in total.",
            model_devis.len(),
            self.num_frames()
        );
        Ok(())
    }

    fn record_one_traj(&mut self, devi: &ModelDevi) {
        let (f_lo, f_hi) = (self.trust_levels.level_f_lo, self.trust_levels.level_f_hi);
        let virial = match (self.trust_levels.virial_levels(), &devi.max_devi_v) {
            (Some(levels), Some(values)) => Some((levels, values)),
            (Some(_), None) => {
                debug!("Virial trust levels set but trajectory has no virial deviation.");
                None
            }
            _ => None,
        };

        let mut accu = Vec::new();
        let mut fail = Vec::new();
        let mut cand = Vec::new();
        for (frame, &f) in devi.max_devi_f.iter().enumerate() {
            let f_class = classify(f, f_lo, f_hi);
            let v_class = virial
                .map(|((v_lo, v_hi), values)| classify(values[frame], v_lo, v_hi))
                .unwrap_or(FrameClass::Accurate);

            match (f_class, v_class) {
                (FrameClass::Failed, _) | (_, FrameClass::Failed) => fail.push(frame),
                (FrameClass::Accurate, FrameClass::Accurate) => accu.push(frame),
                _ => cand.push((frame, f)),
            }
        }

        self.traj_nframes.push(devi.num_frames());
        self.traj_accu.push(accu);
        self.traj_fail.push(fail);
        self.traj_cand.push(cand);
    }

    pub fn num_trajs(&self) -> usize {
        self.traj_nframes.len()
    }

    pub fn num_frames(&self) -> usize {
        self.traj_nframes.iter().sum()
    }

    pub fn num_accurate(&self) -> usize {
        self.traj_accu.iter().map(Vec::len).sum()
    }

    pub fn num_failed(&self) -> usize {
        self.traj_fail.iter().map(Vec::len).sum()
    }

    pub fn num_candidates(&self) -> usize {
        self.traj_cand.iter().map(Vec::len).sum()
    }

    /// The stage is converged once the accurate ratio reaches the target accuracy.
    pub fn converged(&self) -> bool {
        self.accurate_ratio() >= self.conv_accuracy
    }

    pub fn no_candidate(&self) -> bool {
        self.num_candidates() == 0
    }

    /// Selects up to `max_nframes` candidates (all when `None`).
    ///
    /// Returns one sorted list of frame indices per recorded trajectory.
    pub fn get_candidate_ids(&self, max_nframes: Option<usize>) -> Vec<Vec<usize>> {
        let mut pool: Vec<(usize, usize, f64)> = self
            .traj_cand
            .iter()
            .enumerate()
            .flat_map(|(traj, cands)| cands.iter().map(move |&(frame, f)| (traj, frame, f)))
            .collect();

        if let Some(max) = max_nframes.filter(|&max| max < pool.len()) {
            match self.selection {
                CandidateSelection::Random { seed } => {
                    let mut rng = match seed {
                        Some(seed) => StdRng::seed_from_u64(seed),
                        None => StdRng::from_entropy(),
                    };
                    pool.shuffle(&mut rng);
                }
                CandidateSelection::MaxDevi => {
                    pool.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
                }
            }
            pool.truncate(max);
        }

        let mut ids = vec![Vec::new(); self.num_trajs()];
        for (traj, frame, _) in pool {
            ids[traj].push(frame);
        }
        for traj_ids in &mut ids {
            traj_ids.sort_unstable();
        }
        ids
    }
}

impl ExplorationReport for ExplorationReportTrustLevels {
    fn ratios(&self) -> ExplorationRatios {
        let total = self.num_frames();
        if total == 0 {
            return ExplorationRatios::default();
        }
        let total = total as f64;
        ExplorationRatios {
            failed: self.num_failed() as f64 / total,
            accurate: self.num_accurate() as f64 / total,
            candidate: self.num_candidates() as f64 / total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn force_report(selection: CandidateSelection) -> ExplorationReportTrustLevels {
        ExplorationReportTrustLevels::new(TrustLevels::new(0.1, 0.3).unwrap(), 0.9, selection)
            .unwrap()
    }

    #[test]
    fn force_classification_respects_boundaries() {
        let mut report = force_report(CandidateSelection::MaxDevi);
        report
            .record(&[ModelDevi::from_force(vec![0.05, 0.1, 0.2, 0.3, 0.5])])
            .unwrap();

        assert_eq!(report.num_accurate(), 1);
        assert_eq!(report.num_candidates(), 2);
        assert_eq!(report.num_failed(), 2);
        assert_eq!(report.get_candidate_ids(None), vec![vec![1, 2]]);
    }

    #[test]
    fn virial_failure_or_candidacy_overrides_accurate_force() {
        let levels = TrustLevels::new(0.1, 0.3).unwrap().with_virial(1.0, 2.0).unwrap();
        let mut report =
            ExplorationReportTrustLevels::new(levels, 0.5, CandidateSelection::MaxDevi).unwrap();
        let devi = ModelDevi::from_force(vec![0.05, 0.05, 0.05, 0.2])
            .with_virial(vec![0.5, 1.5, 2.5, 0.5]);
        report.record(&[devi]).unwrap();

        // Frame 0 accurate, 1 candidate (virial), 2 failed (virial), 3 candidate (force).
        assert_eq!(report.num_accurate(), 1);
        assert_eq!(report.num_failed(), 1);
        assert_eq!(report.get_candidate_ids(None), vec![vec![1, 3]]);
    }

    #[test]
    fn missing_virial_data_counts_as_accurate() {
        let levels = TrustLevels::new(0.1, 0.3).unwrap().with_virial(1.0, 2.0).unwrap();
        let mut report =
            ExplorationReportTrustLevels::new(levels, 0.5, CandidateSelection::MaxDevi).unwrap();
        report.record(&[ModelDevi::from_force(vec![0.0, 0.0])]).unwrap();
        assert_eq!(report.num_accurate(), 2);
    }

    #[test]
    fn ratios_sum_to_one_and_empty_report_is_zero() {
        let mut report = force_report(CandidateSelection::MaxDevi);
        assert_eq!(report.ratios(), ExplorationRatios::default());

        report
            .record(&[
                ModelDevi::from_force(vec![0.0, 0.2, 0.4]),
                ModelDevi::from_force(vec![0.0, 0.0, 0.0, 0.15, 0.9]),
            ])
            .unwrap();
        let r = report.ratios();
        assert!((r.failed + r.accurate + r.candidate - 1.0).abs() < EPS);
        assert!((r.accurate - 4.0 / 8.0).abs() < EPS);
        assert!((r.candidate - 2.0 / 8.0).abs() < EPS);
        assert!((r.failed - 2.0 / 8.0).abs() < EPS);
    }

    #[test]
    fn convergence_follows_accurate_ratio() {
        let mut report = force_report(CandidateSelection::MaxDevi);
        report
            .record(&[ModelDevi::from_force(vec![0.0; 9].into_iter().chain([0.2]).collect())])
            .unwrap();
        assert!(report.converged());
        assert!(!report.no_candidate());

        report.record(&[ModelDevi::from_force(vec![0.5])]).unwrap();
        assert!(!report.converged());
    }

    #[test]
    fn clear_forgets_recorded_trajectories() {
        let mut report = force_report(CandidateSelection::MaxDevi);
        report.record(&[ModelDevi::from_force(vec![0.2, 0.2])]).unwrap();
        report.clear();
        assert_eq!(report.num_trajs(), 0);
        assert!(report.no_candidate());
        assert!(report.get_candidate_ids(Some(5)).is_empty());
    }

    #[test]
    fn max_devi_selection_prefers_largest_deviation() {
        let mut report = force_report(CandidateSelection::MaxDevi);
        report
            .record(&[
                ModelDevi::from_force(vec![0.11, 0.25, 0.12]),
                ModelDevi::from_force(vec![0.29, 0.15]),
            ])
            .unwrap();
        let ids = report.get_candidate_ids(Some(2));
        assert_eq!(ids, vec![vec![1], vec![0]]);
    }

    #[test]
    fn random_selection_is_bounded_and_reproducible_with_seed() {
        let selection = CandidateSelection::Random { seed: Some(7) };
        let mut report = force_report(selection);
        let devis: Vec<ModelDevi> = (0..4)
            .map(|_| ModelDevi::from_force(vec![0.2; 10]))
            .collect();
        report.record(&devis).unwrap();

        let first = report.get_candidate_ids(Some(6));
        let second = report.get_candidate_ids(Some(6));
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(first.iter().map(Vec::len).sum::<usize>(), 6);
        for traj_ids in &first {
            assert!(traj_ids.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn limit_above_pool_size_returns_everything() {
        let mut report = force_report(CandidateSelection::default());
        report.record(&[ModelDevi::from_force(vec![0.2, 0.05, 0.2])]).unwrap();
        assert_eq!(report.get_candidate_ids(Some(100)), vec![vec![0, 2]]);
    }

    #[test]
    fn mismatched_virial_length_is_rejected_without_recording() {
        let mut report = force_report(CandidateSelection::MaxDevi);
        let good = ModelDevi::from_force(vec![0.0]);
        let bad = ModelDevi::from_force(vec![0.0, 0.0]).with_virial(vec![0.0]);
        let result = report.record(&[good, bad]);
        assert_eq!(
            result,
            Err(TrustLevelError::LengthMismatch {
                traj: 1,
                force: 2,
                virial: 1
            })
        );
        assert_eq!(report.num_trajs(), 0);
    }

    #[test]
    fn invalid_levels_are_rejected() {
        assert!(matches!(
            TrustLevels::new(0.5, 0.1),
            Err(TrustLevelError::InvertedLevels { quantity: "force", .. })
        ));
        assert!(matches!(
            TrustLevels::new(-0.1, 0.1),
            Err(TrustLevelError::InvalidLevel { name: "level_f_lo", .. })
        ));
        let half_virial = TrustLevels {
            level_f_lo: 0.1,
            level_f_hi: 0.2,
            level_v_lo: Some(0.1),
            level_v_hi: None,
        };
        assert_eq!(
            half_virial.validate(),
            Err(TrustLevelError::IncompleteVirialLevels)
        );
        assert!(matches!(
            ExplorationReportTrustLevels::new(
                TrustLevels::new(0.1, 0.2).unwrap(),
                1.5,
                CandidateSelection::MaxDevi
            ),
            Err(TrustLevelError::InvalidAccuracy(_))
        ));
    }

    #[test]
    fn selection_parses_from_tagged_toml() {
        let random: CandidateSelection = toml::from_str("type = \"random\"\nseed = 3").unwrap();
        assert_eq!(random, CandidateSelection::Random { seed: Some(3) });
        let max: CandidateSelection = toml::from_str("type = \"max-devi\"").unwrap();
        assert_eq!(max, CandidateSelection::MaxDevi);
    }
}
