//! Exploration reports summarize how well the current models cover what an
//! exploration stage sampled.
//!
//! Every report exposes its failed/accurate/candidate ratios through
//! [`ExplorationReport`]; the table-printing helpers are derived from them.

mod trust_levels;

pub use trust_levels::{
    CandidateSelection, DEFAULT_CONV_ACCURACY, ExplorationReportTrustLevels, TrustLevelError,
    TrustLevels,
};

/// Fractions of sampled frames in each class. For a non-empty report they sum to one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExplorationRatios {
    pub failed: f64,
    pub accurate: f64,
    pub candidate: f64,
}

/// A summary of one round of exploration.
pub trait ExplorationReport {
    /// Returns the failed, accurate, and candidate ratios of the recorded frames.
    fn ratios(&self) -> ExplorationRatios;

    fn failed_ratio(&self) -> f64 {
        self.ratios().failed
    }

    fn accurate_ratio(&self) -> f64 {
        self.ratios().accurate
    }

    fn candidate_ratio(&self) -> f64 {
        self.ratios().candidate
    }

    /// The header line matching [`ExplorationReport::print`].
    fn print_header(&self) -> String {
        format!(
            "#{:>7} {:>8} {:>8} {:>10} {:>10} {:>10}",
            "stage", "id_stg.", "iter.", "accu.", "cand.", "fail."
        )
    }

    /// One fixed-width table line describing this report.
    fn print(&self, stage_idx: usize, idx_in_stage: usize, iter_idx: usize) -> String {
        let ratios = self.ratios();
        format!(
            " {:>7} {:>8} {:>8} {:>10.4} {:>10.4} {:>10.4}",
            stage_idx, idx_in_stage, iter_idx, ratios.accurate, ratios.candidate, ratios.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(ExplorationRatios);

    impl ExplorationReport for Fixed {
        fn ratios(&self) -> ExplorationRatios {
            self.0
        }
    }

    #[test]
    fn provided_accessors_read_ratios() {
        let report = Fixed(ExplorationRatios {
            failed: 0.1,
            accurate: 0.7,
            candidate: 0.2,
        });
        assert_eq!(report.failed_ratio(), 0.1);
        assert_eq!(report.accurate_ratio(), 0.7);
        assert_eq!(report.candidate_ratio(), 0.2);
    }

    #[test]
    fn header_and_line_share_column_widths() {
        let report = Fixed(ExplorationRatios {
            failed: 0.125,
            accurate: 0.5,
            candidate: 0.375,
        });
        let header = report.print_header();
        let line = report.print(1, 0, 12);
        assert_eq!(header.len(), line.len());
        assert_eq!(
            line,
            "       1        0       12     0.5000     0.3750     0.1250"
        );
        assert!(header.starts_with("#  stage"));
    }
}
