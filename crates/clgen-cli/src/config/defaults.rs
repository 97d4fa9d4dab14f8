use clgen::exploration::filter::{DEFAULT_LENGTH_RATIO, DEFAULT_SAFE_DIST_RATIO, DEFAULT_THETA};
use clgen::exploration::report::{CandidateSelection, DEFAULT_CONV_ACCURACY};

pub struct DefaultsConfig {
    pub conv_accuracy: f64,
    pub selection: CandidateSelection,
    pub safe_dist_ratio: f64,
    pub skewness_theta: f64,
    pub length_ratio: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            conv_accuracy: DEFAULT_CONV_ACCURACY,
            selection: CandidateSelection::default(),
            safe_dist_ratio: DEFAULT_SAFE_DIST_RATIO,
            skewness_theta: DEFAULT_THETA,
            length_ratio: DEFAULT_LENGTH_RATIO,
        }
    }
}
