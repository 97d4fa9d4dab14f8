use super::ConfFilter;
use crate::core::models::frame::Frame;
use crate::core::utils::geometry::cell_lengths;

pub const DEFAULT_LENGTH_RATIO: f64 = 5.0;

/// Rejects periodic frames whose cell is stretched along one direction.
///
/// The ratio of the longest to the shortest lattice vector must not exceed
/// `length_ratio`. Non-periodic frames always pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxLengthFilter {
    length_ratio: f64,
}

impl Default for BoxLengthFilter {
    fn default() -> Self {
        Self {
            length_ratio: DEFAULT_LENGTH_RATIO,
        }
    }
}

impl BoxLengthFilter {
    pub fn new(length_ratio: f64) -> Self {
        Self { length_ratio }
    }
}

impl ConfFilter for BoxLengthFilter {
    fn check(&self, frame: &Frame, _type_map: &[String]) -> bool {
        if frame.nopbc {
            return true;
        }
        let lengths = cell_lengths(&frame.cell);
        let shortest = lengths.iter().copied().fold(f64::INFINITY, f64::min);
        let longest = lengths.iter().copied().fold(0.0, f64::max);
        shortest > 0.0 && longest / shortest <= self.length_ratio
    }
}
