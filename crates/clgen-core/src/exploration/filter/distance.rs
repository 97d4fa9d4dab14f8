use super::ConfFilter;
use crate::core::elements::covalent_radius;
use crate::core::models::frame::Frame;
use crate::core::utils::geometry::PeriodicCell;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEFAULT_SAFE_DIST_RATIO: f64 = 0.5;

/// Rejects frames in which two atoms come unphysically close.
///
/// A pair of elements `a`, `b` is too close when their distance falls below
/// `safe_dist_ratio * (r_a + r_b)`. Radii come from `custom_safe_dist` when
/// given for an element, otherwise from the covalent radius table. Periodic
/// frames use the minimum-image distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConfFilter {
    custom_safe_dist: HashMap<String, f64>,
    safe_dist_ratio: f64,
}

impl Default for DistanceConfFilter {
    fn default() -> Self {
        Self {
            custom_safe_dist: HashMap::new(),
            safe_dist_ratio: DEFAULT_SAFE_DIST_RATIO,
        }
    }
}

impl DistanceConfFilter {
    pub fn new(custom_safe_dist: HashMap<String, f64>, safe_dist_ratio: f64) -> Self {
        Self {
            custom_safe_dist,
            safe_dist_ratio,
        }
    }

    fn radius_of(&self, symbol: &str) -> Option<f64> {
        self.custom_safe_dist
            .get(symbol)
            .copied()
            .or_else(|| covalent_radius(symbol))
    }
}

impl ConfFilter for DistanceConfFilter {
    fn check(&self, frame: &Frame, type_map: &[String]) -> bool {
        if frame.coords.len() != frame.atom_types.len() {
            warn!(
                "Frame has {} coordinates but {} atom types; rejecting frame.",
                frame.coords.len(),
                frame.atom_types.len()
            );
            return false;
        }

        let mut radii = Vec::with_capacity(frame.num_atoms());
        for &t in &frame.atom_types {
            let Some(symbol) = type_map.get(t) else {
                warn!("Atom type {} is not in the type map; rejecting frame.", t);
                return false;
            };
            let Some(radius) = self.radius_of(symbol) else {
                warn!(
                    "No safe distance known for element '{}'; rejecting frame.",
                    symbol
                );
                return false;
            };
            radii.push(radius);
        }

        let periodic = if frame.nopbc {
            None
        } else {
            match PeriodicCell::new(&frame.cell) {
                Some(cell) => Some(cell),
                None => {
                    warn!("Frame has a singular cell; rejecting frame.");
                    return false;
                }
            }
        };

        let coords = &frame.coords;
        for i in 0..coords.len() {
            for j in (i + 1)..coords.len() {
                let dist = match &periodic {
                    Some(cell) => cell.minimum_image_distance(&coords[i], &coords[j]),
                    None => (coords[j] - coords[i]).norm(),
                };
                let safe = self.safe_dist_ratio * (radii[i] + radii[j]);
                if dist < safe {
                    debug!(
                        "Atoms {} and {} are {:.3} A apart, below the safe distance {:.3} A.",
                        i, j, dist, safe
                    );
                    return false;
                }
            }
        }
        true
    }
}
