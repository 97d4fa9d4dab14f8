use super::ConfFilter;
use crate::core::models::frame::Frame;
use crate::core::utils::geometry::cell_angles;
use tracing::debug;

pub const DEFAULT_THETA: f64 = 60.0;

/// Rejects periodic frames whose cell has become too skewed.
///
/// Every cell angle must lie within `[theta, 180 - theta]` degrees.
/// Non-periodic frames always pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSkewnessConfFilter {
    theta: f64,
}

impl Default for BoxSkewnessConfFilter {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
        }
    }
}

impl BoxSkewnessConfFilter {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }
}

impl ConfFilter for BoxSkewnessConfFilter {
    fn check(&self, frame: &Frame, _type_map: &[String]) -> bool {
        if frame.nopbc {
            return true;
        }
        let Some(angles) = cell_angles(&frame.cell) else {
            debug!("Degenerate cell; rejecting frame.");
            return false;
        };
        let (lo, hi) = (self.theta, 180.0 - self.theta);
        angles.iter().all(|&angle| angle >= lo && angle <= hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Point3};

    fn frame_with_cell(cell: Matrix3<f64>) -> Frame {
        Frame::new(vec![Point3::origin()], cell, vec![0])
    }

    fn sheared_cell(tilt: f64) -> Matrix3<f64> {
        Matrix3::new(
            4.0, 0.0, 0.0, //
            tilt, 4.0, 0.0, //
            0.0, 0.0, 4.0,
        )
    }

    #[test]
    fn orthogonal_cell_passes() {
        let filter = BoxSkewnessConfFilter::default();
        assert!(filter.check(&frame_with_cell(Matrix3::from_diagonal_element(4.0)), &[]));
    }

    #[test]
    fn moderate_shear_passes() {
        // gamma = atan2(4, 1) ~ 76 degrees.
        let filter = BoxSkewnessConfFilter::default();
        assert!(filter.check(&frame_with_cell(sheared_cell(1.0)), &[]));
    }

    #[test]
    fn heavy_shear_is_rejected() {
        // gamma = atan2(4, 8) ~ 26.6 degrees.
        let filter = BoxSkewnessConfFilter::default();
        assert!(!filter.check(&frame_with_cell(sheared_cell(8.0)), &[]));
        // Obtuse side: gamma ~ 153.4 degrees.
        assert!(!filter.check(&frame_with_cell(sheared_cell(-8.0)), &[]));
    }

    #[test]
    fn tighter_theta_rejects_moderate_shear() {
        let filter = BoxSkewnessConfFilter::new(80.0);
        assert!(!filter.check(&frame_with_cell(sheared_cell(1.0)), &[]));
    }

    #[test]
    fn nonperiodic_frames_pass() {
        let filter = BoxSkewnessConfFilter::default();
        assert!(filter.check(&frame_with_cell(sheared_cell(8.0)).without_pbc(), &[]));
    }
}
