use nalgebra::{Matrix3, Point3, Vector3};

/// Lengths of the three lattice vectors stored as rows of `cell`.
pub fn cell_lengths(cell: &Matrix3<f64>) -> [f64; 3] {
    [cell.row(0).norm(), cell.row(1).norm(), cell.row(2).norm()]
}

/// Cell angles `[alpha, beta, gamma]` in degrees.
///
/// `alpha` lies between b and c, `beta` between a and c, `gamma` between a and b.
/// Returns `None` for a cell with a zero-length lattice vector.
pub fn cell_angles(cell: &Matrix3<f64>) -> Option<[f64; 3]> {
    let a: Vector3<f64> = cell.row(0).transpose();
    let b: Vector3<f64> = cell.row(1).transpose();
    let c: Vector3<f64> = cell.row(2).transpose();
    Some([angle_between(&b, &c)?, angle_between(&a, &c)?, angle_between(&a, &b)?])
}

fn angle_between(u: &Vector3<f64>, v: &Vector3<f64>) -> Option<f64> {
    let denom = u.norm() * v.norm();
    if denom <= f64::EPSILON {
        return None;
    }
    let cos = (u.dot(v) / denom).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Precomputed cell data for repeated minimum-image distance queries.
#[derive(Debug, Clone)]
pub struct PeriodicCell {
    // Columns are lattice vectors, so `to_cartesian * frac` yields Cartesian coordinates.
    to_cartesian: Matrix3<f64>,
    to_fractional: Matrix3<f64>,
    // Norms of the reciprocal rows; bound how far an image can sit in each fractional axis.
    reciprocal_norms: [f64; 3],
}

impl PeriodicCell {
    /// Builds the helper from a row-vector cell; `None` when the cell is singular.
    pub fn new(cell: &Matrix3<f64>) -> Option<Self> {
        let to_cartesian = cell.transpose();
        let to_fractional = to_cartesian.try_inverse()?;
        let reciprocal_norms = [
            to_fractional.row(0).norm(),
            to_fractional.row(1).norm(),
            to_fractional.row(2).norm(),
        ];
        Some(Self {
            to_cartesian,
            to_fractional,
            reciprocal_norms,
        })
    }

    /// Shortest distance between `p` and any periodic image of `q`.
    ///
    /// Exact for any non-singular cell. Strongly sheared cells widen the
    /// image search, so the cost grows with the skew.
    pub fn minimum_image_distance(&self, p: &Point3<f64>, q: &Point3<f64>) -> f64 {
        let frac = self.to_fractional * (q - p);
        let wrapped = frac.map(|x| x - x.round());
        let mut best = (self.to_cartesian * wrapped).norm();

        // An image at distance `d` has |frac_i| <= d * |reciprocal row i|.
        let range = |axis: usize, best: f64| {
            let reach = best * self.reciprocal_norms[axis];
            let lo = (-reach - wrapped[axis]).ceil() as i64;
            let hi = (reach - wrapped[axis]).floor() as i64;
            lo..=hi
        };
        for i in range(0, best) {
            for j in range(1, best) {
                for k in range(2, best) {
                    let shift = Vector3::new(i as f64, j as f64, k as f64);
                    let d = (self.to_cartesian * (wrapped + shift)).norm();
                    if d < best {
                        best = d;
                    }
                }
            }
        }
        best
    }
}
