//! Configuration filters applied to sampled frames before candidates are labeled.
//!
//! A [`ConfFilter`] is a predicate over one frame. [`ConfFilters`] chains several
//! of them and keeps only the frames that every filter admits.

mod box_length;
mod box_skewness;
mod distance;

pub use box_length::{BoxLengthFilter, DEFAULT_LENGTH_RATIO};
pub use box_skewness::{BoxSkewnessConfFilter, DEFAULT_THETA};
pub use distance::{DEFAULT_SAFE_DIST_RATIO, DistanceConfFilter};

use crate::core::models::frame::{ConfigurationSet, Frame};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

/// A predicate that admits or rejects a sampled configuration.
pub trait ConfFilter: Send + Sync {
    /// Returns `true` when the frame is physically acceptable.
    ///
    /// `type_map` maps the frame's atom types to element symbols.
    fn check(&self, frame: &Frame, type_map: &[String]) -> bool;
}

/// An ordered collection of filters; a frame passes only if all of them accept it.
#[derive(Default)]
pub struct ConfFilters {
    filters: Vec<Box<dyn ConfFilter>>,
}

impl ConfFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter: impl ConfFilter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Checks a single frame against every filter.
    pub fn accepts(&self, frame: &Frame, type_map: &[String]) -> bool {
        self.filters.iter().all(|f| f.check(frame, type_map))
    }

    /// Returns the frames of `confs` accepted by every filter, in their original order.
    #[instrument(skip_all, fields(num_frames = confs.len(), num_filters = self.filters.len()))]
    pub fn check(&self, confs: &ConfigurationSet) -> ConfigurationSet {
        let kept: Vec<Frame> = confs
            .frames
            .par_iter()
            .filter(|frame| self.accepts(frame, &confs.type_map))
            .cloned()
            .collect();

        let rejected = confs.len() - kept.len();
        if rejected > 0 {
            info!(
                "Configuration filters rejected {} of {} frames.",
                rejected,
                confs.len()
            );
        } else {
            debug!("All {} frames passed the configuration filters.", confs.len());
        }

        ConfigurationSet {
            type_map: confs.type_map.clone(),
            frames: kept,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Point3};

    struct MaxAtoms(usize);

    impl ConfFilter for MaxAtoms {
        fn check(&self, frame: &Frame, _type_map: &[String]) -> bool {
            frame.num_atoms() <= self.0
        }
    }

    struct NoType(usize);

    impl ConfFilter for NoType {
        fn check(&self, frame: &Frame, _type_map: &[String]) -> bool {
            !frame.atom_types.contains(&self.0)
        }
    }

    fn frame_with_types(types: Vec<usize>) -> Frame {
        let coords = (0..types.len())
            .map(|i| Point3::new(i as f64 * 2.0, 0.0, 0.0))
            .collect();
        Frame::new(coords, Matrix3::from_diagonal_element(20.0), types)
    }

    fn sample_set() -> ConfigurationSet {
        let mut set = ConfigurationSet::new(vec!["H".to_string(), "O".to_string()]);
        set.push(frame_with_types(vec![0, 0]));
        set.push(frame_with_types(vec![0, 1, 0]));
        set.push(frame_with_types(vec![0, 0, 0, 0]));
        set.push(frame_with_types(vec![0]));
        set
    }

    #[test]
    fn empty_collection_keeps_everything() {
        let filters = ConfFilters::new();
        let set = sample_set();
        assert_eq!(filters.check(&set), set);
    }

    #[test]
    fn frames_must_pass_every_filter_and_keep_order() {
        let mut filters = ConfFilters::new();
        filters.add(MaxAtoms(3)).add(NoType(1));
        assert_eq!(filters.len(), 2);

        let kept = filters.check(&sample_set());
        let sizes: Vec<usize> = kept.frames.iter().map(Frame::num_atoms).collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(kept.type_map, vec!["H".to_string(), "O".to_string()]);
    }
}
