/// Model deviation recorded along one exploration trajectory.
///
/// Each entry corresponds to one dumped frame. `max_devi_f` is the maximum
/// per-atom force deviation across the model ensemble; `max_devi_v` is the
/// maximum virial deviation and is only present when it was recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDevi {
    pub steps: Vec<u64>,
    pub max_devi_f: Vec<f64>,
    pub max_devi_v: Option<Vec<f64>>,
}

impl ModelDevi {
    pub fn new(steps: Vec<u64>, max_devi_f: Vec<f64>) -> Self {
        Self {
            steps,
            max_devi_f,
            max_devi_v: None,
        }
    }

    /// Builds a deviation record whose steps are simply `0..n`.
    pub fn from_force(max_devi_f: Vec<f64>) -> Self {
        let steps = (0..max_devi_f.len() as u64).collect();
        Self::new(steps, max_devi_f)
    }

    pub fn with_virial(mut self, max_devi_v: Vec<f64>) -> Self {
        self.max_devi_v = Some(max_devi_v);
        self
    }

    pub fn num_frames(&self) -> usize {
        self.max_devi_f.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_devi_f.is_empty()
    }
}
