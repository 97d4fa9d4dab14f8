use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum MdSettingsError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Unknown ensemble '{0}'. Expected one of: nve, nvt, npt, npt-i, npt-a, npt-t")]
    UnknownEnsemble(String),
    #[error("JSON error: {0}")]
    Json(String),
}

/// Thermodynamic ensemble of an exploration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ensemble {
    #[serde(rename = "nve")]
    Nve,
    #[serde(rename = "nvt")]
    Nvt,
    #[serde(rename = "npt")]
    Npt,
    /// Isotropic pressure coupling.
    #[serde(rename = "npt-i")]
    NptIso,
    /// Anisotropic pressure coupling.
    #[serde(rename = "npt-a")]
    NptAniso,
    /// Fully triclinic pressure coupling.
    #[serde(rename = "npt-t")]
    NptTri,
}

impl Ensemble {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ensemble::Nve => "nve",
            Ensemble::Nvt => "nvt",
            Ensemble::Npt => "npt",
            Ensemble::NptIso => "npt-i",
            Ensemble::NptAniso => "npt-a",
            Ensemble::NptTri => "npt-t",
        }
    }

    pub fn requires_temperature(&self) -> bool {
        !matches!(self, Ensemble::Nve)
    }

    pub fn requires_pressure(&self) -> bool {
        matches!(
            self,
            Ensemble::Npt | Ensemble::NptIso | Ensemble::NptAniso | Ensemble::NptTri
        )
    }
}

impl fmt::Display for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ensemble {
    type Err = MdSettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nve" => Ok(Ensemble::Nve),
            "nvt" => Ok(Ensemble::Nvt),
            "npt" => Ok(Ensemble::Npt),
            "npt-i" => Ok(Ensemble::NptIso),
            "npt-a" => Ok(Ensemble::NptAniso),
            "npt-t" => Ok(Ensemble::NptTri),
            _ => Err(MdSettingsError::UnknownEnsemble(s.to_string())),
        }
    }
}

/// Parameters of one molecular-dynamics exploration run.
///
/// Times are in picoseconds, temperatures in Kelvin, pressures in bar. Every
/// field is written when serialized; unset optional values appear as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdSettings {
    pub ens: Ensemble,
    pub dt: f64,
    pub nsteps: u64,
    pub trj_freq: u64,
    pub temps: Option<Vec<f64>>,
    pub press: Option<Vec<f64>>,
    pub tau_t: f64,
    pub tau_p: f64,
    /// Primary knock-on atom energy.
    pub pka_e: Option<f64>,
    pub neidelay: Option<u32>,
    pub no_pbc: bool,
    pub use_clusters: bool,
    pub relative_epsilon: Option<f64>,
    pub relative_v_epsilon: Option<f64>,
    /// Electronic temperature applied per frame.
    pub ele_temp_f: Option<f64>,
    /// Electronic temperature applied per atom.
    pub ele_temp_a: Option<f64>,
}

pub const DEFAULT_TAU_T: f64 = 0.1;
pub const DEFAULT_TAU_P: f64 = 0.5;

impl MdSettings {
    pub fn new(ens: Ensemble, dt: f64, nsteps: u64, trj_freq: u64) -> Self {
        Self {
            ens,
            dt,
            nsteps,
            trj_freq,
            temps: None,
            press: None,
            tau_t: DEFAULT_TAU_T,
            tau_p: DEFAULT_TAU_P,
            pka_e: None,
            neidelay: None,
            no_pbc: false,
            use_clusters: false,
            relative_epsilon: None,
            relative_v_epsilon: None,
            ele_temp_f: None,
            ele_temp_a: None,
        }
    }

    /// Serializes every setting into a single JSON object.
    ///
    /// Fails on NaN or infinite values, which JSON cannot represent.
    pub fn to_json_string(&self) -> Result<String, MdSettingsError> {
        self.check_finite()?;
        serde_json::to_string(self).map_err(|e| MdSettingsError::Json(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, MdSettingsError> {
        serde_json::from_str(text).map_err(|e| MdSettingsError::Json(e.to_string()))
    }

    fn check_finite(&self) -> Result<(), MdSettingsError> {
        let scalars = [
            ("dt", Some(self.dt)),
            ("tau_t", Some(self.tau_t)),
            ("tau_p", Some(self.tau_p)),
            ("pka_e", self.pka_e),
            ("relative_epsilon", self.relative_epsilon),
            ("relative_v_epsilon", self.relative_v_epsilon),
            ("ele_temp_f", self.ele_temp_f),
            ("ele_temp_a", self.ele_temp_a),
        ];
        let listed = [("temps", &self.temps), ("press", &self.press)]
            .into_iter()
            .flat_map(|(name, values)| values.iter().flatten().map(move |&v| (name, Some(v))));

        for (name, value) in scalars.into_iter().chain(listed) {
            if let Some(value) = value.filter(|v| !v.is_finite()) {
                return Err(MdSettingsError::InvalidParameter {
                    name,
                    reason: format!("{} cannot be written as JSON", value),
                });
            }
        }
        Ok(())
    }

    /// Number of trajectory frames the run dumps, counting the initial one.
    pub fn num_dumped_frames(&self) -> u64 {
        if self.trj_freq == 0 {
            return 0;
        }
        self.nsteps / self.trj_freq + 1
    }
}

#[derive(Default)]
pub struct MdSettingsBuilder {
    ens: Option<Ensemble>,
    dt: Option<f64>,
    nsteps: Option<u64>,
    trj_freq: Option<u64>,
    temps: Option<Vec<f64>>,
    press: Option<Vec<f64>>,
    tau_t: Option<f64>,
    tau_p: Option<f64>,
    pka_e: Option<f64>,
    neidelay: Option<u32>,
    no_pbc: bool,
    use_clusters: bool,
    relative_epsilon: Option<f64>,
    relative_v_epsilon: Option<f64>,
    ele_temp_f: Option<f64>,
    ele_temp_a: Option<f64>,
}

impl MdSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensemble(mut self, ens: Ensemble) -> Self {
        self.ens = Some(ens);
        self
    }
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }
    pub fn nsteps(mut self, nsteps: u64) -> Self {
        self.nsteps = Some(nsteps);
        self
    }
    pub fn trj_freq(mut self, freq: u64) -> Self {
        self.trj_freq = Some(freq);
        self
    }
    pub fn temps(mut self, temps: Vec<f64>) -> Self {
        self.temps = Some(temps);
        self
    }
    pub fn press(mut self, press: Vec<f64>) -> Self {
        self.press = Some(press);
        self
    }
    pub fn tau_t(mut self, tau: f64) -> Self {
        self.tau_t = Some(tau);
        self
    }
    pub fn tau_p(mut self, tau: f64) -> Self {
        self.tau_p = Some(tau);
        self
    }
    pub fn pka_e(mut self, energy: f64) -> Self {
        self.pka_e = Some(energy);
        self
    }
    pub fn neidelay(mut self, delay: u32) -> Self {
        self.neidelay = Some(delay);
        self
    }
    pub fn no_pbc(mut self, no_pbc: bool) -> Self {
        self.no_pbc = no_pbc;
        self
    }
    pub fn use_clusters(mut self, use_clusters: bool) -> Self {
        self.use_clusters = use_clusters;
        self
    }
    pub fn relative_epsilon(mut self, eps: f64) -> Self {
        self.relative_epsilon = Some(eps);
        self
    }
    pub fn relative_v_epsilon(mut self, eps: f64) -> Self {
        self.relative_v_epsilon = Some(eps);
        self
    }
    pub fn ele_temp_f(mut self, temp: f64) -> Self {
        self.ele_temp_f = Some(temp);
        self
    }
    pub fn ele_temp_a(mut self, temp: f64) -> Self {
        self.ele_temp_a = Some(temp);
        self
    }

    pub fn build(self) -> Result<MdSettings, MdSettingsError> {
        let ens = self
            .ens
            .ok_or(MdSettingsError::MissingParameter("ensemble"))?;
        let dt = self.dt.ok_or(MdSettingsError::MissingParameter("dt"))?;
        let nsteps = self
            .nsteps
            .ok_or(MdSettingsError::MissingParameter("nsteps"))?;
        let trj_freq = self
            .trj_freq
            .ok_or(MdSettingsError::MissingParameter("trj_freq"))?;

        if !(dt > 0.0) {
            return Err(MdSettingsError::InvalidParameter {
                name: "dt",
                reason: format!("timestep must be positive, got {}", dt),
            });
        }
        if trj_freq == 0 {
            return Err(MdSettingsError::InvalidParameter {
                name: "trj_freq",
                reason: "dump frequency must be at least 1".to_string(),
            });
        }
        if ens.requires_temperature() && self.temps.as_ref().is_none_or(|t| t.is_empty()) {
            return Err(MdSettingsError::InvalidParameter {
                name: "temps",
                reason: format!("ensemble '{}' needs at least one temperature", ens),
            });
        }
        if ens.requires_pressure() && self.press.as_ref().is_none_or(|p| p.is_empty()) {
            return Err(MdSettingsError::InvalidParameter {
                name: "press",
                reason: format!("ensemble '{}' needs at least one pressure", ens),
            });
        }

        Ok(MdSettings {
            ens,
            dt,
            nsteps,
            trj_freq,
            temps: self.temps,
            press: self.press,
            tau_t: self.tau_t.unwrap_or(DEFAULT_TAU_T),
            tau_p: self.tau_p.unwrap_or(DEFAULT_TAU_P),
            pka_e: self.pka_e,
            neidelay: self.neidelay,
            no_pbc: self.no_pbc,
            use_clusters: self.use_clusters,
            relative_epsilon: self.relative_epsilon,
            relative_v_epsilon: self.relative_v_epsilon,
            ele_temp_f: self.ele_temp_f,
            ele_temp_a: self.ele_temp_a,
        })
    }
}
