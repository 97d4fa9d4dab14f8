use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A single sampled configuration produced by an exploration trajectory.
///
/// Coordinates are Cartesian in Angstroms. The cell stores one lattice
/// vector per row. Atom types index into the owning set's type map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFrame", into = "RawFrame")]
pub struct Frame {
    pub coords: Vec<Point3<f64>>,
    pub cell: Matrix3<f64>,
    pub atom_types: Vec<usize>,
    pub nopbc: bool,
}

impl Frame {
    pub fn new(coords: Vec<Point3<f64>>, cell: Matrix3<f64>, atom_types: Vec<usize>) -> Self {
        Self {
            coords,
            cell,
            atom_types,
            nopbc: false,
        }
    }

    /// Marks the frame as a non-periodic cluster.
    pub fn without_pbc(mut self) -> Self {
        self.nopbc = true;
        self
    }

    pub fn num_atoms(&self) -> usize {
        self.coords.len()
    }

    /// Lattice vector `i` (row `i` of the cell matrix).
    pub fn lattice_vector(&self, i: usize) -> Vector3<f64> {
        self.cell.row(i).transpose()
    }
}

#[derive(Serialize, Deserialize)]
struct RawFrame {
    coords: Vec<[f64; 3]>,
    cell: [[f64; 3]; 3],
    atom_types: Vec<usize>,
    #[serde(default)]
    nopbc: bool,
}

impl From<RawFrame> for Frame {
    fn from(raw: RawFrame) -> Self {
        let rows = raw.cell;
        Self {
            coords: raw
                .coords
                .into_iter()
                .map(|[x, y, z]| Point3::new(x, y, z))
                .collect(),
            cell: Matrix3::new(
                rows[0][0], rows[0][1], rows[0][2], //
                rows[1][0], rows[1][1], rows[1][2], //
                rows[2][0], rows[2][1], rows[2][2],
            ),
            atom_types: raw.atom_types,
            nopbc: raw.nopbc,
        }
    }
}

impl From<Frame> for RawFrame {
    fn from(frame: Frame) -> Self {
        let row = |i: usize| [frame.cell[(i, 0)], frame.cell[(i, 1)], frame.cell[(i, 2)]];
        Self {
            coords: frame.coords.iter().map(|p| [p.x, p.y, p.z]).collect(),
            cell: [row(0), row(1), row(2)],
            atom_types: frame.atom_types,
            nopbc: frame.nopbc,
        }
    }
}

/// A collection of frames sharing one type map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSet {
    pub type_map: Vec<String>,
    pub frames: Vec<Frame>,
}

impl ConfigurationSet {
    pub fn new(type_map: Vec<String>) -> Self {
        Self {
            type_map,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Element symbol of atom `atom` in `frame`, if its type is mapped.
    pub fn symbol_of<'a>(&'a self, frame: &Frame, atom: usize) -> Option<&'a str> {
        frame
            .atom_types
            .get(atom)
            .and_then(|&t| self.type_map.get(t))
            .map(String::as_str)
    }

    /// Checks that every frame's arrays agree in length and its types are mapped.
    ///
    /// Returns the index of the first inconsistent frame and a description.
    pub fn validate(&self) -> Result<(), (usize, String)> {
        for (idx, frame) in self.frames.iter().enumerate() {
            if frame.coords.len() != frame.atom_types.len() {
                return Err((
                    idx,
                    format!(
                        "{} coordinates but {} atom types",
                        frame.coords.len(),
                        frame.atom_types.len()
                    ),
                ));
            }
            if let Some(&bad) = frame
                .atom_types
                .iter()
                .find(|&&t| t >= self.type_map.len())
            {
                return Err((
                    idx,
                    format!(
                        "atom type {} is outside the type map of size {}",
                        bad,
                        self.type_map.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}
