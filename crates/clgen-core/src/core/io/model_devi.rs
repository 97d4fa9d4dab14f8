use crate::core::io::traits::DataFile;
use crate::core::models::model_devi::ModelDevi;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const STEP_COLUMN: &str = "step";
const MAX_DEVI_V_COLUMN: &str = "max_devi_v";
const MAX_DEVI_F_COLUMN: &str = "max_devi_f";

// Column layout of a header-less table: step, max/min/avg virial, max/min/avg force.
const DEFAULT_STEP_INDEX: usize = 0;
const DEFAULT_MAX_DEVI_V_INDEX: usize = 1;
const DEFAULT_MAX_DEVI_F_INDEX: usize = 4;

#[derive(Debug, Error)]
pub enum ModelDeviError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ModelDeviParseErrorKind,
    },
    #[error("Header does not name the required column '{0}'")]
    MissingColumn(&'static str),
}

#[derive(Debug, Error)]
pub enum ModelDeviParseErrorKind {
    #[error("Invalid integer in column '{column}' (value: '{value}')")]
    InvalidInt { column: &'static str, value: String },
    #[error("Invalid float in column '{column}' (value: '{value}')")]
    InvalidFloat { column: &'static str, value: String },
    #[error("Expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },
}

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    step: usize,
    max_devi_f: usize,
    max_devi_v: Option<usize>,
}

impl ColumnLayout {
    fn default_layout() -> Self {
        Self {
            step: DEFAULT_STEP_INDEX,
            max_devi_f: DEFAULT_MAX_DEVI_F_INDEX,
            max_devi_v: Some(DEFAULT_MAX_DEVI_V_INDEX),
        }
    }

    fn from_header(names: &[&str]) -> Result<Self, ModelDeviError> {
        let find = |name: &str| names.iter().position(|n| *n == name);
        Ok(Self {
            step: find(STEP_COLUMN).ok_or(ModelDeviError::MissingColumn(STEP_COLUMN))?,
            max_devi_f: find(MAX_DEVI_F_COLUMN)
                .ok_or(ModelDeviError::MissingColumn(MAX_DEVI_F_COLUMN))?,
            max_devi_v: find(MAX_DEVI_V_COLUMN),
        })
    }

    fn min_columns(&self) -> usize {
        let widest = self.step.max(self.max_devi_f);
        widest.max(self.max_devi_v.unwrap_or(0)) + 1
    }
}

fn parse_float(line: usize, column: &'static str, value: &str) -> Result<f64, ModelDeviError> {
    value.parse().map_err(|_| ModelDeviError::Parse {
        line,
        kind: ModelDeviParseErrorKind::InvalidFloat {
            column,
            value: value.to_string(),
        },
    })
}

fn parse_step(line: usize, value: &str) -> Result<u64, ModelDeviError> {
    value.parse().map_err(|_| ModelDeviError::Parse {
        line,
        kind: ModelDeviParseErrorKind::InvalidInt {
            column: STEP_COLUMN,
            value: value.to_string(),
        },
    })
}

impl DataFile for ModelDevi {
    type Error = ModelDeviError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut layout: Option<ColumnLayout> = None;
        let mut steps = Vec::new();
        let mut max_devi_f = Vec::new();
        let mut max_devi_v = Vec::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line_num = idx + 1;
            let line = line_result?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('#') {
                // Only the first comment before any data describes the columns.
                if layout.is_none() && steps.is_empty() {
                    let names: Vec<&str> = header.split_whitespace().collect();
                    if names.contains(&STEP_COLUMN) {
                        layout = Some(ColumnLayout::from_header(&names)?);
                    }
                }
                continue;
            }

            let columns = *layout.get_or_insert_with(ColumnLayout::default_layout);
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() < columns.min_columns() {
                return Err(ModelDeviError::Parse {
                    line: line_num,
                    kind: ModelDeviParseErrorKind::TooFewColumns {
                        expected: columns.min_columns(),
                        found: fields.len(),
                    },
                });
            }

            steps.push(parse_step(line_num, fields[columns.step])?);
            max_devi_f.push(parse_float(
                line_num,
                MAX_DEVI_F_COLUMN,
                fields[columns.max_devi_f],
            )?);
            if let Some(v_idx) = columns.max_devi_v {
                max_devi_v.push(parse_float(line_num, MAX_DEVI_V_COLUMN, fields[v_idx])?);
            }
        }

        let has_virial = layout.is_some_and(|l| l.max_devi_v.is_some());
        Ok(ModelDevi {
            steps,
            max_devi_f,
            max_devi_v: has_virial.then_some(max_devi_v),
        })
    }

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        match &self.max_devi_v {
            Some(virial) => {
                writeln!(
                    writer,
                    "#{:>11} {:>18} {:>18}",
                    STEP_COLUMN, MAX_DEVI_V_COLUMN, MAX_DEVI_F_COLUMN
                )?;
                for ((step, f), v) in self.steps.iter().zip(&self.max_devi_f).zip(virial) {
                    writeln!(writer, "{:>12} {:>18.6e} {:>18.6e}", step, v, f)?;
                }
            }
            None => {
                writeln!(writer, "#{:>11} {:>18}", STEP_COLUMN, MAX_DEVI_F_COLUMN)?;
                for (step, f) in self.steps.iter().zip(&self.max_devi_f) {
                    writeln!(writer, "{:>12} {:>18.6e}", step, f)?;
                }
            }
        }
        Ok(())
    }
}
