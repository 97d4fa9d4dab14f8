use crate::core::io::traits::DataFile;
use crate::core::models::frame::ConfigurationSet;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationSetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Inconsistent frame {frame}: {message}")]
    Inconsistency { frame: usize, message: String },
}

impl DataFile for ConfigurationSet {
    type Error = ConfigurationSetError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let set: ConfigurationSet = serde_json::from_reader(reader)?;
        set.validate()
            .map_err(|(frame, message)| ConfigurationSetError::Inconsistency { frame, message })?;
        Ok(set)
    }

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}
