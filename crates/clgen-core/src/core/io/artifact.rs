use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("File I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Serialization error for '{}': {source}", path.display())]
    Serde {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Dumps any serializable object to `path` as JSON.
pub fn dump_object_to_file<T: Serialize, P: AsRef<Path>>(
    obj: &T,
    path: P,
) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    let io_err = |e| ArtifactError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, obj).map_err(|e| ArtifactError::Serde {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(io_err)?;
    debug!("Dumped object artifact to {:?}", path);
    Ok(())
}

/// Loads an object previously written by [`dump_object_to_file`].
pub fn load_object_from_file<T: DeserializeOwned, P: AsRef<Path>>(
    path: P,
) -> Result<T, ArtifactError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ArtifactError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ArtifactError::Serde {
        path: path.to_path_buf(),
        source: e,
    })
}
