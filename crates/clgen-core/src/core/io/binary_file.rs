use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BinaryFileError {
    #[error("No such file: {}", path.display())]
    NotFound { path: PathBuf },
    #[error(
        "File extension mismatch, require \"{expected}\", current \"{found}\", file path: {}",
        path.display()
    )]
    ExtensionMismatch {
        expected: String,
        found: String,
        path: PathBuf,
    },
    #[error("File I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Raw bytes of an input file, carried between workflow steps.
///
/// The optional extension (always stored with its leading dot) is checked when
/// the file is read and compared again, as a warning only, when the bytes are
/// written back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryFileInput {
    ext: Option<String>,
    file_name: String,
    #[serde(with = "base64_bytes")]
    file_data: Vec<u8>,
}

impl BinaryFileInput {
    pub fn new<P: AsRef<Path>>(path: P, ext: Option<&str>) -> Result<Self, BinaryFileError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BinaryFileError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let ext = ext.filter(|e| !e.is_empty()).map(normalize_extension);
        if let Some(expected) = &ext {
            let found = dotted_extension(path);
            if &found != expected {
                return Err(BinaryFileError::ExtensionMismatch {
                    expected: expected.clone(),
                    found,
                    path: path.to_path_buf(),
                });
            }
        }

        let file_data = fs::read(path).map_err(|e| BinaryFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(
            "Loaded binary input '{}' ({} bytes)",
            file_name,
            file_data.len()
        );

        Ok(Self {
            ext,
            file_name,
            file_data,
        })
    }

    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn data(&self) -> &[u8] {
        &self.file_data
    }

    /// Writes the stored bytes to `path`.
    ///
    /// A target whose extension differs from the expected one is still
    /// written; the mismatch is only logged.
    pub fn save_as_file<P: AsRef<Path>>(&self, path: P) -> Result<(), BinaryFileError> {
        let path = path.as_ref();
        if let Some(expected) = &self.ext {
            let found = dotted_extension(path);
            if &found != expected {
                warn!(
                    "File extension mismatch, require \"{}\", current \"{}\", file path: {}",
                    expected,
                    found,
                    path.display()
                );
            }
        }
        fs::write(path, &self.file_data).map_err(|e| BinaryFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// The path's extension with its leading dot, or an empty string.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const PAYLOAD: &[u8] = &[0x00, 0xff, 0x10, 0x7f, b'p', b'b', 0x0a];

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempdir().unwrap();
        let result = BinaryFileInput::new(dir.path().join("absent.pb"), None);
        assert!(matches!(result, Err(BinaryFileError::NotFound { .. })));
    }

    #[test]
    fn extension_is_normalized_and_checked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.pb");
        fs::write(&path, PAYLOAD).unwrap();

        let with_dot = BinaryFileInput::new(&path, Some(".pb")).unwrap();
        let without_dot = BinaryFileInput::new(&path, Some("pb")).unwrap();
        assert_eq!(with_dot.ext(), Some(".pb"));
        assert_eq!(without_dot.ext(), Some(".pb"));
        assert_eq!(with_dot.file_name(), "graph.pb");
    }

    #[test]
    fn mismatched_extension_is_rejected_on_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.pth");
        fs::write(&path, PAYLOAD).unwrap();

        match BinaryFileInput::new(&path, Some("pb")) {
            Err(BinaryFileError::ExtensionMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, ".pb");
                assert_eq!(found, ".pth");
            }
            other => panic!("Expected extension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn missing_extension_counts_as_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph");
        fs::write(&path, PAYLOAD).unwrap();
        assert!(matches!(
            BinaryFileInput::new(&path, Some(".pb")),
            Err(BinaryFileError::ExtensionMismatch { .. })
        ));
    }

    #[test]
    fn save_as_file_reproduces_bytes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("graph.pb");
        let target = dir.path().join("copy.pb");
        fs::write(&source, PAYLOAD).unwrap();

        let input = BinaryFileInput::new(&source, Some("pb")).unwrap();
        input.save_as_file(&target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), PAYLOAD);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn save_capturing_logs(input: &BinaryFileInput, target: &Path) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || input.save_as_file(target).unwrap());
        log.text()
    }

    #[test]
    fn save_with_other_extension_warns_and_still_writes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("graph.pb");
        let target = dir.path().join("copy.txt");
        fs::write(&source, PAYLOAD).unwrap();

        let input = BinaryFileInput::new(&source, Some("pb")).unwrap();
        let logs = save_capturing_logs(&input, &target);
        assert_eq!(fs::read(&target).unwrap(), PAYLOAD);
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(
            logs.contains("File extension mismatch, require \".pb\", current \".txt\""),
            "{}",
            logs
        );
    }

    #[test]
    fn save_with_matching_extension_does_not_warn() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("graph.pb");
        let target = dir.path().join("copy.pb");
        fs::write(&source, PAYLOAD).unwrap();

        let input = BinaryFileInput::new(&source, Some("pb")).unwrap();
        let logs = save_capturing_logs(&input, &target);
        assert!(!logs.contains("mismatch"), "{}", logs);
    }

    #[test]
    fn serialized_form_encodes_bytes_as_base64() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("graph.pb");
        fs::write(&source, PAYLOAD).unwrap();
        let input = BinaryFileInput::new(&source, None).unwrap();

        let json = serde_json::to_value(&input).unwrap();
        assert!(json["file_data"].is_string());
        assert_eq!(json["ext"], serde_json::Value::Null);

        let back: BinaryFileInput = serde_json::from_value(json).unwrap();
        assert_eq!(back, input);
    }
}
