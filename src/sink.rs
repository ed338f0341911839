use crate::artifact::Artifact;
use crate::error::{CertSplitError, Result};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where extracted artifacts go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// One file per artifact.
    Files,
    /// Artifact contents on stdout, one per line.
    Stdout,
    /// A single JSON object on stdout.
    Json,
}

impl SinkMode {
    /// `json` implies stdout output.
    pub fn from_flags(stdout: bool, json: bool) -> Self {
        if json {
            SinkMode::Json
        } else if stdout {
            SinkMode::Stdout
        } else {
            SinkMode::Files
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SinkReport {
    pub artifacts: usize,
    pub files_written: Vec<PathBuf>,
    pub bytes_written: u64,
}

pub struct Sink {
    mode: SinkMode,
    directory: PathBuf,
}

impl Sink {
    pub fn new(mode: SinkMode) -> Self {
        Self {
            mode,
            directory: PathBuf::from("."),
        }
    }

    pub fn with_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.directory = directory.into();
        self
    }

    /// Emit every artifact in order. Stdout modes write to `out`; file mode
    /// ignores it.
    pub fn emit<W: Write>(&self, artifacts: &[Artifact], out: &mut W) -> Result<SinkReport> {
        let mut report = SinkReport {
            artifacts: artifacts.len(),
            ..SinkReport::default()
        };

        match self.mode {
            SinkMode::Json => {
                let json = to_json_object(artifacts)?;
                writeln!(out, "{}", json)?;
                out.flush()?;
                report.bytes_written = json.len() as u64 + 1;
            }
            SinkMode::Stdout => {
                for artifact in artifacts {
                    let printable = artifact.contents.to_printable();
                    writeln!(out, "{}", printable)?;
                    report.bytes_written += printable.len() as u64 + 1;
                }
                out.flush()?;
            }
            SinkMode::Files => {
                for artifact in artifacts {
                    let path = self.directory.join(&artifact.filename);
                    write_file(&path, artifact.contents.as_bytes(), artifact.mode)?;
                    info!("Wrote {} to {}", artifact.kind, path.display());
                    report.bytes_written += artifact.contents.len() as u64;
                    report.files_written.push(path);
                }
            }
        }

        Ok(report)
    }
}

/// Filename to printable contents, keys sorted.
pub fn to_json_object(artifacts: &[Artifact]) -> Result<String> {
    let object: BTreeMap<&str, String> = artifacts
        .iter()
        .map(|artifact| (artifact.filename.as_str(), artifact.contents.to_printable()))
        .collect();

    serde_json::to_string(&object).map_err(CertSplitError::Marshal)
}

/// Write `contents` to `path`, replacing any existing file, and apply `mode`.
pub fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let to_write_error = |e: std::io::Error| CertSplitError::Write {
        path: path.display().to_string(),
        source: e,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options.open(path).map_err(to_write_error)?;
    file.write_all(contents).map_err(to_write_error)?;
    file.flush().map_err(to_write_error)?;

    // The mode given to open() only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(to_write_error)?;
    }

    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use tempfile::TempDir;

    fn sample_artifacts() -> Vec<Artifact> {
        vec![
            Artifact::text(ArtifactKind::Certificate, "mycert", "CERTDATA"),
            Artifact::text(ArtifactKind::PrivateKey, "mycert", "KEYDATA"),
            Artifact::binary(ArtifactKind::OcspResponse, "mycert", vec![0x30, 0x03]),
        ]
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(SinkMode::from_flags(false, false), SinkMode::Files);
        assert_eq!(SinkMode::from_flags(true, false), SinkMode::Stdout);
        assert_eq!(SinkMode::from_flags(false, true), SinkMode::Json);
        assert_eq!(SinkMode::from_flags(true, true), SinkMode::Json);
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        let report = Sink::new(SinkMode::Json)
            .emit(&sample_artifacts(), &mut out)
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"mycert-key.pem\":\"KEYDATA\",\"mycert-response.der\":\"MAM=\",\"mycert.pem\":\"CERTDATA\"}\n"
        );
        assert_eq!(report.artifacts, 3);
        assert!(report.files_written.is_empty());
    }

    #[test]
    fn test_json_output_without_artifacts() {
        let mut out = Vec::new();
        Sink::new(SinkMode::Json).emit(&[], &mut out).unwrap();
        assert_eq!(out, b"{}\n");
    }

    #[test]
    fn test_stdout_output_keeps_order() {
        let mut out = Vec::new();
        Sink::new(SinkMode::Stdout)
            .emit(&sample_artifacts(), &mut out)
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "CERTDATA\nKEYDATA\nMAM=\n");
    }

    #[test]
    fn test_file_output() {
        let temp_dir = TempDir::new().unwrap();
        let mut out = Vec::new();

        let report = Sink::new(SinkMode::Files)
            .with_directory(temp_dir.path())
            .emit(&sample_artifacts(), &mut out)
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(report.files_written.len(), 3);
        assert_eq!(report.bytes_written, 8 + 7 + 2);

        let dir = temp_dir.path();
        assert_eq!(fs::read_to_string(dir.join("mycert.pem")).unwrap(), "CERTDATA");
        assert_eq!(fs::read_to_string(dir.join("mycert-key.pem")).unwrap(), "KEYDATA");
        assert_eq!(fs::read(dir.join("mycert-response.der")).unwrap(), vec![0x30, 0x03]);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let key_path = temp_dir.path().join("mycert-key.pem");

        // An existing world-readable key must be tightened.
        fs::write(&key_path, "old").unwrap();
        fs::set_permissions(&key_path, fs::Permissions::from_mode(0o644)).unwrap();

        Sink::new(SinkMode::Files)
            .with_directory(temp_dir.path())
            .emit(&sample_artifacts(), &mut std::io::sink())
            .unwrap();

        let mode_of = |name: &str| {
            fs::metadata(temp_dir.path().join(name))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode_of("mycert.pem"), 0o664);
        assert_eq!(mode_of("mycert-key.pem"), 0o600);
        assert_eq!(mode_of("mycert-response.der"), 0o644);
        assert_eq!(fs::read_to_string(&key_path).unwrap(), "KEYDATA");
    }

    #[test]
    fn test_rewrite_is_identical() {
        let temp_dir = TempDir::new().unwrap();
        let sink = Sink::new(SinkMode::Files).with_directory(temp_dir.path());

        sink.emit(&sample_artifacts(), &mut std::io::sink()).unwrap();
        let first = fs::read(temp_dir.path().join("mycert-response.der")).unwrap();

        sink.emit(&sample_artifacts(), &mut std::io::sink()).unwrap();
        let second = fs::read(temp_dir.path().join("mycert-response.der")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = Sink::new(SinkMode::Files)
            .with_directory(&missing)
            .emit(&sample_artifacts(), &mut std::io::sink())
            .unwrap_err();

        match err {
            CertSplitError::Write { path, .. } => assert!(path.ends_with("mycert.pem")),
            other => panic!("expected Write error, got {:?}", other),
        }
    }
}
