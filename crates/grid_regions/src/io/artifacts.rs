use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::{
    error::{DetectError, Result},
    traits::ArtifactSink,
    types::CandidateRecord,
};

/// Writes artifacts as files in one output directory.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    output_dir: PathBuf,
}

impl FsArtifactSink {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ArtifactSink for FsArtifactSink {
    fn persist(&self, file_name: &str, encoded: &[u8]) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let write_err = |source| DetectError::ArtifactWrite {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.output_dir).map_err(write_err)?;
        // The handle is released when the writer drops, on every path out.
        let mut writer = BufWriter::new(File::create(&path).map_err(write_err)?);
        writer.write_all(encoded).map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        Ok(path)
    }

    fn discard(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serialize records as JSON lines, one record per line.
pub fn records_to_json_lines(records: &[CandidateRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parse records written by [`records_to_json_lines`].
pub fn records_from_json_lines(content: &str) -> Result<Vec<CandidateRecord>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Ok(serde_json::from_str(line)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    #[test]
    fn test_persist_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path().join("nested").join("out"));

        let path = sink.persist("p1_cand_0.png", b"first").unwrap();
        assert_eq!(path, dir.path().join("nested/out/p1_cand_0.png"));
        assert_eq!(fs::read(&path).unwrap(), b"first");

        sink.persist("p1_cand_0.png", b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_persist_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"").unwrap();

        let sink = FsArtifactSink::new(&blocker);
        let err = sink.persist("p1_cand_0.png", b"data").unwrap_err();
        match err {
            DetectError::ArtifactWrite { path, .. } => assert_eq!(path, blocker.join("p1_cand_0.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_discard_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let path = sink.persist("p2_cand_1.png", b"data").unwrap();

        sink.discard(&path).unwrap();
        assert!(!path.exists());
        sink.discard(&path).unwrap();
    }

    #[test]
    fn test_json_lines_round_trip() {
        let records = vec![
            CandidateRecord {
                page_index: 1,
                sequence_index: 0,
                bbox: BoundingBox::new(10, 20, 300, 200),
                joint_count: Some(12),
                file_path: PathBuf::from("out/p1_cand_0.png"),
            },
            CandidateRecord {
                page_index: 3,
                sequence_index: 1,
                bbox: BoundingBox::new(0, 0, 150, 100),
                joint_count: None,
                file_path: PathBuf::from("out/p3_cand_1.png"),
            },
        ];

        let text = records_to_json_lines(&records).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.lines().nth(1).unwrap().contains("joint_count"));
        assert_eq!(records_from_json_lines(&text).unwrap(), records);
    }
}
