//! Multi-page scanning.
//!
//! Pages are detected and cropped in parallel, merged back in page order,
//! numbered, then persisted. Numbering after the merge means no counter is
//! shared between workers.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    config::SequenceScope,
    error::{DetectError, Result},
    pipeline::{persist, Detector, RenderedCandidate},
    traits::{ArtifactSink, CandidateClassifier, PageSource},
    types::{CandidateRecord, CroppedArtifact},
};

/// A page that contributed no candidates because it could not be loaded.
#[derive(Debug)]
pub struct PageFailure {
    pub page_index: usize,
    pub error: DetectError,
}

/// A candidate that was detected but could not be encoded or written.
#[derive(Debug)]
pub struct ArtifactFailure {
    pub page_index: usize,
    pub sequence_index: usize,
    pub error: DetectError,
}

/// Outcome of scanning a whole document.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub page_count: usize,
    /// Persisted artifacts in page order, then discovery order
    pub artifacts: Vec<CroppedArtifact>,
    pub skipped_pages: Vec<PageFailure>,
    pub artifact_failures: Vec<ArtifactFailure>,
}

impl ScanReport {
    pub fn records(&self) -> Vec<CandidateRecord> {
        self.artifacts.iter().map(CroppedArtifact::record).collect()
    }

    /// Keep only the artifacts `classifier` confirms as tables and delete
    /// the rest from `sink`. Returns how many were discarded.
    ///
    /// A classifier error counts as a rejection.
    pub fn retain_tables(&mut self, classifier: &dyn CandidateClassifier, sink: &dyn ArtifactSink) -> usize {
        let before = self.artifacts.len();
        self.artifacts.retain(|artifact| {
            let accepted = match classifier.is_table(artifact) {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(path = %artifact.path.display(), "classifier failed: {e}");
                    false
                }
            };

            if accepted {
                info!(path = %artifact.path.display(), "accepted");
            } else {
                info!(path = %artifact.path.display(), "discarded");
                if let Err(e) = sink.discard(&artifact.path) {
                    warn!(path = %artifact.path.display(), "failed to remove discarded artifact: {e}");
                }
            }
            accepted
        });

        let discarded = before - self.artifacts.len();
        info!(accepted = self.artifacts.len(), discarded, "classification complete");
        discarded
    }
}

impl Detector {
    /// Scan every page of `source`, persisting accepted candidates to `sink`.
    ///
    /// Undecodable pages and failed writes are recorded in the report and do
    /// not stop the scan.
    pub fn scan_document(&self, source: &dyn PageSource, sink: &dyn ArtifactSink) -> ScanReport {
        let page_count = source.page_count();
        info!(pages = page_count, "{}", self.info());

        // Per-page work; the page image is dropped once its crops are encoded.
        let pages: Vec<(usize, Result<Vec<RenderedCandidate>>)> = (1..=page_count)
            .into_par_iter()
            .map(|page_index| {
                let rendered = source.load_page(page_index).map(|page| {
                    let regions = self.detect(&page);
                    self.render(&page, regions)
                });
                (page_index, rendered)
            })
            .collect();

        let mut report = ScanReport {
            page_count,
            ..ScanReport::default()
        };

        // Merge in page order and assign sequence indices.
        let mut pending = Vec::new();
        let mut next_sequence = 0;
        for (page_index, rendered) in pages {
            let rendered = match rendered {
                Ok(rendered) => rendered,
                Err(error) => {
                    warn!(page = page_index, "skipping page: {error}");
                    report.skipped_pages.push(PageFailure { page_index, error });
                    continue;
                }
            };

            if rendered.is_empty() {
                debug!(page = page_index, "no candidate regions");
            } else {
                info!(page = page_index, "found {} candidate regions", rendered.len());
            }

            if self.config().sequence_scope == SequenceScope::Page {
                next_sequence = 0;
            }
            for mut candidate in rendered {
                candidate.region.sequence_index = next_sequence;
                next_sequence += 1;
                pending.push(candidate);
            }
        }

        let persisted: Vec<(usize, usize, Result<CroppedArtifact>)> = pending
            .into_par_iter()
            .map(|candidate| {
                let (page, sequence) = (candidate.region.page_index, candidate.region.sequence_index);
                (page, sequence, persist(candidate, sink))
            })
            .collect();

        for (page_index, sequence_index, outcome) in persisted {
            match outcome {
                Ok(artifact) => report.artifacts.push(artifact),
                Err(error) => {
                    warn!(page = page_index, sequence = sequence_index, "failed to save candidate: {error}");
                    report.artifact_failures.push(ArtifactFailure {
                        page_index,
                        sequence_index,
                        error,
                    });
                }
            }
        }

        info!(
            candidates = report.artifacts.len(),
            skipped_pages = report.skipped_pages.len(),
            failed = report.artifact_failures.len(),
            "detection phase complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use crate::config::DetectorConfig;
    use crate::io::{FsArtifactSink, MemoryPageSource};
    use crate::testing::{blank_page, draw_grid, draw_outline};
    use crate::types::PageImage;

    fn two_table_page(page_index: usize) -> PageImage {
        let mut page = blank_page(page_index, 800, 1000);
        draw_grid(&mut page, 50, 50, 700, 400, 6, 5, 2);
        draw_grid(&mut page, 100, 600, 600, 900, 4, 4, 2);
        page
    }

    fn document() -> MemoryPageSource {
        let mut outline = blank_page(3, 800, 1000);
        draw_outline(&mut outline, 100, 100, 600, 500, 2);
        MemoryPageSource::new(vec![
            two_table_page(1),
            blank_page(2, 800, 1000),
            outline,
            two_table_page(4),
        ])
    }

    /// Fails to load the pages listed in `bad`
    struct FlakySource {
        inner: MemoryPageSource,
        bad: Vec<usize>,
    }

    impl PageSource for FlakySource {
        fn page_count(&self) -> usize {
            self.inner.page_count()
        }

        fn load_page(&self, page_index: usize) -> Result<PageImage> {
            if self.bad.contains(&page_index) {
                return Err(DetectError::PageDecode {
                    page_index,
                    reason: "corrupt raster".to_string(),
                });
            }
            self.inner.load_page(page_index)
        }
    }

    /// Refuses to write one specific file
    struct RefusingSink {
        inner: FsArtifactSink,
        refuse: String,
    }

    impl ArtifactSink for RefusingSink {
        fn persist(&self, file_name: &str, encoded: &[u8]) -> Result<PathBuf> {
            if file_name == self.refuse {
                return Err(DetectError::ArtifactWrite {
                    path: self.inner.output_dir().join(file_name),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.persist(file_name, encoded)
        }

        fn discard(&self, path: &Path) -> Result<()> {
            self.inner.discard(path)
        }
    }

    /// Accepts tall artifacts and errors on everything from page 4
    struct JointClassifier {
        calls: Mutex<usize>,
    }

    impl CandidateClassifier for JointClassifier {
        fn is_table(&self, artifact: &CroppedArtifact) -> Result<bool> {
            *self.calls.lock().unwrap() += 1;
            if artifact.region.page_index == 4 {
                return Err(DetectError::Classifier("service unavailable".to_string()));
            }
            Ok(artifact.region.bbox.height > 350)
        }
    }

    fn file_names(report: &ScanReport) -> Vec<String> {
        report
            .artifacts
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_document_sequence_is_global_in_page_order() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let detector = Detector::new(DetectorConfig::permissive()).unwrap();

        let report = detector.scan_document(&document(), &sink);
        assert_eq!(report.page_count, 4);
        assert_eq!(report.artifacts.len(), 5);
        assert!(report.skipped_pages.is_empty());

        let pages: Vec<usize> = report.artifacts.iter().map(|a| a.region.page_index).collect();
        assert_eq!(pages, vec![1, 1, 3, 4, 4]);
        let sequence: Vec<usize> = report.artifacts.iter().map(|a| a.region.sequence_index).collect();
        assert_eq!(sequence, vec![0, 1, 2, 3, 4]);
        assert_eq!(file_names(&report)[2], "p3_cand_2.png");
        for artifact in &report.artifacts {
            assert!(artifact.path.exists());
        }
    }

    #[test]
    fn test_page_scope_restarts_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let config = DetectorConfig::permissive().with_sequence_scope(SequenceScope::Page);
        let report = Detector::new(config).unwrap().scan_document(&document(), &sink);

        assert_eq!(
            file_names(&report),
            vec!["p1_cand_0.png", "p1_cand_1.png", "p3_cand_0.png", "p4_cand_0.png", "p4_cand_1.png"]
        );
    }

    #[test]
    fn test_strict_scan_drops_outline_page() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let report = Detector::new(DetectorConfig::strict()).unwrap().scan_document(&document(), &sink);

        let pages: Vec<usize> = report.artifacts.iter().map(|a| a.region.page_index).collect();
        assert_eq!(pages, vec![1, 1, 4, 4]);
        assert!(report.artifacts.iter().all(|a| a.region.joint_count.unwrap() >= 10));
        assert!(!dir.path().join("p3_cand_2.png").exists());
    }

    #[test]
    fn test_corrupt_page_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let source = FlakySource {
            inner: document(),
            bad: vec![1],
        };

        let report = Detector::new(DetectorConfig::permissive()).unwrap().scan_document(&source, &sink);
        assert_eq!(report.skipped_pages.len(), 1);
        assert_eq!(report.skipped_pages[0].page_index, 1);
        assert_eq!(file_names(&report), vec!["p3_cand_0.png", "p4_cand_1.png", "p4_cand_2.png"]);
    }

    #[test]
    fn test_write_failure_only_loses_one_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RefusingSink {
            inner: FsArtifactSink::new(dir.path()),
            refuse: "p1_cand_1.png".to_string(),
        };

        let report = Detector::new(DetectorConfig::permissive()).unwrap().scan_document(&document(), &sink);
        assert_eq!(report.artifacts.len(), 4);
        assert_eq!(report.artifact_failures.len(), 1);
        let failure = &report.artifact_failures[0];
        assert_eq!((failure.page_index, failure.sequence_index), (1, 1));
        assert!(matches!(failure.error, DetectError::ArtifactWrite { .. }));
    }

    #[test]
    fn test_rescan_overwrites_with_identical_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let detector = Detector::new(DetectorConfig::strict()).unwrap();

        let first = detector.scan_document(&document(), &sink).records();
        let second = detector.scan_document(&document(), &sink).records();
        assert_eq!(first, second);
    }

    #[test]
    fn test_retain_tables_deletes_rejected_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let mut report = Detector::new(DetectorConfig::permissive()).unwrap().scan_document(&document(), &sink);
        let all_paths: Vec<PathBuf> = report.artifacts.iter().map(|a| a.path.clone()).collect();

        let classifier = JointClassifier { calls: Mutex::new(0) };
        let discarded = report.retain_tables(&classifier, &sink);

        assert_eq!(*classifier.calls.lock().unwrap(), 5);
        // Tall grid on page 1 and the outline on page 3 survive
        assert_eq!(discarded, 3);
        let kept: Vec<usize> = report.artifacts.iter().map(|a| a.region.page_index).collect();
        assert_eq!(kept, vec![1, 3]);
        for path in all_paths {
            let still_listed = report.artifacts.iter().any(|a| a.path == path);
            assert_eq!(path.exists(), still_listed);
        }
    }
}
