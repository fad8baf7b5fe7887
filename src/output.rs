//! Result types returned by a translation run.

use crate::notebook::CellKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CellOutcome {
    /// Markdown cell walked section by section.
    Translated {
        sections_translated: usize,
        sections_failed: usize,
        images_described: usize,
        images_failed: usize,
    },
    /// Code cell came back from the model with comments.
    Annotated,
    /// The annotate call failed; the original code was kept.
    AnnotationFailed { reason: String },
    /// Unsupported cell type, copied unchanged.
    PassedThrough,
}

impl CellOutcome {
    /// Whether any part of the cell fell back to its original content.
    pub fn has_failures(&self) -> bool {
        match self {
            CellOutcome::Translated {
                sections_failed,
                images_failed,
                ..
            } => *sections_failed > 0 || *images_failed > 0,
            CellOutcome::AnnotationFailed { .. } => true,
            CellOutcome::Annotated | CellOutcome::PassedThrough => false,
        }
    }

    /// One-line description for logs and progress output.
    pub fn summary(&self) -> String {
        match self {
            CellOutcome::Translated {
                sections_translated,
                sections_failed,
                images_described,
                images_failed,
            } => {
                let mut s = format!("{sections_translated} sections");
                if *images_described > 0 {
                    s.push_str(&format!(", {images_described} images"));
                }
                let skipped = sections_failed + images_failed;
                if skipped > 0 {
                    s.push_str(&format!(", {skipped} skipped"));
                }
                s
            }
            CellOutcome::Annotated => "commented".to_string(),
            CellOutcome::AnnotationFailed { reason } => format!("kept original: {reason}"),
            CellOutcome::PassedThrough => "unchanged".to_string(),
        }
    }
}

/// Per-cell entry of the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReport {
    /// 0-based position in the notebook.
    pub index: usize,
    pub kind: CellKind,
    #[serde(flatten)]
    pub outcome: CellOutcome,
}

impl CellReport {
    pub fn new(index: usize, kind: CellKind, outcome: CellOutcome) -> Self {
        Self {
            index,
            kind,
            outcome,
        }
    }
}

/// Aggregate counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    pub total_cells: usize,
    pub markdown_cells: usize,
    pub code_cells: usize,
    pub passthrough_cells: usize,
    pub sections_translated: usize,
    pub sections_failed: usize,
    pub images_described: usize,
    pub images_failed: usize,
    pub code_cells_annotated: usize,
    pub code_cells_failed: usize,
    pub total_duration_ms: u64,
}

impl TranslationStats {
    /// Fold per-cell reports into totals.
    pub fn from_reports(reports: &[CellReport], total_duration_ms: u64) -> Self {
        let mut stats = TranslationStats {
            total_cells: reports.len(),
            total_duration_ms,
            ..Default::default()
        };
        for report in reports {
            match &report.outcome {
                CellOutcome::Translated {
                    sections_translated,
                    sections_failed,
                    images_described,
                    images_failed,
                } => {
                    stats.markdown_cells += 1;
                    stats.sections_translated += sections_translated;
                    stats.sections_failed += sections_failed;
                    stats.images_described += images_described;
                    stats.images_failed += images_failed;
                }
                CellOutcome::Annotated => {
                    stats.code_cells += 1;
                    stats.code_cells_annotated += 1;
                }
                CellOutcome::AnnotationFailed { .. } => {
                    stats.code_cells += 1;
                    stats.code_cells_failed += 1;
                }
                CellOutcome::PassedThrough => stats.passthrough_cells += 1,
            }
        }
        stats
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutput {
    /// Where the translated notebook was written.
    pub output_path: PathBuf,
    /// Number of cells written (always equal to the input cell count).
    pub cells: usize,
    pub reports: Vec<CellReport>,
    pub stats: TranslationStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_skips_only_when_present() {
        let clean = CellOutcome::Translated {
            sections_translated: 3,
            sections_failed: 0,
            images_described: 0,
            images_failed: 0,
        };
        assert_eq!(clean.summary(), "3 sections");

        let partial = CellOutcome::Translated {
            sections_translated: 1,
            sections_failed: 1,
            images_described: 2,
            images_failed: 1,
        };
        assert_eq!(partial.summary(), "1 sections, 2 images, 2 skipped");
        assert_eq!(CellOutcome::PassedThrough.summary(), "unchanged");
    }

    #[test]
    fn stats_fold_every_outcome() {
        let reports = vec![
            CellReport::new(
                0,
                CellKind::Markdown,
                CellOutcome::Translated {
                    sections_translated: 2,
                    sections_failed: 1,
                    images_described: 1,
                    images_failed: 0,
                },
            ),
            CellReport::new(1, CellKind::Code, CellOutcome::Annotated),
            CellReport::new(
                2,
                CellKind::Code,
                CellOutcome::AnnotationFailed {
                    reason: "timeout".into(),
                },
            ),
            CellReport::new(3, CellKind::Other("raw".into()), CellOutcome::PassedThrough),
        ];
        let stats = TranslationStats::from_reports(&reports, 42);
        assert_eq!(stats.total_cells, 4);
        assert_eq!(stats.markdown_cells, 1);
        assert_eq!(stats.code_cells, 2);
        assert_eq!(stats.passthrough_cells, 1);
        assert_eq!(stats.sections_translated, 2);
        assert_eq!(stats.sections_failed, 1);
        assert_eq!(stats.code_cells_failed, 1);
        assert_eq!(stats.total_duration_ms, 42);
        assert!(reports[0].outcome.has_failures());
        assert!(!reports[1].outcome.has_failures());
    }

    #[test]
    fn report_serialises_flat() {
        let r = CellReport::new(3, CellKind::Other("raw".into()), CellOutcome::PassedThrough);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["kind"], "raw");
        assert_eq!(v["outcome"], "passed_through");
    }
}
