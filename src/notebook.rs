//! Jupyter notebook model and file I/O.
//!
//! Only the fields the translator reads are typed: the cell list, the cell
//! type tag and the cell source. Everything else (notebook metadata, cell
//! metadata, outputs, execution counts, attachments, ids) is carried through
//! untouched via `#[serde(flatten)]`, so a rebuilt notebook differs from the
//! original only in the `source` of the cells that were processed.

use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Top-level keys every nbformat 4 document must carry.
const REQUIRED_FIELDS: [&str; 4] = ["cells", "metadata", "nbformat", "nbformat_minor"];

/// A whole notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    pub metadata: Map<String, Value>,
    pub nbformat: u32,
    pub nbformat_minor: u32,
    /// Any other top-level key, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notebook {
    /// Copy of this notebook with its cell sequence replaced.
    pub fn with_cells(&self, cells: Vec<Cell>) -> Notebook {
        Notebook {
            cells,
            metadata: self.metadata.clone(),
            nbformat: self.nbformat,
            nbformat_minor: self.nbformat_minor,
            extra: self.extra.clone(),
        }
    }
}

/// One notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellKind,
    pub source: CellSource,
    /// `metadata`, `outputs`, `execution_count`, `id`, `attachments`, …
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Cell {
    /// Convenience constructor with no extra fields.
    pub fn new(cell_type: CellKind, source: impl Into<String>) -> Cell {
        Cell {
            cell_type,
            source: CellSource::Text(source.into()),
            rest: Map::new(),
        }
    }

    /// Copy of this cell with new source text, keeping the source representation.
    pub fn with_source_text(&self, text: &str) -> Cell {
        Cell {
            cell_type: self.cell_type.clone(),
            source: self.source.replaced_with(text),
            rest: self.rest.clone(),
        }
    }
}

/// The cell type tag.
///
/// Unknown tags (`raw`, or anything a future nbformat adds) are kept as-is so
/// they serialise back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellKind {
    Markdown,
    Code,
    Other(String),
}

impl CellKind {
    pub fn as_str(&self) -> &str {
        match self {
            CellKind::Markdown => "markdown",
            CellKind::Code => "code",
            CellKind::Other(tag) => tag,
        }
    }
}

impl From<String> for CellKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "markdown" => CellKind::Markdown,
            "code" => CellKind::Code,
            _ => CellKind::Other(tag),
        }
    }
}

impl From<CellKind> for String {
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell source: nbformat allows a single string or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    /// Lines in nbformat's convention: every line but the last keeps its `\n`.
    Lines(Vec<String>),
}

impl CellSource {
    /// The source as one string.
    pub fn to_text(&self) -> String {
        match self {
            CellSource::Text(text) => text.clone(),
            CellSource::Lines(lines) => lines.concat(),
        }
    }

    /// New source holding `text`, in the same representation as `self`.
    pub fn replaced_with(&self, text: &str) -> CellSource {
        match self {
            CellSource::Text(_) => CellSource::Text(text.to_string()),
            CellSource::Lines(_) => CellSource::Lines(split_keep_newlines(text)),
        }
    }
}

/// Split text into nbformat source lines, keeping each line's trailing `\n`.
pub fn split_keep_newlines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Read and validate a notebook file.
pub fn load_notebook(path: &Path) -> Result<Notebook, TranslateError> {
    if !path.exists() {
        return Err(TranslateError::NotebookNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|source| TranslateError::NotebookRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value =
        serde_json::from_str(&raw).map_err(|source| TranslateError::NotebookParse {
            path: path.to_path_buf(),
            source,
        })?;

    validate_structure(&value).map_err(|reason| TranslateError::InvalidNotebook {
        path: path.to_path_buf(),
        reason,
    })?;

    let notebook: Notebook =
        serde_json::from_value(value).map_err(|e| TranslateError::InvalidNotebook {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!("Loaded {} cells from {}", notebook.cells.len(), path.display());
    Ok(notebook)
}

/// Check the nbformat skeleton before typed deserialisation so the error
/// names the missing piece.
fn validate_structure(value: &Value) -> Result<(), String> {
    let root = value
        .as_object()
        .ok_or_else(|| "top level is not a JSON object".to_string())?;

    for field in REQUIRED_FIELDS {
        if !root.contains_key(field) {
            return Err(format!("missing top-level field '{field}'"));
        }
    }

    let cells = root["cells"]
        .as_array()
        .ok_or_else(|| "'cells' is not an array".to_string())?;

    for (i, cell) in cells.iter().enumerate() {
        let cell = cell
            .as_object()
            .ok_or_else(|| format!("cell {i} is not an object"))?;
        for field in ["cell_type", "source"] {
            if !cell.contains_key(field) {
                return Err(format!("cell {i} is missing '{field}'"));
            }
        }
    }

    Ok(())
}

/// Derive the output path: `dir/name.ext` → `dir/name{suffix}.ext`.
pub fn output_path_for(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(file_name)
}

/// Serialise a notebook the way Jupyter does (1-space indent, trailing newline).
pub fn to_notebook_json(notebook: &Notebook) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    notebook.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write a notebook, creating missing parent directories.
///
/// Uses atomic write (temp file in the target directory + rename) so an
/// interrupted run never leaves a truncated notebook behind.
pub fn write_notebook(notebook: &Notebook, path: &Path) -> Result<(), TranslateError> {
    let write_err = |source: std::io::Error| TranslateError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let bytes = to_notebook_json(notebook).map_err(|e| write_err(e.into()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Translated notebook saved to: {}", path.display());
    Ok(())
}
