//! Markdown cells: section-wise translation and image descriptions.
//!
//! A cell is split into sections at blank lines and heading lines. Each
//! section is copied verbatim, then followed by a description block for every
//! image it references and a translation block when it carries prose:
//!
//! ```text
//! ## Results
//! ![loss](loss.png)
//!
//! **Image Description：**
//! <description of loss.png>
//!
//! **Translation：**
//! <translated section>
//!
//! ```
//!
//! A failed image or a failed translation is logged and skipped; the rest of
//! the section and the cell carry on.

use crate::labels::{description_label, translation_label};
use crate::pipeline::gateway::{log_failure, Gateway};
use crate::pipeline::image::ImageResolver;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// What happened while processing one markdown cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownOutcome {
    /// New cell text.
    pub text: String,
    pub sections_translated: usize,
    pub sections_failed: usize,
    pub images_described: usize,
    pub images_failed: usize,
}

/// Group lines into sections.
///
/// A blank line closes the current section and is dropped. A line starting
/// with `#` closes the current section and opens the next one.
pub fn split_sections(text: &str) -> Vec<Vec<&str>> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let blank = line.trim().is_empty();
        if blank || line.starts_with('#') {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            if !blank {
                current.push(line);
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

/// Every `![alt](src)` source in `text`, in order of appearance.
pub fn find_image_references(text: &str) -> Vec<&str> {
    RE_IMAGE
        .captures_iter(text)
        .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
        .collect()
}

/// Whether a section has a non-blank line that is not an image line.
pub fn has_translatable_prose(section: &[&str]) -> bool {
    section
        .iter()
        .any(|line| !line.trim().is_empty() && !line.starts_with('!'))
}

/// Translate a markdown cell section by section and describe its images.
///
/// Empty input is returned unchanged.
pub async fn process_markdown(
    text: &str,
    target_language: &str,
    source_document: Option<&Path>,
    gateway: &Gateway,
    resolver: &ImageResolver,
) -> MarkdownOutcome {
    let mut outcome = MarkdownOutcome::default();
    if text.is_empty() {
        return outcome;
    }

    let description_label = description_label(target_language);
    let translation_label = translation_label(target_language);
    let mut lines: Vec<String> = Vec::new();

    for section in split_sections(text) {
        let section_text = section.join("\n");
        lines.extend(section.iter().map(|line| line.to_string()));

        for src in find_image_references(&section_text) {
            let described = match resolver.resolve(src, source_document).await {
                Ok(bytes) => gateway
                    .try_describe(&bytes, target_language)
                    .await
                    .map_err(|e| {
                        log_failure("Image description", &e);
                        e.to_string()
                    }),
                Err(e) => Err(e.to_string()),
            };

            match described {
                Ok(description) => {
                    lines.push(String::new());
                    lines.push(format!("**{description_label}：**"));
                    lines.push(description);
                    outcome.images_described += 1;
                    debug!("Generated image description for: {}", src);
                }
                Err(reason) => {
                    warn!("Could not process image {}: {}", src, reason);
                    outcome.images_failed += 1;
                }
            }
        }

        if has_translatable_prose(&section) {
            match gateway.try_translate(&section_text, target_language).await {
                Ok(translation) => {
                    lines.push(String::new());
                    lines.push(format!("**{translation_label}：**"));
                    lines.push(translation);
                    outcome.sections_translated += 1;
                    debug!("Translated section: {}", preview(&section_text));
                }
                Err(e) => {
                    log_failure("Translation", &e);
                    warn!("Could not translate section: {}", preview(&section_text));
                    outcome.sections_failed += 1;
                }
            }
        }

        lines.push(String::new());
    }

    outcome.text = lines.join("\n");
    outcome
}

/// First 50 characters of a section, for log lines.
fn preview(text: &str) -> String {
    let mut p: String = text.chars().take(50).collect();
    if p.len() < text.len() {
        p.push('…');
    }
    p
}
