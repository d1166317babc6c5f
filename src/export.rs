//! Whole-file export.
//!
//! Every topic is rendered on the rayon thread pool. Each worker owns its
//! own [`BhfFile`] over a shared copy of the file bytes, so no cursor is
//! ever shared between threads.

use crate::bhf::BhfFile;
use crate::error::{Diagnostic, Result};
use crate::model::{ContextOffset, Document, Topic};
use crate::parse_options::ParseOptions;
use crate::render::{RenderOptions, TextFormat};
use log::{debug, info};
use rayon::prelude::*;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Renders every topic of a file.
///
/// Fails with the first error encountered, in topic order. Problems the
/// lenient mode steps over are kept on each [`Topic`].
pub fn render_all(
    data: impl Into<Arc<[u8]>>,
    document: &Document,
    parse_options: &ParseOptions,
    options: &RenderOptions,
) -> Result<Vec<Topic>> {
    render_all_with_progress(data, document, parse_options, options, |_| {})
        .into_iter()
        .collect()
}

/// Renders every topic of a file, calling `progress` as each one finishes.
///
/// Results are returned in ascending offset order, one per distinct topic.
pub fn render_all_with_progress<F>(
    data: impl Into<Arc<[u8]>>,
    document: &Document,
    parse_options: &ParseOptions,
    options: &RenderOptions,
    progress: F,
) -> Vec<Result<Topic>>
where
    F: Fn(ContextOffset) + Sync,
{
    let data: Arc<[u8]> = data.into();
    let offsets = document.topic_offsets();
    info!("Rendering {} topics", offsets.len());

    offsets
        .par_iter()
        .map_init(
            || {
                BhfFile::with_document(
                    Cursor::new(Arc::clone(&data)),
                    document.clone(),
                    parse_options.clone(),
                )
            },
            |file, &offset| -> Result<Topic> {
                // Each worker's handle outlives many topics; keep only this one's problems
                let seen = file.diagnostics().len();
                let result = file.render_text_with_options(offset, options);
                progress(offset);

                let content = result?;
                Ok(Topic {
                    offset,
                    contexts: document.contexts_at(offset),
                    content,
                    diagnostics: file.diagnostics()[seen..].to_vec(),
                })
            },
        )
        .collect()
}

/// Collects the diagnostics of every topic, in topic order.
pub fn diagnostics(topics: &[Topic]) -> impl Iterator<Item = &Diagnostic> {
    topics.iter().flat_map(|topic| topic.diagnostics.iter())
}

/// File stem used for an exported topic.
pub fn topic_stem(topic: &Topic) -> String {
    match topic.contexts.first() {
        Some(id) => format!("context-{}", id),
        None => format!("offset-{}", topic.offset),
    }
}

/// Writes rendered topics below `dir`.
///
/// Plain text topics get one file each. HTML topics are written to a
/// single `index.html` in which every context id is an anchor, so the
/// default `#context-N` links resolve within the page.
pub fn write_topics(topics: &[Topic], dir: impl AsRef<Path>, format: TextFormat) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    match format {
        TextFormat::PlainText => {
            let mut written = Vec::with_capacity(topics.len());
            for topic in topics {
                let path = dir.join(format!("{}.{}", topic_stem(topic), format.extension()));
                std::fs::write(&path, &topic.content)?;
                written.push(path);
            }
            debug!("Wrote {} topic files to {}", written.len(), dir.display());
            Ok(written)
        }
        TextFormat::Html => {
            let path = dir.join("index.html");
            let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
            write_html_book(topics, &mut file)?;
            file.flush()?;
            Ok(vec![path])
        }
    }
}

/// Writes rendered HTML topics as one page.
pub fn write_html_book<W: Write>(topics: &[Topic], writer: &mut W) -> Result<()> {
    writeln!(writer, "<!DOCTYPE html>")?;
    writeln!(writer, "<html><head><meta charset=\"utf-8\"></head><body>")?;
    for topic in topics {
        writeln!(writer, "<section>")?;
        for id in &topic.contexts {
            writeln!(writer, "<a id=\"context-{}\"></a>", id)?;
        }
        writeln!(writer, "{}", topic.content)?;
        writeln!(writer, "</section>")?;
    }
    writeln!(writer, "</body></html>")?;
    Ok(())
}
