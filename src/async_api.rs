//! Async API for non-blocking help file processing.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! unbhf = { version = "0.1", features = ["async"] }
//! ```
//!
//! The file is read with tokio; decoding is CPU-bound and runs on the
//! blocking pool over an in-memory copy.

use crate::bhf::BhfFile;
use crate::error::{Error, Result};
use crate::model::{ContextId, Topic};
use crate::render::{RenderOptions, TextFormat};
use crate::ParseOptions;
use std::io::Cursor;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

/// An open help file backed by an in-memory copy.
pub type MemoryBhfFile = BhfFile<Cursor<Vec<u8>>>;

async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
}

/// Asynchronously opens a help file from a path.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unbhf::Result<()> {
/// let file = unbhf::async_api::open("TURBO.TPH").await?;
/// println!("Contexts: {}", file.contexts().len());
/// # Ok(())
/// # }
/// ```
pub async fn open(path: impl AsRef<Path>) -> Result<MemoryBhfFile> {
    let data = fs::read(path).await?;
    open_bytes(data).await
}

/// Asynchronously parses a help file held in memory.
pub async fn open_bytes(data: Vec<u8>) -> Result<MemoryBhfFile> {
    open_bytes_with_options(data, ParseOptions::default()).await
}

/// Asynchronously parses a help file held in memory with custom options.
pub async fn open_bytes_with_options(data: Vec<u8>, options: ParseOptions) -> Result<MemoryBhfFile> {
    blocking(move || BhfFile::from_reader_with_options(Cursor::new(data), options)).await
}

/// Asynchronously parses a help file from an async reader.
pub async fn open_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<MemoryBhfFile> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    open_bytes(data).await
}

/// Asynchronously renders one context as plain text.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unbhf::Result<()> {
/// let text = unbhf::async_api::extract_text("TURBO.TPH", 0).await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
pub async fn extract_text(path: impl AsRef<Path>, id: ContextId) -> Result<String> {
    render_context(path, id, RenderOptions::default()).await
}

/// Asynchronously renders one context as HTML.
pub async fn to_html(path: impl AsRef<Path>, id: ContextId) -> Result<String> {
    render_context(path, id, TextFormat::Html.into()).await
}

/// Asynchronously renders one context with custom options.
pub async fn render_context(
    path: impl AsRef<Path>,
    id: ContextId,
    options: RenderOptions,
) -> Result<String> {
    let mut file = open(path).await?;
    blocking(move || file.render_context_with_options(id, &options)).await
}

/// Asynchronously renders every topic of a file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unbhf::Result<()> {
/// let topics = unbhf::async_api::render_all("TURBO.TPH", Default::default()).await?;
/// for topic in topics {
///     tokio::fs::write(format!("{}.txt", topic.offset), topic.content).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn render_all(path: impl AsRef<Path>, options: RenderOptions) -> Result<Vec<Topic>> {
    render_all_with_options(path, ParseOptions::default(), options).await
}

/// Asynchronously renders every topic of a file with custom parse options.
pub async fn render_all_with_options(
    path: impl AsRef<Path>,
    parse_options: ParseOptions,
    options: RenderOptions,
) -> Result<Vec<Topic>> {
    let data = fs::read(path).await?;
    blocking(move || {
        let document =
            BhfFile::from_reader_with_options(Cursor::new(data.as_slice()), parse_options.clone())?
                .into_document();
        crate::export::render_all(data, &document, &parse_options, &options)
    })
    .await
}
