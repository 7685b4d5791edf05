use pdf_oxide::converters::ConversionOptions;
use std::path::Path;

use crate::error::{Error, Result};

/// Extract the plain text of every page, joined with single newlines.
///
/// Paragraph breaks inside a page survive as blank lines, which is what the
/// chunker splits on.
pub fn extract_text(path: &Path) -> Result<String> {
    let path_str = path.to_string_lossy();
    let mut doc = pdf_oxide::PdfDocument::open(path_str.as_ref())
        .map_err(|e| Error::Operation(format!("failed to open {}: {}", path.display(), e)))?;
    let page_count = doc
        .page_count()
        .map_err(|e| Error::Operation(format!("failed to read pages of {}: {}", path.display(), e)))?;
    let options = ConversionOptions { include_images: false, ..ConversionOptions::default() };

    let mut pages = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let text = doc
            .to_plain_text(page_index, &options)
            .map_err(|e| Error::Operation(format!("page {} of {}: {}", page_index + 1, path.display(), e)))?;
        pages.push(text);
    }
    Ok(pages.join("\n"))
}
