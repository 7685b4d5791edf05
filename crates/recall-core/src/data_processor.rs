use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::pdf;

/// Per-document ingestion outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub chars: usize,
    pub chunks: usize,
}

/// Chunks collected from a corpus directory, in file order then paragraph order.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub chunks: Vec<String>,
    pub documents: Vec<DocumentReport>,
    /// Documents that produced no text, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

#[derive(Default)]
pub struct DataProcessor;

impl DataProcessor {
    pub fn new() -> Self { Self }

    /// Extract and split every `.txt` and `.pdf` file under `data_dir`.
    ///
    /// Fails with `Error::NotFound` when the corpus yields no chunk at all.
    pub fn process_directory(&self, data_dir: &Path) -> Result<IngestReport> {
        let files = self.list_source_files(data_dir);
        if files.is_empty() {
            return Err(Error::NotFound(format!("no .txt or .pdf files under {}", data_dir.display())));
        }
        let mut report = IngestReport::default();
        for (file_index, file_path) in files.iter().enumerate() {
            info!("Extracting {}/{}: {}", file_index + 1, files.len(), file_path.display());
            let text = match self.extract(file_path) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping {}: {}", file_path.display(), e);
                    report.skipped.push((file_path.clone(), e.to_string()));
                    continue;
                }
            };
            let chunks = split_paragraphs(&text);
            if chunks.is_empty() {
                warn!("No text extracted from {}. Skipping", file_path.display());
                report.skipped.push((file_path.clone(), "no extractable text".to_string()));
                continue;
            }
            info!("Extracted {} characters, {} chunks from {}", text.len(), chunks.len(), file_path.display());
            report.documents.push(DocumentReport { path: file_path.clone(), chars: text.len(), chunks: chunks.len() });
            report.chunks.extend(chunks);
        }
        info!(
            "Processed {} files into {} chunks ({} skipped)",
            files.len(),
            report.chunks.len(),
            report.skipped.len()
        );
        if report.chunks.is_empty() {
            return Err(Error::NotFound(format!("no valid text chunks under {}", data_dir.display())));
        }
        Ok(report)
    }

    fn extract(&self, file_path: &Path) -> Result<String> {
        match file_path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => pdf::extract_text(file_path),
            _ => self.read_file_content(file_path),
        }
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn list_source_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
            if matches!(ext.as_deref(), Some("txt") | Some("pdf")) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        files
    }
}

/// Split on blank-line paragraph boundaries, trimming and dropping empty paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
