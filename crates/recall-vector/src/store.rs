use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use recall_core::error::{Error, Result};
use recall_core::{SearchHit, SimilarityMode};
use recall_embed::EmbeddingProvider;

use crate::flat::{FlatIndex, IndexEntry};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct IndexFile {
    format_version: u32,
    index: FlatIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub accepted: usize,
    pub dropped: usize,
    pub dim: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct IndexStatus {
    pub mode: SimilarityMode,
    pub dim: usize,
    pub entries: usize,
    pub built_at: DateTime<Utc>,
}

/// The persisted index file.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Embed `chunks`, keep the ones that produced a usable vector and persist
    /// the result, replacing any previous index only once the new one is written.
    pub fn build(&self, chunks: &[String], provider: &EmbeddingProvider) -> Result<BuildReport> {
        let mode = provider.mode();
        info!("Embedding {} chunks with {} ({} mode)", chunks.len(), provider.name(), mode);

        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut entries: Vec<IndexEntry> = Vec::with_capacity(chunks.len());
        let mut dropped = 0usize;
        for (i, chunk) in chunks.iter().enumerate() {
            pb.set_position(i as u64 + 1);
            let vector = match provider.embed(chunk) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Dropping chunk {}: {}", i, e);
                    dropped += 1;
                    continue;
                }
            };
            if let Some(first) = entries.first() {
                if vector.len() != first.vector.len() {
                    warn!("Dropping chunk {}: dimension {} != {}", i, vector.len(), first.vector.len());
                    dropped += 1;
                    continue;
                }
            }
            entries.push(IndexEntry { vector, chunk: chunk.clone() });
        }
        pb.finish_with_message("done");

        if entries.is_empty() {
            return Err(Error::NotFound(format!(
                "no chunk produced a valid embedding ({} dropped); index not written",
                dropped
            )));
        }
        let index = FlatIndex::from_entries(mode, entries)?;
        self.persist(&index)?;
        info!("Indexed {} chunks (dim={}), dropped {} -> {}", index.len(), index.dim, dropped, self.path.display());
        Ok(BuildReport { accepted: index.len(), dropped, dim: index.dim, path: self.path.clone() })
    }

    /// Write `index` to a temp file next to the target, then rename over it.
    pub fn persist(&self, index: &FlatIndex) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            let file = IndexFile { format_version: FORMAT_VERSION, index: index.clone() };
            bincode::serialize_into(&mut writer, &file)
                .map_err(|e| Error::Operation(format!("failed to encode index: {e}")))?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        debug!("Persisted index to {}", self.path.display());
        Ok(())
    }

    /// Read the persisted index. A missing file is `NotFound`; anything that
    /// fails to decode or validate is `IndexUnavailable`.
    pub fn load(&self) -> Result<FlatIndex> {
        if !self.path.exists() {
            return Err(Error::NotFound(format!("no index at {}", self.path.display())));
        }
        let bytes = fs::read(&self.path)
            .map_err(|e| Error::IndexUnavailable(format!("{}: {e}", self.path.display())))?;
        let decoded: IndexFile = bincode::deserialize(&bytes)
            .map_err(|e| Error::IndexUnavailable(format!("{}: {e}", self.path.display())))?;
        if decoded.format_version != FORMAT_VERSION {
            return Err(Error::IndexUnavailable(format!(
                "{} has format version {}, expected {}",
                self.path.display(),
                decoded.format_version,
                FORMAT_VERSION
            )));
        }
        let index = decoded.index;
        if index.dim == 0 || index.is_empty() || index.entries().iter().any(|e| e.vector.len() != index.dim) {
            return Err(Error::IndexUnavailable(format!("{} failed validation", self.path.display())));
        }
        Ok(index)
    }

    /// Load, refusing an index built under a different metric.
    pub fn load_for(&self, mode: SimilarityMode) -> Result<FlatIndex> {
        let index = self.load()?;
        if index.mode != mode {
            return Err(Error::IndexUnavailable(format!(
                "index was built in {} mode but {} mode is configured; rebuild it",
                index.mode, mode
            )));
        }
        Ok(index)
    }

    pub fn search(&self, mode: SimilarityMode, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        self.load_for(mode)?.search(query, top_k)
    }

    pub fn status(&self) -> Result<IndexStatus> {
        let index = self.load()?;
        Ok(IndexStatus { mode: index.mode, dim: index.dim, entries: index.len(), built_at: index.built_at })
    }
}
