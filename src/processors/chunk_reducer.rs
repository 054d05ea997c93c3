use crate::error::{ProcessingError, Result};
use crate::models::{ChunkExtrema, Padding, Timestamp, TimestampExtrema, Variable};
use crate::readers::{ChunkReader, FileInventory};
use crate::utils::constants::CHUNKS_PER_TIMESTAMP;
use crate::utils::progress::ProgressReporter;
use std::path::Path;
use tracing::{debug, warn};

/// Reduces the fixed run of chunks belonging to one timestamp to per-chunk extrema
pub struct ChunkReducer {
    reader: ChunkReader,
    chunks_per_timestamp: usize,
}

impl ChunkReducer {
    pub fn new(chunks_per_timestamp: usize) -> Self {
        Self {
            reader: ChunkReader::new(),
            chunks_per_timestamp,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.reader = ChunkReader::with_mmap(use_mmap);
        self
    }

    pub fn chunks_per_timestamp(&self) -> usize {
        self.chunks_per_timestamp
    }

    /// Read chunks `0..chunks_per_timestamp` in order and reduce each one.
    ///
    /// Every index is expected on disk; the first missing or unreadable chunk
    /// aborts the timestamp. `padding` must already be resolved (see
    /// [`resolve_padding`]).
    pub fn reduce_timestamp(
        &self,
        dir: &Path,
        variable: Variable,
        timestamp: Timestamp,
        padding: Padding,
        progress: Option<&ProgressReporter>,
    ) -> Result<TimestampExtrema> {
        let mut extrema = TimestampExtrema::new(timestamp);
        extrema.chunks.reserve(self.chunks_per_timestamp);

        for index in 0..self.chunks_per_timestamp {
            let path = dir.join(timestamp.chunk_file_name(variable, padding, index));

            match progress {
                Some(p) => p.println(&format!("Reading file: {}", path.display())),
                None => debug!("Reading file: {}", path.display()),
            }

            let values = self.reader.read_chunk(&path)?;
            let chunk = match ChunkExtrema::from_values(&values) {
                Some(chunk) => chunk,
                None => {
                    warn!(
                        "No valid values in {}, reusing previous extrema",
                        path.display()
                    );
                    fill_gap(extrema.last())
                }
            };
            extrema.chunks.push(chunk);

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        Ok(extrema)
    }
}

impl Default for ChunkReducer {
    fn default() -> Self {
        Self::new(CHUNKS_PER_TIMESTAMP)
    }
}

/// Stand-in for a chunk with no valid values: the previous chunk's extrema
/// within the same timestamp, or zeros if there is none yet
pub fn fill_gap(previous: Option<ChunkExtrema>) -> ChunkExtrema {
    previous.unwrap_or(ChunkExtrema::ZERO)
}

/// Turn `Padding::Detect` into a concrete convention by looking for chunk 0 on disk
pub fn resolve_padding(
    padding: Padding,
    variable: Variable,
    timestamp: Timestamp,
    inventory: &FileInventory,
) -> Result<Padding> {
    if padding != Padding::Detect {
        return Ok(padding);
    }

    [Padding::Unpadded, Padding::ZeroPadded]
        .into_iter()
        .find(|p| inventory.contains(&timestamp.chunk_file_name(variable, *p, 0)))
        .ok_or_else(|| ProcessingError::MissingChunkConvention {
            timestamp: timestamp.key(),
        })
}
