use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, FLOAT_SIZE};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads headerless little-endian float32 chunk files
pub struct ChunkReader {
    use_mmap: bool,
}

impl ChunkReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read every value in the chunk; a missing or unreadable file is an error
    pub fn read_chunk(&self, path: &Path) -> Result<Vec<f32>> {
        if self.use_mmap {
            self.read_chunk_mmap(path)
        } else {
            self.read_chunk_buffered(path)
        }
    }

    fn read_chunk_buffered(&self, path: &Path) -> Result<Vec<f32>> {
        let file = File::open(path).map_err(|e| chunk_error(path, e))?;
        let capacity = file
            .metadata()
            .map(|m| m.len() as usize)
            .unwrap_or(DEFAULT_BUFFER_SIZE);

        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut bytes = Vec::with_capacity(capacity);
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| chunk_error(path, e))?;

        decode_f32_le(&bytes, path)
    }

    fn read_chunk_mmap(&self, path: &Path) -> Result<Vec<f32>> {
        let file = File::open(path).map_err(|e| chunk_error(path, e))?;
        let len = file.metadata().map_err(|e| chunk_error(path, e))?.len();
        if len == 0 {
            return Ok(Vec::new());
        }

        // Chunk files are written once upstream and not modified while we read them
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| chunk_error(path, e))?;
        decode_f32_le(&mmap, path)
    }
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a flat float32 array; the byte length must be a multiple of four
pub fn decode_f32_le(bytes: &[u8], path: &Path) -> Result<Vec<f32>> {
    if bytes.len() % FLOAT_SIZE != 0 {
        return Err(ProcessingError::InvalidChunkLength {
            path: path.to_path_buf(),
            len: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(FLOAT_SIZE)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn chunk_error(path: &Path, source: std::io::Error) -> ProcessingError {
    ProcessingError::ChunkRead {
        path: path.to_path_buf(),
        source,
    }
}
