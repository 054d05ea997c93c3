/// File names
pub const METADATA_FILE: &str = "metadata.json";
pub const CHUNK_EXTENSION: &str = ".bin";

/// Directory names
pub const DEFAULT_DATA_DIR: &str = "downloads/data";

/// Chunk layout
pub const CHUNKS_PER_TIMESTAMP: usize = 90;
pub const FLOAT_SIZE: usize = 4;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const METADATA_INDENT: &[u8] = b"    ";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "OCEAN_EXTREMA";
