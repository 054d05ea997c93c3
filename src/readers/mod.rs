pub mod chunk_reader;
pub mod date_extractor;
pub mod inventory;

pub use chunk_reader::ChunkReader;
pub use date_extractor::{extract_dates, parse_filename};
pub use inventory::{filter_by_variable, list_files, FileInventory};
