pub mod aggregator;
pub mod chunk_reducer;
pub mod pipeline;

pub use aggregator::{aggregate, Aggregator};
pub use chunk_reducer::{fill_gap, resolve_padding, ChunkReducer};
pub use pipeline::{Pipeline, VariableSummary};
