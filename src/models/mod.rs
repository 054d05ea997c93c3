pub mod extrema;
pub mod timestamp;
pub mod variable;

pub use extrema::{ChunkExtrema, LocalSeries, TimestampExtrema, VariableExtrema};
pub use timestamp::{Padding, Timestamp};
pub use variable::Variable;
