pub mod dataset;
pub mod error;
pub mod knowledge;
pub mod profile;

pub use dataset::{Cell, Column, ColumnKind, Table};
pub use knowledge::{KbEntry, QaResult};
pub use profile::{ColumnProfile, ColumnStats, DatasetProfile};
