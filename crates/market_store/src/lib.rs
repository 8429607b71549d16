//! In-memory store backing the prediction engine's collaborator
//! contracts, with JSON-file loading for the binary.

mod json;
mod memory;

pub use json::{flush_predictions, load_data_dir};
pub use memory::MemoryStore;
