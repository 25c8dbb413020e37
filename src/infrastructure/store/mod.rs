//! Experiment repository implementations

mod in_memory;
mod json_file;

pub use in_memory::InMemoryExperimentRepository;
pub use json_file::JsonFileExperimentRepository;
