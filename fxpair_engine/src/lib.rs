pub mod assets;
pub mod catalog;
pub mod companding;
pub mod compositor;
pub mod config;
pub mod dataset;
pub mod resampler;
pub mod strategy;
pub mod trim;

// Re-exports
pub use assets::{MemoryDecoder, SampleLayout, WavDecoder, WaveDecoder};
pub use catalog::{filter_catalog, Catalog, NotePair, PairedCatalog};
pub use dataset::{create_dataset, create_dataset_with_rng, DatasetOutcome, DatasetSummary};
pub use strategy::{strategy_for, SelectionStrategy};

#[cfg(test)]
mod tests_dataset;
