pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{
    csv_export::CsvRenderer, http::HttpCartSource, memory::InMemoryCartStore, pdf::PdfRenderer,
    storage::LocalStorage, text::TextRenderer,
};
pub use app::pipelines::cart_pipeline::ShoppingCartPipeline;
pub use config::ExportConfig;
pub use crate::core::{
    aggregator::aggregate, engine::ExportEngine, layout::DocumentSettings, AggregatedEntry,
    CartReport, IngredientLine, UserIdentity,
};
pub use utils::error::{ExportError, Result};
