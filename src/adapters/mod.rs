// Adapters layer: concrete implementations for external systems (recipe API, stores, renderers, storage).

pub mod csv_export;
pub mod http;
pub mod memory;
pub mod pdf;
pub mod storage;
pub mod text;
