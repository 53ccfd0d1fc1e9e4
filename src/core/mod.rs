pub mod aggregator;
pub mod collector;
pub mod engine;
pub mod layout;

pub use crate::domain::model::{
    AggregatedEntry, CartEntry, CartReport, DocumentFormat, FileAttachment, IngredientLine,
    RecipeId, UserIdentity,
};
pub use crate::domain::ports::{CartSource, DocumentRenderer, Pipeline, Storage};
pub use crate::utils::error::Result;
