use crate::domain::model::{
    CartEntry, CartReport, DocumentFormat, FileAttachment, IngredientLine, RecipeId, UserIdentity,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Read-only view of carts and recipes kept by the persistence layer.
pub trait CartSource: Send + Sync {
    fn cart_entries(
        &self,
        user: &UserIdentity,
    ) -> impl std::future::Future<Output = Result<Vec<CartEntry>>> + Send;

    fn ingredient_lines(
        &self,
        recipe_id: RecipeId,
    ) -> impl std::future::Future<Output = Result<Vec<IngredientLine>>> + Send;
}

pub trait DocumentRenderer: Send + Sync {
    fn format(&self) -> DocumentFormat;
    fn render(&self, report: &CartReport) -> Result<Vec<u8>>;
}

impl<R: DocumentRenderer + ?Sized> DocumentRenderer for Box<R> {
    fn format(&self) -> DocumentFormat {
        (**self).format()
    }

    fn render(&self, report: &CartReport) -> Result<Vec<u8>> {
        (**self).render(report)
    }
}

/// Destination for finished attachments.
pub trait Storage: Send + Sync {
    /// Writes `data` under `filename` and returns where it landed.
    fn write_file(
        &self,
        filename: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, user: &UserIdentity) -> Result<Vec<IngredientLine>>;
    async fn transform(&self, lines: Vec<IngredientLine>) -> Result<CartReport>;
    async fn load(&self, user: &UserIdentity, report: CartReport) -> Result<FileAttachment>;
}
