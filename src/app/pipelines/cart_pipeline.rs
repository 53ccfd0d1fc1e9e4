use crate::core::aggregator::aggregate;
use crate::core::collector::collect_ingredients;
use crate::core::{
    CartReport, CartSource, DocumentRenderer, FileAttachment, IngredientLine, Pipeline,
    UserIdentity,
};
use crate::utils::error::Result;

pub const DEFAULT_FILENAME_SUFFIX: &str = "shopping-cart";

/// 購物車匯出管道：收集 → 合併 → 輸出文件
pub struct ShoppingCartPipeline<S: CartSource, R: DocumentRenderer> {
    source: S,
    renderer: R,
    filename_suffix: String,
}

impl<S: CartSource, R: DocumentRenderer> ShoppingCartPipeline<S, R> {
    pub fn new(source: S, renderer: R) -> Self {
        Self {
            source,
            renderer,
            filename_suffix: DEFAULT_FILENAME_SUFFIX.to_string(),
        }
    }

    pub fn with_filename_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.filename_suffix = suffix.into();
        self
    }

    /// `"{username}'s-{suffix}.{ext}"`
    pub fn attachment_filename(&self, user: &UserIdentity) -> String {
        format!(
            "{}'s-{}.{}",
            user.username,
            self.filename_suffix,
            self.renderer.format().extension()
        )
    }
}

#[async_trait::async_trait]
impl<S: CartSource, R: DocumentRenderer> Pipeline for ShoppingCartPipeline<S, R> {
    async fn extract(&self, user: &UserIdentity) -> Result<Vec<IngredientLine>> {
        let entries = self.source.cart_entries(user).await?;
        tracing::debug!("Cart of '{}' holds {} recipes", user.username, entries.len());

        collect_ingredients(&self.source, &entries).await
    }

    async fn transform(&self, lines: Vec<IngredientLine>) -> Result<CartReport> {
        Ok(aggregate(&lines))
    }

    async fn load(&self, user: &UserIdentity, report: CartReport) -> Result<FileAttachment> {
        if report.is_empty() {
            tracing::info!("🛒 Cart of '{}' is empty", user.username);
        }

        let body = self.renderer.render(&report)?;
        let format = self.renderer.format();

        Ok(FileAttachment {
            filename: self.attachment_filename(user),
            content_type: format.content_type(),
            body,
        })
    }
}
