use crate::core::{FileAttachment, Pipeline, UserIdentity};
use crate::utils::error::Result;

pub struct ExportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ExportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Collects, aggregates and renders the cart of `user`. Any stage failure
    /// fails the whole export; there are no partial results.
    pub async fn run(&self, user: &UserIdentity) -> Result<FileAttachment> {
        tracing::info!("🛒 Exporting shopping cart for '{}'", user.username);

        // Extract
        let lines = self.pipeline.extract(user).await?;
        tracing::info!("Collected {} ingredient lines", lines.len());

        // Transform
        let report = self.pipeline.transform(lines).await?;
        tracing::info!("Aggregated into {} shopping list entries", report.len());

        // Load
        let attachment = self.pipeline.load(user, report).await?;
        tracing::info!(
            "📄 Rendered '{}' ({} bytes)",
            attachment.filename,
            attachment.body.len()
        );

        Ok(attachment)
    }
}
