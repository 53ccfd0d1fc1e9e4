use crate::config::toml_config::ExportConfig;
use crate::core::DocumentFormat;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "cart-export")]
#[command(about = "Export a user's shopping cart as a shopping list document")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "cart-export.toml")]
    pub config: String,

    /// Username whose cart is exported (defaults to the API token's owner)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Override export.format (pdf, txt, csv)
    #[arg(long)]
    pub format: Option<DocumentFormat>,

    /// Override output.path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the shopping list instead of writing the document
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut ExportConfig) {
        if let Some(format) = self.format {
            config.export.format = format;
            tracing::info!("🔧 Format overridden to: {}", format.extension());
        }

        if let Some(output) = &self.output {
            config.output.path = output.clone();
            tracing::info!("🔧 Output path overridden to: {}", output);
        }
    }
}
