use crate::adapters::csv_export::CsvRenderer;
use crate::adapters::http::HttpCartSource;
use crate::adapters::memory::InMemoryCartStore;
use crate::adapters::pdf::PdfRenderer;
use crate::adapters::text::TextRenderer;
use crate::app::pipelines::cart_pipeline::DEFAULT_FILENAME_SUFFIX;
use crate::core::layout::DocumentSettings;
use crate::core::{DocumentFormat, DocumentRenderer};
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub document: DocumentSettings,
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub format: DocumentFormat,
    pub filename_suffix: String,
    pub include_timestamp: bool,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Pdf,
            filename_suffix: DEFAULT_FILENAME_SUFFIX.to_string(),
            include_timestamp: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Api,
    Snapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceType,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub page_size: Option<usize>,
    /// `.json` snapshot, or `.csv` recipe lines paired with `carts_path`.
    pub snapshot_path: Option<String>,
    pub carts_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl ExportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FOODGRAM_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        // 先檢查 ${VAR} 是否都已替換
        let text_fields = [
            ("source.endpoint", self.source.endpoint.as_deref()),
            ("source.token", self.source.token.as_deref()),
            ("source.snapshot_path", self.source.snapshot_path.as_deref()),
            ("source.carts_path", self.source.carts_path.as_deref()),
            ("output.path", Some(self.output.path.as_str())),
            ("export.filename_suffix", Some(self.export.filename_suffix.as_str())),
            ("document.title", Some(self.document.title.as_str())),
            ("document.empty_message", Some(self.document.empty_message.as_str())),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                validation::validate_resolved(field, value)?;
            }
        }
        if let Some(font_path) = &self.document.font_path {
            validation::validate_resolved("document.font_path", &font_path.to_string_lossy())?;
        }

        validation::validate_non_empty_string("export.filename_suffix", &self.export.filename_suffix)?;
        validation::validate_path("output.path", &self.output.path)?;

        let doc = &self.document;
        validation::validate_non_empty_string("document.title", &doc.title)?;
        validation::validate_non_empty_string("document.empty_message", &doc.empty_message)?;
        validation::validate_range("document.font_size", doc.font_size, 4.0, 72.0)?;
        validation::validate_range("document.title_font_size", doc.title_font_size, 4.0, 96.0)?;
        validation::validate_range("document.page_width_mm", doc.page_width_mm, 50.0, 1000.0)?;
        validation::validate_range("document.page_height_mm", doc.page_height_mm, 50.0, 1000.0)?;
        validation::validate_range("document.margin_mm", doc.margin_mm, 0.0, doc.page_height_mm / 4.0)?;
        validation::validate_range("document.line_spacing_mm", doc.line_spacing_mm, 1.0, 100.0)?;
        if let Some(font_path) = &doc.font_path {
            validation::validate_path("document.font_path", &font_path.to_string_lossy())?;
        }

        match self.source.r#type {
            SourceType::Api => {
                let endpoint = validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
                if let Some(token) = &self.source.token {
                    validation::validate_non_empty_string("source.token", token)?;
                }
                if let Some(page_size) = self.source.page_size {
                    validation::validate_positive_number("source.page_size", page_size, 1)?;
                }
            }
            SourceType::Snapshot => {
                let snapshot = validation::validate_required_field("source.snapshot_path", &self.source.snapshot_path)?;
                validation::validate_path("source.snapshot_path", snapshot)?;
                validation::validate_file_extension("source.snapshot_path", snapshot, &["json", "csv"])?;
                if snapshot.ends_with(".csv") {
                    let carts = validation::validate_required_field("source.carts_path", &self.source.carts_path)?;
                    validation::validate_file_extension("source.carts_path", carts, &["csv"])?;
                }
            }
        }

        Ok(())
    }

    /// Builds the renderer for `export.format`. Fails when the configured
    /// font cannot be read.
    pub fn build_renderer(&self) -> Result<Box<dyn DocumentRenderer>> {
        let settings = self.document.clone();
        let renderer: Box<dyn DocumentRenderer> = match self.export.format {
            DocumentFormat::Pdf => Box::new(
                PdfRenderer::new(settings)?.with_timestamp(self.export.include_timestamp),
            ),
            DocumentFormat::Txt => Box::new(
                TextRenderer::new(settings).with_timestamp(self.export.include_timestamp),
            ),
            DocumentFormat::Csv => Box::new(CsvRenderer::new()),
        };
        Ok(renderer)
    }

    pub fn build_http_source(&self) -> Result<HttpCartSource> {
        let endpoint = validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
        let mut source = HttpCartSource::new(endpoint)?;

        if let Some(token) = &self.source.token {
            source = source.with_token(token.clone());
        }
        if let Some(timeout) = self.source.timeout_seconds {
            source = source.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(page_size) = self.source.page_size {
            source = source.with_page_size(page_size);
        }

        Ok(source)
    }

    pub fn build_snapshot_store(&self) -> Result<InMemoryCartStore> {
        let snapshot = validation::validate_required_field("source.snapshot_path", &self.source.snapshot_path)?;

        if snapshot.ends_with(".csv") {
            let carts = validation::validate_required_field("source.carts_path", &self.source.carts_path)?;
            let store = InMemoryCartStore::new();
            let lines = store.load_recipe_lines_csv(snapshot)?;
            let rows = store.load_carts_csv(carts)?;
            tracing::info!("📥 Loaded {} recipe lines and {} cart rows", lines, rows);
            Ok(store)
        } else {
            tracing::info!("📥 Loading snapshot from {}", snapshot);
            InMemoryCartStore::from_json_file(snapshot)
        }
    }
}

impl Validate for ExportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
