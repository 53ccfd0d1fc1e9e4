use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF rendering failed: {message}")]
    PdfError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Upstream returned {status} for {url}")]
    UpstreamError { status: u16, url: String },

    #[error("Authentication required: {message}")]
    AuthenticationError { message: String },

    #[error("Recipe {recipe_id} not found")]
    RecipeNotFound { recipe_id: u64 },

    #[error("Recipe {recipe_id} is already in {username}'s shopping cart")]
    AlreadyInCart { username: String, recipe_id: u64 },

    #[error("Recipe {recipe_id} is not in {username}'s shopping cart")]
    NotInCart { username: String, recipe_id: u64 },

    #[error("Failed to load font '{path}': {source}")]
    FontError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Data,
    Rendering,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExportError::ApiError(_) | ExportError::UpstreamError { .. } => ErrorCategory::Network,
            ExportError::AuthenticationError { .. } => ErrorCategory::Authentication,
            ExportError::ConfigError { .. }
            | ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ExportError::CsvError(_)
            | ExportError::SerializationError(_)
            | ExportError::ValidationError { .. }
            | ExportError::ProcessingError { .. }
            | ExportError::RecipeNotFound { .. }
            | ExportError::AlreadyInCart { .. }
            | ExportError::NotInCart { .. } => ErrorCategory::Data,
            ExportError::PdfError { .. } | ExportError::FontError { .. } => ErrorCategory::Rendering,
            ExportError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ExportError::AlreadyInCart { .. } | ExportError::NotInCart { .. } => ErrorSeverity::Low,
            ExportError::ApiError(_) | ExportError::UpstreamError { .. } => ErrorSeverity::Medium,
            // 字型缺失是啟動期錯誤，不應逐請求重試
            ExportError::FontError { .. }
            | ExportError::ConfigError { .. }
            | ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::MissingConfigError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the recipe API endpoint is reachable and try again",
            ErrorCategory::Authentication => "Provide a valid API token in source.token",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::Data => "Check the cart and recipe data for missing or invalid entries",
            ErrorCategory::Rendering => "Check document.font_path and the document settings",
            ErrorCategory::Storage => "Check that the output path exists and is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ExportError::ApiError(_) | ExportError::UpstreamError { .. } => {
                format!("Could not fetch the shopping cart: {}", self)
            }
            ExportError::AuthenticationError { .. } => {
                "You must be signed in to download a shopping cart".to_string()
            }
            ExportError::FontError { path, .. } => {
                format!("The document font '{}' could not be loaded", path)
            }
            _ => self.to_string(),
        }
    }
}

impl From<printpdf::Error> for ExportError {
    fn from(err: printpdf::Error) -> Self {
        ExportError::PdfError {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
