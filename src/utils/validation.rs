use crate::utils::error::{ExportError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ExportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension) => Ok(()),
        Some(extension) => Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ExportError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 未被替換的 `${VAR}` 代表環境變數沒有設定
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if let Some(start) = value.find("${") {
        let rest = &value[start + 2..];
        let var_name = rest.split('}').next().unwrap_or(rest);
        return Err(ExportError::MissingConfigError {
            field: format!("{} (environment variable {} is not set)", field_name, var_name),
        });
    }
    Ok(())
}

/// 數量必須是正整數（0 視為無效）
pub fn validate_amount(ingredient: &str, amount: u32) -> Result<()> {
    if amount == 0 {
        return Err(ExportError::ValidationError {
            message: format!("Amount of '{}' must be greater than 0", ingredient),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://foodgram.example.com").is_ok());
        assert!(validate_url("source.endpoint", "http://localhost:8000").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "invalid-url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("source.page_size", 5, 1).is_ok());
        assert!(validate_positive_number("source.page_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("source.snapshot_path", "cart.json", &["json", "csv"]).is_ok());
        assert!(validate_file_extension("source.snapshot_path", "lines.csv", &["json", "csv"]).is_ok());
        assert!(validate_file_extension("source.snapshot_path", "cart.txt", &["json", "csv"]).is_err());
        assert!(validate_file_extension("source.snapshot_path", "cart", &["json", "csv"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("document.font_size", 14.0, 4.0, 72.0).is_ok());
        assert!(validate_range("document.font_size", 100.0, 4.0, 72.0).is_err());
    }

    #[test]
    fn test_validate_resolved() {
        assert!(validate_resolved("source.token", "abc123").is_ok());
        assert!(matches!(
            validate_resolved("source.token", "${FOODGRAM_TOKEN}"),
            Err(ExportError::MissingConfigError { field }) if field.contains("FOODGRAM_TOKEN")
        ));
    }

    #[test]
    fn test_validate_amount_rejects_zero() {
        assert!(validate_amount("salt", 1).is_ok());
        assert!(validate_amount("salt", 0).is_err());
    }
}
