use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

pub type RecipeId = u64;

/// 已認證的使用者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
        }
    }
}

/// 購物車中的一筆記錄，指向一個食譜
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub recipe_id: RecipeId,
}

/// One ingredient row of a recipe, as stored upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    #[serde(alias = "ingredient_name")]
    pub name: String,
    pub amount: u32,
    #[serde(rename = "measurement_unit", alias = "unit")]
    pub unit: String,
}

impl IngredientLine {
    pub fn new(name: impl Into<String>, amount: u32, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }
}

/// A merged `(name, unit)` row of the shopping list.
///
/// `name` holds the lowercased aggregation key; use [`AggregatedEntry::display_name`]
/// for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedEntry {
    pub name: String,
    pub total_amount: u64,
    pub unit: String,
}

impl AggregatedEntry {
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }
}

impl fmt::Display for AggregatedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({});",
            self.display_name(),
            self.total_amount,
            self.unit
        )
    }
}

/// Uppercases the first character and leaves the rest untouched.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 購物清單報表，依每個 (name, unit) 首次出現的順序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartReport {
    entries: Vec<AggregatedEntry>,
}

impl CartReport {
    pub(crate) fn from_entries(entries: Vec<AggregatedEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AggregatedEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, name: &str, unit: &str) -> Option<&AggregatedEntry> {
        let key = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.name == key && entry.unit == unit)
    }
}

impl<'a> IntoIterator for &'a CartReport {
    type Item = &'a AggregatedEntry;
    type IntoIter = std::slice::Iter<'a, AggregatedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Txt,
    Csv,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Txt => "text/plain; charset=utf-8",
            DocumentFormat::Csv => "text/csv",
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "txt" | "text" => Ok(DocumentFormat::Txt),
            "csv" => Ok(DocumentFormat::Csv),
            other => Err(format!("unsupported document format: {}", other)),
        }
    }
}

/// 下載用的檔案附件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl FileAttachment {
    /// Value for the `Content-Disposition` response header.
    pub fn content_disposition(&self) -> String {
        let escaped = self.filename.replace('\\', "\\\\").replace('"', "\\\"");
        format!("attachment; filename=\"{}\"", escaped)
    }

    /// The body as a reader positioned at its start.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("potato"), "Potato");
        assert_eq!(capitalize("картофель"), "Картофель");
        assert_eq!(capitalize("olive oil"), "Olive oil");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_entry_display_line() {
        let entry = AggregatedEntry {
            name: "potato".to_string(),
            total_amount: 3,
            unit: "kg".to_string(),
        };
        assert_eq!(entry.to_string(), "Potato - 3 (kg);");
    }

    #[test]
    fn test_ingredient_line_accepts_api_field_names() {
        let line: IngredientLine = serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "Salt",
            "measurement_unit": "tsp",
            "amount": 1
        }))
        .unwrap();
        assert_eq!(line, IngredientLine::new("Salt", 1, "tsp"));
    }

    #[test]
    fn test_content_disposition_escapes_quotes() {
        let attachment = FileAttachment {
            filename: "bob\"s-shopping-cart.pdf".to_string(),
            content_type: "application/pdf",
            body: Vec::new(),
        };
        assert_eq!(
            attachment.content_disposition(),
            "attachment; filename=\"bob\\\"s-shopping-cart.pdf\""
        );
    }

    #[test]
    fn test_document_format_from_str() {
        assert_eq!("PDF".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
        assert_eq!("text".parse::<DocumentFormat>().unwrap(), DocumentFormat::Txt);
        assert!("docx".parse::<DocumentFormat>().is_err());
    }
}
