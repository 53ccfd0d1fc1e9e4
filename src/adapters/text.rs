use crate::core::layout::{report_lines, timestamp_footer, DocumentSettings};
use crate::core::{CartReport, DocumentFormat, DocumentRenderer};
use crate::utils::error::Result;

/// Plain-text shopping list, one entry per line.
pub struct TextRenderer {
    settings: DocumentSettings,
    include_timestamp: bool,
}

impl TextRenderer {
    pub fn new(settings: DocumentSettings) -> Self {
        Self {
            settings,
            include_timestamp: false,
        }
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.include_timestamp = enabled;
        self
    }
}

impl DocumentRenderer for TextRenderer {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Txt
    }

    fn render(&self, report: &CartReport) -> Result<Vec<u8>> {
        let mut lines = report_lines(report, &self.settings);
        if self.include_timestamp {
            lines.push(String::new());
            lines.push(timestamp_footer(chrono::Utc::now()));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        Ok(output.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::aggregate;
    use crate::core::IngredientLine;

    #[test]
    fn test_text_lists_title_and_entries() {
        let renderer = TextRenderer::new(DocumentSettings::default());
        let lines = vec![
            IngredientLine::new("Potato", 2, "kg"),
            IngredientLine::new("Potato", 1, "kg"),
        ];

        let body = String::from_utf8(renderer.render(&aggregate(&lines)).unwrap()).unwrap();

        assert_eq!(body, "Shopping List\nPotato - 3 (kg);\n");
    }

    #[test]
    fn test_text_empty_cart_is_only_message() {
        let settings = DocumentSettings {
            empty_message: "Корзина пуста".to_string(),
            ..DocumentSettings::default()
        };
        let renderer = TextRenderer::new(settings);

        let body = String::from_utf8(renderer.render(&CartReport::default()).unwrap()).unwrap();

        assert_eq!(body, "Корзина пуста\n");
    }
}
