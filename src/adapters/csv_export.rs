use crate::core::{CartReport, DocumentFormat, DocumentRenderer};
use crate::utils::error::{ExportError, Result};

/// `name,amount,measurement_unit` rows for spreadsheets. An empty cart is a
/// header-only file.
#[derive(Debug, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for CsvRenderer {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Csv
    }

    fn render(&self, report: &CartReport) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["name", "amount", "measurement_unit"])?;

        for entry in report {
            writer.write_record([
                entry.display_name(),
                entry.total_amount.to_string(),
                entry.unit.clone(),
            ])?;
        }

        writer.into_inner().map_err(|e| ExportError::ProcessingError {
            message: format!("Failed to finish CSV output: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::aggregate;
    use crate::core::IngredientLine;

    #[test]
    fn test_csv_rows_follow_report_order() {
        let lines = vec![
            IngredientLine::new("salt", 1, "tsp"),
            IngredientLine::new("olive oil, extra virgin", 2, "tbsp"),
            IngredientLine::new("salt", 2, "tsp"),
        ];

        let body = String::from_utf8(CsvRenderer::new().render(&aggregate(&lines)).unwrap()).unwrap();

        assert_eq!(
            body,
            "name,amount,measurement_unit\nSalt,3,tsp\n\"Olive oil, extra virgin\",2,tbsp\n"
        );
    }

    #[test]
    fn test_csv_empty_cart_is_header_only() {
        let body = CsvRenderer::new().render(&CartReport::default()).unwrap();
        assert_eq!(body, b"name,amount,measurement_unit\n");
    }
}
