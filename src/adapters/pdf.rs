use crate::core::layout::{layout_report, timestamp_footer, DocumentSettings};
use crate::core::{CartReport, DocumentFormat, DocumentRenderer};
use crate::utils::error::{ExportError, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

enum FontSource {
    Builtin,
    External(Vec<u8>),
}

/// Renders the shopping list as a PDF document.
pub struct PdfRenderer {
    settings: DocumentSettings,
    font: FontSource,
    include_timestamp: bool,
}

impl PdfRenderer {
    /// Reads and parses the configured font up front; a missing or unusable
    /// font fails here rather than on the first render.
    pub fn new(settings: DocumentSettings) -> Result<Self> {
        let font = match &settings.font_path {
            Some(path) => {
                let font_error = |source: std::io::Error| ExportError::FontError {
                    path: path.display().to_string(),
                    source,
                };
                let bytes = std::fs::read(path).map_err(font_error)?;

                // 先在空白文件上試載一次，確認是可用的 TrueType 字型
                PdfDocument::empty("font check")
                    .add_external_font(bytes.as_slice())
                    .map_err(|e| {
                        font_error(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            format!("not a usable TrueType font: {}", e),
                        ))
                    })?;

                tracing::info!("🔤 Loaded font {} ({} bytes)", path.display(), bytes.len());
                FontSource::External(bytes)
            }
            None => FontSource::Builtin,
        };

        Ok(Self {
            settings,
            font,
            include_timestamp: false,
        })
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.include_timestamp = enabled;
        self
    }

    fn add_font(&self, doc: &PdfDocumentReference) -> Result<IndirectFontRef> {
        let font = match &self.font {
            FontSource::Builtin => doc.add_builtin_font(BuiltinFont::Helvetica)?,
            FontSource::External(bytes) => doc.add_external_font(bytes.as_slice())?,
        };
        Ok(font)
    }
}

/// Helvetica is written with WinAnsiEncoding, which covers Latin-1 plus the
/// Windows-1252 punctuation block.
fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}')
        || matches!(
            c,
            '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
                | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ'
                | 'ž' | 'Ÿ'
        )
}

impl DocumentRenderer for PdfRenderer {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn render(&self, report: &CartReport) -> Result<Vec<u8>> {
        let footer = self
            .include_timestamp
            .then(|| timestamp_footer(chrono::Utc::now()));
        let layout = layout_report(report, &self.settings, footer.as_deref());

        if let FontSource::Builtin = self.font {
            if let Some(text) = layout.text().find(|text| !text.chars().all(is_win_ansi)) {
                return Err(ExportError::PdfError {
                    message: format!(
                        "'{}' cannot be drawn with the builtin Helvetica font; set document.font_path to a TTF font",
                        text
                    ),
                });
            }
        }

        let width = Mm(layout.width_mm);
        let height = Mm(layout.height_mm);
        let (doc, first_page, first_layer) =
            PdfDocument::new(self.settings.title.as_str(), width, height, "Layer 1");
        let font = self.add_font(&doc)?;

        let mut targets = vec![(first_page, first_layer)];
        for _ in 1..layout.pages.len() {
            targets.push(doc.add_page(width, height, "Layer 1"));
        }

        for (page, (page_index, layer_index)) in layout.pages.iter().zip(targets) {
            let layer = doc.get_page(page_index).get_layer(layer_index);
            for line in &page.lines {
                layer.use_text(
                    line.text.as_str(),
                    line.font_size,
                    Mm(line.x_mm),
                    Mm(line.y_mm),
                    &font,
                );
            }
        }

        Ok(doc.save_to_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::aggregate;
    use crate::core::IngredientLine;
    use lopdf::content::Content;
    use lopdf::{Document, Object};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Text shown on each page, in drawing order.
    fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj" || op.operator == "TJ")
                    .map(|op| {
                        let mut text = Vec::new();
                        collect_string_bytes(&op.operands, &mut text);
                        String::from_utf8_lossy(&text).into_owned()
                    })
                    .collect()
            })
            .collect()
    }

    fn collect_string_bytes(objects: &[Object], out: &mut Vec<u8>) {
        for object in objects {
            match object {
                Object::String(bytes, _) => out.extend_from_slice(bytes),
                Object::Array(items) => collect_string_bytes(items, out),
                _ => {}
            }
        }
    }

    #[test]
    fn test_missing_font_fails_at_construction() {
        let settings = DocumentSettings {
            font_path: Some("/nonexistent/fonts/DejaVuSans.ttf".into()),
            ..DocumentSettings::default()
        };

        let err = PdfRenderer::new(settings).err().unwrap();
        assert!(matches!(err, ExportError::FontError { .. }));
    }

    #[test]
    fn test_unparsable_font_fails_at_construction() {
        let mut font_file = NamedTempFile::new().unwrap();
        font_file.write_all(b"this is not a ttf").unwrap();

        let settings = DocumentSettings {
            font_path: Some(font_file.path().to_path_buf()),
            ..DocumentSettings::default()
        };

        let err = PdfRenderer::new(settings).err().unwrap();
        assert!(matches!(err, ExportError::FontError { .. }));
    }

    #[test]
    fn test_pdf_lists_title_and_entries() {
        let renderer = PdfRenderer::new(DocumentSettings::default()).unwrap();
        let lines = vec![
            IngredientLine::new("Potato", 2, "kg"),
            IngredientLine::new("Salt", 1, "tsp"),
            IngredientLine::new("Potato", 1, "kg"),
            IngredientLine::new("Lemon", 3, "pcs"),
        ];

        let bytes = renderer.render(&aggregate(&lines)).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(renderer.format(), DocumentFormat::Pdf);
        assert_eq!(
            page_texts(&bytes),
            vec![vec![
                "Shopping List".to_string(),
                "Potato - 3 (kg);".to_string(),
                "Salt - 1 (tsp);".to_string(),
                "Lemon - 3 (pcs);".to_string(),
            ]]
        );
    }

    #[test]
    fn test_pdf_of_empty_cart_holds_only_message() {
        let renderer = PdfRenderer::new(DocumentSettings::default()).unwrap();

        let bytes = renderer.render(&CartReport::default()).unwrap();

        assert_eq!(
            page_texts(&bytes),
            vec![vec!["Your shopping cart is empty".to_string()]]
        );
    }

    #[test]
    fn test_pdf_page_count_follows_layout() {
        let settings = DocumentSettings::default();
        let renderer = PdfRenderer::new(settings.clone())
            .unwrap()
            .with_timestamp(true);

        let lines: Vec<IngredientLine> = (0..120)
            .map(|i| IngredientLine::new(format!("ingredient {}", i), 1, "g"))
            .collect();
        let report = aggregate(&lines);
        let expected_pages = layout_report(&report, &settings, None).pages.len();
        assert!(expected_pages > 1);

        let pages = page_texts(&renderer.render(&report).unwrap());

        assert_eq!(pages.len(), expected_pages);
        assert_eq!(pages[0][0], "Shopping List");
        assert_eq!(pages[0][1], "Ingredient 0 - 1 (g);");
        let last = pages.last().unwrap();
        assert_eq!(last[last.len() - 2], "Ingredient 119 - 1 (g);");
        assert!(last[last.len() - 1].starts_with("Generated "));
        let entry_count: usize = pages.iter().map(|page| page.len()).sum::<usize>() - 2;
        assert_eq!(entry_count, 120);
    }

    #[test]
    fn test_builtin_font_rejects_text_outside_win_ansi() {
        let renderer = PdfRenderer::new(DocumentSettings::default()).unwrap();
        let lines = vec![IngredientLine::new("картофель", 1, "кг")];

        let err = renderer.render(&aggregate(&lines)).unwrap_err();

        assert!(matches!(err, ExportError::PdfError { ref message } if message.contains("Картофель")));
    }

    #[test]
    fn test_builtin_font_accepts_latin_1() {
        let renderer = PdfRenderer::new(DocumentSettings::default()).unwrap();
        let lines = vec![IngredientLine::new("crème fraîche", 200, "g")];

        assert!(renderer.render(&aggregate(&lines)).is_ok());
        assert!(!is_win_ansi('ж'));
        assert!(is_win_ansi('€'));
    }
}
