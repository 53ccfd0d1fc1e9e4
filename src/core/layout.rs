use crate::domain::model::CartReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const PT_TO_MM: f32 = 0.352_778;
// Helvetica 的平均字寬約為字級的一半
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

/// Text and geometry of the rendered shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub title: String,
    pub empty_message: String,
    /// TTF font used instead of builtin Helvetica, e.g. for Cyrillic names.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    pub title_font_size: f32,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub line_spacing_mm: f32,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            title: "Shopping List".to_string(),
            empty_message: "Your shopping cart is empty".to_string(),
            font_path: None,
            font_size: 14.0,
            title_font_size: 20.0,
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            line_spacing_mm: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub font_size: f32,
    /// Distance from the left page edge.
    pub x_mm: f32,
    /// Baseline distance from the bottom page edge.
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn text(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.text.as_str()))
    }
}

/// Title plus one formatted line per entry, or only the empty-cart message.
pub fn report_lines(report: &CartReport, settings: &DocumentSettings) -> Vec<String> {
    if report.is_empty() {
        return vec![settings.empty_message.clone()];
    }

    std::iter::once(settings.title.clone())
        .chain(report.iter().map(|entry| entry.to_string()))
        .collect()
}

pub fn timestamp_footer(now: DateTime<Utc>) -> String {
    format!("Generated {}", now.format("%Y-%m-%d %H:%M UTC"))
}

/// Approximate line width from the average Helvetica glyph width.
///
/// Glyph metrics of an external TTF are not consulted, so with
/// `font_path` set the centering of the empty-cart message is approximate.
pub fn estimate_text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVERAGE_GLYPH_WIDTH * PT_TO_MM
}

/// Places the report on pages top to bottom.
///
/// The title sits on the first page only. When the next line would cross the
/// bottom margin a new page starts at the top margin. An empty report yields a
/// single page with the empty-cart message roughly centered on it (see
/// [`estimate_text_width_mm`]), never starting left of the margin.
pub fn layout_report(
    report: &CartReport,
    settings: &DocumentSettings,
    footer: Option<&str>,
) -> DocumentLayout {
    let mut pages = Vec::new();

    if report.is_empty() {
        let text = settings.empty_message.clone();
        let width = estimate_text_width_mm(&text, settings.font_size);
        let x_mm = ((settings.page_width_mm - width) / 2.0).max(settings.margin_mm);
        pages.push(PageLayout {
            lines: vec![TextLine {
                text,
                font_size: settings.font_size,
                x_mm,
                y_mm: settings.page_height_mm / 2.0,
            }],
        });
    } else {
        let top = settings.page_height_mm - settings.margin_mm;
        let mut page = PageLayout::default();
        page.lines.push(TextLine {
            text: settings.title.clone(),
            font_size: settings.title_font_size,
            x_mm: settings.margin_mm,
            y_mm: top,
        });
        let mut y = top - settings.line_spacing_mm * 2.0;

        for entry in report {
            if y < settings.margin_mm {
                pages.push(std::mem::take(&mut page));
                y = top;
            }
            page.lines.push(TextLine {
                text: entry.to_string(),
                font_size: settings.font_size,
                x_mm: settings.margin_mm,
                y_mm: y,
            });
            y -= settings.line_spacing_mm;
        }
        pages.push(page);
    }

    if let (Some(text), Some(last)) = (footer, pages.last_mut()) {
        last.lines.push(TextLine {
            text: text.to_string(),
            font_size: settings.font_size * 0.7,
            x_mm: settings.margin_mm,
            y_mm: settings.margin_mm / 2.0,
        });
    }

    tracing::debug!(
        "Laid out {} entries on {} page(s)",
        report.len(),
        pages.len()
    );

    DocumentLayout {
        width_mm: settings.page_width_mm,
        height_mm: settings.page_height_mm,
        pages,
    }
}
