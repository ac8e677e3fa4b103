//! Syntax highlighting for generated code using syntect.

use crate::codegen::CodeLanguage;
use egui::Color32;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const THEME_NAME: &str = "base16-ocean.dark";
const PLAIN_COLOR: Color32 = Color32::LIGHT_GRAY;

/// Cached syntax highlighting resources.
pub(crate) struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub(crate) fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(THEME_NAME)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight `code` as `language` and return a list of (text, color) spans.
    pub(crate) fn highlight(&self, code: &str, language: CodeLanguage) -> Vec<(String, Color32)> {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension(language.extension())
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let Some(theme) = self.theme() else {
            return vec![(code.to_string(), PLAIN_COLOR)];
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut result = Vec::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    for (style, text) in ranges {
                        result.push((text.to_string(), style_to_color32(style)));
                    }
                }
                Err(_) => result.push((line.to_string(), PLAIN_COLOR)),
            }
        }

        result
    }

    /// Render highlighted code as a LayoutJob for egui.
    pub(crate) fn layout_job(&self, code: &str, language: CodeLanguage) -> egui::text::LayoutJob {
        let mut job = egui::text::LayoutJob::default();

        for (text, color) in self.highlight(code, language) {
            job.append(&text, 0.0, text_format(color));
        }

        job
    }
}

/// Same layout as [`Highlighter::layout_job`] without colouring, for when
/// highlighting is switched off.
pub(crate) fn plain_layout_job(code: &str) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    job.append(code, 0.0, text_format(PLAIN_COLOR));
    job
}

fn text_format(color: Color32) -> egui::TextFormat {
    egui::TextFormat {
        font_id: egui::FontId::monospace(12.0),
        color,
        ..Default::default()
    }
}

/// Convert syntect Style to egui Color32.
fn style_to_color32(style: Style) -> Color32 {
    Color32::from_rgb(style.foreground.r, style.foreground.g, style.foreground.b)
}

/// Read-only, selectable code view.
pub(crate) fn code_viewer(ui: &mut egui::Ui, job: egui::text::LayoutJob, id_salt: &str) {
    egui::ScrollArea::both()
        .id_salt(id_salt)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.add(egui::Label::new(job).selectable(true).extend());
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_highlights() {
        let highlighter = Highlighter::new();
        let samples = [
            (CodeLanguage::Html, "<form id=\"f\">\n</form>\n"),
            (CodeLanguage::Css, "#f { color: red; }\n"),
            (CodeLanguage::Js, "const x = 42;\n"),
        ];
        for (language, code) in samples {
            let spans = highlighter.highlight(code, language);
            assert!(!spans.is_empty());
            let text: String = spans.iter().map(|(t, _)| t.as_str()).collect();
            assert_eq!(text, code);
        }
    }

    #[test]
    fn test_html_gets_more_than_one_colour() {
        let highlighter = Highlighter::new();
        let spans = highlighter.highlight("<input type=\"text\" required>\n", CodeLanguage::Html);
        let first = spans[0].1;
        assert!(spans.iter().any(|(_, c)| *c != first));
    }

    #[test]
    fn test_layout_jobs_keep_text() {
        let highlighter = Highlighter::new();
        let job = highlighter.layout_job("let x = 42;", CodeLanguage::Js);
        assert_eq!(job.text, "let x = 42;");
        assert_eq!(plain_layout_job("a { }").text, "a { }");
    }
}
