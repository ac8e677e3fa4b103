//! HTML, CSS and JavaScript emitters for a form design.
//!
//! Everything here is a pure function of the field tree and settings, so the
//! same design always produces byte-identical output.

mod css;
mod html;
mod js;

use crate::error::ExportError;
use crate::field::FieldTree;
use crate::project::FormSettings;
use std::path::{Path, PathBuf};

pub(crate) const HTML_FILE_NAME: &str = "form.html";
pub(crate) const CSS_FILE_NAME: &str = "form-styles.css";
pub(crate) const JS_FILE_NAME: &str = "form-validation.js";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum CodeLanguage {
    #[default]
    Html,
    Css,
    Js,
}

impl CodeLanguage {
    pub(crate) const ALL: [CodeLanguage; 3] = [CodeLanguage::Html, CodeLanguage::Css, CodeLanguage::Js];

    pub(crate) const fn display_name(self) -> &'static str {
        match self {
            CodeLanguage::Html => "HTML",
            CodeLanguage::Css => "CSS",
            CodeLanguage::Js => "JavaScript",
        }
    }

    /// File extension syntect uses to pick a grammar.
    pub(crate) const fn extension(self) -> &'static str {
        match self {
            CodeLanguage::Html => "html",
            CodeLanguage::Css => "css",
            CodeLanguage::Js => "js",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClipboardTarget {
    Single(CodeLanguage),
    All,
}

/// The three generated texts for one state of the design.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct GeneratedCode {
    pub(crate) html: String,
    pub(crate) css: String,
    pub(crate) js: String,
}

impl GeneratedCode {
    pub(crate) fn generate(
        tree: &FieldTree,
        settings: &FormSettings,
        custom_css: &str,
        include_validation: bool,
    ) -> Self {
        Self {
            html: html::generate_html(tree.fields(), settings),
            css: css::generate_css(settings, custom_css),
            js: js::generate_js(tree, settings, include_validation),
        }
    }

    pub(crate) fn text(&self, language: CodeLanguage) -> &str {
        match language {
            CodeLanguage::Html => &self.html,
            CodeLanguage::Css => &self.css,
            CodeLanguage::Js => &self.js,
        }
    }

    pub(crate) fn clipboard_text(&self, target: ClipboardTarget) -> String {
        match target {
            ClipboardTarget::Single(language) => self.text(language).to_string(),
            ClipboardTarget::All => format!(
                "<!-- HTML -->\n{}\n\n<!-- CSS -->\n<style>\n{}\n</style>\n\n<!-- JavaScript -->\n<script>\n{}\n</script>",
                self.html, self.css, self.js
            ),
        }
    }

    /// A complete page embedding the form and linking the exported
    /// stylesheet and script by relative file name.
    pub(crate) fn standalone_document(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("    <meta charset=\"UTF-8\">\n");
        out.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        out.push_str("    <title>Generated Form</title>\n");
        out.push_str(&format!(
            "    <link rel=\"stylesheet\" href=\"{CSS_FILE_NAME}\">\n"
        ));
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        for line in self.html.lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("    {line}\n"));
            }
        }
        out.push_str(&format!("    <script src=\"{JS_FILE_NAME}\"></script>\n"));
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    /// Writes the page, stylesheet and script into `dir`. Returns the paths
    /// written, in that order.
    pub(crate) fn write_files(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        if !dir.is_dir() {
            return Err(ExportError::MissingDirectory(dir.to_path_buf()));
        }
        let files = [
            (HTML_FILE_NAME, self.standalone_document()),
            (CSS_FILE_NAME, self.css.clone()),
            (JS_FILE_NAME, self.js.clone()),
        ];
        let mut written = Vec::with_capacity(files.len());
        for (name, contents) in files {
            let path = dir.join(name);
            std::fs::write(&path, contents).map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Escapes text for HTML element content and double- or single-quoted
/// attribute values.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldId, FieldType};

    fn sample_tree() -> FieldTree {
        let mut email = Field::new(FieldId::new("field_1"), FieldType::Email, "email", None);
        email.required = true;
        let submit = Field::new(FieldId::new("field_2"), FieldType::Submit, "submit", None);
        FieldTree::from(vec![email, submit])
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & \"b\" 'c'"), "a &amp; &quot;b&quot; &#39;c&#39;");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_empty_design_placeholders() {
        let code = GeneratedCode::generate(&FieldTree::default(), &FormSettings::default(), "", true);
        assert_eq!(code.html, html::EMPTY_HTML);
        assert_eq!(code.js, js::NO_REQUIRED_FIELDS_JS);
        assert!(code.css.starts_with("/* === Base form styles === */"));
    }

    #[test]
    fn test_generation_is_idempotent() {
        let tree = sample_tree();
        let settings = FormSettings::default();
        let a = GeneratedCode::generate(&tree, &settings, ".x{}", true);
        let b = GeneratedCode::generate(&tree, &settings, ".x{}", true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_clipboard_bundle() {
        let code = GeneratedCode {
            html: "<form></form>".into(),
            css: "a{}".into(),
            js: "// js".into(),
        };
        assert_eq!(code.clipboard_text(ClipboardTarget::Single(CodeLanguage::Css)), "a{}");
        assert_eq!(
            code.clipboard_text(ClipboardTarget::All),
            "<!-- HTML -->\n<form></form>\n\n<!-- CSS -->\n<style>\na{}\n</style>\n\n<!-- JavaScript -->\n<script>\n// js\n</script>"
        );
    }

    #[test]
    fn test_standalone_document_links_assets() {
        let code = GeneratedCode::generate(&sample_tree(), &FormSettings::default(), "", true);
        let doc = code.standalone_document();
        assert!(doc.starts_with("<!DOCTYPE html>\n"));
        assert!(doc.contains("<link rel=\"stylesheet\" href=\"form-styles.css\">"));
        assert!(doc.contains("<script src=\"form-validation.js\"></script>"));
        assert!(doc.contains("    <form id=\"my-form\" action=\"#\" method=\"POST\">\n"));
        assert!(doc.contains("    </form>\n"));
    }

    #[test]
    fn test_write_files() {
        let dir = std::env::temp_dir().join(format!("form-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let code = GeneratedCode::generate(&sample_tree(), &FormSettings::default(), "", true);

        let written = code.write_files(&dir).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![HTML_FILE_NAME, CSS_FILE_NAME, JS_FILE_NAME]);
        assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), code.css);
        assert_eq!(std::fs::read_to_string(&written[2]).unwrap(), code.js);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_files_missing_directory() {
        let code = GeneratedCode::default();
        let missing = std::env::temp_dir().join("form-export-does-not-exist/nested");
        assert!(matches!(
            code.write_files(&missing),
            Err(ExportError::MissingDirectory(_))
        ));
    }
}
