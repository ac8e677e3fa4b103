//! Client-side required-field validation.

use crate::field::{Field, FieldKind, FieldTree};
use crate::project::FormSettings;
use std::collections::HashSet;

pub(crate) const VALIDATION_DISABLED_JS: &str = "// JavaScript validation disabled";
pub(crate) const NO_REQUIRED_FIELDS_JS: &str = "// No fields require validation";

const REQUIRED_MESSAGE: &str = "This field is required";

pub(crate) fn generate_js(tree: &FieldTree, settings: &FormSettings, include_validation: bool) -> String {
    if !include_validation {
        return VALIDATION_DISABLED_JS.to_string();
    }

    let required: Vec<&Field> = tree
        .iter()
        .filter(|f| f.required && !f.is_button())
        .collect();
    if required.is_empty() {
        return NO_REQUIRED_FIELDS_JS.to_string();
    }

    let mut out = String::new();
    out.push_str("// === Form validation ===\n");
    out.push_str("document.addEventListener('DOMContentLoaded', function() {\n");
    out.push_str(&format!(
        "    const form = document.getElementById('{}');\n\n",
        escape_js(&settings.id)
    ));
    out.push_str("    if (form) {\n");
    out.push_str("        form.addEventListener('submit', function(e) {\n");
    out.push_str("            let isValid = true;\n");
    out.push_str("            let firstError = null;\n\n");
    out.push_str("            // Clear previous errors\n");
    out.push_str(
        "            form.querySelectorAll('.error-message').forEach(el => el.remove());\n",
    );
    out.push_str("            form.querySelectorAll('.field-error').forEach(el => el.classList.remove('field-error'));\n\n");
    out.push_str("            // Check required fields\n");

    let mut idents = Identifiers::default();
    let checks: Vec<String> = required
        .iter()
        .map(|f| required_check(f, &idents.next_for(&f.name)))
        .collect();
    out.push_str(&checks.join("\n"));

    out.push_str("\n            if (!isValid) {\n");
    out.push_str("                e.preventDefault();\n");
    out.push_str("                if (firstError) firstError.focus();\n");
    out.push_str("            }\n");
    out.push_str("        });\n");
    out.push_str("    }\n\n");
    out.push_str("    function showError(field, message) {\n");
    out.push_str("        field.classList.add('field-error');\n");
    out.push_str("        const errorEl = document.createElement('span');\n");
    out.push_str("        errorEl.className = 'error-message';\n");
    out.push_str("        errorEl.textContent = message;\n");
    out.push_str("        errorEl.style.cssText = 'color: #dc3545; font-size: 12px; display: block; margin-top: 4px;';\n");
    out.push_str("        field.parentNode.appendChild(errorEl);\n");
    out.push_str("    }\n");
    out.push_str("});");
    out
}

fn required_check(field: &Field, ident: &str) -> String {
    let selector = format!("[name=\"{}\"]", escape_css_string(&field.name));
    let caption = if field.label.trim().is_empty() {
        &field.name
    } else {
        &field.label
    };
    // Choice inputs always carry a value; their emptiness is the checked state.
    let empty_test = match &field.kind {
        FieldKind::Checkbox => format!("!{ident}.checked"),
        FieldKind::Radio { .. } => format!(
            "!form.querySelector('{}')",
            escape_js(&format!("{selector}:checked"))
        ),
        _ => format!("!{ident}.value.trim()"),
    };

    let mut out = String::new();
    out.push_str(&format!("            // Validate {}\n", single_line(caption)));
    out.push_str(&format!(
        "            const {ident} = form.querySelector('{}');\n",
        escape_js(&selector)
    ));
    out.push_str(&format!("            if ({ident} && {empty_test}) {{\n"));
    out.push_str(&format!(
        "                showError({ident}, '{}');\n",
        escape_js(REQUIRED_MESSAGE)
    ));
    out.push_str("                isValid = false;\n");
    out.push_str(&format!(
        "                if (!firstError) firstError = {ident};\n"
    ));
    out.push_str("            }\n");
    out
}

/// Hands out `field_<name>` identifiers. A candidate already handed out
/// gets the next free `_<n>` suffix, so no `const` is declared twice.
#[derive(Default)]
struct Identifiers {
    taken: HashSet<String>,
}

impl Identifiers {
    fn next_for(&mut self, name: &str) -> String {
        let base: String = std::iter::once("field_".to_string())
            .chain(name.chars().map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_string()
                } else {
                    "_".to_string()
                }
            }))
            .collect();
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}_{suffix}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Escapes text for a single-quoted JS string literal.
pub(crate) fn escape_js(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3C"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

fn escape_css_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn single_line(s: &str) -> String {
    s.split(['\r', '\n']).collect::<Vec<_>>().join(" ")
}
