//! Stylesheet scoped to the form's id selector.

use crate::project::FormSettings;

const SCOPE: &str = "{form}";

const BASE_CSS: &str = r#"/* === Base form styles === */
{form} {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    max-width: 600px;
    margin: 0 auto;
    padding: 20px;
}

{form} .form-field {
    margin-bottom: 16px;
}

{form} label {
    display: block;
    margin-bottom: 4px;
    font-weight: 500;
    color: #333;
}

{form} input[type="text"],
{form} input[type="email"],
{form} input[type="password"],
{form} input[type="number"],
{form} input[type="date"],
{form} input[type="file"],
{form} select,
{form} textarea {
    width: 100%;
    padding: 10px 12px;
    border: 1px solid #ccc;
    border-radius: 4px;
    font-size: 14px;
    transition: border-color 0.2s, box-shadow 0.2s;
}

{form} input:focus,
{form} select:focus,
{form} textarea:focus {
    outline: none;
    border-color: #4a90d9;
    box-shadow: 0 0 0 3px rgba(74, 144, 217, 0.15);
}

{form} textarea {
    min-height: 100px;
    resize: vertical;
}

{form} .checkbox-field,
{form} .radio-field {
    display: flex;
    align-items: center;
    gap: 8px;
}

{form} .checkbox-field input,
{form} .radio-field input {
    width: auto;
}

{form} .radio-group {
    display: flex;
    flex-direction: column;
    gap: 4px;
}

{form} fieldset {
    border: 1px solid #dee2e6;
    border-radius: 8px;
    padding: 16px;
    margin-bottom: 16px;
}

{form} legend {
    font-weight: 600;
    padding: 0 8px;
    color: #4a90d9;
}

{form} button[type="submit"],
{form} button[type="reset"] {
    padding: 12px 24px;
    font-size: 14px;
    font-weight: 500;
    border: none;
    border-radius: 4px;
    cursor: pointer;
    transition: background-color 0.2s;
}

{form} button[type="submit"] {
    background-color: #4a90d9;
    color: white;
}

{form} button[type="submit"]:hover {
    background-color: #357abd;
}

{form} button[type="reset"] {
    background-color: #6c757d;
    color: white;
    margin-left: 8px;
}

{form} button[type="reset"]:hover {
    background-color: #5a6268;
}

{form} .required-indicator {
    color: #dc3545;
    margin-left: 2px;
}

{form} .field-error {
    border-color: #dc3545;
}

/* === Responsive === */
@media (max-width: 480px) {
    {form} {
        padding: 12px;
    }

    {form} button[type="submit"],
    {form} button[type="reset"] {
        width: 100%;
        margin-left: 0;
        margin-top: 8px;
    }
}"#;

pub(crate) fn generate_css(settings: &FormSettings, custom_css: &str) -> String {
    let selector = format!("#{}", escape_css_ident(&settings.id));
    let mut out = BASE_CSS.replace(SCOPE, &selector);
    if !custom_css.trim().is_empty() {
        out.push_str("\n\n/* === Custom CSS === */\n");
        out.push_str(custom_css);
    }
    out
}

/// Escapes an id for use after `#` in a selector.
pub(crate) fn escape_css_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (i, c) in ident.chars().enumerate() {
        match c {
            'a'..='z' | 'A'..='Z' | '_' | '-' => out.push(c),
            '0'..='9' if i > 0 => out.push(c),
            // Leading digits need a hex escape followed by a space.
            '0'..='9' => out.push_str(&format!("\\{:x} ", c as u32)),
            c if !c.is_ascii() => out.push(c),
            c if c.is_ascii_control() => out.push_str(&format!("\\{:x} ", c as u32)),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rule_is_scoped() {
        let css = generate_css(&FormSettings::default(), "");
        assert!(!css.contains(SCOPE));
        assert!(css.starts_with("/* === Base form styles === */\n#my-form {"));
        for line in css.lines() {
            let selector = line.trim();
            if selector.ends_with('{') && !selector.starts_with("@media") {
                assert!(selector.starts_with("#my-form"), "unscoped rule: {selector}");
            }
            if selector.ends_with(',') {
                assert!(selector.starts_with("#my-form"), "unscoped selector: {selector}");
            }
        }
        assert!(css.contains("@media (max-width: 480px)"));
        assert!(!css.contains("Custom CSS"));
    }

    #[test]
    fn test_custom_css_is_appended_verbatim() {
        let custom = ".brand { color: <teal>; }";
        let css = generate_css(&FormSettings::default(), custom);
        assert!(css.ends_with("\n\n/* === Custom CSS === */\n.brand { color: <teal>; }"));
    }

    #[test]
    fn test_blank_custom_css_is_skipped() {
        let css = generate_css(&FormSettings::default(), "  \n");
        assert!(!css.contains("Custom CSS"));
    }

    #[test]
    fn test_form_id_is_css_escaped() {
        assert_eq!(escape_css_ident("my-form"), "my-form");
        assert_eq!(escape_css_ident("1st"), "\\31 st");
        assert_eq!(escape_css_ident("a.b c"), "a\\.b\\ c");
        let settings = FormSettings {
            id: "sign.up".into(),
            ..Default::default()
        };
        assert!(generate_css(&settings, "").contains("#sign\\.up .form-field {"));
    }
}
