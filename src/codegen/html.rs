//! Form markup.

use super::escape_html;
use crate::field::{Field, FieldKind, FieldOption};
use crate::project::FormSettings;

pub(crate) const EMPTY_HTML: &str = "<!-- Add fields to see the HTML code -->";

const INDENT: &str = "    ";

pub(crate) fn generate_html(fields: &[Field], settings: &FormSettings) -> String {
    if fields.is_empty() {
        return EMPTY_HTML.to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "<form id=\"{}\" action=\"{}\" method=\"{}\">\n",
        escape_html(&settings.id),
        escape_html(&settings.action),
        settings.method.as_str(),
    ));
    render_fields(&mut out, fields, 1);
    out.push_str("</form>");
    out
}

fn render_fields(out: &mut String, fields: &[Field], depth: usize) {
    for field in fields {
        render_field(out, field, depth);
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

/// ` name="value"`, or nothing when `value` is empty.
fn attr(name: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" {name}=\"{}\"", escape_html(value))
    }
}

fn flag(name: &str, on: bool) -> String {
    if on { format!(" {name}") } else { String::new() }
}

fn wrapper_open(field: &Field, extra_class: &str) -> String {
    let mut class = String::from("form-field");
    if !extra_class.is_empty() {
        class.push(' ');
        class.push_str(extra_class);
    }
    if !field.custom_classes.trim().is_empty() {
        class.push(' ');
        class.push_str(field.custom_classes.trim());
    }
    format!(
        "<div class=\"{}\"{}>",
        escape_html(&class),
        attr("style", &field.custom_styles)
    )
}

fn label_text(field: &Field) -> String {
    let indicator = if field.required {
        "<span class=\"required-indicator\">*</span>"
    } else {
        ""
    };
    format!("{}{indicator}", escape_html(&field.label))
}

fn label_for(field: &Field) -> String {
    format!(
        "<label for=\"{}\">{}</label>",
        escape_html(&field.name),
        label_text(field)
    )
}

fn id_and_name(field: &Field) -> String {
    let name = escape_html(&field.name);
    format!(" id=\"{name}\" name=\"{name}\"")
}

fn state_flags(field: &Field) -> String {
    format!(
        "{}{}",
        flag("required", field.required),
        flag("disabled", field.disabled)
    )
}

fn render_field(out: &mut String, field: &Field, depth: usize) {
    match &field.kind {
        FieldKind::Text {
            placeholder,
            pattern,
            max_length,
        } => render_input(
            out,
            field,
            depth,
            &[
                ("placeholder", placeholder),
                ("value", &field.default_value),
                ("pattern", pattern),
                ("maxlength", max_length),
            ],
        ),
        FieldKind::Email {
            placeholder,
            pattern,
        } => render_input(
            out,
            field,
            depth,
            &[
                ("placeholder", placeholder),
                ("value", &field.default_value),
                ("pattern", pattern),
            ],
        ),
        FieldKind::Password {
            placeholder,
            max_length,
        } => render_input(
            out,
            field,
            depth,
            &[
                ("placeholder", placeholder),
                ("value", &field.default_value),
                ("maxlength", max_length),
            ],
        ),
        FieldKind::Number { min, max, step } => render_input(
            out,
            field,
            depth,
            &[
                ("value", &field.default_value),
                ("min", min),
                ("max", max),
                ("step", step),
            ],
        ),
        FieldKind::Date { min, max } => render_input(
            out,
            field,
            depth,
            &[("value", &field.default_value), ("min", min), ("max", max)],
        ),
        FieldKind::Textarea {
            placeholder,
            max_length,
            rows,
        } => {
            line(out, depth, &wrapper_open(field, ""));
            line(out, depth + 1, &label_for(field));
            let rows = if *rows > 0 {
                format!(" rows=\"{rows}\"")
            } else {
                String::new()
            };
            line(
                out,
                depth + 1,
                &format!(
                    "<textarea{}{}{}{rows}{}>{}</textarea>",
                    id_and_name(field),
                    attr("placeholder", placeholder),
                    attr("maxlength", max_length),
                    state_flags(field),
                    escape_html(&field.default_value),
                ),
            );
            line(out, depth, "</div>");
        }
        FieldKind::Checkbox => {
            line(out, depth, &wrapper_open(field, "checkbox-field"));
            line(
                out,
                depth + 1,
                &format!(
                    "<input type=\"checkbox\"{}{}{}>",
                    id_and_name(field),
                    flag("checked", !field.default_value.is_empty()),
                    state_flags(field),
                ),
            );
            line(out, depth + 1, &label_for(field));
            line(out, depth, "</div>");
        }
        FieldKind::Radio { options } => render_radio_group(out, field, options, depth),
        FieldKind::Select { options } => {
            line(out, depth, &wrapper_open(field, ""));
            line(out, depth + 1, &label_for(field));
            line(
                out,
                depth + 1,
                &format!("<select{}{}>", id_and_name(field), state_flags(field)),
            );
            for option in options {
                line(
                    out,
                    depth + 2,
                    &format!(
                        "<option value=\"{}\">{}</option>",
                        escape_html(&option.value),
                        escape_html(&option.label)
                    ),
                );
            }
            line(out, depth + 1, "</select>");
            line(out, depth, "</div>");
        }
        FieldKind::File { accept, multiple } => {
            line(out, depth, &wrapper_open(field, ""));
            line(out, depth + 1, &label_for(field));
            line(
                out,
                depth + 1,
                &format!(
                    "<input type=\"file\"{}{}{}{}>",
                    id_and_name(field),
                    attr("accept", accept),
                    flag("multiple", *multiple),
                    state_flags(field),
                ),
            );
            line(out, depth, "</div>");
        }
        FieldKind::Submit { button_text } | FieldKind::Reset { button_text } => {
            let field_type = field.field_type();
            let text = if button_text.is_empty() {
                field_type.default_button_text()
            } else {
                button_text.as_str()
            };
            line(out, depth, &wrapper_open(field, ""));
            line(
                out,
                depth + 1,
                &format!(
                    "<button type=\"{}\"{}>{}</button>",
                    field_type.as_str(),
                    flag("disabled", field.disabled),
                    escape_html(text)
                ),
            );
            line(out, depth, "</div>");
        }
        FieldKind::Fieldset { legend, children } => {
            let legend = if legend.is_empty() { "Group" } else { legend.as_str() };
            line(
                out,
                depth,
                &format!(
                    "<fieldset{}{}>",
                    attr("class", field.custom_classes.trim()),
                    attr("style", &field.custom_styles)
                ),
            );
            line(
                out,
                depth + 1,
                &format!("<legend>{}</legend>", escape_html(legend)),
            );
            render_fields(out, children, depth + 1);
            line(out, depth, "</fieldset>");
        }
    }
}

fn render_input(out: &mut String, field: &Field, depth: usize, attrs: &[(&str, &String)]) {
    let attrs: String = attrs.iter().map(|(name, value)| attr(name, value)).collect();
    line(out, depth, &wrapper_open(field, ""));
    line(out, depth + 1, &label_for(field));
    line(
        out,
        depth + 1,
        &format!(
            "<input type=\"{}\"{}{attrs}{}>",
            field.field_type().as_str(),
            id_and_name(field),
            state_flags(field),
        ),
    );
    line(out, depth, "</div>");
}

fn render_radio_group(out: &mut String, field: &Field, options: &[FieldOption], depth: usize) {
    let name = escape_html(&field.name);
    line(out, depth, &wrapper_open(field, ""));
    line(out, depth + 1, &format!("<label>{}</label>", label_text(field)));
    line(out, depth + 1, "<div class=\"radio-group\">");
    for (i, option) in options.iter().enumerate() {
        line(out, depth + 2, "<div class=\"radio-field\">");
        line(
            out,
            depth + 3,
            &format!(
                "<input type=\"radio\" id=\"{name}_{i}\" name=\"{name}\" value=\"{}\"{}>",
                escape_html(&option.value),
                state_flags(field),
            ),
        );
        line(
            out,
            depth + 3,
            &format!(
                "<label for=\"{name}_{i}\">{}</label>",
                escape_html(&option.label)
            ),
        );
        line(out, depth + 2, "</div>");
    }
    line(out, depth + 1, "</div>");
    line(out, depth, "</div>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldId, FieldType};
    use crate::project::FormMethod;
    use pretty_assertions::assert_eq;

    fn field(t: FieldType, name: &str) -> Field {
        Field::new(FieldId::new(format!("id_{name}")), t, name, None)
    }

    #[test]
    fn test_empty_form_placeholder() {
        assert_eq!(generate_html(&[], &FormSettings::default()), EMPTY_HTML);
    }

    #[test]
    fn test_required_text_input() {
        let mut email = field(FieldType::Text, "email");
        email.label = "Email".into();
        email.required = true;
        email.kind = FieldKind::Text {
            placeholder: "you@example.com".into(),
            pattern: String::new(),
            max_length: "64".into(),
        };

        let html = generate_html(&[email], &FormSettings::default());
        let expected = "\
<form id=\"my-form\" action=\"#\" method=\"POST\">
    <div class=\"form-field\">
        <label for=\"email\">Email<span class=\"required-indicator\">*</span></label>
        <input type=\"text\" id=\"email\" name=\"email\" placeholder=\"you@example.com\" maxlength=\"64\" required>
    </div>
</form>";
        assert_eq!(html, expected);
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut text = field(FieldType::Text, "a\"b");
        text.label = "<script>alert('x')</script>".into();
        text.default_value = "Tom & \"Jerry\"".into();
        text.custom_classes = "x\"><b".into();
        let settings = FormSettings {
            id: "f<1>".into(),
            action: "/send?a=1&b=2".into(),
            method: FormMethod::Get,
        };

        let html = generate_html(&[text], &settings);
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"Tom &amp; &quot;Jerry&quot;\""));
        assert!(html.contains("name=\"a&quot;b\""));
        assert!(html.contains("class=\"form-field x&quot;&gt;&lt;b\""));
        assert!(html.contains("<form id=\"f&lt;1&gt;\" action=\"/send?a=1&amp;b=2\" method=\"GET\">"));
    }

    #[test]
    fn test_empty_optional_attributes_are_omitted() {
        let number = field(FieldType::Number, "age");
        let html = generate_html(&[number], &FormSettings::default());
        assert!(html.contains("<input type=\"number\" id=\"age\" name=\"age\">"));
        assert!(!html.contains("min="));
        assert!(!html.contains("value="));
    }

    #[test]
    fn test_checkbox_radio_select_file() {
        let mut check = field(FieldType::Checkbox, "terms");
        check.default_value = "on".into();
        check.disabled = true;
        let radio = field(FieldType::Radio, "plan");
        let select = field(FieldType::Select, "color");
        let mut file = field(FieldType::File, "cv");
        file.kind = FieldKind::File {
            accept: ".pdf".into(),
            multiple: true,
        };

        let html = generate_html(&[check, radio, select, file], &FormSettings::default());
        assert!(html.contains("<div class=\"form-field checkbox-field\">"));
        assert!(html.contains("<input type=\"checkbox\" id=\"terms\" name=\"terms\" checked disabled>"));
        assert!(html.contains(
            "<input type=\"radio\" id=\"plan_2\" name=\"plan\" value=\"option3\">"
        ));
        assert!(html.contains("<label for=\"plan_0\">Option 1</label>"));
        assert!(html.contains("<option value=\"option2\">Option 2</option>"));
        assert!(html.contains(
            "<input type=\"file\" id=\"cv\" name=\"cv\" accept=\".pdf\" multiple>"
        ));
    }

    #[test]
    fn test_textarea_and_buttons() {
        let mut notes = field(FieldType::Textarea, "notes");
        notes.default_value = "a < b".into();
        let submit = field(FieldType::Submit, "go");
        let mut reset = field(FieldType::Reset, "clear");
        reset.kind = FieldKind::Reset {
            button_text: String::new(),
        };

        let html = generate_html(&[notes, submit, reset], &FormSettings::default());
        assert!(html.contains(
            "<textarea id=\"notes\" name=\"notes\" rows=\"4\">a &lt; b</textarea>"
        ));
        assert!(html.contains("<button type=\"submit\">Submit</button>"));
        assert!(html.contains("<button type=\"reset\">Reset</button>"));
    }

    #[test]
    fn test_nested_fieldsets() {
        let mut outer = field(FieldType::Fieldset, "outer");
        outer.custom_classes = "card".into();
        let mut inner = field(FieldType::Fieldset, "inner");
        inner.kind = FieldKind::Fieldset {
            legend: String::new(),
            children: vec![field(FieldType::Date, "when")],
        };
        outer.children_mut().unwrap().push(inner);

        let html = generate_html(&[outer], &FormSettings::default());
        let expected = "\
<form id=\"my-form\" action=\"#\" method=\"POST\">
    <fieldset class=\"card\">
        <legend>Field group</legend>
        <fieldset>
            <legend>Group</legend>
            <div class=\"form-field\">
                <label for=\"when\">Date</label>
                <input type=\"date\" id=\"when\" name=\"when\">
            </div>
        </fieldset>
    </fieldset>
</form>";
        assert_eq!(html, expected);
    }

    #[test]
    fn test_custom_styles_on_wrapper() {
        let mut text = field(FieldType::Email, "mail");
        text.custom_styles = "color: red".into();
        let html = generate_html(&[text], &FormSettings::default());
        assert!(html.contains("<div class=\"form-field\" style=\"color: red\">"));
    }
}
