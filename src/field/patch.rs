use super::{DEFAULT_ROWS, Field, FieldKind, FieldOption};

/// A set of attribute edits for one field, as produced by the property panel.
///
/// `None` leaves an attribute alone. Attributes the field's type does not
/// support are ignored on [`FieldPatch::apply`].
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FieldPatch {
    pub(crate) name: Option<String>,
    pub(crate) label: Option<String>,
    pub(crate) placeholder: Option<String>,
    pub(crate) default_value: Option<String>,
    pub(crate) required: Option<bool>,
    pub(crate) disabled: Option<bool>,
    pub(crate) custom_classes: Option<String>,
    pub(crate) custom_styles: Option<String>,
    pub(crate) pattern: Option<String>,
    pub(crate) max_length: Option<String>,
    pub(crate) min: Option<String>,
    pub(crate) max: Option<String>,
    pub(crate) step: Option<String>,
    pub(crate) rows: Option<u32>,
    pub(crate) accept: Option<String>,
    pub(crate) multiple: Option<bool>,
    pub(crate) options: Option<Vec<FieldOption>>,
    pub(crate) legend: Option<String>,
    pub(crate) button_text: Option<String>,
}

impl FieldPatch {
    /// Captures every editable attribute of `field`. Used to turn an edited
    /// working copy back into a patch.
    pub(crate) fn from_field(field: &Field) -> Self {
        let mut patch = FieldPatch {
            name: Some(field.name.clone()),
            label: Some(field.label.clone()),
            default_value: Some(field.default_value.clone()),
            required: Some(field.required),
            disabled: Some(field.disabled),
            custom_classes: Some(field.custom_classes.clone()),
            custom_styles: Some(field.custom_styles.clone()),
            ..Default::default()
        };
        match &field.kind {
            FieldKind::Text {
                placeholder,
                pattern,
                max_length,
            } => {
                patch.placeholder = Some(placeholder.clone());
                patch.pattern = Some(pattern.clone());
                patch.max_length = Some(max_length.clone());
            }
            FieldKind::Email {
                placeholder,
                pattern,
            } => {
                patch.placeholder = Some(placeholder.clone());
                patch.pattern = Some(pattern.clone());
            }
            FieldKind::Password {
                placeholder,
                max_length,
            } => {
                patch.placeholder = Some(placeholder.clone());
                patch.max_length = Some(max_length.clone());
            }
            FieldKind::Number { min, max, step } => {
                patch.min = Some(min.clone());
                patch.max = Some(max.clone());
                patch.step = Some(step.clone());
            }
            FieldKind::Date { min, max } => {
                patch.min = Some(min.clone());
                patch.max = Some(max.clone());
            }
            FieldKind::Textarea {
                placeholder,
                max_length,
                rows,
            } => {
                patch.placeholder = Some(placeholder.clone());
                patch.max_length = Some(max_length.clone());
                patch.rows = Some(*rows);
            }
            FieldKind::Checkbox => {}
            FieldKind::Radio { options } | FieldKind::Select { options } => {
                patch.options = Some(options.clone());
            }
            FieldKind::File { accept, multiple } => {
                patch.accept = Some(accept.clone());
                patch.multiple = Some(*multiple);
            }
            FieldKind::Submit { button_text } | FieldKind::Reset { button_text } => {
                patch.button_text = Some(button_text.clone());
            }
            FieldKind::Fieldset { legend, .. } => {
                patch.legend = Some(legend.clone());
            }
        }
        patch
    }

    pub(crate) fn apply(self, field: &mut Field) {
        let caps = field.capabilities();

        if !caps.button {
            // An emptied name keeps the old one so the control stays addressable.
            if let Some(name) = self.name.filter(|n| !n.is_empty()) {
                field.name = name;
            }
            if let Some(label) = self.label {
                field.label = label;
            }
            if let Some(required) = self.required {
                field.required = required;
            }
        }
        if !caps.button
            && !caps.container
            && !caps.options
            && let Some(value) = self.default_value
        {
            field.default_value = value;
        }
        if let Some(disabled) = self.disabled {
            field.disabled = disabled;
        }
        if let Some(classes) = self.custom_classes {
            field.custom_classes = classes;
        }
        if let Some(styles) = self.custom_styles {
            field.custom_styles = styles;
        }

        match &mut field.kind {
            FieldKind::Text {
                placeholder,
                pattern,
                max_length,
            } => {
                set(placeholder, self.placeholder);
                set(pattern, self.pattern);
                set(max_length, self.max_length);
            }
            FieldKind::Email {
                placeholder,
                pattern,
            } => {
                set(placeholder, self.placeholder);
                set(pattern, self.pattern);
            }
            FieldKind::Password {
                placeholder,
                max_length,
            } => {
                set(placeholder, self.placeholder);
                set(max_length, self.max_length);
            }
            FieldKind::Number { min, max, step } => {
                set(min, self.min);
                set(max, self.max);
                set(step, self.step);
            }
            FieldKind::Date { min, max } => {
                set(min, self.min);
                set(max, self.max);
            }
            FieldKind::Textarea {
                placeholder,
                max_length,
                rows,
            } => {
                set(placeholder, self.placeholder);
                set(max_length, self.max_length);
                if let Some(r) = self.rows {
                    *rows = if r == 0 { DEFAULT_ROWS } else { r };
                }
            }
            FieldKind::Checkbox => {}
            FieldKind::Radio { options } | FieldKind::Select { options } => {
                set(options, self.options);
            }
            FieldKind::File { accept, multiple } => {
                set(accept, self.accept);
                set(multiple, self.multiple);
            }
            FieldKind::Submit { button_text } | FieldKind::Reset { button_text } => {
                set(button_text, self.button_text);
            }
            FieldKind::Fieldset { legend, .. } => {
                set(legend, self.legend);
            }
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}
