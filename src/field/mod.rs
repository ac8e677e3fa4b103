mod patch;
pub(crate) mod tree;

use crate::error::UnknownFieldType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub(crate) use patch::FieldPatch;
pub(crate) use tree::{FieldTree, MoveDirection};

const ID_PREFIX: &str = "field_";
pub(crate) const DEFAULT_ROWS: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct FieldId(String);

impl FieldId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of ids handed out by [`FieldIdAllocator`], if this is one.
    pub(crate) fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out `field_<n>` ids. The counter only moves forward, so an id is
/// never reissued within a session even after its field was deleted.
#[derive(Clone, Debug)]
pub(crate) struct FieldIdAllocator {
    next: u64,
}

impl Default for FieldIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FieldIdAllocator {
    /// Allocates the next id for which `taken` returns false.
    pub(crate) fn allocate(&mut self, taken: impl Fn(&FieldId) -> bool) -> FieldId {
        loop {
            let id = FieldId::new(format!("{ID_PREFIX}{}", self.next));
            self.next += 1;
            if !taken(&id) {
                return id;
            }
        }
    }

    /// Moves the counter past every allocator-style id in `ids`.
    pub(crate) fn advance_past<'a>(&mut self, ids: impl IntoIterator<Item = &'a FieldId>) {
        if let Some(max) = ids.into_iter().filter_map(FieldId::sequence).max() {
            self.next = self.next.max(max.saturating_add(1));
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Capabilities {
    pub(crate) placeholder: bool,
    pub(crate) pattern: bool,
    pub(crate) max_length: bool,
    pub(crate) min: bool,
    pub(crate) max: bool,
    pub(crate) step: bool,
    pub(crate) rows: bool,
    pub(crate) accept: bool,
    pub(crate) multiple: bool,
    pub(crate) options: bool,
    pub(crate) container: bool,
    pub(crate) button: bool,
}

impl Capabilities {
    /// Optional attributes these capabilities allow, in property panel order.
    pub(crate) fn attribute_names(&self) -> Vec<&'static str> {
        [
            (self.placeholder, "placeholder"),
            (self.pattern, "pattern"),
            (self.max_length, "max length"),
            (self.min, "min"),
            (self.max, "max"),
            (self.step, "step"),
            (self.rows, "rows"),
            (self.accept, "accept"),
            (self.multiple, "multiple"),
            (self.options, "options"),
            (self.container, "child fields"),
            (self.button, "button text"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FieldType {
    Text,
    Email,
    Password,
    Number,
    Date,
    Textarea,
    Checkbox,
    Radio,
    Select,
    File,
    Submit,
    Reset,
    Fieldset,
}

impl FieldType {
    pub(crate) const ALL: [FieldType; 13] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Password,
        FieldType::Number,
        FieldType::Date,
        FieldType::Textarea,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Select,
        FieldType::File,
        FieldType::Submit,
        FieldType::Reset,
        FieldType::Fieldset,
    ];

    /// Types offered by the "add into fieldset" menu.
    pub(crate) const NESTABLE: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Password,
        FieldType::Number,
        FieldType::Date,
        FieldType::Textarea,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Select,
        FieldType::File,
    ];

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Textarea => "textarea",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Select => "select",
            FieldType::File => "file",
            FieldType::Submit => "submit",
            FieldType::Reset => "reset",
            FieldType::Fieldset => "fieldset",
        }
    }

    /// Palette label, also used as the initial field label.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Email => "Email",
            FieldType::Password => "Password",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Textarea => "Textarea",
            FieldType::Checkbox => "Checkbox",
            FieldType::Radio => "Radio",
            FieldType::Select => "Select",
            FieldType::File => "File",
            FieldType::Submit => "Submit",
            FieldType::Reset => "Reset",
            FieldType::Fieldset => "Fieldset",
        }
    }

    pub(crate) const fn icon(self) -> &'static str {
        match self {
            FieldType::Text => "📝",
            FieldType::Email => "✉",
            FieldType::Password => "🔒",
            FieldType::Number => "🔢",
            FieldType::Date => "📅",
            FieldType::Textarea => "📄",
            FieldType::Checkbox => "☑",
            FieldType::Radio => "🔘",
            FieldType::Select => "📋",
            FieldType::File => "📁",
            FieldType::Submit => "🚀",
            FieldType::Reset => "🔄",
            FieldType::Fieldset => "📦",
        }
    }

    pub(crate) const fn capabilities(self) -> Capabilities {
        const NONE: Capabilities = Capabilities {
            placeholder: false,
            pattern: false,
            max_length: false,
            min: false,
            max: false,
            step: false,
            rows: false,
            accept: false,
            multiple: false,
            options: false,
            container: false,
            button: false,
        };
        match self {
            FieldType::Text => Capabilities {
                placeholder: true,
                pattern: true,
                max_length: true,
                ..NONE
            },
            FieldType::Email => Capabilities {
                placeholder: true,
                pattern: true,
                ..NONE
            },
            FieldType::Password => Capabilities {
                placeholder: true,
                max_length: true,
                ..NONE
            },
            FieldType::Number => Capabilities {
                min: true,
                max: true,
                step: true,
                ..NONE
            },
            FieldType::Date => Capabilities {
                min: true,
                max: true,
                ..NONE
            },
            FieldType::Textarea => Capabilities {
                placeholder: true,
                max_length: true,
                rows: true,
                ..NONE
            },
            FieldType::Checkbox => NONE,
            FieldType::Radio | FieldType::Select => Capabilities {
                options: true,
                ..NONE
            },
            FieldType::File => Capabilities {
                accept: true,
                multiple: true,
                ..NONE
            },
            FieldType::Submit | FieldType::Reset => Capabilities {
                button: true,
                ..NONE
            },
            FieldType::Fieldset => Capabilities {
                container: true,
                ..NONE
            },
        }
    }

    pub(crate) const fn default_button_text(self) -> &'static str {
        match self {
            FieldType::Reset => "Reset",
            _ => "Submit",
        }
    }

    /// Type-specific attributes a freshly created field starts with.
    pub(crate) fn default_kind(self) -> FieldKind {
        match self {
            FieldType::Text => FieldKind::Text {
                placeholder: String::new(),
                pattern: String::new(),
                max_length: String::new(),
            },
            FieldType::Email => FieldKind::Email {
                placeholder: String::new(),
                pattern: String::new(),
            },
            FieldType::Password => FieldKind::Password {
                placeholder: String::new(),
                max_length: String::new(),
            },
            FieldType::Number => FieldKind::Number {
                min: String::new(),
                max: String::new(),
                step: String::new(),
            },
            FieldType::Date => FieldKind::Date {
                min: String::new(),
                max: String::new(),
            },
            FieldType::Textarea => FieldKind::Textarea {
                placeholder: String::new(),
                max_length: String::new(),
                rows: DEFAULT_ROWS,
            },
            FieldType::Checkbox => FieldKind::Checkbox,
            FieldType::Radio => FieldKind::Radio {
                options: FieldOption::seeded(),
            },
            FieldType::Select => FieldKind::Select {
                options: FieldOption::seeded(),
            },
            FieldType::File => FieldKind::File {
                accept: String::new(),
                multiple: false,
            },
            FieldType::Submit => FieldKind::Submit {
                button_text: self.default_button_text().into(),
            },
            FieldType::Reset => FieldKind::Reset {
                button_text: self.default_button_text().into(),
            },
            FieldType::Fieldset => FieldKind::Fieldset {
                legend: "Field group".into(),
                children: Vec::new(),
            },
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FieldOption {
    #[serde(default)]
    pub(crate) value: String,
    #[serde(default)]
    pub(crate) label: String,
}

impl FieldOption {
    pub(crate) fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    fn seeded() -> Vec<FieldOption> {
        (1..=3)
            .map(|i| FieldOption::new(format!("option{i}"), format!("Option {i}")))
            .collect()
    }
}

fn default_rows() -> u32 {
    DEFAULT_ROWS
}

/// Attributes that only some field types carry. The `type` tag doubles as
/// the field's type in the snapshot document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub(crate) enum FieldKind {
    Text {
        #[serde(default)]
        placeholder: String,
        #[serde(default)]
        pattern: String,
        #[serde(default)]
        max_length: String,
    },
    Email {
        #[serde(default)]
        placeholder: String,
        #[serde(default)]
        pattern: String,
    },
    Password {
        #[serde(default)]
        placeholder: String,
        #[serde(default)]
        max_length: String,
    },
    Number {
        #[serde(default)]
        min: String,
        #[serde(default)]
        max: String,
        #[serde(default)]
        step: String,
    },
    Date {
        #[serde(default)]
        min: String,
        #[serde(default)]
        max: String,
    },
    Textarea {
        #[serde(default)]
        placeholder: String,
        #[serde(default)]
        max_length: String,
        #[serde(default = "default_rows")]
        rows: u32,
    },
    Checkbox,
    Radio {
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    Select {
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    File {
        #[serde(default)]
        accept: String,
        #[serde(default)]
        multiple: bool,
    },
    Submit {
        #[serde(default)]
        button_text: String,
    },
    Reset {
        #[serde(default)]
        button_text: String,
    },
    Fieldset {
        #[serde(default)]
        legend: String,
        #[serde(default)]
        children: Vec<Field>,
    },
}

impl FieldKind {
    pub(crate) const fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Email { .. } => FieldType::Email,
            FieldKind::Password { .. } => FieldType::Password,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Date { .. } => FieldType::Date,
            FieldKind::Textarea { .. } => FieldType::Textarea,
            FieldKind::Checkbox => FieldType::Checkbox,
            FieldKind::Radio { .. } => FieldType::Radio,
            FieldKind::Select { .. } => FieldType::Select,
            FieldKind::File { .. } => FieldType::File,
            FieldKind::Submit { .. } => FieldType::Submit,
            FieldKind::Reset { .. } => FieldType::Reset,
            FieldKind::Fieldset { .. } => FieldType::Fieldset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Field {
    pub(crate) id: FieldId,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) default_value: String,
    #[serde(default)]
    pub(crate) required: bool,
    #[serde(default)]
    pub(crate) disabled: bool,
    #[serde(default)]
    pub(crate) custom_classes: String,
    #[serde(default)]
    pub(crate) custom_styles: String,
    /// Owning fieldset, kept for lookups only. Ownership is the parent's
    /// `children` sequence.
    #[serde(default)]
    pub(crate) parent_id: Option<FieldId>,
    #[serde(flatten)]
    pub(crate) kind: FieldKind,
}

impl Field {
    pub(crate) fn new(
        id: FieldId,
        field_type: FieldType,
        name: impl Into<String>,
        parent_id: Option<FieldId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            label: field_type.label().into(),
            default_value: String::new(),
            required: false,
            disabled: false,
            custom_classes: String::new(),
            custom_styles: String::new(),
            parent_id,
            kind: field_type.default_kind(),
        }
    }

    pub(crate) const fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub(crate) const fn capabilities(&self) -> Capabilities {
        self.field_type().capabilities()
    }

    pub(crate) const fn is_button(&self) -> bool {
        self.capabilities().button
    }

    pub(crate) fn children(&self) -> Option<&[Field]> {
        match &self.kind {
            FieldKind::Fieldset { children, .. } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Field>> {
        match &mut self.kind {
            FieldKind::Fieldset { children, .. } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn placeholder(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Text { placeholder, .. }
            | FieldKind::Email { placeholder, .. }
            | FieldKind::Password { placeholder, .. }
            | FieldKind::Textarea { placeholder, .. } => Some(placeholder),
            _ => None,
        }
    }

    pub(crate) fn options(&self) -> Option<&[FieldOption]> {
        match &self.kind {
            FieldKind::Radio { options } | FieldKind::Select { options } => Some(options),
            _ => None,
        }
    }

    /// Text shown in the field list: label, falling back to legend, button
    /// text or name.
    pub(crate) fn display_label(&self) -> &str {
        let text = match &self.kind {
            FieldKind::Fieldset { legend, .. } => legend.as_str(),
            FieldKind::Submit { button_text } | FieldKind::Reset { button_text } => {
                button_text.as_str()
            }
            _ => self.label.as_str(),
        };
        if text.is_empty() { &self.name } else { text }
    }
}
