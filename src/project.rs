//! Form-level settings and the JSON snapshot document used for save/load.

use crate::error::SnapshotError;
use crate::field::FieldTree;
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const SNAPSHOT_VERSION: &str = "1.0";
pub(crate) const DEFAULT_FORM_ID: &str = "my-form";
pub(crate) const DEFAULT_FORM_ACTION: &str = "#";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum FormMethod {
    #[serde(rename = "GET", alias = "get")]
    Get,
    #[default]
    #[serde(rename = "POST", alias = "post")]
    Post,
}

impl FormMethod {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            FormMethod::Get => "GET",
            FormMethod::Post => "POST",
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FormSettings {
    pub(crate) id: String,
    pub(crate) action: String,
    pub(crate) method: FormMethod,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            id: DEFAULT_FORM_ID.into(),
            action: DEFAULT_FORM_ACTION.into(),
            method: FormMethod::Post,
        }
    }
}

impl FormSettings {
    /// Blank id or action fall back to their defaults.
    pub(crate) fn normalized(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = DEFAULT_FORM_ID.into();
        }
        if self.action.trim().is_empty() {
            self.action = DEFAULT_FORM_ACTION.into();
        }
        self
    }
}

/// Everything needed to rebuild a design. Each top-level key is optional on
/// load so partial documents are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snapshot {
    #[serde(default = "default_version")]
    pub(crate) version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) form_settings: Option<FormSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) fields: Option<FieldTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) custom_css: Option<String>,
}

fn default_version() -> String {
    SNAPSHOT_VERSION.into()
}

impl Snapshot {
    pub(crate) fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldId, FieldType};

    #[test]
    fn test_form_settings_default() {
        let settings = FormSettings::default();
        assert_eq!(settings.id, "my-form");
        assert_eq!(settings.action, "#");
        assert_eq!(settings.method, FormMethod::Post);
    }

    #[test]
    fn test_form_settings_normalized() {
        let settings = FormSettings {
            id: "  ".into(),
            action: String::new(),
            method: FormMethod::Get,
        }
        .normalized();
        assert_eq!(settings.id, "my-form");
        assert_eq!(settings.action, "#");
        assert_eq!(settings.method, FormMethod::Get);
    }

    #[test]
    fn test_method_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&FormMethod::Get).unwrap(), "\"GET\"");
        let m: FormMethod = serde_json::from_str("\"post\"").unwrap();
        assert_eq!(m, FormMethod::Post);
    }

    #[test]
    fn test_partial_snapshot_is_accepted() {
        let snap = Snapshot::from_json(r#"{"customCss": "a { color: red; }"}"#).unwrap();
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert!(snap.form_settings.is_none());
        assert!(snap.fields.is_none());
        assert_eq!(snap.custom_css.as_deref(), Some("a { color: red; }"));

        let snap = Snapshot::from_json(r#"{"formSettings": {"id": "signup"}}"#).unwrap();
        let settings = snap.form_settings.unwrap();
        assert_eq!(settings.id, "signup");
        assert_eq!(settings.action, "#");
    }

    #[test]
    fn test_malformed_snapshot_is_rejected() {
        assert!(matches!(
            Snapshot::from_json("{not json"),
            Err(SnapshotError::Parse(_))
        ));
        assert!(matches!(
            Snapshot::from_json(r#"{"fields": [{"id": "a", "type": "hologram"}]}"#),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut fieldset = Field::new(FieldId::new("field_1"), FieldType::Fieldset, "group", None);
        fieldset.children_mut().unwrap().push(Field::new(
            FieldId::new("field_2"),
            FieldType::Select,
            "color",
            Some(FieldId::new("field_1")),
        ));
        let snap = Snapshot {
            version: SNAPSHOT_VERSION.into(),
            form_settings: Some(FormSettings::default()),
            fields: Some(FieldTree::from(vec![fieldset])),
            custom_css: Some(String::new()),
        };

        let value: serde_json::Value =
            serde_json::from_str(&snap.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["formSettings"]["method"], "POST");
        assert_eq!(value["fields"][0]["type"], "fieldset");
        assert_eq!(value["fields"][0]["legend"], "Field group");
        let child = &value["fields"][0]["children"][0];
        assert_eq!(child["type"], "select");
        assert_eq!(child["parentId"], "field_1");
        assert_eq!(child["options"][1]["value"], "option2");
        assert_eq!(value["customCss"], "");
    }
}
