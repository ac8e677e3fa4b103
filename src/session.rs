//! The editor session: one form design plus everything derived from it.
//!
//! Every mutation goes through [`EditorSession`] so the generated code is
//! always in step with the tree.

use crate::codegen::GeneratedCode;
use crate::error::{ExportError, SnapshotError};
use crate::field::{Field, FieldId, FieldIdAllocator, FieldPatch, FieldTree, FieldType, MoveDirection};
use crate::project::{FormSettings, SNAPSHOT_VERSION, Snapshot};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub(crate) struct EditorSession {
    tree: FieldTree,
    form_settings: FormSettings,
    custom_css: String,
    include_validation: bool,
    editing: Option<FieldId>,
    ids: FieldIdAllocator,
    generated: GeneratedCode,
}

impl Default for EditorSession {
    fn default() -> Self {
        let mut session = Self {
            tree: FieldTree::default(),
            form_settings: FormSettings::default(),
            custom_css: String::new(),
            include_validation: true,
            editing: None,
            ids: FieldIdAllocator::default(),
            generated: GeneratedCode::default(),
        };
        session.regenerate();
        session
    }
}

impl EditorSession {
    pub(crate) fn tree(&self) -> &FieldTree {
        &self.tree
    }

    pub(crate) fn form_settings(&self) -> &FormSettings {
        &self.form_settings
    }

    pub(crate) fn custom_css(&self) -> &str {
        &self.custom_css
    }

    pub(crate) fn include_validation(&self) -> bool {
        self.include_validation
    }

    pub(crate) fn generated(&self) -> &GeneratedCode {
        &self.generated
    }

    /// Field currently open in the property panel.
    pub(crate) fn editing(&self) -> Option<&FieldId> {
        self.editing.as_ref()
    }

    /// Builds a field with the type's defaults and a fresh id. The field is
    /// not inserted anywhere.
    pub(crate) fn create_field(&mut self, field_type: FieldType, parent: Option<&FieldId>) -> Field {
        let id = self.ids.allocate(|candidate| self.tree.contains(candidate));
        let name = match id.sequence() {
            Some(n) => format!("{field_type}_{n}"),
            None => format!("{field_type}_{id}"),
        };
        Field::new(id, field_type, name, parent.cloned())
    }

    /// Appends a new field to fieldset `parent`, or to the top level. Returns
    /// `None` without touching anything if `parent` is not a fieldset.
    pub(crate) fn add_field(&mut self, field_type: FieldType, parent: Option<&FieldId>) -> Option<FieldId> {
        if let Some(parent_id) = parent
            && !self
                .tree
                .find(parent_id)
                .is_some_and(|f| f.capabilities().container)
        {
            debug!("add {field_type}: parent {parent_id} is not a fieldset");
            return None;
        }
        let field = self.create_field(field_type, parent);
        let id = field.id.clone();
        if !self.tree.insert(field, parent) {
            return None;
        }
        info!("added {field_type} field {id}");
        self.regenerate();
        Some(id)
    }

    pub(crate) fn find_field(&self, id: &FieldId) -> Option<&Field> {
        self.tree.find(id)
    }

    pub(crate) fn edit_field(&mut self, id: &FieldId, patch: FieldPatch) -> bool {
        let Some(field) = self.tree.find_mut(id) else {
            debug!("edit: no field {id}");
            return false;
        };
        patch.apply(field);
        debug!("edited field {id}");
        self.regenerate();
        true
    }

    /// Removes a field and its subtree. Closes the property panel if the
    /// field it shows went with it.
    pub(crate) fn delete_field(&mut self, id: &FieldId) -> bool {
        let Some(removed) = self.tree.remove(id) else {
            debug!("delete: no field {id}");
            return false;
        };
        if let Some(editing) = &self.editing
            && !self.tree.contains(editing)
        {
            self.editing = None;
        }
        info!("deleted {} field {id}", removed.field_type());
        self.regenerate();
        true
    }

    pub(crate) fn duplicate_field(&mut self, id: &FieldId) -> Option<FieldId> {
        let Some(copy) = self.tree.duplicate(id, &mut self.ids) else {
            debug!("duplicate: no field {id}");
            return None;
        };
        info!("duplicated field {id} as {copy}");
        self.regenerate();
        Some(copy)
    }

    pub(crate) fn move_field(&mut self, id: &FieldId, direction: MoveDirection) -> bool {
        if !self.tree.move_field(id, direction) {
            debug!("move {direction:?}: {id} stays put");
            return false;
        }
        self.regenerate();
        true
    }

    pub(crate) fn reorder_fields(&mut self, dragged: &FieldId, target: &FieldId) -> bool {
        if !self.tree.reorder(dragged, target) {
            debug!("reorder: cannot drop {dragged} before {target}");
            return false;
        }
        debug!("dropped {dragged} before {target}");
        self.regenerate();
        true
    }

    pub(crate) fn open_editor(&mut self, id: &FieldId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        self.editing = Some(id.clone());
        true
    }

    pub(crate) fn close_editor(&mut self) {
        self.editing = None;
    }

    pub(crate) fn set_form_settings(&mut self, settings: FormSettings) {
        self.form_settings = settings.normalized();
        self.regenerate();
    }

    pub(crate) fn set_custom_css(&mut self, css: impl Into<String>) {
        self.custom_css = css.into();
        self.regenerate();
    }

    pub(crate) fn set_include_validation(&mut self, include: bool) {
        self.include_validation = include;
        self.regenerate();
    }

    pub(crate) fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION.into(),
            form_settings: Some(self.form_settings.clone()),
            fields: Some(self.tree.clone()),
            custom_css: Some(self.custom_css.clone()),
        }
    }

    /// Replaces each part of the design the snapshot carries. A snapshot
    /// whose tree repeats an id is rejected and the session is left as is.
    pub(crate) fn load_snapshot(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        if let Some(fields) = &snapshot.fields
            && let Some(id) = fields.first_duplicate_id()
        {
            warn!("rejecting snapshot: duplicate field id {id}");
            return Err(SnapshotError::DuplicateId(id.clone()));
        }
        if snapshot.version != SNAPSHOT_VERSION {
            warn!("loading snapshot version {} as {SNAPSHOT_VERSION}", snapshot.version);
        }

        if let Some(settings) = snapshot.form_settings {
            self.form_settings = settings.normalized();
        }
        if let Some(mut fields) = snapshot.fields {
            fields.normalize_parents();
            self.ids.advance_past(fields.iter().map(|f| &f.id));
            self.tree = fields;
        }
        if let Some(css) = snapshot.custom_css {
            self.custom_css = css;
        }
        self.editing = None;
        info!("loaded snapshot with {} fields", self.tree.iter().count());
        self.regenerate();
        Ok(())
    }

    pub(crate) fn load_snapshot_json(&mut self, json: &str) -> Result<(), SnapshotError> {
        let snapshot = Snapshot::from_json(json)?;
        self.load_snapshot(snapshot)
    }

    pub(crate) fn save_to_path(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.export_snapshot().to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved snapshot to {}", path.display());
        Ok(())
    }

    pub(crate) fn load_from_path(&mut self, path: &Path) -> Result<(), SnapshotError> {
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_snapshot_json(&json)
    }

    pub(crate) fn export_files(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let written = self.generated.write_files(dir)?;
        info!("exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Empties the design. Form settings and custom CSS are kept.
    pub(crate) fn clear_all(&mut self) {
        self.tree.clear();
        self.editing = None;
        info!("cleared all fields");
        self.regenerate();
    }

    fn regenerate(&mut self) {
        self.generated = GeneratedCode::generate(
            &self.tree,
            &self.form_settings,
            &self.custom_css,
            self.include_validation,
        );
    }
}
