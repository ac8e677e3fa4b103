use crate::{
    codegen::{ClipboardTarget, CodeLanguage},
    field::{Field, FieldId, FieldKind, FieldOption, FieldPatch, FieldType, MoveDirection},
    highlight::{self, Highlighter},
    project::{FormMethod, FormSettings},
    session::EditorSession,
};
use chrono::NaiveDate;
use egui::{Color32, Id, RichText, Stroke, text::LayoutJob};
use egui_extras::DatePickerButton;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

const DATE_FORMAT: &str = "%Y-%m-%d";
const STATUS_SECS: u64 = 3;
const INDENT: f32 = 16.0;
const REQUIRED_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

const PALETTE_GROUPS: [(&str, &[FieldType]); 4] = [
    (
        "Inputs",
        &[
            FieldType::Text,
            FieldType::Email,
            FieldType::Password,
            FieldType::Number,
            FieldType::Date,
            FieldType::Textarea,
            FieldType::File,
        ],
    ),
    (
        "Choices",
        &[FieldType::Checkbox, FieldType::Radio, FieldType::Select],
    ),
    ("Buttons", &[FieldType::Submit, FieldType::Reset]),
    ("Containers", &[FieldType::Fieldset]),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum RightTab {
    #[default]
    Properties,
    Code,
    Settings,
}

/// Drag-and-drop payload for a field row.
#[derive(Clone, Debug)]
struct DraggedField(FieldId);

/// Something the user asked for while the field list was drawn. Applied
/// after drawing so the tree is not borrowed while it changes.
enum ListAction {
    Select(FieldId),
    Edit(FieldId),
    Move(FieldId, MoveDirection),
    Duplicate(FieldId),
    Delete(FieldId),
    AddChild(FieldId, FieldType),
    Reorder { dragged: FieldId, target: FieldId },
}

/// Values typed into the live preview. Never part of the design.
#[derive(Default)]
struct PreviewState {
    texts: HashMap<FieldId, String>,
    flags: HashMap<FieldId, bool>,
    choices: HashMap<FieldId, usize>,
    dates: HashMap<FieldId, NaiveDate>,
}

impl PreviewState {
    fn text(&mut self, field: &Field) -> &mut String {
        self.texts
            .entry(field.id.clone())
            .or_insert_with(|| field.default_value.clone())
    }

    fn flag(&mut self, field: &Field) -> &mut bool {
        self.flags.entry(field.id.clone()).or_default()
    }

    fn choice(&mut self, field: &Field) -> &mut usize {
        self.choices.entry(field.id.clone()).or_default()
    }

    fn date(&mut self, field: &Field) -> &mut NaiveDate {
        self.dates
            .entry(field.id.clone())
            .or_insert_with(|| parse_date(&field.default_value).unwrap_or_else(today))
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

pub(crate) struct FormBuilderApp {
    session: EditorSession,
    palette_open: bool,
    preview_open: bool,
    selected: Option<FieldId>,
    /// Working copy shown in the property panel; written back on Save.
    draft: Option<Field>,
    right_tab: RightTab,
    code_tab: CodeLanguage,
    /// Settings as typed. The session holds the normalized values.
    settings_draft: FormSettings,
    custom_css_draft: String,
    current_file: Option<PathBuf>,
    status_message: Option<(String, Instant)>,
    confirm_clear: bool,
    highlighter: Highlighter,
    syntax_highlighting: bool,
    highlighted: Option<(CodeLanguage, String, LayoutJob)>,
    preview: PreviewState,
}

impl Default for FormBuilderApp {
    fn default() -> Self {
        let session = EditorSession::default();
        Self {
            settings_draft: session.form_settings().clone(),
            custom_css_draft: session.custom_css().to_string(),
            session,
            palette_open: true,
            preview_open: true,
            selected: None,
            draft: None,
            right_tab: RightTab::default(),
            code_tab: CodeLanguage::default(),
            current_file: None,
            status_message: None,
            confirm_clear: false,
            highlighter: Highlighter::new(),
            syntax_highlighting: true,
            highlighted: None,
            preview: PreviewState::default(),
        }
    }
}

impl FormBuilderApp {
    /// Set a status message that will auto-clear after a few seconds
    fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    fn add_field(&mut self, field_type: FieldType, parent: Option<&FieldId>) {
        if let Some(id) = self.session.add_field(field_type, parent) {
            self.selected = Some(id);
        }
    }

    fn open_editor(&mut self, id: &FieldId) {
        if self.session.open_editor(id) {
            self.draft = self.session.find_field(id).cloned();
            self.selected = Some(id.clone());
            self.right_tab = RightTab::Properties;
        }
    }

    fn close_editor(&mut self) {
        self.session.close_editor();
        self.draft = None;
    }

    fn save_draft(&mut self) {
        if let Some(draft) = self.draft.take() {
            self.session.edit_field(&draft.id, FieldPatch::from_field(&draft));
            self.session.close_editor();
        }
    }

    fn delete_field(&mut self, id: &FieldId) {
        if self.session.delete_field(id) {
            if self.selected.as_ref().is_some_and(|s| self.session.find_field(s).is_none()) {
                self.selected = None;
            }
            if self.session.editing().is_none() {
                self.draft = None;
            }
        }
    }

    fn duplicate_field(&mut self, id: &FieldId) {
        if let Some(copy) = self.session.duplicate_field(id) {
            self.selected = Some(copy);
        }
    }

    fn apply(&mut self, action: ListAction) {
        match action {
            ListAction::Select(id) => self.selected = Some(id),
            ListAction::Edit(id) => self.open_editor(&id),
            ListAction::Move(id, direction) => {
                self.session.move_field(&id, direction);
            }
            ListAction::Duplicate(id) => self.duplicate_field(&id),
            ListAction::Delete(id) => self.delete_field(&id),
            ListAction::AddChild(parent, field_type) => self.add_field(field_type, Some(&parent)),
            ListAction::Reorder { dragged, target } => {
                if self.session.reorder_fields(&dragged, &target) {
                    self.selected = Some(dragged);
                }
            }
        }
    }

    fn save_snapshot(&mut self, path: PathBuf) {
        match self.session.save_to_path(&path) {
            Ok(()) => {
                self.set_status(format!("Saved to {}", path.display()));
                self.current_file = Some(path);
            }
            Err(e) => self.set_status(format!("Save failed: {e}")),
        }
    }

    fn load_snapshot(&mut self, path: PathBuf) {
        match self.session.load_from_path(&path) {
            Ok(()) => {
                self.after_reset();
                self.set_status(format!("Loaded {}", path.display()));
                self.current_file = Some(path);
            }
            Err(e) => self.set_status(format!("Load failed: {e}")),
        }
    }

    fn export_files(&mut self, dir: PathBuf) {
        match self.session.export_files(&dir) {
            Ok(written) => self.set_status(format!(
                "Exported {} files to {}",
                written.len(),
                dir.display()
            )),
            Err(e) => self.set_status(format!("Export failed: {e}")),
        }
    }

    fn clear_all(&mut self) {
        self.session.clear_all();
        self.after_reset();
        self.set_status("All fields removed".into());
    }

    /// Drops view state that pointed into a design that was replaced.
    fn after_reset(&mut self) {
        self.selected = None;
        self.draft = None;
        self.settings_draft = self.session.form_settings().clone();
        self.custom_css_draft = self.session.custom_css().to_string();
        self.preview.reset();
    }

    fn copy_code(&mut self, ctx: &egui::Context, target: ClipboardTarget) {
        ctx.copy_text(self.session.generated().clipboard_text(target));
        let what = match target {
            ClipboardTarget::Single(language) => language.display_name(),
            ClipboardTarget::All => "All code",
        };
        self.set_status(format!("{what} copied to clipboard"));
    }

    fn snapshot_dialog() -> rfd::FileDialog {
        rfd::FileDialog::new().add_filter("Form design", &["json"])
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui
                    .button("Open...")
                    .on_hover_text("Open a saved form design")
                    .clicked()
                {
                    if let Some(path) = Self::snapshot_dialog().pick_file() {
                        self.load_snapshot(path);
                    }
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui.button("Save").on_hover_text("Save the form design").clicked() {
                    if let Some(path) = self.current_file.clone() {
                        self.save_snapshot(path);
                    } else if let Some(path) = Self::snapshot_dialog()
                        .set_file_name("form-design.json")
                        .save_file()
                    {
                        self.save_snapshot(path);
                    }
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui
                    .button("Save As...")
                    .on_hover_text("Save the form design to a new file")
                    .clicked()
                {
                    if let Some(path) = Self::snapshot_dialog()
                        .set_file_name("form-design.json")
                        .save_file()
                    {
                        self.save_snapshot(path);
                    }
                    ui.close_kind(egui::UiKind::Menu);
                }
                ui.separator();
                if ui
                    .button("Export Files...")
                    .on_hover_text("Write form.html, form-styles.css and form-validation.js")
                    .clicked()
                {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        self.export_files(dir);
                    }
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui.button("Copy All Code").clicked() {
                    self.copy_code(ui.ctx(), ClipboardTarget::All);
                    ui.close_kind(egui::UiKind::Menu);
                }
                ui.separator();
                if ui
                    .add_enabled(!self.session.tree().is_empty(), egui::Button::new("Clear All..."))
                    .clicked()
                {
                    self.confirm_clear = true;
                    ui.close_kind(egui::UiKind::Menu);
                }
            });

            ui.menu_button("Edit", |ui| {
                let selected = self.selected.clone();
                ui.add_enabled_ui(selected.is_some(), |ui| {
                    let Some(id) = selected else {
                        return;
                    };
                    if ui.button("Edit").on_hover_text("Open properties").clicked() {
                        self.open_editor(&id);
                        ui.close_kind(egui::UiKind::Menu);
                    }
                    if ui.button("Duplicate").on_hover_text("Ctrl+D").clicked() {
                        self.duplicate_field(&id);
                        ui.close_kind(egui::UiKind::Menu);
                    }
                    if ui.button("Move Up").on_hover_text("Alt+Up").clicked() {
                        self.session.move_field(&id, MoveDirection::Up);
                        ui.close_kind(egui::UiKind::Menu);
                    }
                    if ui.button("Move Down").on_hover_text("Alt+Down").clicked() {
                        self.session.move_field(&id, MoveDirection::Down);
                        ui.close_kind(egui::UiKind::Menu);
                    }
                    if ui.button("Delete").on_hover_text("Del").clicked() {
                        self.delete_field(&id);
                        ui.close_kind(egui::UiKind::Menu);
                    }
                });
            });

            ui.menu_button("View", |ui| {
                ui.checkbox(&mut self.palette_open, "Palette");
                ui.checkbox(&mut self.preview_open, "Live preview");
                if ui
                    .checkbox(&mut self.syntax_highlighting, "Syntax highlighting")
                    .changed()
                {
                    self.highlighted = None;
                }
            });

            // Show status message if recent
            if let Some((msg, time)) = &self.status_message {
                if time.elapsed().as_secs() < STATUS_SECS {
                    ui.separator();
                    ui.label(msg);
                } else {
                    self.status_message = None;
                }
            }
        });
    }

    fn palette_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Palette");
        ui.separator();
        ui.label("Click a control to add it to the form");
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (group, types) in PALETTE_GROUPS {
                    egui::CollapsingHeader::new(group)
                        .default_open(true)
                        .show(ui, |ui| {
                            for &field_type in types {
                                let text = format!("{} {}", field_type.icon(), field_type.label());
                                let supports = field_type.capabilities().attribute_names().join(", ");
                                let response = ui.button(text);
                                let response = if supports.is_empty() {
                                    response
                                } else {
                                    response.on_hover_text(format!("Supports: {supports}"))
                                };
                                if response.clicked() {
                                    self.add_field(field_type, None);
                                }
                            }
                        });
                }

                ui.add_space(8.0);
                ui.separator();
                egui::CollapsingHeader::new("Shortcuts")
                    .default_open(false)
                    .show(ui, |ui| {
                        ui.small("Delete: remove field");
                        ui.small("Ctrl+D: duplicate");
                        ui.small("Alt+Up/Down: move");
                        ui.small("Esc: close properties");
                    });
            });
    }

    fn field_list_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Form fields");
            ui.label(format!("({})", self.session.tree().iter().count()));
        });
        ui.separator();

        if self.session.tree().is_empty() {
            ui.label("No fields yet. Pick one from the palette.");
            return;
        }

        let mut actions = Vec::new();
        egui::ScrollArea::vertical()
            .id_salt("field_list_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                field_rows(
                    ui,
                    self.session.tree().fields(),
                    0,
                    self.selected.as_ref(),
                    &mut actions,
                );
            });
        for action in actions {
            self.apply(action);
        }
    }

    fn properties_ui(&mut self, ui: &mut egui::Ui) {
        let Some(draft) = self.draft.as_mut() else {
            ui.label("Select a field and press ✏ to edit its properties.");
            return;
        };

        ui.label(format!("{} {} · {}", draft.field_type().icon(), draft.field_type().label(), draft.id));
        ui.separator();

        let mut save = false;
        let mut cancel = false;
        egui::ScrollArea::vertical()
            .id_salt("properties_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                draft_editor(ui, draft);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    save = ui.button("Save").clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            });

        if save {
            self.save_draft();
            self.set_status("Field updated".into());
        } else if cancel {
            self.close_editor();
        }
    }

    fn code_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for language in CodeLanguage::ALL {
                if ui
                    .selectable_label(self.code_tab == language, language.display_name())
                    .clicked()
                {
                    self.code_tab = language;
                }
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Copy").clicked() {
                self.copy_code(ui.ctx(), ClipboardTarget::Single(self.code_tab));
            }
            if ui.button("Copy all").clicked() {
                self.copy_code(ui.ctx(), ClipboardTarget::All);
            }
        });
        ui.separator();

        let job = self.code_job(self.code_tab);
        highlight::code_viewer(ui, job, "generated_code_scroll");
    }

    /// Layout for the current text of `language`, reusing the last one while
    /// the text is unchanged.
    fn code_job(&mut self, language: CodeLanguage) -> LayoutJob {
        let text = self.session.generated().text(language);
        if let Some((cached_language, cached_text, job)) = &self.highlighted
            && *cached_language == language
            && cached_text == text
        {
            return job.clone();
        }
        let job = if self.syntax_highlighting {
            self.highlighter.layout_job(text, language)
        } else {
            highlight::plain_layout_job(text)
        };
        self.highlighted = Some((language, text.to_string(), job.clone()));
        job
    }

    fn settings_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Form settings");
        ui.separator();

        let mut settings_changed = false;
        egui::Grid::new("form_settings_grid")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Form id");
                settings_changed |= ui.text_edit_singleline(&mut self.settings_draft.id).changed();
                ui.end_row();

                ui.label("Action");
                settings_changed |= ui
                    .text_edit_singleline(&mut self.settings_draft.action)
                    .changed();
                ui.end_row();

                ui.label("Method");
                egui::ComboBox::from_id_salt("form_method")
                    .selected_text(self.settings_draft.method.as_str())
                    .show_ui(ui, |ui| {
                        for method in [FormMethod::Post, FormMethod::Get] {
                            settings_changed |= ui
                                .selectable_value(&mut self.settings_draft.method, method, method.as_str())
                                .changed();
                        }
                    });
                ui.end_row();
            });
        if settings_changed {
            self.session.set_form_settings(self.settings_draft.clone());
        }

        let mut validation = self.session.include_validation();
        if ui
            .checkbox(&mut validation, "Generate JavaScript validation")
            .changed()
        {
            self.session.set_include_validation(validation);
        }

        ui.add_space(8.0);
        ui.label("Custom CSS");
        let response = ui.add(
            egui::TextEdit::multiline(&mut self.custom_css_draft)
                .code_editor()
                .desired_rows(12)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.session.set_custom_css(self.custom_css_draft.clone());
        }
    }

    fn preview_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Live preview");
            ui.small(format!(
                "{} {} → {}",
                self.session.form_settings().method,
                self.session.form_settings().id,
                self.session.form_settings().action
            ));
        });
        ui.separator();
        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.session.tree().is_empty() {
                    ui.weak("The preview appears once the form has fields.");
                } else if preview_fields(ui, self.session.tree().fields(), &mut self.preview) {
                    self.preview.reset();
                }
            });
    }

    fn confirm_clear_ui(&mut self, ctx: &egui::Context) {
        let mut confirmed = false;
        let mut dismissed = false;
        egui::Window::new("Clear all fields?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Every field will be removed. Form settings and custom CSS are kept.");
                ui.horizontal(|ui| {
                    confirmed = ui.button("Clear all").clicked();
                    dismissed = ui.button("Cancel").clicked();
                });
            });
        if confirmed {
            self.clear_all();
        }
        if confirmed || dismissed {
            self.confirm_clear = false;
        }
    }
}

/// One row per field, children indented below their fieldset.
fn field_rows(
    ui: &mut egui::Ui,
    fields: &[Field],
    depth: usize,
    selected: Option<&FieldId>,
    actions: &mut Vec<ListAction>,
) {
    for field in fields {
        let id = &field.id;
        let row = ui
            .horizontal(|ui| {
                ui.add_space(depth as f32 * INDENT);
                ui.dnd_drag_source(
                    Id::new(("field_row", id.as_str())),
                    DraggedField(id.clone()),
                    |ui| {
                        ui.label("⋮⋮").on_hover_text("Drag to reorder");
                    },
                );
                let mut badge = format!("{} {}", field.field_type().icon(), field.field_type().label());
                if let Some(options) = field.options() {
                    badge.push_str(&format!(" ({})", options.len()));
                }
                ui.label(RichText::new(badge).small());
                let mut caption = RichText::new(field.display_label());
                if field.required {
                    caption = caption.strong();
                }
                if ui
                    .selectable_label(selected == Some(id), caption)
                    .clicked()
                {
                    actions.push(ListAction::Select(id.clone()));
                }

                if ui.small_button("↑").on_hover_text("Move up").clicked() {
                    actions.push(ListAction::Move(id.clone(), MoveDirection::Up));
                }
                if ui.small_button("↓").on_hover_text("Move down").clicked() {
                    actions.push(ListAction::Move(id.clone(), MoveDirection::Down));
                }
                if ui.small_button("✏").on_hover_text("Edit").clicked() {
                    actions.push(ListAction::Edit(id.clone()));
                }
                if ui.small_button("📋").on_hover_text("Duplicate").clicked() {
                    actions.push(ListAction::Duplicate(id.clone()));
                }
                if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                    actions.push(ListAction::Delete(id.clone()));
                }
            })
            .response;

        if let Some(dragged) = row.dnd_hover_payload::<DraggedField>()
            && dragged.0 != *id
        {
            let stroke = Stroke::new(2.0, ui.visuals().selection.stroke.color);
            ui.painter().hline(row.rect.x_range(), row.rect.top(), stroke);
        }
        if let Some(dragged) = row.dnd_release_payload::<DraggedField>() {
            actions.push(ListAction::Reorder {
                dragged: dragged.0.clone(),
                target: id.clone(),
            });
        }

        if let Some(children) = field.children() {
            ui.horizontal(|ui| {
                ui.add_space((depth + 1) as f32 * INDENT);
                ui.menu_button("➕ Add field to group", |ui| {
                    for field_type in FieldType::NESTABLE {
                        let text = format!("{} {}", field_type.icon(), field_type.label());
                        if ui.button(text).clicked() {
                            actions.push(ListAction::AddChild(id.clone(), field_type));
                            ui.close_kind(egui::UiKind::Menu);
                        }
                    }
                });
            });
            if children.is_empty() {
                ui.horizontal(|ui| {
                    ui.add_space((depth + 1) as f32 * INDENT);
                    ui.weak("Empty group");
                });
            } else {
                field_rows(ui, children, depth + 1, selected, actions);
            }
        }
    }
}

/// Editors for every attribute the draft's type supports.
fn draft_editor(ui: &mut egui::Ui, draft: &mut Field) {
    let caps = draft.capabilities();
    let salt = draft.id.as_str().to_string();

    egui::Grid::new(("draft_grid", &salt))
        .num_columns(2)
        .show(ui, |ui| {
            if !caps.button {
                ui.label("Name");
                ui.text_edit_singleline(&mut draft.name)
                    .on_hover_text("Leave empty to keep the current name");
                ui.end_row();
                ui.label("Label");
                ui.text_edit_singleline(&mut draft.label);
                ui.end_row();
            }

            match &mut draft.kind {
                FieldKind::Text {
                    placeholder,
                    pattern,
                    max_length,
                } => {
                    text_row(ui, "Placeholder", placeholder);
                    text_row(ui, "Pattern", pattern);
                    text_row(ui, "Max length", max_length);
                }
                FieldKind::Email {
                    placeholder,
                    pattern,
                } => {
                    text_row(ui, "Placeholder", placeholder);
                    text_row(ui, "Pattern", pattern);
                }
                FieldKind::Password {
                    placeholder,
                    max_length,
                } => {
                    text_row(ui, "Placeholder", placeholder);
                    text_row(ui, "Max length", max_length);
                }
                FieldKind::Number { min, max, step } => {
                    text_row(ui, "Min", min);
                    text_row(ui, "Max", max);
                    text_row(ui, "Step", step);
                }
                FieldKind::Date { min, max } => {
                    date_row(ui, "Min", min, &format!("{salt}_min"));
                    date_row(ui, "Max", max, &format!("{salt}_max"));
                }
                FieldKind::Textarea {
                    placeholder,
                    max_length,
                    rows,
                } => {
                    text_row(ui, "Placeholder", placeholder);
                    text_row(ui, "Max length", max_length);
                    ui.label("Rows");
                    ui.add(egui::DragValue::new(rows).range(1..=50));
                    ui.end_row();
                }
                FieldKind::File { accept, multiple } => {
                    text_row(ui, "Accept", accept);
                    ui.label("Multiple");
                    ui.checkbox(multiple, "");
                    ui.end_row();
                }
                FieldKind::Submit { button_text } | FieldKind::Reset { button_text } => {
                    text_row(ui, "Button text", button_text);
                }
                FieldKind::Fieldset { legend, .. } => {
                    text_row(ui, "Legend", legend);
                }
                FieldKind::Checkbox | FieldKind::Radio { .. } | FieldKind::Select { .. } => {}
            }

            if !caps.button && !caps.container && !caps.options {
                if matches!(draft.kind, FieldKind::Date { .. }) {
                    date_row(ui, "Default value", &mut draft.default_value, &format!("{salt}_default"));
                } else {
                    text_row(ui, "Default value", &mut draft.default_value);
                }
            }

            text_row(ui, "CSS classes", &mut draft.custom_classes);
            text_row(ui, "Inline styles", &mut draft.custom_styles);
        });

    ui.horizontal(|ui| {
        if !caps.button {
            ui.checkbox(&mut draft.required, "Required");
        }
        ui.checkbox(&mut draft.disabled, "Disabled");
    });

    if let FieldKind::Radio { options } | FieldKind::Select { options } = &mut draft.kind {
        ui.add_space(6.0);
        options_editor(ui, options);
    }
}

fn text_row(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(label);
    ui.text_edit_singleline(value);
    ui.end_row();
}

/// A `YYYY-MM-DD` attribute edited with a date picker. Empty means unset.
fn date_row(ui: &mut egui::Ui, label: &str, value: &mut String, id_salt: &str) {
    ui.label(label);
    ui.horizontal(|ui| match parse_date(value) {
        Some(mut date) => {
            ui.add(DatePickerButton::new(&mut date).id_salt(id_salt));
            *value = date.format(DATE_FORMAT).to_string();
            if ui.small_button("✖").on_hover_text("Clear").clicked() {
                value.clear();
            }
        }
        None => {
            if ui.button("Set date").clicked() {
                *value = today().format(DATE_FORMAT).to_string();
            }
        }
    });
    ui.end_row();
}

fn options_editor(ui: &mut egui::Ui, options: &mut Vec<FieldOption>) {
    ui.label("Options");
    let mut remove = None;
    egui::Grid::new("options_grid").num_columns(3).show(ui, |ui| {
        ui.weak("Value");
        ui.weak("Label");
        ui.end_row();
        for (i, option) in options.iter_mut().enumerate() {
            ui.add(egui::TextEdit::singleline(&mut option.value).desired_width(90.0));
            ui.add(egui::TextEdit::singleline(&mut option.label).desired_width(120.0));
            if ui.small_button("🗑").on_hover_text("Remove option").clicked() {
                remove = Some(i);
            }
            ui.end_row();
        }
    });
    if let Some(i) = remove {
        options.remove(i);
    }
    if ui.button("➕ Add option").clicked() {
        let n = options.len() + 1;
        options.push(FieldOption::new(format!("option{n}"), format!("Option {n}")));
    }
}

/// Renders the form with egui widgets. Returns true if a reset button was
/// pressed.
fn preview_fields(ui: &mut egui::Ui, fields: &[Field], state: &mut PreviewState) -> bool {
    let mut reset = false;
    for field in fields {
        ui.add_enabled_ui(!field.disabled, |ui| {
            reset |= preview_field(ui, field, state);
        });
        ui.add_space(6.0);
    }
    reset
}

fn preview_field(ui: &mut egui::Ui, field: &Field, state: &mut PreviewState) -> bool {
    let text_color = ui.visuals().text_color();
    let caption = || {
        let mut job = LayoutJob::default();
        let style = egui::TextFormat {
            color: text_color,
            ..Default::default()
        };
        job.append(&field.label, 0.0, style.clone());
        if field.required {
            job.append(
                " *",
                0.0,
                egui::TextFormat {
                    color: REQUIRED_COLOR,
                    ..style
                },
            );
        }
        job
    };
    let hint = field.placeholder().unwrap_or_default().to_string();

    match &field.kind {
        FieldKind::Text { .. } | FieldKind::Email { .. } | FieldKind::Number { .. } => {
            ui.label(caption());
            ui.add(egui::TextEdit::singleline(state.text(field)).hint_text(hint));
        }
        FieldKind::Password { .. } => {
            ui.label(caption());
            ui.add(
                egui::TextEdit::singleline(state.text(field))
                    .password(true)
                    .hint_text(hint),
            );
        }
        FieldKind::Date { .. } => {
            ui.label(caption());
            ui.add(DatePickerButton::new(state.date(field)).id_salt(field.id.as_str()));
        }
        FieldKind::Textarea { rows, .. } => {
            ui.label(caption());
            ui.add(
                egui::TextEdit::multiline(state.text(field))
                    .hint_text(hint)
                    .desired_rows(*rows as usize),
            );
        }
        FieldKind::Checkbox => {
            ui.checkbox(state.flag(field), caption());
        }
        FieldKind::Radio { options } => {
            ui.label(caption());
            let choice = state.choice(field);
            for (i, option) in options.iter().enumerate() {
                ui.radio_value(&mut *choice, i, &option.label);
            }
        }
        FieldKind::Select { options } => {
            ui.label(caption());
            let choice = state.choice(field);
            let current = options.get(*choice).map(|o| o.label.as_str()).unwrap_or("");
            egui::ComboBox::from_id_salt(field.id.as_str())
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for (i, option) in options.iter().enumerate() {
                        ui.selectable_value(&mut *choice, i, &option.label);
                    }
                });
        }
        FieldKind::File { accept, multiple } => {
            ui.label(caption());
            ui.horizontal(|ui| {
                let text = if *multiple { "Choose files..." } else { "Choose file..." };
                ui.add_enabled(false, egui::Button::new(text));
                if !accept.is_empty() {
                    ui.weak(accept);
                }
            });
        }
        FieldKind::Submit { button_text } => {
            ui.add(egui::Button::new(button_caption(field, button_text)));
        }
        FieldKind::Reset { button_text } => {
            return ui.button(button_caption(field, button_text)).clicked();
        }
        FieldKind::Fieldset { legend, children } => {
            let mut reset = false;
            ui.group(|ui| {
                ui.strong(if legend.is_empty() { "Group" } else { legend.as_str() });
                reset = preview_fields(ui, children, state);
            });
            return reset;
        }
    }
    false
}

fn button_caption<'a>(field: &Field, text: &'a str) -> &'a str {
    if text.is_empty() {
        field.field_type().default_button_text()
    } else {
        text
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl eframe::App for FormBuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Field shortcuts are ignored while a text box has focus.
        let typing = ctx.wants_keyboard_input();
        let (delete_pressed, duplicate_pressed, move_up, move_down, escape_pressed) =
            ctx.input(|i| {
                let del = !typing && i.key_pressed(egui::Key::Delete);
                let dup = !typing && i.modifiers.command && i.key_pressed(egui::Key::D);
                let up = !typing && i.modifiers.alt && i.key_pressed(egui::Key::ArrowUp);
                let down = !typing && i.modifiers.alt && i.key_pressed(egui::Key::ArrowDown);
                let esc = i.key_pressed(egui::Key::Escape);
                (del, dup, up, down, esc)
            });

        if let Some(id) = self.selected.clone() {
            if delete_pressed {
                self.delete_field(&id);
            } else if duplicate_pressed {
                self.duplicate_field(&id);
            } else if move_up {
                self.session.move_field(&id, MoveDirection::Up);
            } else if move_down {
                self.session.move_field(&id, MoveDirection::Down);
            }
        }
        if escape_pressed {
            if self.confirm_clear {
                self.confirm_clear = false;
            } else {
                self.close_editor();
            }
        }

        egui::TopBottomPanel::top("menubar").show(ctx, |ui| self.top_bar(ui));
        if self.palette_open {
            egui::SidePanel::left("palette")
                .resizable(true)
                .default_width(180.0)
                .show(ctx, |ui| self.palette_ui(ui));
        }
        egui::SidePanel::right("properties")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for (tab, label) in [
                        (RightTab::Properties, "Properties"),
                        (RightTab::Code, "Code"),
                        (RightTab::Settings, "Settings"),
                    ] {
                        if ui.selectable_label(self.right_tab == tab, label).clicked() {
                            self.right_tab = tab;
                        }
                    }
                });
                ui.separator();

                match self.right_tab {
                    RightTab::Properties => self.properties_ui(ui),
                    RightTab::Code => self.code_ui(ui),
                    RightTab::Settings => self.settings_ui(ui),
                }
            });
        if self.preview_open {
            egui::TopBottomPanel::bottom("preview")
                .resizable(true)
                .default_height(280.0)
                .show(ctx, |ui| self.preview_ui(ui));
        }
        egui::CentralPanel::default().show(ctx, |ui| self.field_list_ui(ui));

        if self.confirm_clear {
            self.confirm_clear_ui(ctx);
        }

        if egui::DragAndDrop::has_payload_of_type::<DraggedField>(ctx) {
            ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
        }
    }
}
