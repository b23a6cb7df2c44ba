use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Field, Record, SearchField};

/// Whether the record form creates a record or edits an existing one.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum FormKind {
    Add,
    Edit,
}

/// Form state for adding or modifying a record.
#[derive(Clone, Debug)]
pub(crate) struct RecordForm {
    pub(crate) record: Record,
    pub(crate) kind: FormKind,
    pub(crate) active: Field,
    pub(crate) statuses: Vec<String>,
    pub(crate) error: Option<String>,
}

impl RecordForm {
    /// Blank form with the first configured status preselected.
    pub(crate) fn for_add(statuses: &[String]) -> Self {
        let mut record = Record::default();
        if let Some(first) = statuses.first() {
            record.status = first.clone();
        }
        Self {
            record,
            kind: FormKind::Add,
            active: Field::Project,
            statuses: statuses.to_vec(),
            error: None,
        }
    }

    /// Populate the form from an existing record. A status that is not in
    /// the configured list is offered as an extra choice so it survives.
    pub(crate) fn for_edit(record: &Record, statuses: &[String]) -> Self {
        let mut choices = statuses.to_vec();
        if !record.status.is_empty() && !choices.contains(&record.status) {
            choices.insert(0, record.status.clone());
        }
        Self {
            record: record.clone(),
            kind: FormKind::Edit,
            active: Field::Status,
            statuses: choices,
            error: None,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Add => "Add Record",
            FormKind::Edit => "Modify Record",
        }
    }

    fn focusable(&self) -> &'static [Field] {
        match self.kind {
            FormKind::Add => &Field::ALL,
            FormKind::Edit => &Field::EDITABLE,
        }
    }

    /// Identity fields are shown but cannot be changed while editing.
    pub(crate) fn is_locked(&self, field: Field) -> bool {
        self.kind == FormKind::Edit && !field.is_editable()
    }

    pub(crate) fn next_field(&mut self) {
        self.step_field(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.step_field(-1);
    }

    fn step_field(&mut self, delta: isize) {
        let fields = self.focusable();
        let current = fields.iter().position(|f| *f == self.active).unwrap_or(0) as isize;
        let len = fields.len() as isize;
        self.active = fields[(current + delta).rem_euclid(len) as usize];
    }

    /// Type into the active field. The status field is a selector and only
    /// reacts to `cycle_status`.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || self.active == Field::Status || self.is_locked(self.active) {
            return false;
        }
        self.record.get_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        if self.active == Field::Status || self.is_locked(self.active) {
            return;
        }
        self.record.get_mut(self.active).pop();
    }

    /// Move the status selector by `delta` through the configured values.
    pub(crate) fn cycle_status(&mut self, delta: isize) -> bool {
        if self.active != Field::Status || self.statuses.is_empty() {
            return false;
        }
        self.record.status = cycle(&self.statuses, &self.record.status, delta);
        true
    }

    /// The record as typed, with surrounding whitespace removed.
    pub(crate) fn to_record(&self) -> Record {
        self.record.trimmed()
    }

    /// Render one `Label: value` line for the modal.
    pub(crate) fn build_line(&self, field: Field) -> Line<'static> {
        let value = self.record.get(field);
        let is_active = self.active == field;
        let locked = self.is_locked(field);

        let display = if field == Field::Status {
            format!("◀ {} ▶", if value.is_empty() { "<choose>" } else { value })
        } else if value.is_empty() {
            let placeholder = if field.is_required() { "<required>" } else { "<optional>" };
            placeholder.to_string()
        } else {
            value.to_string()
        };

        let style = if locked {
            Style::default().fg(Color::DarkGray)
        } else if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ];
        if locked {
            spans.push(Span::styled("  (read-only)", Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    }

    pub(crate) fn value_len(&self, field: Field) -> usize {
        self.record.get(field).chars().count()
    }
}

/// What a lookup dialog is looking for.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LookupPurpose {
    /// Find the single record with a given status and edit it.
    Modify,
    /// Find the single record with a given project and delete it.
    Delete,
}

/// Exact-match lookup dialog in front of the modify and delete flows.
#[derive(Clone, Debug)]
pub(crate) struct LookupForm {
    pub(crate) purpose: LookupPurpose,
    pub(crate) value: String,
    pub(crate) statuses: Vec<String>,
    pub(crate) error: Option<String>,
}

impl LookupForm {
    pub(crate) fn new(purpose: LookupPurpose, value: String, statuses: &[String]) -> Self {
        Self {
            purpose,
            value,
            statuses: statuses.to_vec(),
            error: None,
        }
    }

    pub(crate) fn field(&self) -> Field {
        match self.purpose {
            LookupPurpose::Modify => Field::Status,
            LookupPurpose::Delete => Field::Project,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.purpose {
            LookupPurpose::Modify => "Modify Record",
            LookupPurpose::Delete => "Delete Record",
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Status lookups can step through the configured values with ←/→.
    pub(crate) fn cycle_status(&mut self, delta: isize) -> bool {
        if self.purpose != LookupPurpose::Modify || self.statuses.is_empty() {
            return false;
        }
        self.value = cycle(&self.statuses, self.value.trim(), delta);
        true
    }
}

/// State for the live search bar.
#[derive(Clone, Debug, Default)]
pub(crate) struct SearchForm {
    pub(crate) field: SearchField,
    pub(crate) query: String,
}

/// File operations that need a path from the user.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum FileAction {
    Open,
    New,
    SaveAs,
    ExportCsv,
    ImportCsv,
}

impl FileAction {
    pub(crate) fn title(self) -> &'static str {
        match self {
            FileAction::Open => "Open JSON File",
            FileAction::New => "New File",
            FileAction::SaveAs => "Save As",
            FileAction::ExportCsv => "Export CSV",
            FileAction::ImportCsv => "Import CSV",
        }
    }

    pub(crate) fn cancelled_message(self) -> &'static str {
        match self {
            FileAction::Open => "Open cancelled.",
            FileAction::New => "New file cancelled.",
            FileAction::SaveAs => "Save cancelled.",
            FileAction::ExportCsv => "Export cancelled.",
            FileAction::ImportCsv => "Import cancelled.",
        }
    }

    /// Whether running the action replaces the records in memory.
    pub(crate) fn replaces_records(self) -> bool {
        matches!(self, FileAction::Open | FileAction::New | FileAction::ImportCsv)
    }
}

/// Path input standing in for a file picker. Esc means the picker was
/// dismissed.
#[derive(Clone, Debug)]
pub(crate) struct PathPrompt {
    pub(crate) action: FileAction,
    pub(crate) input: String,
    pub(crate) error: Option<String>,
    /// Quit once the file is written (save from the exit dialog).
    pub(crate) exit_after: bool,
}

impl PathPrompt {
    pub(crate) fn new(action: FileAction, input: String) -> Self {
        Self {
            action,
            input,
            error: None,
            exit_after: false,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.input.push(ch);
        self.error = None;
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }
}

/// State for confirming the deletion of one record.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmDelete {
    pub(crate) index: usize,
    pub(crate) project: String,
}

/// Tracks the user's choice when quitting with unsaved changes.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmExit {
    pub(crate) selection: ExitChoice,
}

impl ConfirmExit {
    pub(crate) fn new() -> Self {
        Self {
            selection: ExitChoice::Save,
        }
    }

    /// Move the selection forward (Save → Discard → Cancel).
    pub(crate) fn next(&mut self) {
        self.selection = match self.selection {
            ExitChoice::Save => ExitChoice::Discard,
            ExitChoice::Discard => ExitChoice::Cancel,
            ExitChoice::Cancel => ExitChoice::Save,
        };
    }

    pub(crate) fn previous(&mut self) {
        self.selection = match self.selection {
            ExitChoice::Save => ExitChoice::Cancel,
            ExitChoice::Discard => ExitChoice::Save,
            ExitChoice::Cancel => ExitChoice::Discard,
        };
    }

    pub(crate) fn labels(&self) -> [&'static str; 3] {
        ["Save & Quit", "Discard & Quit", "Cancel"]
    }

    pub(crate) fn selected_index(&self) -> usize {
        match self.selection {
            ExitChoice::Save => 0,
            ExitChoice::Discard => 1,
            ExitChoice::Cancel => 2,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum ExitChoice {
    Save,
    Discard,
    Cancel,
}

/// Step through `values` starting from `current`. Unknown values start over
/// from the first (or last, going backwards) entry.
fn cycle(values: &[String], current: &str, delta: isize) -> String {
    let len = values.len() as isize;
    let next = match values.iter().position(|v| v == current) {
        Some(idx) => (idx as isize + delta).rem_euclid(len),
        None if delta < 0 => len - 1,
        None => 0,
    };
    values[next as usize].clone()
}
