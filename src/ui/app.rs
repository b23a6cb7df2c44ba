use std::mem;
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::event::KeyCode;
use log::debug;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use crate::config::Config;
use crate::models::{Field, Record};
use crate::store::{Document, OpenOutcome, SaveOutcome};
use crate::view::{Page, ViewState};

use super::forms::{
    ConfirmDelete, ConfirmExit, ExitChoice, FileAction, FormKind, LookupForm, LookupPurpose,
    PathPrompt, RecordForm, SearchForm,
};
use super::helpers::{centered_rect, plural_records, truncate_cell};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Relative column widths for the record table, in field order.
const COLUMN_WIDTHS: [u16; 7] = [14, 12, 14, 12, 11, 10, 27];

/// Modal states. Only one dialog is open at a time, which is also what keeps
/// file operations from overlapping.
enum Mode {
    Normal,
    Adding(RecordForm),
    Editing { index: usize, form: RecordForm },
    Lookup(LookupForm),
    ConfirmDelete(ConfirmDelete),
    Searching(SearchForm),
    Prompt(PathPrompt),
    ConfirmDiscard(FileAction),
    ConfirmExit(ConfirmExit),
    Help,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    document: Document,
    config: Config,
    view: ViewState,
    /// Highlighted row within the current page.
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(document: Document, config: Config) -> Self {
        let view = ViewState::new(config.sort_field, config.sort_order);
        Self {
            document,
            config,
            view,
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Show an error in the footer, e.g. a start-up file that failed to load.
    pub fn report_error<S: Into<String>>(&mut self, message: S) {
        self.set_status(message, StatusKind::Error);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Process one key press. Returns `true` when the application should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add(code, form)?,
            Mode::Editing { index, form } => self.handle_edit(code, index, form)?,
            Mode::Lookup(form) => self.handle_lookup(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(form) => self.handle_search(code, form)?,
            Mode::Prompt(prompt) => self.handle_prompt(code, prompt, &mut exit)?,
            Mode::ConfirmDiscard(action) => self.handle_confirm_discard(code, action)?,
            Mode::ConfirmExit(confirm) => self.handle_confirm_exit(code, confirm, &mut exit)?,
            Mode::Help => Mode::Normal,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Ctrl shortcuts mirror the plain keys of the main view and are ignored
    /// while a dialog is open. Ctrl+Shift+S arrives as an uppercase `S`.
    /// Ctrl+M is not offered because terminals send it as Enter.
    pub fn handle_ctrl(&mut self, code: KeyCode) -> Result<bool> {
        if !matches!(self.mode, Mode::Normal) {
            return Ok(false);
        }
        match code {
            KeyCode::Char(ch @ ('o' | 'n' | 's' | 'S' | 'a' | 'd' | 'f')) => {
                self.handle_key(KeyCode::Char(ch))
            }
            _ => Ok(false),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.document.has_unsaved_changes() {
                    return Ok(Mode::ConfirmExit(ConfirmExit::new()));
                }
                *exit = true;
            }
            KeyCode::Char('?') => return Ok(Mode::Help),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Left | KeyCode::PageUp => self.change_page(-1),
            KeyCode::Right | KeyCode::PageDown => self.change_page(1),
            KeyCode::Home => self.change_page(isize::MIN / 2),
            KeyCode::End => self.change_page(isize::MAX / 2),
            KeyCode::Char('k') => {
                let field = self.view.sort_field.next();
                self.view = self.view.change_sort(field);
                self.selected = 0;
                self.set_status(format!("Sorted by {field}."), StatusKind::Info);
            }
            KeyCode::Char('r') => {
                self.view = self.view.toggle_order();
                self.selected = 0;
            }
            KeyCode::Char('o') => return Ok(self.begin_file_action(FileAction::Open)),
            KeyCode::Char('n') => return Ok(self.begin_file_action(FileAction::New)),
            KeyCode::Char('i') => return Ok(self.begin_file_action(FileAction::ImportCsv)),
            KeyCode::Char('S') => return Ok(self.begin_file_action(FileAction::SaveAs)),
            KeyCode::Char('x') => return Ok(self.begin_file_action(FileAction::ExportCsv)),
            KeyCode::Char('s') => {
                if self.document.path().is_none() {
                    return Ok(self.begin_file_action(FileAction::SaveAs));
                }
                let outcome = self.document.save();
                self.report_save(FileAction::SaveAs, outcome);
            }
            KeyCode::Char('a') | KeyCode::Char('+') => {
                if self.require_document() {
                    self.clear_status();
                    return Ok(Mode::Adding(RecordForm::for_add(&self.config.statuses)));
                }
            }
            KeyCode::Char('m') | KeyCode::Char('e') => {
                if self.require_document() {
                    self.clear_status();
                    let value = self.selected_record().map(|r| r.status).unwrap_or_default();
                    return Ok(Mode::Lookup(LookupForm::new(
                        LookupPurpose::Modify,
                        value,
                        &self.config.statuses,
                    )));
                }
            }
            KeyCode::Char('d') | KeyCode::Char('-') => {
                if self.require_document() {
                    self.clear_status();
                    let value = self.selected_record().map(|r| r.project).unwrap_or_default();
                    return Ok(Mode::Lookup(LookupForm::new(
                        LookupPurpose::Delete,
                        value,
                        &self.config.statuses,
                    )));
                }
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                if self.require_document() {
                    return Ok(Mode::Searching(SearchForm {
                        field: self.view.search_field,
                        query: self.view.search_term.clone(),
                    }));
                }
            }
            KeyCode::Char('c') => {
                if self.view.has_active_search() {
                    self.view = self.view.clear_filter();
                    self.selected = 0;
                    self.set_status("Search cleared.", StatusKind::Info);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add(&mut self, code: KeyCode, mut form: RecordForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle_status(-1);
            }
            KeyCode::Right => {
                form.cycle_status(1);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                match self.document.store_mut().add(form.to_record()) {
                    Ok(()) => {
                        self.refresh_view();
                        self.set_status("Record added.", StatusKind::Info);
                        return Ok(Mode::Normal);
                    }
                    Err(err) => {
                        let message = err.to_string();
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::Adding(form))
    }

    fn handle_edit(&mut self, code: KeyCode, index: usize, mut form: RecordForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle_status(-1);
            }
            KeyCode::Right => {
                form.cycle_status(1);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                match self.document.store_mut().update_at(index, form.to_record()) {
                    Ok(()) => {
                        self.refresh_view();
                        self.set_status(
                            "Record updated. Only status, result and description changed.",
                            StatusKind::Info,
                        );
                        return Ok(Mode::Normal);
                    }
                    Err(err) => {
                        let message = err.to_string();
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::Editing { index, form })
    }

    fn handle_lookup(&mut self, code: KeyCode, mut form: LookupForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Ok(Mode::Normal);
            }
            KeyCode::Left => {
                form.cycle_status(-1);
            }
            KeyCode::Right => {
                form.cycle_status(1);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            KeyCode::Enter => {
                let value = form.value.trim().to_string();
                if value.is_empty() {
                    form.error = Some(format!("Enter a {} to look up.", form.field().label()));
                    return Ok(Mode::Lookup(form));
                }

                let field = form.field();
                let lookup = self
                    .document
                    .store()
                    .find_by_field(field, &value)
                    .into_unique(field, &value);
                match lookup {
                    Ok(index) => {
                        debug!("{field} lookup for {value:?} matched record {index}");
                        let Some(record) = self.document.store().get(index).cloned() else {
                            return Ok(Mode::Normal);
                        };
                        self.clear_status();
                        return Ok(match form.purpose {
                            LookupPurpose::Modify => Mode::Editing {
                                index,
                                form: RecordForm::for_edit(&record, &self.config.statuses),
                            },
                            LookupPurpose::Delete => Mode::ConfirmDelete(ConfirmDelete {
                                index,
                                project: record.project,
                            }),
                        });
                    }
                    Err(err) => {
                        let message = err.to_string();
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            _ => {}
        }
        Ok(Mode::Lookup(form))
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.document.store_mut().remove_at(confirm.index) {
                    Ok(_) => {
                        self.refresh_view();
                        self.set_status("Record deleted.", StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut form: SearchForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.view = self.view.clear_filter();
                self.selected = 0;
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                let count = self.current_page().total_records;
                if self.view.has_active_search() {
                    self.set_status(
                        format!("{} match the search.", plural_records(count)),
                        StatusKind::Info,
                    );
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.move_selection(-1);
                return Ok(Mode::Searching(form));
            }
            KeyCode::Down => {
                self.move_selection(1);
                return Ok(Mode::Searching(form));
            }
            KeyCode::Tab => form.field = form.field.next(),
            KeyCode::Backspace => {
                form.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => form.query.push(ch),
            _ => return Ok(Mode::Searching(form)),
        }

        self.view = self.view.apply_filter(form.field, &form.query);
        self.selected = 0;
        Ok(Mode::Searching(form))
    }

    fn handle_prompt(&mut self, code: KeyCode, mut prompt: PathPrompt, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.run_file_action(prompt.action, None);
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                prompt.backspace();
                Ok(Mode::Prompt(prompt))
            }
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
                Ok(Mode::Prompt(prompt))
            }
            KeyCode::Enter => {
                let input = prompt.input.trim().to_string();
                if input.is_empty() {
                    prompt.error = Some("Enter a file name.".to_string());
                    return Ok(Mode::Prompt(prompt));
                }
                let target = PathBuf::from(input);
                match self.run_file_action(prompt.action, Some(&target)) {
                    Some(message) => {
                        prompt.error = Some(message);
                        Ok(Mode::Prompt(prompt))
                    }
                    None => {
                        if prompt.exit_after {
                            *exit = true;
                        }
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::Prompt(prompt)),
        }
    }

    fn handle_confirm_discard(&mut self, code: KeyCode, action: FileAction) -> Result<Mode> {
        match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                Ok(Mode::Prompt(PathPrompt::new(action, self.initial_path(action))))
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status(action.cancelled_message(), StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDiscard(action)),
        }
    }

    fn handle_confirm_exit(
        &mut self,
        code: KeyCode,
        mut confirm: ConfirmExit,
        exit: &mut bool,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => Ok(Mode::Normal),
            KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
                confirm.previous();
                Ok(Mode::ConfirmExit(confirm))
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                confirm.next();
                Ok(Mode::ConfirmExit(confirm))
            }
            KeyCode::Enter => match confirm.selection {
                ExitChoice::Save => {
                    if self.document.path().is_none() {
                        let mut prompt = PathPrompt::new(
                            FileAction::SaveAs,
                            self.initial_path(FileAction::SaveAs),
                        );
                        prompt.exit_after = true;
                        return Ok(Mode::Prompt(prompt));
                    }
                    let outcome = self.document.save();
                    if self.report_save(FileAction::SaveAs, outcome).is_some() {
                        return Ok(Mode::ConfirmExit(confirm));
                    }
                    *exit = true;
                    Ok(Mode::Normal)
                }
                ExitChoice::Discard => {
                    *exit = true;
                    Ok(Mode::Normal)
                }
                ExitChoice::Cancel => Ok(Mode::Normal),
            },
            _ => Ok(Mode::ConfirmExit(confirm)),
        }
    }

    /// Open the path prompt for `action`, asking first when it would throw
    /// away unsaved records.
    fn begin_file_action(&mut self, action: FileAction) -> Mode {
        self.clear_status();
        if matches!(action, FileAction::SaveAs | FileAction::ExportCsv)
            && self.document.store().is_empty()
        {
            self.set_status("There are no records to save.", StatusKind::Error);
            return Mode::Normal;
        }
        if action.replaces_records() && self.document.has_unsaved_changes() {
            return Mode::ConfirmDiscard(action);
        }
        Mode::Prompt(PathPrompt::new(action, self.initial_path(action)))
    }

    fn initial_path(&self, action: FileAction) -> String {
        match action {
            FileAction::SaveAs => self.document.default_save_name(),
            FileAction::ExportCsv => {
                let name = self.document.default_save_name();
                let stem = name.strip_suffix(".json").unwrap_or(&name);
                format!("{stem}.csv")
            }
            FileAction::Open | FileAction::New | FileAction::ImportCsv => String::new(),
        }
    }

    /// Run a file action against the document. `None` is a dismissed prompt.
    /// Returns the error message when the action failed so the prompt can
    /// stay open.
    fn run_file_action(&mut self, action: FileAction, target: Option<&Path>) -> Option<String> {
        match action {
            FileAction::Open | FileAction::ImportCsv => {
                let outcome = if action == FileAction::Open {
                    self.document.open(target)
                } else {
                    self.document.import_csv(target)
                };
                self.report_open(action, outcome)
            }
            FileAction::New => {
                let outcome = self.document.create_new(target);
                let written = matches!(outcome, SaveOutcome::Written(_));
                let failure = self.report_save(action, outcome);
                if written {
                    self.reset_view();
                }
                failure
            }
            FileAction::SaveAs => {
                let outcome = self.document.save_as(target);
                self.report_save(action, outcome)
            }
            FileAction::ExportCsv => {
                let outcome = self.document.export_csv(target);
                self.report_save(action, outcome)
            }
        }
    }

    fn report_open(&mut self, action: FileAction, outcome: OpenOutcome) -> Option<String> {
        match outcome {
            OpenOutcome::Loaded { path, records } => {
                self.reset_view();
                let name = file_label(&path);
                let message = if action == FileAction::ImportCsv {
                    format!("Imported {} from {name}. Save to keep them.", plural_records(records))
                } else {
                    format!("Loaded {name} ({}).", plural_records(records))
                };
                self.set_status(message, StatusKind::Info);
                None
            }
            OpenOutcome::Cancelled => {
                self.set_status(action.cancelled_message(), StatusKind::Info);
                None
            }
            OpenOutcome::Failed(err) => {
                let message = err.to_string();
                self.set_status(message.clone(), StatusKind::Error);
                Some(message)
            }
        }
    }

    fn report_save(&mut self, action: FileAction, outcome: SaveOutcome) -> Option<String> {
        match outcome {
            SaveOutcome::Written(path) => {
                let name = file_label(&path);
                let message = match action {
                    FileAction::New => format!("Created {name}."),
                    FileAction::ExportCsv => format!(
                        "Exported {} to {name}.",
                        plural_records(self.document.store().len())
                    ),
                    _ => format!("Saved {name}."),
                };
                self.set_status(message, StatusKind::Info);
                None
            }
            SaveOutcome::Cancelled => {
                self.set_status(action.cancelled_message(), StatusKind::Info);
                None
            }
            SaveOutcome::Failed(err) => {
                let message = err.to_string();
                self.set_status(message.clone(), StatusKind::Error);
                Some(message)
            }
        }
    }

    /// Operations on records need a file (opened, created or imported).
    fn require_document(&mut self) -> bool {
        if self.document.path().is_some() || !self.document.store().is_empty() {
            true
        } else {
            self.set_status(
                "Open a file with 'o' or create one with 'n' first.",
                StatusKind::Error,
            );
            false
        }
    }

    fn current_page(&self) -> Page {
        self.view.project(self.document.store(), self.config.page_size)
    }

    fn selected_record(&self) -> Option<Record> {
        self.current_page().items.get(self.selected).cloned()
    }

    fn change_page(&mut self, delta: isize) {
        let total_pages = self.current_page().total_pages;
        let next = self.view.change_page(delta, total_pages);
        if next.page != self.view.page {
            self.view = next;
            self.selected = 0;
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.current_page().items.len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    /// Keep page and selection in range after the record set changed.
    fn refresh_view(&mut self) {
        let total_pages = self.current_page().total_pages;
        self.view = self.view.clamp_page(total_pages);
        let len = self.current_page().items.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Back to the first page of the unfiltered set, keeping the sort.
    fn reset_view(&mut self) {
        self.view = self.view.clear_filter();
        self.selected = 0;
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let page = self.current_page();
        self.draw_banner(frame, chunks[0]);
        self.draw_table(frame, chunks[1], &page);
        self.draw_pagination(frame, chunks[2], &page);
        self.draw_footer(frame, chunks[3]);

        match &self.mode {
            Mode::Adding(form) | Mode::Editing { form, .. } => self.draw_record_form(frame, area, form),
            Mode::Lookup(form) => self.draw_lookup(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(form) => self.draw_search_bar(frame, area, form),
            Mode::Prompt(prompt) => self.draw_prompt(frame, area, prompt),
            Mode::ConfirmDiscard(action) => self.draw_confirm_discard(frame, area, *action),
            Mode::ConfirmExit(confirm) => self.draw_confirm_exit(frame, area, confirm),
            Mode::Help => self.draw_help(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_banner(&self, frame: &mut Frame, area: Rect) {
        let line = match self.document.display_name() {
            Some(name) => {
                let mut spans = vec![
                    Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!(" • {}", plural_records(self.document.store().len()))),
                ];
                if self.document.has_unsaved_changes() {
                    spans.push(Span::styled(
                        " • unsaved changes",
                        Style::default().fg(Color::Yellow),
                    ));
                }
                Line::from(spans)
            }
            None if !self.document.store().is_empty() => Line::from(vec![
                Span::raw(format!(
                    "Unsaved records • {}",
                    plural_records(self.document.store().len())
                )),
                Span::styled(" • use 'S' to save", Style::default().fg(Color::Yellow)),
            ]),
            None => Line::from(Span::styled(
                "No file loaded",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, page: &Page) {
        if page.items.is_empty() {
            let text = if self.document.store().is_empty() {
                "No data to show. Open a JSON file with 'o' or create one with 'n'."
            } else if page.total_records == 0 {
                "No records match the search."
            } else {
                "This page is empty."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Jornadas"));
            frame.render_widget(message, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let widths: Vec<usize> = COLUMN_WIDTHS
            .iter()
            .map(|pct| (inner_width * *pct as usize / 100).saturating_sub(1))
            .collect();

        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(Field::ALL.into_iter().map(|field| {
            let title = if field == self.view.sort_field {
                format!("{} {}", field.label(), self.view.sort_order.arrow())
            } else {
                field.label().to_string()
            };
            Cell::from(title)
        }))
        .style(header_style);

        let rows = page.items.iter().enumerate().map(|(idx, record)| {
            let cells = Field::ALL
                .into_iter()
                .zip(widths.iter())
                .map(|(field, width)| Cell::from(truncate_cell(record.get(field), *width)));
            let row = Row::new(cells);
            if idx == self.selected {
                row.style(Style::default().fg(Color::Black).bg(Color::Yellow))
            } else {
                row
            }
        });

        let constraints = COLUMN_WIDTHS.map(Constraint::Percentage);
        let table = Table::new(rows, constraints)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Jornadas"));
        frame.render_widget(table, area);
    }

    fn draw_pagination(&self, frame: &mut Frame, area: Rect, page: &Page) {
        let mut spans = Vec::new();
        if page.total_pages <= 1 {
            if page.total_records > 0 {
                spans.push(Span::raw(plural_records(page.total_records)));
            }
        } else {
            spans.push(Span::raw(format!(
                "Page {} of {} ({})",
                page.number,
                page.total_pages,
                plural_records(page.total_records)
            )));
        }
        if self.view.has_active_search() {
            spans.push(Span::styled(
                format!(
                    "   Filter: {} contains \"{}\"",
                    self.view.search_field.label(),
                    self.view.search_term.trim()
                ),
                Style::default().fg(Color::Magenta),
            ));
        }
        let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::Searching(_) => &[
                ("[Tab]", " Field   "),
                ("[↑↓]", " Select   "),
                ("[Enter]", " Keep filter   "),
                ("[Esc]", " Clear"),
            ],
            Mode::Normal => &[
                ("[o]", " Open   "),
                ("[n]", " New   "),
                ("[s/S]", " Save/As   "),
                ("[a]", " Add   "),
                ("[m]", " Modify   "),
                ("[d]", " Delete   "),
                ("[f]", " Search   "),
                ("[←→]", " Page   "),
                ("[k/r]", " Sort   "),
                ("[?]", " Help   "),
                ("[q]", " Quit"),
            ],
            _ => &[("[Enter]", " Confirm   "), ("[Esc]", " Cancel")],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, label) in hints {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    }

    fn draw_record_form(&self, frame: &mut Frame, area: Rect, form: &RecordForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = Field::ALL.into_iter().map(|f| form.build_line(f)).collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            let hint = match form.kind {
                FormKind::Add => "Enter to save • Tab to switch • ←/→ status • Esc to cancel",
                FormKind::Edit => "Only status, result and description can change • Enter to save",
            };
            lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::Gray))));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active != Field::Status {
            let row = Field::ALL.iter().position(|f| *f == form.active).unwrap_or(0) as u16;
            let prefix = form.active.label().len() as u16 + 2;
            let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_lookup(&self, frame: &mut Frame, area: Rect, form: &LookupForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let prompt = format!("{}: ", form.field().label());
        let mut lines = vec![
            Line::from(vec![
                Span::raw(prompt.clone()),
                Span::styled(form.value.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            let hint = match form.purpose {
                LookupPurpose::Modify => "Exactly one record must have this status • ←/→ to pick",
                LookupPurpose::Delete => "Exactly one record must have this project",
            };
            lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::Gray))));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        let cursor_x = inner.x + prompt.chars().count() as u16 + form.value.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Record").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete the record for project \"{}\"?",
                confirm.project
            )),
            Line::from(""),
            Line::from(Span::styled(
                "y to delete • n or Esc to keep it",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, form: &SearchForm) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Search in: {}", form.field.label()));
        let prefix = "Search: ";
        let paragraph = Paragraph::new(Span::raw(format!("{prefix}{}", form.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + prefix.len() as u16 + form.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect, prompt: &PathPrompt) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(prompt.action.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let prefix = "Path: ";
        let mut lines = vec![
            Line::from(vec![
                Span::raw(prefix),
                Span::styled(prompt.input.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
        ];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to confirm • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + prefix.len() as u16 + prompt.input.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_confirm_discard(&self, frame: &mut Frame, area: Rect, action: FileAction) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(action.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("There are unsaved changes. They will be lost if you continue."),
            Line::from(""),
            Line::from(Span::styled(
                "y to continue • n or Esc to go back",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn draw_confirm_exit(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmExit) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Exit Application").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut option_spans = Vec::new();
        for (idx, label) in confirm.labels().iter().enumerate() {
            if idx > 0 {
                option_spans.push(Span::raw("   "));
            }
            let style = if confirm.selected_index() == idx {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            option_spans.push(Span::styled(*label, style));
        }

        let lines = vec![
            Line::from("There are unsaved changes. Save them before quitting?"),
            Line::from(""),
            Line::from(option_spans),
            Line::from(""),
            Line::from(Span::styled(
                "Use ←/→ to choose • Enter to confirm • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Keyboard Shortcuts")
            .borders(Borders::ALL);
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let entries = [
            ("o / Ctrl+O", "Open a JSON file"),
            ("n / Ctrl+N", "Create a new file"),
            ("s / Ctrl+S", "Save"),
            ("S / Ctrl+Shift+S", "Save as"),
            ("x", "Export CSV"),
            ("i", "Import CSV"),
            ("a / Ctrl+A", "Add a record"),
            ("m", "Modify the record with a status"),
            ("d / Ctrl+D", "Delete the record with a project"),
            ("f / Ctrl+F", "Search"),
            ("c", "Clear the search"),
            ("← / →", "Previous / next page"),
            ("↑ / ↓", "Select a row"),
            ("k", "Sort by the next column"),
            ("r", "Reverse the sort order"),
            ("q", "Quit"),
        ];
        let mut lines: Vec<Line> = entries
            .iter()
            .map(|(key, text)| {
                Line::from(vec![
                    Span::styled(format!("{key:<18}"), key_style),
                    Span::raw(*text),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::Gray),
        )));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
