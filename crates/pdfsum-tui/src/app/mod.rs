mod backend;
mod update;
mod update_file_picker;
mod util;
use util::*;

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use pdfsum_core::{Command, DocumentState, Event, Transition, reduce};

use crate::theme::Theme;
use crate::tui_event::BackendCommand;

/// Which screen is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Document,
    FilePicker,
}

/// State for the file picker screen.
#[derive(Debug, Clone)]
pub struct FilePickerState {
    /// Current directory being browsed.
    pub current_dir: PathBuf,
    /// Entries in the current directory (dirs first, then PDFs).
    pub entries: Vec<FileEntry>,
    /// Cursor position in the entries list.
    pub cursor: usize,
}

/// A single entry in the file picker.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl FilePickerState {
    pub fn new() -> Self {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::at(current_dir)
    }

    /// Picker rooted at `dir`.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        let mut state = Self {
            current_dir: dir.into(),
            entries: Vec::new(),
            cursor: 0,
        };
        state.refresh_entries();
        state
    }

    /// Refresh the entries list from the current directory.
    ///
    /// Only directories and files with a `.pdf` extension are listed.
    pub fn refresh_entries(&mut self) {
        let mut entries = Vec::new();

        // Parent directory entry
        if let Some(parent) = self.current_dir.parent() {
            entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
            });
        }

        match std::fs::read_dir(&self.current_dir) {
            Ok(read_dir) => {
                let mut dirs = Vec::new();
                let mut files = Vec::new();

                for entry in read_dir.flatten() {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().to_string();

                    // Skip hidden files/dirs
                    if name.starts_with('.') {
                        continue;
                    }

                    if path.is_dir() {
                        dirs.push(FileEntry {
                            name,
                            path,
                            is_dir: true,
                        });
                    } else if is_pdf_path(&path) {
                        files.push(FileEntry {
                            name,
                            path,
                            is_dir: false,
                        });
                    }
                }

                dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

                entries.extend(dirs);
                entries.extend(files);
            }
            Err(e) => {
                tracing::warn!(dir = %self.current_dir.display(), error = %e, "cannot list directory");
            }
        }

        self.entries = entries;
        self.cursor = 0;
    }

    /// Enter the directory at cursor, or return false if not a directory.
    pub fn enter_directory(&mut self) -> bool {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_dir
        {
            self.current_dir = entry.path.clone();
            self.refresh_entries();
            return true;
        }
        false
    }

    /// The PDF under the cursor, if the cursor is on a file.
    pub fn selected_pdf(&self) -> Option<&Path> {
        self.entries
            .get(self.cursor)
            .filter(|e| !e.is_dir)
            .map(|e| e.path.as_path())
    }
}

impl Default for FilePickerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Main application state.
pub struct App {
    pub screen: Screen,
    /// Document lifecycle, advanced only through [`reduce`].
    pub document: DocumentState,
    /// Path of the file selected for the current generation.
    pub selected_path: Option<PathBuf>,

    pub tick: usize,
    pub theme: Theme,
    pub should_quit: bool,
    pub show_help: bool,

    /// First visible line of the extracted-text pane.
    pub text_scroll: u16,
    pub visible_rows: usize,

    pub file_picker: FilePickerState,

    /// Where OSC 52 clipboard sequences go; the terminal's stdout.
    pub clipboard: Box<dyn Write>,

    /// Channel to the backend tasks. `None` when running without a backend.
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self::with_picker(theme, FilePickerState::new())
    }

    pub fn with_picker(theme: Theme, file_picker: FilePickerState) -> Self {
        Self {
            screen: Screen::Document,
            document: DocumentState::default(),
            selected_path: None,
            tick: 0,
            theme,
            should_quit: false,
            show_help: false,
            text_scroll: 0,
            visible_rows: 20,
            file_picker,
            clipboard: Box::new(std::io::stdout()),
            backend_cmd_tx: None,
        }
    }

    /// Start processing `path` as a new document.
    pub fn open_file(&mut self, path: PathBuf) {
        let name = display_name(&path);
        tracing::info!(file = %path.display(), "file selected");
        self.selected_path = Some(path);
        self.text_scroll = 0;
        self.screen = Screen::Document;
        self.dispatch(Event::FileSelected { name });
    }

    /// Handle a path pasted into the terminal, which is what most terminals
    /// do when a file is dragged onto the window.
    ///
    /// Returns false if the paste doesn't name an existing `.pdf` file.
    pub fn open_dropped(&mut self, pasted: &str) -> bool {
        let path = dropped_path(pasted);
        if !is_pdf_path(&path) || !path.is_file() {
            tracing::warn!(pasted = %pasted.trim(), "ignoring paste that is not a PDF path");
            return false;
        }
        self.open_file(path);
        true
    }

    /// Apply a document event and forward the resulting command, if any.
    pub(crate) fn dispatch(&mut self, event: Event) {
        let Transition { state, command } = reduce(&self.document, event);
        self.document = state;
        if let Some(command) = command {
            self.send_command(command);
        }
    }

    fn send_command(&self, command: Command) {
        let cmd = match command {
            Command::Extract { generation } => {
                let Some(path) = self.selected_path.clone() else {
                    tracing::warn!(generation, "extract requested without a selected file");
                    return;
                };
                BackendCommand::Extract { generation, path }
            }
            Command::Summarize { generation, text } => {
                BackendCommand::Summarize { generation, text }
            }
        };
        if let Some(tx) = &self.backend_cmd_tx {
            let _ = tx.send(cmd);
        }
    }

    /// Number of lines in the extracted-text pane.
    pub fn text_line_count(&self) -> usize {
        self.document
            .displayed_text()
            .map(|t| t.lines().count())
            .unwrap_or(0)
    }

    /// Render the current screen.
    pub fn view(&self, f: &mut ratatui::Frame) {
        let area = f.area();
        match self.screen {
            Screen::Document => crate::view::document::render_in(f, self, area),
            Screen::FilePicker => crate::view::file_picker::render_in(f, self, area),
        }

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }
}
