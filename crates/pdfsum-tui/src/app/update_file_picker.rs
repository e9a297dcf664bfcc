use super::{App, Screen};
use crate::action::Action;

impl App {
    /// Handle input while on the file picker screen.
    pub(super) fn handle_file_picker_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::NavigateBack => {
                self.screen = Screen::Document;
            }
            Action::MoveDown => {
                let max = self.file_picker.entries.len().saturating_sub(1);
                if self.file_picker.cursor < max {
                    self.file_picker.cursor += 1;
                }
            }
            Action::MoveUp => {
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(1);
            }
            Action::PageDown => {
                let page = self.visible_rows.max(1);
                let max = self.file_picker.entries.len().saturating_sub(1);
                self.file_picker.cursor = (self.file_picker.cursor + page).min(max);
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1);
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(page);
            }
            Action::GoTop => {
                self.file_picker.cursor = 0;
            }
            Action::GoBottom => {
                self.file_picker.cursor = self.file_picker.entries.len().saturating_sub(1);
            }
            Action::DrillIn => {
                // Enter on a directory opens it, on a PDF starts processing
                if !self.file_picker.enter_directory()
                    && let Some(path) = self.file_picker.selected_pdf().map(|p| p.to_path_buf())
                {
                    self.open_file(path);
                }
            }
            Action::ToggleHelp => {
                self.show_help = true;
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            Action::Resize(_w, h) => {
                self.visible_rows = (h as usize).saturating_sub(6);
            }
            _ => {}
        }
    }
}
