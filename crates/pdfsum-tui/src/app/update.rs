use pdfsum_core::Event;

use super::{App, Screen, osc52_copy};
use crate::action::Action;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        // Help overlay swallows everything except dismissal
        if self.show_help {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::ToggleHelp | Action::NavigateBack => {
                    self.show_help = false;
                }
                Action::Tick => {
                    self.tick = self.tick.wrapping_add(1);
                }
                Action::Resize(_w, h) => {
                    self.visible_rows = Self::rows_for_height(h);
                }
                _ => {}
            }
            return false;
        }

        if self.screen == Screen::FilePicker {
            self.handle_file_picker_action(action);
            return self.should_quit;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            Action::Resize(_w, h) => {
                self.visible_rows = Self::rows_for_height(h);
            }
            Action::OpenFilePicker => {
                self.file_picker.refresh_entries();
                self.screen = Screen::FilePicker;
            }
            Action::Summarize => {
                if self.document.can_summarize() {
                    tracing::info!(generation = self.document.generation, "summary requested");
                }
                self.dispatch(Event::SummaryRequested);
            }
            Action::CopyText => {
                if let Some(text) = self.document.displayed_text() {
                    osc52_copy(&mut *self.clipboard, text);
                }
            }
            Action::CopySummary => {
                if let Some(summary) = &self.document.summary {
                    osc52_copy(&mut *self.clipboard, summary);
                }
            }
            Action::MoveDown => self.scroll_text_to(self.text_scroll.saturating_add(1)),
            Action::MoveUp => self.scroll_text_to(self.text_scroll.saturating_sub(1)),
            Action::PageDown => {
                let page = self.visible_rows.max(1) as u16;
                self.scroll_text_to(self.text_scroll.saturating_add(page));
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1) as u16;
                self.scroll_text_to(self.text_scroll.saturating_sub(page));
            }
            Action::GoTop => self.text_scroll = 0,
            Action::GoBottom => self.scroll_text_to(u16::MAX),
            Action::ToggleHelp => {
                self.show_help = true;
            }
            Action::DrillIn | Action::NavigateBack | Action::None => {}
        }
        false
    }

    /// Clamp a scroll position so the last line stays on screen.
    fn scroll_text_to(&mut self, target: u16) {
        let max = self.text_line_count().saturating_sub(1);
        self.text_scroll = target.min(u16::try_from(max).unwrap_or(u16::MAX));
    }

    /// Rows available to the text pane for a terminal of height `h`.
    fn rows_for_height(h: u16) -> usize {
        (h as usize).saturating_sub(12)
    }
}
