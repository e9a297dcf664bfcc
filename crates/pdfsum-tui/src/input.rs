use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::action::Action;

/// Map a crossterm terminal event to a TUI action.
pub fn map_event(event: &Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }
            map_key(key)
        }
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::MoveDown,
        MouseEventKind::ScrollUp => Action::MoveUp,
        _ => Action::None,
    }
}

fn map_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Enter => Action::DrillIn,
        KeyCode::Esc => Action::NavigateBack,
        KeyCode::Char('g') => Action::GoTop,
        KeyCode::Char('G') => Action::GoBottom,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageDown,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageUp,
        KeyCode::Char('o') | KeyCode::Char('a') => Action::OpenFilePicker,
        KeyCode::Char('s') => Action::Summarize,
        KeyCode::Char('y') => Action::CopyText,
        KeyCode::Char('Y') => Action::CopySummary,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Home => Action::GoTop,
        KeyCode::End => Action::GoBottom,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn document_keys() {
        assert_eq!(map_event(&press(KeyCode::Char('o'), KeyModifiers::NONE)), Action::OpenFilePicker);
        assert_eq!(map_event(&press(KeyCode::Char('s'), KeyModifiers::NONE)), Action::Summarize);
        assert_eq!(map_event(&press(KeyCode::Char('y'), KeyModifiers::NONE)), Action::CopyText);
        assert_eq!(map_event(&press(KeyCode::Char('Y'), KeyModifiers::SHIFT)), Action::CopySummary);
    }

    #[test]
    fn ctrl_c_quits_and_ctrl_d_pages() {
        assert_eq!(map_event(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(map_event(&press(KeyCode::Char('d'), KeyModifiers::CONTROL)), Action::PageDown);
    }

    #[test]
    fn resize_passes_dimensions() {
        assert_eq!(map_event(&Event::Resize(120, 40)), Action::Resize(120, 40));
    }

    #[test]
    fn unmapped_key_is_none() {
        assert_eq!(map_event(&press(KeyCode::Char('z'), KeyModifiers::NONE)), Action::None);
    }
}
