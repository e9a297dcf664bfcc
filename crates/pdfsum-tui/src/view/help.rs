use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup = centered_rect(60, 24, area);

    let lines = vec![
        Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.header_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section_header("Document", theme),
        key_line("o / a", "Browse for a PDF", theme),
        key_line("s", "Summarize extracted text", theme),
        key_line("y", "Copy extracted text (OSC 52)", theme),
        key_line("Y", "Copy summary (OSC 52)", theme),
        Line::from(""),
        section_header("Navigation", theme),
        key_line("j / \u{2193}", "Scroll down / move down", theme),
        key_line("k / \u{2191}", "Scroll up / move up", theme),
        key_line("Ctrl+d / PgDn", "Page down", theme),
        key_line("Ctrl+u / PgUp", "Page up", theme),
        key_line("g / Home", "Go to top", theme),
        key_line("G / End", "Go to bottom", theme),
        key_line("Enter", "Open directory / choose PDF", theme),
        key_line("Esc", "Close file browser", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<16}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}

/// Create a centered rectangle of the given width (columns) and height (rows).
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}
