use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use pdfsum_core::{ExtractionStatus, SummaryStatus};

use crate::app::App;
use crate::view::spinner_char;

pub const TITLE: &str = "PDF Text Extractor";
pub const SUBTITLE: &str = "Extract text from any PDF document";
pub const UPLOAD_PROMPT: &str = "Choose PDF file or drag here";
pub const BROWSE_HINT: &str = "[o] Browse Files";
pub const PROCESSING_MESSAGE: &str = "Processing PDF...";
pub const SUMMARIZING_MESSAGE: &str = "Summarizing...";
pub const SUCCESS_MESSAGE: &str = "Text extracted successfully!";
pub const EXTRACTION_ERROR_MESSAGE: &str = "Error processing PDF. Please try again.";
pub const SUMMARY_ERROR_MESSAGE: &str = "Failed to generate summary. Please try again.";

/// Rows reserved for the summary pane when a summary exists.
const SUMMARY_PANE_HEIGHT: u16 = 8;

/// Render the document screen into the given area.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let summary_height = if app.document.summary.is_some() {
        SUMMARY_PANE_HEIGHT.min(area.height / 3)
    } else {
        0
    };

    let chunks = Layout::vertical([
        Constraint::Length(2),              // header
        Constraint::Length(3),              // upload box
        Constraint::Length(2),              // status lines
        Constraint::Min(3),                 // extracted text
        Constraint::Length(summary_height), // summary
        Constraint::Length(1),              // footer
    ])
    .split(area);

    render_header(f, app, chunks[0]);
    render_upload_box(f, app, chunks[1]);
    render_status(f, app, chunks[2]);
    render_text_pane(f, app, chunks[3]);
    if summary_height > 0 {
        render_summary_pane(f, app, chunks[4]);
    }
    render_footer(f, app, chunks[5]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let lines = vec![
        Line::from(Span::styled(format!(" {TITLE} "), theme.header_style())),
        Line::from(Span::styled(
            format!(" {SUBTITLE}"),
            Style::default().fg(theme.dim),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_upload_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let name = match &app.document.file_name {
        Some(name) => Span::styled(
            format!("\u{1F4C4} {name}"),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(UPLOAD_PROMPT, Style::default().fg(theme.dim)),
    };
    let hint_style = if app.document.extraction == ExtractionStatus::Processing {
        Style::default().fg(theme.dim)
    } else {
        Style::default().fg(theme.accent)
    };
    let line = Line::from(vec![
        Span::raw(" "),
        name,
        Span::raw("   "),
        Span::styled(BROWSE_HINT, hint_style),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style());
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let doc = &app.document;

    let extraction_color = theme.extraction_color(doc.extraction);
    let extraction_line = match doc.extraction {
        ExtractionStatus::Idle => Line::from(""),
        ExtractionStatus::Processing => Line::from(Span::styled(
            format!(" {} {PROCESSING_MESSAGE}", spinner_char(app.tick)),
            Style::default().fg(extraction_color),
        )),
        ExtractionStatus::Success => Line::from(Span::styled(
            format!(" \u{2713} {SUCCESS_MESSAGE}"),
            Style::default().fg(extraction_color),
        )),
        ExtractionStatus::Error => Line::from(Span::styled(
            format!(" \u{2717} {EXTRACTION_ERROR_MESSAGE}"),
            Style::default()
                .fg(extraction_color)
                .add_modifier(Modifier::BOLD),
        )),
    };

    let mut summary_spans = Vec::new();
    let summary_color = theme.summary_color(doc.summary_status);
    match doc.summary_status {
        SummaryStatus::Summarizing => summary_spans.push(Span::styled(
            format!(" {} {SUMMARIZING_MESSAGE}", spinner_char(app.tick)),
            Style::default().fg(summary_color),
        )),
        SummaryStatus::Failed => summary_spans.push(Span::styled(
            format!(" \u{2717} {SUMMARY_ERROR_MESSAGE}"),
            Style::default()
                .fg(summary_color)
                .add_modifier(Modifier::BOLD),
        )),
        SummaryStatus::NotStarted | SummaryStatus::Done => {}
    }
    if doc.extraction == ExtractionStatus::Success {
        let hint_style = if doc.can_summarize() {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.dim)
        };
        summary_spans.push(Span::raw("  "));
        summary_spans.push(Span::styled("[s] Summarize", hint_style));
    }

    f.render_widget(
        Paragraph::new(vec![extraction_line, Line::from(summary_spans)]),
        area,
    );
}

fn render_text_pane(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let text = app.document.displayed_text();

    let copy_style = if text.is_some() {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.dim)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Extracted Text ")
        .title(Line::from(Span::styled(" [y] Copy ", copy_style)).right_aligned());

    let body = Text::styled(text.unwrap_or_default(), Style::default().fg(theme.text));
    let paragraph = Paragraph::new(body)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.text_scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_summary_pane(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let summary = app.document.summary.as_deref().unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.success))
        .title(" Summary ")
        .title(
            Line::from(Span::styled(" [Y] Copy ", Style::default().fg(theme.accent)))
                .right_aligned(),
        );
    let paragraph = Paragraph::new(summary)
        .style(Style::default().fg(theme.text))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = Line::from(Span::styled(
        " o:open  s:summarize  y/Y:copy  j/k:scroll  ?:help  q:quit",
        app.theme.footer_style(),
    ));
    f.render_widget(Paragraph::new(footer), area);
}
