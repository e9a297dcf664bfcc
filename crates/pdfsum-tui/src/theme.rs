use ratatui::style::{Color, Modifier, Style};

use pdfsum_core::{ExtractionStatus, SummaryStatus};

/// Color theme for the TUI.
pub struct Theme {
    pub success: Color,
    pub error: Color,
    pub accent: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Look up a theme by name, falling back to `hacker`.
    pub fn by_name(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            success: Color::Rgb(0, 210, 0),
            error: Color::Red,
            accent: Color::Cyan,

            header_fg: Color::Black,
            header_bg: Color::Rgb(0, 210, 0),
            border: Color::DarkGray,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            spinner: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    /// Modern theme: white text, electric blue accents, dark blue header.
    pub fn modern() -> Self {
        Self {
            success: Color::Rgb(0, 200, 80),
            error: Color::Rgb(255, 80, 80),
            accent: Color::Rgb(60, 140, 255),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    pub fn extraction_color(&self, status: ExtractionStatus) -> Color {
        match status {
            ExtractionStatus::Idle => self.dim,
            ExtractionStatus::Processing => self.spinner,
            ExtractionStatus::Success => self.success,
            ExtractionStatus::Error => self.error,
        }
    }

    pub fn summary_color(&self, status: SummaryStatus) -> Color {
        match status {
            SummaryStatus::NotStarted => self.dim,
            SummaryStatus::Summarizing => self.spinner,
            SummaryStatus::Done => self.success,
            SummaryStatus::Failed => self.error,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
