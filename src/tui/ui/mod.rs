//! UI module: View components for the TUI.

pub mod form;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::ClinicalTheme;

pub const DISCLAIMER: &str = "Medical Disclaimer: This application is intended for educational and research purposes only. The predictions generated by this system should not be interpreted as medical advice or a clinical diagnosis. Always consult a qualified healthcare professional for medical decisions.";

/// Reachability of the prediction service as last probed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Checking,
    Online(String),
    Unreachable,
}

pub fn render_header(f: &mut Frame, area: Rect, api_url: &str, health: &HealthStatus) {
    let (status_text, status_style) = match health {
        HealthStatus::Checking => ("checking…".to_string(), ClinicalTheme::text_muted()),
        HealthStatus::Online(status) => (format!("online ({status})"), ClinicalTheme::success()),
        HealthStatus::Unreachable => ("unreachable".to_string(), ClinicalTheme::danger()),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" HeartGuard ", ClinicalTheme::header()),
        Span::styled(" Heart Disease Risk Assessment", ClinicalTheme::title()),
        Span::styled(format!(" │ {api_url} "), ClinicalTheme::text_secondary()),
        Span::styled(status_text, status_style),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

pub fn render_key_hints(f: &mut Frame, area: Rect, submitting: bool) {
    let hints: &[(&str, &str)] = if submitting {
        &[("[↑↓] ", "Navigate "), ("[Ctrl+Q] ", "Quit")]
    } else {
        &[
            ("[↑↓] ", "Navigate "),
            ("[◀▶] ", "Choose "),
            ("[Enter] ", "Predict "),
            ("[S] ", "Sample "),
            ("[R] ", "Reset "),
            ("[Q] ", "Quit"),
        ]
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(*key, ClinicalTheme::key_hint()),
                Span::styled(*desc, ClinicalTheme::key_desc()),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ClinicalTheme::border());

    let p = Paragraph::new(Line::from(Span::styled(
        DISCLAIMER,
        ClinicalTheme::text_muted(),
    )))
    .block(block)
    .wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
