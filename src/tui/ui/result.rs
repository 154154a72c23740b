//! Result panel: idle hint, progress gauge, or the outcome card.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::{present, LifecycleState, Presentation};
use crate::tui::styles::ClinicalTheme;

/// Render the panel for the current lifecycle state.
///
/// `progress` is the animated fraction shown while a request is in flight.
pub fn render_result(f: &mut Frame, area: Rect, state: LifecycleState<'_>, progress: f64) {
    match state {
        LifecycleState::Idle => render_idle(f, area),
        LifecycleState::Submitting => render_progress(f, area, progress),
        LifecycleState::Settled(outcome) => match present(outcome) {
            Some(card) => render_card(f, area, &card),
            None => render_idle(f, area),
        },
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Ready for risk assessment",
            ClinicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Fill in the parameters and press Enter",
            ClinicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Result ", ClinicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_progress(f: &mut Frame, area: Rect, progress: f64) {
    let block = Block::default()
        .title(Span::styled(" Result ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let label = Paragraph::new(Line::from(Span::styled(
        "Analyzing...",
        ClinicalTheme::focused(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(label, chunks[0]);

    let ratio = progress.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .gauge_style(ClinicalTheme::info())
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0));
    f.render_widget(gauge, chunks[1]);

    let desc = Paragraph::new(Line::from(Span::styled(
        "Waiting for the prediction service",
        ClinicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(desc, chunks[2]);
}

fn render_card(f: &mut Frame, area: Rect, card: &Presentation) {
    let accent = ClinicalTheme::tone(card.tone);
    let block = Block::default()
        .title(Span::styled(" Result ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(accent);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(card.title, accent.add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    if !card.message.is_empty() {
        lines.push(Line::from(Span::styled(
            card.message.as_str(),
            ClinicalTheme::text(),
        )));
        lines.push(Line::from(""));
    }
    if let Some(confidence) = card.confidence_text() {
        lines.push(Line::from(vec![
            Span::styled("Model Confidence: ", ClinicalTheme::text_secondary()),
            Span::styled(confidence, ClinicalTheme::title()),
        ]));
        lines.push(Line::from(""));
    }
    if let Some(advice) = card.advice {
        lines.push(Line::from(Span::styled(advice, ClinicalTheme::text_muted())));
    }

    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(content, area);
}
