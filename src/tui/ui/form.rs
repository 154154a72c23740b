//! Clinical parameter entry form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::PredictionSession;
use crate::domain::{ClinicalField, FieldKind, FormState};
use crate::tui::styles::ClinicalTheme;

/// Sample patient, in wire order (first row of the Cleveland dataset).
const SAMPLE_PATIENT: [&str; ClinicalField::COUNT] = [
    "63", "1", "3", "145", "233", "1", "0", "150", "0", "2.3", "0", "0", "1",
];

/// Cursor over the form. Values live in the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormView {
    selected: usize,
}

impl FormView {
    #[must_use]
    pub fn selected_field(&self) -> ClinicalField {
        ClinicalField::ALL[self.selected]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % ClinicalField::COUNT;
    }

    pub fn prev_field(&mut self) {
        self.selected = (self.selected + ClinicalField::COUNT - 1) % ClinicalField::COUNT;
    }

    /// Append a numeric character to the selected field.
    ///
    /// Returns whether the character was accepted.
    pub fn input_char(&self, session: &mut PredictionSession, c: char) -> bool {
        if !(c.is_ascii_digit() || c == '.' || c == '-') {
            return false;
        }
        session.push_char(self.selected_field(), c);
        true
    }

    pub fn delete_char(&self, session: &mut PredictionSession) {
        session.pop_char(self.selected_field());
    }

    pub fn clear_field(&self, session: &mut PredictionSession) {
        session.set_field(self.selected_field(), String::new());
    }

    /// Step an enumerated field through its choices. Numeric fields are left
    /// alone.
    pub fn cycle_choice(&self, session: &mut PredictionSession, forward: bool) {
        let field = self.selected_field();
        if let Some(choice) = field.domain().cycle(session.form().value(field), forward) {
            session.set_field(field, choice.value);
        }
    }

    pub fn load_sample(&mut self, session: &mut PredictionSession) {
        for (field, value) in ClinicalField::ALL.into_iter().zip(SAMPLE_PATIENT) {
            session.set_field(field, value);
        }
        self.selected = 0;
    }
}

/// Render the form as two columns of bordered inputs.
pub fn render_form(f: &mut Frame, area: Rect, form: &FormState, view: &FormView) {
    let block = Block::default()
        .title(Span::styled(" Patient Parameters ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(inner);

    let mid = ClinicalField::COUNT.div_ceil(2);
    let (left, right) = ClinicalField::ALL.split_at(mid);
    render_field_column(f, columns[0], left, form, view);
    render_field_column(f, columns[1], right, form, view);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[ClinicalField],
    form: &FormState,
    view: &FormView,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, &field) in fields.iter().enumerate() {
        let is_selected = field == view.selected_field();
        let (border_style, title_style) = if is_selected {
            (ClinicalTheme::border_focused(), ClinicalTheme::focused())
        } else {
            (ClinicalTheme::border(), ClinicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        spans.extend(value_spans(field, form.value(field)));
        if is_selected {
            spans.push(Span::styled("▌", ClinicalTheme::cursor()));
            if field.kind() == FieldKind::Enum {
                spans.push(Span::styled("  ◀ ▶", ClinicalTheme::text_muted()));
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn value_spans(field: ClinicalField, raw: &str) -> Vec<Span<'_>> {
    if raw.is_empty() {
        return vec![Span::styled(field.placeholder(), ClinicalTheme::text_muted())];
    }
    match field.domain().choice_for(raw) {
        Some(choice) if choice.label != choice.value => vec![
            Span::styled(raw, ClinicalTheme::text()),
            Span::styled(format!(" · {}", choice.label), ClinicalTheme::text_secondary()),
        ],
        _ => vec![Span::styled(raw, ClinicalTheme::text())],
    }
}
