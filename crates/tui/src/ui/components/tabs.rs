use expense_client::ViewState;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::theme::Theme;

const TABS: [(ViewState, &str); 4] = [
    (ViewState::Create, "F1"),
    (ViewState::All, "F2"),
    (ViewState::Search, "F3"),
    (ViewState::Delete, "F4"),
];

/// Renders the view switcher; nothing is highlighted on the home view.
pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: ViewState, theme: &Theme) {
    let mut spans = vec![Span::raw(" ")];

    for (i, (view, key)) in TABS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }

        spans.push(Span::styled(
            format!("{key} "),
            Style::default().fg(theme.text_muted),
        ));
        let label = view.label();
        if *view == active {
            spans.push(Span::styled("[", Style::default().fg(theme.accent)));
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("]", Style::default().fg(theme.accent)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.text)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn tab_shortcuts(theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::styled("F1", Style::default().fg(theme.accent)),
        Span::raw("-"),
        Span::styled("F4", Style::default().fg(theme.accent)),
        Span::raw(" views  "),
        Span::styled("F5", Style::default().fg(theme.accent)),
        Span::raw(" refresh"),
    ]
}
