pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use expense_client::ViewState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, CreateFocus, Screen};
use components::hints::{KeyHint, common, hint_separator, hints_to_spans};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Expenses => render_shell(frame, area, state),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar
            Constraint::Length(1), // Banner
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.expenses.view(), &theme);
    components::banner::render(frame, layout[2], state.expenses.banners(), &theme);
    screens::expenses::render(frame, layout[3], state, &theme);
    render_bottom_bar(frame, layout[4], state, &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state.user.as_deref().unwrap_or("saved session");
    let mut spans = vec![
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
    ];
    if state.expenses.loading() {
        spans.push(Span::styled("loading…", Style::default().fg(theme.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    let context = context_hints(state);
    if !context.is_empty() {
        parts.push(hint_separator(theme));
        parts.extend(hints_to_spans(&context, theme));
    }

    parts.push(hint_separator(theme));
    parts.extend(hints_to_spans(&common::global_shortcuts(), theme));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn context_hints(state: &AppState) -> Vec<KeyHint> {
    match state.expenses.view() {
        ViewState::None => common::view_digits(),
        ViewState::All => {
            let mut hints = common::list_navigation();
            hints.push(KeyHint::new("r", "refresh"));
            hints
        }
        ViewState::Create if state.create_focus == CreateFocus::Image => vec![
            KeyHint::new("Enter", "attach"),
            KeyHint::new("Ctrl+X", "remove"),
            KeyHint::new("Tab", "next"),
            KeyHint::new("Esc", "clear"),
        ],
        ViewState::Create => common::form_editing(),
        ViewState::Search => vec![
            KeyHint::new("Enter", "search"),
            KeyHint::new("↑↓", "select"),
            KeyHint::new("Esc", "clear"),
        ],
        ViewState::Delete => vec![
            KeyHint::new("↑↓", "pick"),
            KeyHint::new("Enter", "delete"),
            KeyHint::new("F5", "load ids"),
        ],
    }
}
