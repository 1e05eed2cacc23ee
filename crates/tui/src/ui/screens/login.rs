use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField, LoginMode},
    ui::theme::Theme,
};

fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let login = &state.login;
    let fields = login.fields();

    // One row per field plus a spacer between them.
    let box_height = (fields.len() as u16) * 2 + 3;
    let card_area = centered_box(44, box_height, area);

    frame.render_widget(Clear, card_area);

    let title = match login.mode {
        LoginMode::SignIn => " login ",
        LoginMode::Register => " register ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let constraints: Vec<Constraint> = fields
        .iter()
        .flat_map(|_| [Constraint::Length(1), Constraint::Length(1)])
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        let (label, value, masked) = match field {
            LoginField::Name => ("Name", login.name.as_str(), false),
            LoginField::Email => ("Email", login.email.as_str(), false),
            LoginField::Password => ("Password", login.password.as_str(), true),
        };
        render_input(
            frame,
            rows[i * 2],
            label,
            value,
            masked,
            login.focus == *field,
            &theme,
        );
    }

    let below = Rect {
        x: card_area.x,
        y: card_area.y.saturating_add(card_area.height + 1),
        width: card_area.width,
        height: 2,
    }
    .intersection(area);

    let mut lines = Vec::new();
    if login.busy {
        lines.push(Line::from(Span::styled(
            "Contacting server...",
            Style::default().fg(theme.text_muted),
        )));
    } else if let Some(message) = &login.message {
        lines.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(theme.error),
        )));
    } else if let Some(notice) = &login.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(theme.positive),
        )));
    }
    let switch = match login.mode {
        LoginMode::SignIn => "Ctrl+N register",
        LoginMode::Register => "Ctrl+N back to login",
    };
    lines.push(Line::from(Span::styled(
        switch,
        Style::default().fg(theme.text_muted),
    )));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), below);
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    masked: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let shown = if masked {
        mask_password(value)
    } else {
        value.to_string()
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let line = Line::from(vec![
        Span::styled(format!("{label:<9}"), Style::default().fg(theme.text_muted)),
        Span::styled(format!("{shown}{cursor}"), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn mask_password(password: &str) -> String {
    "•".repeat(password.chars().count())
}
