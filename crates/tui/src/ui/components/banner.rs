use expense_client::Banners;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::theme::Theme;

/// One-line status under the tabs. Errors take precedence over success.
pub fn render(frame: &mut Frame<'_>, area: Rect, banners: &Banners, theme: &Theme) {
    let line = if let Some(error) = &banners.error {
        Line::from(Span::styled(
            format!(" ✗ {error}"),
            Style::default().fg(theme.error),
        ))
    } else if let Some(success) = &banners.success {
        Line::from(Span::styled(
            format!(" ✓ {success}"),
            Style::default().fg(theme.positive),
        ))
    } else {
        return;
    };

    frame.render_widget(Paragraph::new(line), area);
}
