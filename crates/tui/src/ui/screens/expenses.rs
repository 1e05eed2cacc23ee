use expense_client::{Expense, Field, Url, ViewState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{
    app::{AppState, CreateFocus},
    ui::theme::Theme,
};

const NO_RESULTS: &str = "No expenses found for this date.";

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    match state.expenses.view() {
        ViewState::None => render_home(frame, area, state, theme),
        ViewState::Create => render_create(frame, area, state, theme),
        ViewState::All => {
            let empty = if state.expenses.loading() {
                ""
            } else {
                "No expenses yet."
            };
            render_list(frame, area, state, empty, theme);
        }
        ViewState::Search => {
            let layout = split_input(area);
            let input = state.expenses.search_date();
            render_line_input(frame, layout[0], "Date (YYYY-MM-DD)", input, theme);
            let empty = if state.expenses.has_searched() && !state.expenses.loading() {
                NO_RESULTS
            } else {
                ""
            };
            render_list(frame, layout[1], state, empty, theme);
        }
        ViewState::Delete => {
            let layout = split_input(area);
            let input = state.expenses.delete_input();
            render_line_input(frame, layout[0], "Expense id", input, theme);
            render_list(frame, layout[1], state, "", theme);
        }
    }
}

fn split_input(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area)
}

fn render_home(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(theme.accent));
    let lines = vec![
        Line::from("Manage your expenses."),
        Line::from(""),
        Line::from(vec![key("F1"), Span::raw("  record a new expense")]),
        Line::from(vec![key("F2"), Span::raw("  show all expenses")]),
        Line::from(vec![key("F3"), Span::raw("  search expenses by date")]),
        Line::from(vec![key("F4"), Span::raw("  delete an expense by id")]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Receipts are served from {}uploads/", state.base_url),
            Style::default().fg(theme.text_muted),
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title("Home");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_create(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(ViewState::Create.label());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Attachment
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let form = state.expenses.form();
    for (row, focus) in CreateFocus::ORDER.into_iter().enumerate() {
        let (label, value) = match focus.field() {
            Some(Field::Amount) => ("Amount (Rs.)", form.field(Field::Amount)),
            Some(Field::Date) => ("Date (YYYY-MM-DD)", form.field(Field::Date)),
            Some(field) => (field.label(), form.field(field)),
            None => ("Receipt image", state.image_path.as_str()),
        };
        let focused = state.create_focus == focus;
        render_field(frame, rows[row], label, value, focused, theme);
    }

    let attachment = match form.preview() {
        Some(preview) => Line::from(vec![
            Span::styled("Attached ", Style::default().fg(theme.positive)),
            Span::raw(preview.label().to_string()),
            Span::styled(
                format!("  {}", preview.reference()),
                Style::default().fg(theme.text_muted),
            ),
        ]),
        None => Line::from(Span::styled(
            "No receipt attached",
            Style::default().fg(theme.text_muted),
        )),
    };
    frame.render_widget(Paragraph::new(attachment), rows[5]);
}

fn render_field(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    let line = Line::from(vec![
        Span::styled(
            format!("{label:<20}"),
            Style::default().fg(theme.text_muted),
        ),
        Span::styled(format!("{value}{cursor}"), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_line_input(frame: &mut Frame<'_>, area: Rect, title: &str, value: &str, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(theme.accent));
    let content = Paragraph::new(Span::raw(format!("{value}│"))).block(block);
    frame.render_widget(content, area);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, empty: &str, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let expenses = state.expenses.expenses();
    let title = match state.expenses.view() {
        ViewState::Search | ViewState::Delete => format!("Expenses ({})", expenses.len()),
        view => format!("{} ({})", view.label(), expenses.len()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if expenses.is_empty() {
        let message = Paragraph::new(Span::styled(
            empty.to_string(),
            Style::default().fg(theme.text_muted),
        ))
        .block(block);
        frame.render_widget(message, layout[0]);
        return;
    }

    let items = expenses
        .iter()
        .map(|expense| ListItem::new(Line::from(expense_row(expense))))
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected.min(expenses.len() - 1)));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, layout[0], &mut list_state);

    let receipt = expenses
        .get(state.selected)
        .and_then(|expense| receipt_line(expense, &state.base_url));
    if let Some(receipt) = receipt {
        frame.render_widget(
            Paragraph::new(Span::styled(receipt, Style::default().fg(theme.text_muted))),
            layout[1],
        );
    }
}

fn expense_row(expense: &Expense) -> String {
    let amount = format!("Rs.{}", expense.amount);
    let receipt = if expense.bill_image.is_some() {
        "  [receipt]"
    } else {
        ""
    };
    format!(
        "#{:<5} {}  {:>12}  {}{}",
        expense.id,
        expense.date.format("%Y-%m-%d"),
        amount,
        expense.reason,
        receipt
    )
}

fn receipt_line(expense: &Expense, base: &Url) -> Option<String> {
    expense
        .bill_image_url(base)
        .map(|url| format!(" Receipt: {url}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use expense_client::{Amount, ExpenseId};

    fn expense(bill_image: Option<&str>) -> Expense {
        Expense {
            id: ExpenseId(7),
            reason: "Lunch".to_string(),
            amount: Amount::from_cents(50_000),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            bill_image: bill_image.map(str::to_string),
        }
    }

    #[test]
    fn row_shows_rupee_amount() {
        let row = expense_row(&expense(None));
        assert!(row.starts_with("#7 "));
        assert!(row.contains("2024-05-01"));
        assert!(row.contains("Rs.500.00"));
        assert!(row.ends_with("Lunch"));
    }

    #[test]
    fn receipt_marker_and_url() {
        let with_receipt = expense(Some("7-bill.jpg"));
        assert!(expense_row(&with_receipt).ends_with("[receipt]"));

        let base = Url::parse("http://localhost:3000/").unwrap();
        assert_eq!(
            receipt_line(&with_receipt, &base).as_deref(),
            Some(" Receipt: http://localhost:3000/uploads/7-bill.jpg")
        );
        assert_eq!(receipt_line(&expense(None), &base), None);
    }
}
