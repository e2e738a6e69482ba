use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
    Frame,
};
use super::app::{App, InputMode};
use crate::listing::Tone;

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Plain => Style::default(),
        Tone::Strong => Style::default().add_modifier(Modifier::BOLD),
        Tone::Muted => Style::default().fg(Color::DarkGray),
        Tone::Good => Style::default().fg(Color::Green),
        Tone::Info => Style::default().fg(Color::Cyan),
        Tone::Warn => Style::default().fg(Color::Yellow),
        Tone::Bad => Style::default().fg(Color::Red),
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Status
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    let titles: Vec<Line> = app.screens.iter().map(|s| Line::from(s.command())).collect();
    let tabs = Tabs::new(titles)
        .select(app.tab)
        .block(Block::default().borders(Borders::ALL).title("iFinance"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let screen = app.current();
    let headers = screen.headers();
    let rows: Vec<Row> = screen
        .rows()
        .into_iter()
        .map(|(id, cells)| {
            let mut row = vec![Cell::from(id.to_string())];
            row.extend(cells.into_iter().map(|c| Cell::from(c.text).style(tone_style(c.tone))));
            Row::new(row)
        })
        .collect();

    let mut widths = vec![Constraint::Length(4)];
    widths.extend(headers.iter().map(|_| Constraint::Min(10)));

    let mut header = vec!["ID"];
    header.extend(headers.iter().copied());

    let mut title = screen.title();
    let search = screen.search();
    if !search.is_empty() {
        title = format!("{} (search: {})", title, search);
    }
    let footer = screen.footer();
    let pending = screen.pending_delete();

    let table = Table::new(rows, widths)
        .header(Row::new(header)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title).title_bottom(footer))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);

    let status = Paragraph::new(app.status.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[2]);

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | Tab: Next list | j/k: Move | n/p: Page | /: Search | r: Reset | d: Delete | a: Add | e: Edit | R: Reload",
        InputMode::Searching => "Type to filter | Enter/Esc: Done",
        InputMode::ConfirmDelete => "y: Delete | n/Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[3]);

    match app.input_mode {
        InputMode::Searching => {
            let area = centered_rect(60, 3, f.area());
            f.render_widget(Clear, area);
            let input = Paragraph::new(app.input_buffer.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title("Search"));
            f.render_widget(input, area);
        }
        InputMode::ConfirmDelete => {
            let area = centered_rect(60, 3, f.area());
            f.render_widget(Clear, area);
            let prompt = match pending {
                Some(id) => format!("Are you sure you want to delete record {}? [y/N]", id),
                None => "Nothing to delete.".to_string(),
            };
            let input = Paragraph::new(prompt)
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("Confirm delete"));
            f.render_widget(input, area);
        }
        InputMode::Normal => {}
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
