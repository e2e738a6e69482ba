pub mod app;
pub mod ui;

use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use app::{App, InputMode};
use ui::ui;

use crate::storage::KeyValueStore;

pub fn run_tui(store: &dyn KeyValueStore) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(store)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Tab | KeyCode::Right => app.next_tab(),
                    KeyCode::BackTab | KeyCode::Left => app.prev_tab(),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Char('n') | KeyCode::PageDown => app.next_page(),
                    KeyCode::Char('p') | KeyCode::PageUp => app.prev_page(),
                    KeyCode::Char('/') => app.start_search(),
                    KeyCode::Char('r') => app.reset(),
                    KeyCode::Char('R') => app.reload(),
                    KeyCode::Char('d') | KeyCode::Delete => app.start_delete(),
                    KeyCode::Char('a') => app.hint_add(),
                    KeyCode::Char('e') | KeyCode::Enter => app.hint_edit(),
                    _ => {}
                },
                InputMode::Searching => match key.code {
                    KeyCode::Enter | KeyCode::Esc => app.finish_search(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                        app.update_search();
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                        app.update_search();
                    }
                    _ => {}
                },
                InputMode::ConfirmDelete => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_delete(false),
                    _ => {}
                },
            }
        }
    }
}
