//! Crossterm front-end for the maze demo.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use crate::{Command, HELP, View};

/// Foreground color for each rendered glyph.
fn glyph_color(c: char) -> Color {
    match c {
        '#' => Color::DarkGrey,
        '.' => Color::DarkBlue,
        '+' => Color::Yellow,
        '@' => Color::Magenta,
        '*' => Color::Green,
        'S' | 'E' => Color::Red,
        _ => Color::Reset,
    }
}

/// Maps a crossterm key code to a demo command.
fn to_command(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Char(c) => Command::from_key(c),
        KeyCode::Enter => Some(Command::Solve),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Raw-mode, alternate-screen terminal session.
#[derive(Default)]
pub struct Terminal {
    active: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All),
        )?;
        self.active = true;
        log::debug!("terminal initialized");
        Ok(())
    }

    /// Wait up to `timeout` for a key press.
    pub fn poll_command(&mut self, timeout: Duration) -> io::Result<Option<Command>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => Ok(to_command(code)),
            Event::Resize(..) => {
                execute!(io::stdout(), terminal::Clear(ClearType::All))?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Draw the maze, then the status and help lines below it.
    pub fn draw(&mut self, view: &View, delay: Option<Duration>) -> io::Result<()> {
        let mut out = io::stdout().lock();
        let rows = view.render();
        for (y, row) in rows.iter().enumerate() {
            queue!(out, cursor::MoveTo(0, y as u16))?;
            let mut color = None;
            for c in row.chars() {
                let fg = glyph_color(c);
                if color != Some(fg) {
                    queue!(out, SetForegroundColor(fg))?;
                    color = Some(fg);
                }
                queue!(out, Print(c))?;
            }
        }
        let y = rows.len() as u16;
        queue!(
            out,
            ResetColor,
            cursor::MoveTo(0, y + 1),
            terminal::Clear(ClearType::CurrentLine),
            Print(view.status_line(delay)),
            cursor::MoveTo(0, y + 2),
            terminal::Clear(ClearType::CurrentLine),
            Print(HELP),
        )?;
        out.flush()
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        log::debug!("terminal restored");
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.close();
    }
}
