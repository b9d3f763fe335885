pub mod gallows;
pub mod keyboard;
pub mod modal;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};

use crate::{
    app::{App, AppState},
    game::{Outcome, Session, MAX_ERRORS},
    util::format_elapsed,
};

use self::{gallows::Gallows, keyboard::Keyboard, modal::ResultModal};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

const TITLE: &str = "PHYSICS HANGMAN";
const INSTRUCTIONS: &str =
    "Guess the physics word one letter at a time. Ten wrong letters and you hang.";
const KEY_HINTS: &str = "(a-z) guess / (ctrl+r) reset game / (esc) quit";

/// Plain-text board: guessed letters shown, the rest as `_`.
pub fn board_text(session: &Session) -> String {
    session
        .board()
        .into_iter()
        .map(|slot| slot.unwrap_or('_'))
        .join(" ")
}

fn board_line(session: &Session) -> Line<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lost = session.outcome() == Some(Outcome::Lost);

    let spans = session
        .word()
        .chars()
        .zip(session.board())
        .map(|(letter, slot)| match slot {
            Some(c) => Span::styled(c.to_string(), bold.fg(Color::White)),
            // reveal the rest of the word once the game is lost
            None if lost => Span::styled(letter.to_string(), bold.fg(Color::Red)),
            None => Span::styled("_", bold.fg(Color::DarkGray)),
        })
        .intersperse(Span::raw(" "))
        .collect::<Vec<Span>>();

    Line::from(spans)
}

fn tally_line(session: &Session) -> Line<'static> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let value = label.fg(Color::Yellow);

    Line::from(vec![
        Span::styled("Errors: ", label),
        Span::styled(format!("{} / {}", session.error_count(), MAX_ERRORS), value),
        Span::raw("    "),
        Span::styled("Time: ", label),
        Span::styled(format_elapsed(session.elapsed_secs()), value),
        Span::raw("    "),
        Span::styled("Score: ", label),
        Span::styled(session.score().to_string(), value),
    ])
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(2), // instructions
                Constraint::Min(7),    // gallows + board + keyboard
                Constraint::Length(1), // tally
                Constraint::Length(1), // key hints
            ])
            .split(area);

        Paragraph::new(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        Paragraph::new(Span::styled(INSTRUCTIONS, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(15), Constraint::Min(20)])
            .split(chunks[2]);

        Gallows {
            errors: session.error_count(),
            style: Style::default().fg(Color::White),
        }
        .render(body[0], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // padding
                Constraint::Length(2), // word
                Constraint::Min(6),    // keyboard
            ])
            .split(body[1]);

        Paragraph::new(board_line(session))
            .alignment(Alignment::Center)
            .render(right[1], buf);

        Keyboard { session }.render(right[2], buf);

        Paragraph::new(tally_line(session))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        Paragraph::new(Span::styled(KEY_HINTS, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        if self.state == AppState::Results {
            if let Some(message) = self.modal_message() {
                ResultModal {
                    message,
                    word: session.word(),
                    score: session.score(),
                    elapsed_secs: session.elapsed_secs(),
                }
                .render(area, buf);
            }
        }
    }
}

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
