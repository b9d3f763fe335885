use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::game::{LetterStatus, Session};

pub const KEY_ROWS: [&str; 3] = ["ABCDEFGHI", "JKLMNOPQR", "STUVWXYZ"];

pub fn key_style(status: LetterStatus, disabled: bool) -> Style {
    let style = match status {
        LetterStatus::Unknown => Style::default().fg(Color::Black).bg(Color::Yellow),
        LetterStatus::Correct => Style::default().fg(Color::Black).bg(Color::Green),
        LetterStatus::Incorrect => Style::default().fg(Color::Black).bg(Color::Red),
    }
    .add_modifier(Modifier::BOLD);

    if disabled {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

/// On-screen A–Z keyboard coloured by letter status.
pub struct Keyboard<'a> {
    pub session: &'a Session,
}

impl Widget for Keyboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let disabled = self.session.is_over();

        let lines: Vec<Line> = KEY_ROWS
            .iter()
            .flat_map(|row| {
                let keys = row
                    .chars()
                    .map(|c| {
                        Span::styled(
                            format!(" {c} "),
                            key_style(self.session.letter_status(c), disabled),
                        )
                    })
                    .intersperse(Span::raw(" "))
                    .collect::<Vec<Span>>();
                [Line::from(keys), Line::default()]
            })
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
