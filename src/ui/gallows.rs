use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Paragraph, Widget},
};

use crate::game::MAX_ERRORS;

const WIDTH: usize = 9;
const HEIGHT: usize = 7;

/// One drawing step per wrong guess, in order: (row, col, glyph).
const STAGES: [&[(usize, usize, char)]; MAX_ERRORS as usize] = [
    // base
    &[
        (6, 0, '='),
        (6, 1, '='),
        (6, 2, '='),
        (6, 3, '='),
        (6, 4, '='),
        (6, 5, '='),
        (6, 6, '='),
        (6, 7, '='),
        (6, 8, '='),
    ],
    // pole
    &[(1, 6, '|'), (2, 6, '|'), (3, 6, '|'), (4, 6, '|'), (5, 6, '|')],
    // beam
    &[(0, 2, '+'), (0, 3, '-'), (0, 4, '-'), (0, 5, '-'), (0, 6, '+')],
    // rope
    &[(1, 2, '|')],
    // head
    &[(2, 2, 'O')],
    // body
    &[(3, 2, '|')],
    // arms
    &[(3, 1, '/')],
    &[(3, 3, '\\')],
    // legs
    &[(4, 1, '/')],
    &[(4, 3, '\\')],
];

/// The gallows after `errors` wrong guesses, one string per row.
pub fn gallows_lines(errors: u32) -> Vec<String> {
    let mut grid = [[' '; WIDTH]; HEIGHT];

    for stage in STAGES.iter().take(errors as usize) {
        for &(row, col, glyph) in stage.iter() {
            grid[row][col] = glyph;
        }
    }

    grid.iter().map(|row| row.iter().collect()).collect()
}

pub struct Gallows {
    pub errors: u32,
    pub style: Style,
}

impl Widget for Gallows {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = gallows_lines(self.errors)
            .into_iter()
            .map(|l| Line::styled(l, self.style))
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
