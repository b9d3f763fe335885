use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Widget, Wrap},
};

use crate::util::format_elapsed;

const MODAL_WIDTH: u16 = 44;
const MODAL_HEIGHT: u16 = 9;

/// End-of-game notice drawn over the board.
pub struct ResultModal<'a> {
    pub message: &'a str,
    pub word: &'a str,
    pub score: u32,
    pub elapsed_secs: u64,
}

/// A `width` x `height` rect centred in `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

impl Widget for ResultModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rect = centered_rect(area, MODAL_WIDTH, MODAL_HEIGHT);
        Clear.render(rect, buf);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let accent = bold.fg(Color::Yellow);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let lines = vec![
            Line::styled(self.message, accent),
            Line::default(),
            Line::from(vec![
                Span::raw("The word was "),
                Span::styled(self.word, bold),
            ]),
            Line::from(vec![
                Span::raw("Score: "),
                Span::styled(self.score.to_string(), accent),
                Span::raw("   Time: "),
                Span::styled(format_elapsed(self.elapsed_secs), accent),
            ]),
            Line::default(),
            Line::styled("(enter) games list / (r) new game / (esc) quit", dim),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .render(rect, buf);
    }
}
