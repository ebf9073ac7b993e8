use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use std::collections::HashSet;

use crate::game::{Grid, ItemKind, Position, Shape, Snapshot};
use crate::metrics::GameMetrics;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        snapshot: &Snapshot,
        grid: &Grid,
        metrics: &GameMetrics,
        paused: bool,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(snapshot, metrics, paused), chunks[0]);
        frame.render_widget(self.render_grid(snapshot, grid), chunks[1]);
        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, snapshot: &Snapshot, grid: &Grid) -> Paragraph<'_> {
        let body: HashSet<Position> = snapshot.segments.iter().copied().collect();
        let head = snapshot.head();

        let lines: Vec<Line> = (0..grid.height())
            .map(|y| {
                let spans: Vec<Span> = (0..grid.width())
                    .map(|x| {
                        let pos = Position::new(x, y);
                        if Some(pos) == head {
                            Span::styled(
                                "■ ",
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else if body.contains(&pos) {
                            Span::styled("□ ", Style::default().fg(Color::Green))
                        } else if let Some(item) = snapshot.item_at(pos) {
                            item_span(item.kind)
                        } else {
                            Span::styled(". ", Style::default().fg(Color::DarkGray))
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        snapshot: &Snapshot,
        metrics: &GameMetrics,
        paused: bool,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = vec![
            Span::styled("Length: ", label),
            Span::styled(
                snapshot.length.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.tally.best_length.max(snapshot.length).to_string(), value),
            Span::raw("    "),
            Span::styled("Resets: ", label),
            Span::styled(snapshot.resets.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ];
        if paused {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "PAUSED",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

/// Glyph for an item: squares for growth and obstacles, a triangle for shrink
fn item_span(kind: ItemKind) -> Span<'static> {
    let glyph = match kind.shape() {
        Shape::Square => "■ ",
        Shape::Triangle => "▲ ",
    };
    let color = match kind {
        ItemKind::Growth => Color::Red,
        ItemKind::Shrink => Color::Magenta,
        ItemKind::Lethal => Color::Gray,
    };
    Span::styled(glyph, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
