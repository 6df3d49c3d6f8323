use ratatui::{
    buffer::Buffer,
    layout::{self, Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

use crate::engine::{GameState, Snapshot};
use crate::grid::Field;

/// Terminal columns per grid cell, so cells come out roughly square
pub const CELL_WIDTH: u16 = 2;

/// Rows taken by the score bar
const HEADER_HEIGHT: u16 = 3;

const GRID_EVEN: Color = Color::Rgb(0xdd, 0xae, 0x7f);
const GRID_ODD: Color = Color::Rgb(0xc8, 0x9a, 0x5a);
const FOOD_COLOR: Color = Color::Red;
const HEAD_SYMBOL: &str = "😀";
const FOOD_SYMBOL: &str = "●";

/// Smallest terminal (columns, rows) that fits the whole field plus chrome.
pub fn required_size(field: Field) -> (u16, u16) {
    let columns = u16::try_from(field.columns().max(0)).unwrap_or(u16::MAX);
    let rows = u16::try_from(field.rows().max(0)).unwrap_or(u16::MAX);
    (
        columns.saturating_mul(CELL_WIDTH).saturating_add(2),
        rows.saturating_add(2).saturating_add(HEADER_HEIGHT),
    )
}

/// Body colour fades from bright green at the head.
fn snek_color(index: usize) -> Color {
    let fade = (index.min(15) * 10) as u8;
    Color::Rgb(0, 255 - fade, 0)
}

fn grid_color(column: i32, row: i32) -> Color {
    if (column + row) % 2 == 0 {
        GRID_EVEN
    } else {
        GRID_ODD
    }
}

fn paint(buf: &mut Buffer, x: u16, y: u16, symbol: &str, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

impl Widget for &Snapshot<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let field = self.field;
        let origin = |column: i32, row: i32| -> Option<(u16, u16)> {
            let x = area.x.checked_add(u16::try_from(column).ok()?.checked_mul(CELL_WIDTH)?)?;
            let y = area.y.checked_add(u16::try_from(row).ok()?)?;
            (x + CELL_WIDTH <= area.right() && y < area.bottom()).then_some((x, y))
        };

        // Checkerboard
        for row in 0..field.rows() {
            for column in 0..field.columns() {
                let Some((x, y)) = origin(column, row) else {
                    continue;
                };
                for dx in 0..CELL_WIDTH {
                    paint(buf, x + dx, y, " ", Style::new().bg(grid_color(column, row)));
                }
            }
        }

        let (food_column, food_row) = field.grid_index(self.food);
        if let Some((x, y)) = origin(food_column, food_row) {
            let bg = grid_color(food_column, food_row);
            paint(buf, x, y, FOOD_SYMBOL, Style::new().fg(FOOD_COLOR).bg(bg));
            paint(buf, x + 1, y, " ", Style::new().bg(bg));
        }

        // Tail first so the head ends up on top
        for (index, cell) in self.snek.iter().enumerate().rev() {
            let (column, row) = field.grid_index(*cell);
            let Some((x, y)) = origin(column, row) else {
                continue;
            };
            let style = Style::new().bg(snek_color(index));
            if index == 0 {
                paint(buf, x, y, HEAD_SYMBOL, style.fg(Color::Yellow));
                paint(buf, x + 1, y, " ", style);
            } else {
                for dx in 0..CELL_WIDTH {
                    paint(buf, x + dx, y, " ", style);
                }
            }
        }
    }
}

/// Centres a `width` x `height` box inside `area`, shrinking it if needed.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn overlay(state: GameState) -> Option<(Vec<Line<'static>>, Color)> {
    match state {
        GameState::Started => None,
        GameState::NotStarted => Some((
            vec![Line::from("Press SPACE to start the game")],
            Color::LightGreen,
        )),
        GameState::Over => Some((
            vec![
                Line::from("Game Over!"),
                Line::from(""),
                Line::from("R to play again, Q to quit"),
            ],
            Color::LightRed,
        )),
    }
}

/// Paints one whole frame: score bar, arena and any overlay.
pub fn draw(frame: &mut Frame, snapshot: &Snapshot, best: u32) {
    let layout = Layout::default()
        .direction(layout::Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // Title + score
            Constraint::Min(0),                // Game area
        ])
        .split(frame.area());

    let score_text = format!(
        "SNEK    Best: {}    Level : {} | Score: {}",
        best.max(snapshot.score),
        snapshot.level,
        snapshot.score
    );
    frame.render_widget(
        Paragraph::new(score_text)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL)),
        layout[0],
    );

    let (width, height) = required_size(snapshot.field);
    let arena = centered(layout[1], width, height.saturating_sub(HEADER_HEIGHT));
    let title = match snapshot.state {
        GameState::NotStarted => "Ready",
        GameState::Started => "Playing",
        GameState::Over => "Crashed",
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(arena);
    frame.render_widget(block, arena);
    frame.render_widget(snapshot, inner);

    if let Some((lines, color)) = overlay(snapshot.state) {
        let text_width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;
        let text_area = centered(layout[1], text_width, lines.len() as u16 + 2);
        frame.render_widget(Clear, text_area);
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(
                    Style::new()
                        .fg(color)
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL)),
            text_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, Direction};
    use ratatui::{backend::TestBackend, Terminal};
    use std::collections::VecDeque;
    use std::time::Duration;

    fn small_field() -> Field {
        Field {
            width: 100,
            height: 75,
            unit: 25,
        }
    }

    fn snapshot<'a>(snek: &'a VecDeque<Cell>, state: GameState) -> Snapshot<'a> {
        Snapshot {
            field: small_field(),
            snek,
            food: Cell::new(75, 50),
            direction: Direction::Right,
            state,
            score: 3,
            level: 1,
            tick_interval: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_required_size() {
        let field = Field {
            width: 600,
            height: 400,
            unit: 25,
        };
        assert_eq!(required_size(field), (50, 21));
        assert_eq!(required_size(small_field()), (10, 8));
    }

    #[test]
    fn test_widget_paints_snek_and_food() {
        let snek = VecDeque::from([Cell::new(25, 0), Cell::new(0, 0)]);
        let snap = snapshot(&snek, GameState::Started);
        let area = Rect::new(0, 0, 8, 3);
        let mut buf = Buffer::empty(area);

        (&snap).render(area, &mut buf);

        assert_eq!(buf[(2, 0)].symbol(), HEAD_SYMBOL);
        assert_eq!(buf[(2, 0)].bg, snek_color(0));
        assert_eq!(buf[(0, 0)].bg, snek_color(1));
        assert_eq!(buf[(1, 0)].bg, snek_color(1));
        assert_eq!(buf[(6, 2)].symbol(), FOOD_SYMBOL);
        assert_eq!(buf[(6, 2)].fg, FOOD_COLOR);
        // Plain grid elsewhere
        assert_eq!(buf[(4, 0)].bg, GRID_EVEN);
        assert_eq!(buf[(4, 1)].bg, GRID_ODD);
    }

    #[test]
    fn test_widget_clips_to_small_area() {
        let snek = VecDeque::from([Cell::new(75, 50), Cell::new(50, 50)]);
        let snap = snapshot(&snek, GameState::Started);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);

        // Nothing visible lands inside, and nothing panics
        (&snap).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].bg, GRID_EVEN);
    }

    fn rendered_text(state: GameState) -> String {
        let snek = VecDeque::from([Cell::new(25, 0), Cell::new(0, 0)]);
        let snap = snapshot(&snek, state);
        let mut terminal = Terminal::new(TestBackend::new(60, 14)).unwrap();
        terminal.draw(|f| draw(f, &snap, 7)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_draw_header_and_overlays() {
        let ready = rendered_text(GameState::NotStarted);
        assert!(ready.contains("Best: 7"));
        assert!(ready.contains("Level : 1 | Score: 3"));
        assert!(ready.contains("Press SPACE"));

        let playing = rendered_text(GameState::Started);
        assert!(playing.contains("Playing"));
        assert!(!playing.contains("Press SPACE"));

        let over = rendered_text(GameState::Over);
        assert!(over.contains("Game Over!"));
    }
}
