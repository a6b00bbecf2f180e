use std::io;
use std::time::Duration;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

use crate::engine::{Board, CellContent, Status};

const FRAME: Duration = Duration::from_millis(1000 / 60);
// one char for the cell, one for the margin
const CELL_W: u16 = 2;

const NUMBER_COLORS: [Color; 8] = [
    Color::Blue,
    Color::Green,
    Color::Red,
    Color::Rgb(0, 0, 128),
    Color::Rgb(128, 0, 0),
    Color::Rgb(64, 224, 208),
    Color::Black,
    Color::Rgb(120, 120, 120),
];

pub fn run_tui(mut board: Board) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let _guard = TermGuard;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut cursor = (0usize, 0usize);
    let mut last_inner_board = Rect::default();
    loop {
        terminal.draw(|f| { last_inner_board = ui(f, &board, cursor); })?;

        if !event::poll(FRAME)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('h') | KeyCode::Left => {
                    if cursor.0 > 0 { cursor.0 -= 1; }
                }
                KeyCode::Char('l') | KeyCode::Right => {
                    if cursor.0 + 1 < board.width() { cursor.0 += 1; }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    if cursor.1 > 0 { cursor.1 -= 1; }
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    if cursor.1 + 1 < board.height() { cursor.1 += 1; }
                }
                KeyCode::Char('f') => { board.toggle_flag(cursor.0, cursor.1); }
                KeyCode::Enter | KeyCode::Char(' ') => { board.reveal(cursor.0, cursor.1); }
                KeyCode::Char('r') | KeyCode::Char('R') => board.restart(),
                _ => {}
            },
            Event::Mouse(m) => {
                if let MouseEventKind::Down(btn) = m.kind {
                    let (cols, rows) = grid_size(&board);
                    if let Some((cx, cy)) = pos_to_cell(m.column, m.row, last_inner_board, cols, rows) {
                        let (cx, cy) = (cx as usize, cy as usize);
                        cursor = (cx, cy);
                        match btn {
                            MouseButton::Left => { board.reveal(cx, cy); }
                            MouseButton::Right => { board.toggle_flag(cx, cy); }
                            MouseButton::Middle => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }

    terminal.show_cursor()?;
    Ok(())
}

fn ui(f: &mut ratatui::Frame, board: &Board, cursor: (usize, usize)) -> Rect {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.size());

    let (status, status_style) = match board.status() {
        Status::Playing => ("Playing...", Style::default().fg(Color::Blue)),
        Status::Won => ("You won!", Style::default().fg(Color::Green)),
        Status::Lost => ("Boom! You hit a mine.", Style::default().fg(Color::Red)),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::raw(format!("Mines: {}    Status: ", board.remaining_mines())),
        Span::styled(status, status_style.add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Minesweeper"));
    f.render_widget(header, root[0]);

    let (cols, rows) = grid_size(board);
    let area = centered_grid_area(root[1], cols, rows);
    let inner = inner_area(area);
    draw_board(f, board, area, cursor);

    let footer = Paragraph::new("Left click/Enter reveal • Right click/f flag • Arrows/HJKL move • r restart • q quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, root[2]);
    inner
}

/// Board size in terminal cells, saturated for boards wider than a terminal can be.
fn grid_size(board: &Board) -> (u16, u16) {
    let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    (clamp(board.width()), clamp(board.height()))
}

fn centered_grid_area(parent: Rect, cols: u16, rows: u16) -> Rect {
    // grid plus the board block's borders
    let grid_w = cols.saturating_mul(CELL_W).saturating_add(2);
    let grid_h = rows.saturating_add(2);
    let x = parent.x.saturating_add((parent.width.saturating_sub(grid_w)) / 2);
    let y = parent.y.saturating_add((parent.height.saturating_sub(grid_h)) / 2);
    Rect { x, y, width: grid_w.min(parent.width), height: grid_h.min(parent.height) }
}

fn draw_board(f: &mut ratatui::Frame, board: &Board, area: Rect, cursor: (usize, usize)) {
    let w = board.width();
    let mut exposed = vec![false; w * board.height()];
    if board.status() == Status::Lost {
        for (x, y) in board.unflagged_mines() {
            exposed[y * w + x] = true;
        }
    }

    let mut lines: Vec<Line> = Vec::with_capacity(board.height());
    for y in 0..board.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(w);
        for x in 0..w {
            let Some(c) = board.cell(x, y) else { continue };

            let (mut ch, mut style) = if exposed[y * w + x] {
                ('*', Style::default().fg(Color::Red))
            } else if c.revealed() {
                let style = match c.content() {
                    CellContent::Mine => Style::default().fg(Color::Red),
                    _ => number_style(c.adjacent()),
                };
                (c.content().glyph(), style)
            } else if c.flagged() {
                ('F', Style::default().fg(Color::Red))
            } else {
                ('·', Style::default().fg(Color::DarkGray))
            };

            if cursor == (x, y) {
                style = style.add_modifier(Modifier::REVERSED);
                if ch == ' ' { ch = '·'; }
            }

            spans.push(Span::styled(ch.to_string(), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let board_block = Block::default().borders(Borders::ALL).title("Board");
    let para = Paragraph::new(lines).block(board_block);
    f.render_widget(para, area);
}

fn number_style(n: u8) -> Style {
    let revealed = Style::default().bg(Color::White);
    match n {
        1..=8 => revealed.fg(NUMBER_COLORS[n as usize - 1]),
        _ => revealed.fg(Color::Black),
    }
}

fn inner_area(area: Rect) -> Rect {
    // Match Block::inner() for Borders::ALL: shrink by 1 on each side
    Rect { x: area.x.saturating_add(1), y: area.y.saturating_add(1), width: area.width.saturating_sub(2), height: area.height.saturating_sub(2) }
}

/// Maps a terminal position to a grid cell. Clicks above the board, on its border
/// or on the margin column right of a cell are ignored.
fn pos_to_cell(mx: u16, my: u16, inner: Rect, cols: u16, rows: u16) -> Option<(u16, u16)> {
    if mx < inner.x || my < inner.y { return None; }
    let rel_x = mx - inner.x;
    let rel_y = my - inner.y;
    if rel_x % CELL_W != 0 { return None; }
    let cx = rel_x / CELL_W;
    let cy = rel_y;
    if cx < cols && cy < rows { Some((cx, cy)) } else { None }
}

struct TermGuard;
impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = stdout.execute(DisableMouseCapture);
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_map_to_cells_inside_the_board() {
        let inner = Rect { x: 10, y: 5, width: 8, height: 4 };
        assert_eq!(pos_to_cell(10, 5, inner, 4, 4), Some((0, 0)));
        assert_eq!(pos_to_cell(16, 8, inner, 4, 4), Some((3, 3)));
    }

    #[test]
    fn header_border_and_margin_clicks_are_ignored() {
        let inner = Rect { x: 10, y: 5, width: 8, height: 4 };
        assert_eq!(pos_to_cell(12, 2, inner, 4, 4), None);
        assert_eq!(pos_to_cell(9, 6, inner, 4, 4), None);
        assert_eq!(pos_to_cell(11, 6, inner, 4, 4), None);
        assert_eq!(pos_to_cell(18, 6, inner, 4, 4), None);
        assert_eq!(pos_to_cell(12, 9, inner, 4, 4), None);
    }

    #[test]
    fn oversized_boards_are_clipped_to_the_frame() {
        let parent = Rect { x: 0, y: 0, width: 200, height: 50 };
        let area = centered_grid_area(parent, 40000, 1);
        assert_eq!(area.width, 200);
        assert_eq!(area.height, 3);
        let area = centered_grid_area(parent, u16::MAX, u16::MAX);
        assert_eq!((area.width, area.height), (200, 50));
    }

    #[test]
    fn grid_size_saturates() {
        let board = Board::new(crate::engine::GameConfig::new(70_000, 1, 0)).expect("board");
        assert_eq!(grid_size(&board), (u16::MAX, 1));
    }

    #[test]
    fn numbers_use_their_own_colours() {
        assert_eq!(number_style(1).fg, Some(Color::Blue));
        assert_eq!(number_style(4).fg, Some(Color::Rgb(0, 0, 128)));
        assert_eq!(number_style(8).bg, Some(Color::White));
    }
}
