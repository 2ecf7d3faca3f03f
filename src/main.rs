use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, stdout},
    time::Duration,
};

use samegame::grid::{Colour, Grid};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const CLEARED_CHAR: &str = "░░";

// ============================================================================
// Color Mapping
// ============================================================================

fn block_color(colour: Colour) -> Color {
    match colour {
        Colour::Red => Color::Red,
        Colour::Green => Color::Green,
        Colour::Blue => Color::Blue,
        Colour::Yellow => Color::Yellow,
        Colour::Grey => Color::DarkGray,
    }
}

// ============================================================================
// Cursor
// ============================================================================

struct Cursor {
    x: usize,
    y: usize,
}

impl Cursor {
    fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    fn move_by(&mut self, dx: i16, dy: i16, grid: &Grid) {
        let x = self.x as i16 + dx;
        let y = self.y as i16 + dy;
        if grid.coordinates_within_boundaries(x, y) {
            self.x = x as usize;
            self.y = y as usize;
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, grid: &Grid, cursor: &Cursor) {
    let area = frame.size();

    let grid_display_width = (grid.max_x as u16 * CELL_WIDTH) + 2;
    let grid_display_height = grid.max_y as u16 + 2;
    let info_width = 16;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let grid_row = vertical[0];

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
    ])
    .split(grid_row);

    render_grid(frame, grid, cursor, horizontal[0]);
    render_info(frame, grid, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: grid_row.y + grid_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "WASD/Arrows: Move | Space/Enter: Select | N: New Grid | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, grid: &Grid, cursor: &Cursor, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" SameGame ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Row max_y - 1 at the top of the panel, row 0 at the bottom.
    let mut lines: Vec<Line> = Vec::new();

    for y in (0..grid.max_y).rev() {
        let mut spans: Vec<Span> = Vec::new();

        for x in 0..grid.max_x {
            let colour = grid
                .block(x as i16, y as i16)
                .map(|b| b.colour())
                .unwrap_or(Colour::Grey);

            let symbol = if colour == Colour::Grey {
                CLEARED_CHAR
            } else {
                BLOCK_CHAR
            };

            let mut style = Style::default().fg(block_color(colour));
            if x == cursor.x && y == cursor.y {
                style = style.bg(Color::White);
            }

            spans.push(Span::styled(symbol, style));
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn render_info(frame: &mut Frame, grid: &Grid, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Blocks", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", grid.remaining_blocks())),
        Line::from(""),
        Line::from(Span::styled("Size", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}x{}", grid.max_x, grid.max_y)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut grid = Grid::new();
    let mut cursor = Cursor::new();

    loop {
        // Full redraw from public state every iteration; the core emits no
        // incremental diffs.
        terminal.draw(|frame| render(frame, &grid, &cursor))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('n') | KeyCode::Char('N') => {
                            grid = Grid::new();
                            cursor = Cursor::new();
                        }
                        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                            cursor.move_by(-1, 0, &grid);
                        }
                        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                            cursor.move_by(1, 0, &grid);
                        }
                        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                            cursor.move_by(0, 1, &grid);
                        }
                        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                            cursor.move_by(0, -1, &grid);
                        }
                        KeyCode::Char(' ') | KeyCode::Enter => {
                            grid.select_block(cursor.x as i16, cursor.y as i16);
                            // Drained so the queue stays bounded; the draw
                            // above already repaints the whole grid.
                            grid.take_events();
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
