use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use infiniscroll_core::Region;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::host::{CELL_UNITS, ITEM_COLS, PreviewHost, VIEWPORT_COLS};

const IDLE_POLL: Duration = Duration::from_millis(100);
const ITEM_ROWS: u16 = 3;
/// Layout units per arrow key or wheel notch.
const NATIVE_STEP: f64 = 24.0;

fn region_color(region: Region) -> Color {
    match region {
        Region::Leading => Color::Blue,
        Region::Original => Color::Green,
        Region::Trailing => Color::Magenta,
    }
}

/// The bordered phone viewport; its inner area holds the track.
fn viewport_area(area: Rect) -> Rect {
    Rect::new(
        0,
        1,
        (VIEWPORT_COLS + 2).min(area.width),
        (ITEM_ROWS + 2).min(area.height.saturating_sub(1)),
    )
}

fn column_to_x(column: u16, inner: Rect) -> f64 {
    (f64::from(column) - f64::from(inner.x)) * CELL_UNITS
}

fn draw(frame: &mut Frame, host: &PreviewHost) {
    let area = frame.area();

    let header_area = Rect::new(0, 0, area.width, 1);
    let header = Block::default()
        .title(" infiniscroll | drag with mouse | ←→ scroll | w desktop | q quit ")
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, header_area);

    let outer = viewport_area(area);
    let title = if host.is_desktop() { " desktop " } else { " phone " };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(outer);
    frame.render_widget(block, outer);

    let buf = frame.buffer_mut();
    for item in host.visible_items() {
        let color = region_color(item.region);
        let label = format!("{:^width$}", item.label, width = usize::from(ITEM_COLS));
        for (i, ch) in label.chars().enumerate() {
            let col = item.col + i as i32;
            if col < 0 || col >= i32::from(inner.width) {
                continue;
            }
            let x = inner.x + col as u16;
            for row in 0..inner.height {
                let y = inner.y + row;
                let glyph = if row == inner.height / 2 { ch } else { ' ' };
                buf[(x, y)].set_char(glyph).set_fg(Color::Black).set_bg(color);
            }
        }
    }

    let status_y = outer.y + outer.height;
    if status_y < area.height {
        let status = Paragraph::new(host.status()).style(Style::default().fg(Color::Gray));
        frame.render_widget(status, Rect::new(0, status_y, area.width, 1));
    }
}

pub fn run_tui(host: &mut PreviewHost) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let started = Instant::now();
    let mut dragging = false;

    loop {
        host.advance(started.elapsed());
        terminal.draw(|frame| draw(frame, host))?;

        let size = terminal.size()?;
        let inner = Block::default()
            .borders(Borders::ALL)
            .inner(viewport_area(Rect::new(0, 0, size.width, size.height)));
        let timeout = match host.next_deadline() {
            Some(due) if host.is_busy() => due.saturating_sub(started.elapsed()).min(IDLE_POLL),
            _ => IDLE_POLL,
        };

        if event::poll(timeout)? {
            host.advance(started.elapsed());
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('w') => host.toggle_desktop(),
                    KeyCode::Left => host.native_scroll(-NATIVE_STEP),
                    KeyCode::Right => host.native_scroll(NATIVE_STEP),
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left)
                        if (inner.y..inner.y + inner.height).contains(&mouse.row) =>
                    {
                        dragging = true;
                        host.pointer_down(column_to_x(mouse.column, inner));
                    }
                    MouseEventKind::Drag(MouseButton::Left) if dragging => {
                        host.pointer_move(column_to_x(mouse.column, inner));
                    }
                    MouseEventKind::Up(MouseButton::Left) if dragging => {
                        dragging = false;
                        host.pointer_up();
                    }
                    MouseEventKind::ScrollLeft | MouseEventKind::ScrollUp => {
                        host.native_scroll(-NATIVE_STEP);
                    }
                    MouseEventKind::ScrollRight | MouseEventKind::ScrollDown => {
                        host.native_scroll(NATIVE_STEP);
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
