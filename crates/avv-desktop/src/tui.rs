use std::io;
use std::time::Duration;

use avv_core::{DriverState, LevelMeter, StopReason};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::Level;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Sparkline},
};

use crate::{log_capture, screen::MeterScreen};

trait LevelExt {
    fn color(&self) -> Color;
}

impl LevelExt for Level {
    fn color(&self) -> Color {
        match *self {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Cyan,
            Level::Debug => Color::Gray,
            Level::Trace => Color::DarkGray,
        }
    }
}

/// Run the screen in the terminal until the user quits.
pub fn run(screen: &mut MeterScreen, frame_period: Duration) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, screen, frame_period);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &mut MeterScreen,
    frame_period: Duration,
) -> io::Result<()> {
    loop {
        screen.frame();
        terminal.draw(|f| ui(f, screen))?;

        if !event::poll(frame_period)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::Char('c') => {
                log::info!("stimulus cancelled from keyboard");
                screen.cancel();
            }
            _ => {}
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, screen: &MeterScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Audio Volume View")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_meters(f, chunks[1], screen);
    render_status(f, chunks[2], screen);
    render_logs(f, chunks[3]);

    let help = Paragraph::new("C: cancel stimulus | Q/ESC/Ctrl+C: quit")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[4]);
}

fn render_meters(f: &mut Frame, area: Rect, screen: &MeterScreen) {
    let meters: Vec<_> = screen.meters().collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, meters.len().max(1) as u32); meters.len()])
        .split(area);

    for (i, meter) in meters.iter().enumerate() {
        render_meter(f, rows[i], i, meter);
    }
}

fn render_meter(f: &mut Frame, area: Rect, index: usize, meter: &LevelMeter) {
    let color = if meter.is_paused() {
        Color::DarkGray
    } else {
        Color::Green
    };
    let title = if meter.is_paused() {
        format!("Meter {} (paused)", index + 1)
    } else {
        format!("Meter {}", index + 1)
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    // newest bars on the right, as many as fit
    let width = parts[0].width as usize;
    let bars: Vec<u64> = meter.history().map(|l| (l * 100.0).round() as u64).collect();
    let visible = &bars[bars.len().saturating_sub(width)..];
    let sparkline = Sparkline::default()
        .data(visible)
        .max(100)
        .style(Style::default().fg(color));
    f.render_widget(sparkline, parts[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(meter.level().clamp(0.0, 1.0) as f64)
        .label(format!("{:>3.0}%", meter.level() * 100.0));
    f.render_widget(gauge, parts[1]);
}

fn render_status(f: &mut Frame, area: Rect, screen: &MeterScreen) {
    let driver = screen.driver();
    let (state, color) = match driver.state() {
        DriverState::Running => ("running", Color::Green),
        DriverState::Stopped(StopReason::Expired) => ("expired", Color::Yellow),
        DriverState::Stopped(StopReason::Cancelled) => ("cancelled", Color::Red),
    };
    let sample = driver
        .last_sample()
        .map(|s| format!("{s:.0}"))
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " | ticks {}/{} | {}ms left | last sample {}",
            driver.ticks(),
            driver.total_ticks(),
            driver.remaining().as_millis(),
            sample
        )),
    ]);
    let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Stimulus"));
    f.render_widget(status, area);
}

fn render_logs(f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = log_capture::recent(inner.height as usize)
        .into_iter()
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{:<5}]", line.level),
                    Style::default().fg(line.level.color()),
                ),
                Span::raw(" "),
                Span::raw(line.message.to_string()),
            ]))
        })
        .collect();

    f.render_widget(List::new(items), inner);
}
