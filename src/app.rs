//! Application loop
//!
//! Ties the pipeline together: drain backend events into the surface
//! store, re-measure what changed, pack, draw. Two presentation modes:
//! stacked shows every surface in arrival order with whole-surface
//! scrolling; fullscreen packs surfaces into balanced columns and lets
//! the packer evict the least-recently-updated ones when the viewport is
//! full.

use crate::config::Config;
use crate::layout::{pack, place, Candidate, PackOptions, Viewport};
use crate::measure::{measure_forest, Size};
use crate::network::BackendEvent;
use crate::render::render_forest;
use crate::store::SurfaceStore;
use crate::theme::Theme;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::{Frame, Terminal};
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct App {
    store: SurfaceStore,
    /// Off-screen measurements keyed by surface, tagged with the seq they
    /// were taken at; a seq change re-enters the surface as unmeasured.
    measurements: HashMap<String, (u64, Size)>,
    options: PackOptions,
    theme: Theme,
    fullscreen: bool,
    /// Stacked mode: index of the first visible surface.
    scroll: usize,
    connected: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            store: SurfaceStore::new(),
            measurements: HashMap::new(),
            options: PackOptions {
                min_column_width: config.layout.min_column_width,
                gap: config.layout.gap,
            },
            theme: Theme::default(),
            fullscreen: config.ui.fullscreen,
            scroll: 0,
            connected: false,
            should_quit: false,
        }
    }

    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Message(message) => self.store.apply(message),
            BackendEvent::Connected => self.connected = true,
            BackendEvent::Disconnected => self.connected = false,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('f') => self.fullscreen = !self.fullscreen,
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    pub fn handle_resize(&mut self) {
        // Wrap widths changed; every surface re-enters unmeasured.
        self.measurements.clear();
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Re-measure every surface whose forest reference changed since its
    /// last measurement. Idempotent; safe to run every frame.
    fn refresh_measurements(&mut self, viewport: Viewport) {
        let column_width = viewport.width / self.options.column_count(viewport);
        let mut fresh = HashMap::new();
        for entry in self.store.entries_in_arrival_order() {
            if entry.forest.is_empty() {
                continue;
            }
            let size = match self.measurements.get(&entry.name) {
                Some((seq, size)) if *seq == entry.seq => *size,
                _ => measure_forest(&entry.forest, column_width.max(1)),
            };
            fresh.insert(entry.name.clone(), (entry.seq, size));
        }
        // Measurements for removed or emptied surfaces drop out here.
        self.measurements = fresh;
    }

    fn candidates(&self) -> Vec<Candidate> {
        self.store
            .entries_in_arrival_order()
            .into_iter()
            .filter(|entry| !entry.forest.is_empty())
            .map(|entry| Candidate {
                name: entry.name.clone(),
                seq: entry.seq,
                measurement: self
                    .measurements
                    .get(&entry.name)
                    .and_then(|(seq, size)| (*seq == entry.seq).then_some(*size)),
            })
            .collect()
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let content = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));
        let viewport = Viewport::new(content.width, content.height);
        self.refresh_measurements(viewport);

        if self.fullscreen {
            self.draw_fullscreen(content, viewport, frame);
        } else {
            self.draw_stacked(content, frame);
        }
        self.draw_status(area, frame.buffer_mut());
    }

    fn draw_fullscreen(&self, content: Rect, viewport: Viewport, frame: &mut Frame) {
        let candidates = self.candidates();
        let visible = pack(&candidates, viewport, &self.options);
        let sized: Vec<(String, Size)> = visible
            .iter()
            .filter_map(|name| {
                self.measurements
                    .get(name)
                    .map(|(_, size)| (name.clone(), *size))
            })
            .collect();
        let buf = frame.buffer_mut();
        for (name, rect) in place(&sized, viewport, &self.options) {
            let rect = Rect::new(content.x + rect.x, content.y + rect.y, rect.width, rect.height);
            render_forest(self.store.get(&name), rect, buf, &self.theme);
        }
    }

    fn draw_stacked(&mut self, content: Rect, frame: &mut Frame) {
        let entries: Vec<_> = self
            .store
            .entries_in_arrival_order()
            .into_iter()
            .filter(|entry| !entry.forest.is_empty())
            .map(|entry| entry.name.clone())
            .collect();
        if entries.is_empty() {
            let buf = frame.buffer_mut();
            buf.set_stringn(
                content.x,
                content.y,
                "waiting for content...",
                content.width as usize,
                self.theme.fallback,
            );
            return;
        }
        self.scroll = self.scroll.min(entries.len() - 1);

        let buf = frame.buffer_mut();
        let mut y = content.y;
        for name in entries.iter().skip(self.scroll) {
            if y >= content.bottom() {
                break;
            }
            let forest = self.store.get(name);
            let size = measure_forest(forest, content.width);
            let height = size.height.min(content.bottom() - y);
            render_forest(forest, Rect::new(content.x, y, content.width, height), buf, &self.theme);
            y = y.saturating_add(height).saturating_add(self.options.gap);
        }
    }

    fn draw_status(&self, area: Rect, buf: &mut Buffer) {
        let row = area.bottom() - 1;
        let mode = if self.fullscreen { "fullscreen" } else { "stacked" };
        let link = if self.connected { "connected" } else { "offline" };
        let count = self.store.entries_in_arrival_order().len();
        let status = format!(
            " mosaic [{}] {} surface(s), {} | f mode, j/k scroll, q quit",
            mode, count, link
        );
        buf.set_stringn(
            area.x,
            row,
            &status,
            area.width as usize,
            Style::default().add_modifier(Modifier::DIM),
        );
    }
}

/// Run the TUI until the user quits.
pub async fn run(
    config: Config,
    mut events: mpsc::UnboundedReceiver<BackendEvent>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &config, &mut events);
    restore_terminal(&mut terminal)?;
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
    events: &mut mpsc::UnboundedReceiver<BackendEvent>,
) -> Result<()> {
    let mut app = App::new(config);
    let poll_timeout = Duration::from_millis(config.ui.poll_ms);

    while !app.should_quit() {
        while let Ok(backend_event) = events.try_recv() {
            app.handle_backend_event(backend_event);
        }

        while event::poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key.code);
                }
                Event::Resize(_, _) => app.handle_resize(),
                _ => {}
            }
        }

        terminal.draw(|frame| app.draw(frame))?;
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
