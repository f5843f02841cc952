use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use indexmap::IndexSet;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::carousel::Lightbox;
use crate::io as vault_io;
use crate::model::{Record, VaultConfig};
use crate::session::{Durability, Session};

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Moving through the feed
    Navigate,
    /// Tag filter panel open
    Filter,
    /// Typing a new tag for the selected post
    TagInput,
    /// Picking one of the selected post's tags to remove
    TagRemove,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub config: VaultConfig,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    /// Cached filtered view the feed renders from
    pub visible: Vec<Record>,
    /// Cursor index into `visible`
    pub cursor: usize,
    /// First visible card (scroll position, in cards)
    pub scroll: usize,
    /// Media overlay
    pub lightbox: Lightbox,
    /// Cursor in the filter panel
    pub filter_cursor: usize,
    /// Pending filter selection while the panel is open
    pub filter_selection: IndexSet<String>,
    /// Tag text being typed
    pub tag_input: String,
    /// Cursor in the tag-remove picker
    pub remove_cursor: usize,
    /// One-line notice shown in the status row
    pub status: Option<String>,
    pub show_help: bool,
}

impl App {
    pub fn new(session: Session, config: VaultConfig) -> Self {
        let visible = session.current_view();
        App {
            session,
            config,
            theme: Theme::default(),
            mode: Mode::Navigate,
            should_quit: false,
            visible,
            cursor: 0,
            scroll: 0,
            lightbox: Lightbox::new(),
            filter_cursor: 0,
            filter_selection: IndexSet::new(),
            tag_input: String::new(),
            remove_cursor: 0,
            status: None,
            show_help: false,
        }
    }

    /// Recompute the filtered view after any collection or filter change,
    /// keeping the cursor in range.
    pub fn refresh_view(&mut self) {
        self.visible = self.session.current_view();
        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
        if self.scroll > self.cursor {
            self.scroll = self.cursor;
        }
    }

    /// The post under the cursor, if any
    pub fn selected(&self) -> Option<&Record> {
        self.visible.get(self.cursor)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Status-row warning while a write has not reached the store
    pub fn pending_write(&self) -> bool {
        self.session.durability() == Durability::Pending
    }
}

/// Launch the TUI against the given data directory
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = vault_io::load_config(data_dir)?;
    // First launch: materialize the defaults so they are editable
    if !data_dir.join("vault.toml").exists() {
        vault_io::save_config(data_dir, &config)?;
    }
    let db_path = data_dir.join(&config.store.file);
    let session = Session::open(&db_path)?;
    let mut app = App::new(session, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
