use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::engine::board::{BoardEvent, CategoryBoard, FocusTarget, Notice, NoticeLevel};
use crate::engine::session::{EditSlot, TempId};
use crate::engine::view::{RowItem, ViewRow};
use crate::io::backend::CategoryBackend;
use crate::io::logging;
use crate::io::store_io::JsonStore;
use crate::io::watcher::StoreWatcher;
use crate::io::workspace_io;
use crate::model::category::CategoryId;
use crate::model::config::UiConfig;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into a draft row or the edit slot
    Edit,
    /// A drag gesture is in progress; cursor movement sets the drop target
    Move,
    /// The delete dialog is open
    Confirm,
}

/// The row whose text the edit buffer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Draft(TempId),
    Category(CategoryId),
}

/// Main application state
pub struct App {
    pub board: CategoryBoard<Box<dyn CategoryBackend>>,
    pub store_name: String,
    /// arbor/ directory for .state.json (None when not backed by a workspace)
    pub arbor_dir: Option<PathBuf>,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub show_key_hints: bool,
    /// Index into the visible rows
    pub cursor: usize,
    /// First visible row
    pub scroll_offset: usize,
    pub edit_target: Option<EditTarget>,
    pub edit_buffer: String,
    /// Byte offset into `edit_buffer`
    pub edit_cursor: usize,
    /// Last notice, shown in the status row until the next key press
    pub status: Option<Notice>,
}

impl App {
    pub fn new(
        board: CategoryBoard<Box<dyn CategoryBackend>>,
        store_name: impl Into<String>,
        ui: &UiConfig,
    ) -> Self {
        App {
            board,
            store_name: store_name.into(),
            arbor_dir: None,
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::from_config(ui),
            show_key_hints: ui.show_key_hints,
            cursor: 0,
            scroll_offset: 0,
            edit_target: None,
            edit_buffer: String::new(),
            edit_cursor: 0,
            status: None,
        }
    }

    pub fn rows(&self) -> Vec<ViewRow> {
        self.board.visible_rows()
    }

    /// Row under the cursor, clamping the cursor into range
    pub fn cursor_row(&mut self) -> Option<ViewRow> {
        let rows = self.rows();
        self.clamp_cursor(rows.len());
        rows.into_iter().nth(self.cursor)
    }

    pub fn cursor_category(&mut self) -> Option<CategoryId> {
        self.cursor_row().and_then(|r| r.category_id())
    }

    pub fn clamp_cursor(&mut self, row_count: usize) {
        self.cursor = self.cursor.min(row_count.saturating_sub(1));
    }

    /// Move the cursor onto the row showing `id`, if it is visible.
    pub fn select_category(&mut self, id: CategoryId) -> bool {
        match self.rows().iter().position(|r| r.category_id() == Some(id)) {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    fn select_draft(&mut self, temp_id: TempId) -> bool {
        match self.rows().iter().position(|r| r.temp_id() == Some(temp_id)) {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    /// Apply queued board events: focus requests move the cursor and open
    /// the editor, notices go to the status row.
    pub fn process_events(&mut self) {
        for event in self.board.drain_events() {
            match event {
                BoardEvent::FocusRequested(FocusTarget::Draft(temp_id)) => {
                    if self.select_draft(temp_id) {
                        self.begin_edit(EditTarget::Draft(temp_id));
                    }
                }
                BoardEvent::FocusRequested(FocusTarget::Category(id)) => {
                    if self.select_category(id) {
                        self.begin_edit(EditTarget::Category(id));
                    }
                }
                BoardEvent::Notice(notice) => self.status = Some(notice),
            }
        }
    }

    /// Load the edit buffer from the session and switch to Edit mode.
    pub fn begin_edit(&mut self, target: EditTarget) {
        let text = match target {
            EditTarget::Draft(temp_id) => match self.board.session().draft(temp_id) {
                Some(d) => d.name.clone(),
                None => return,
            },
            EditTarget::Category(id) => match self.board.session().edit_slot() {
                EditSlot::Editing {
                    id: edit_id,
                    draft_name,
                } if *edit_id == id => draft_name.clone(),
                _ => return,
            },
        };
        self.edit_cursor = text.len();
        self.edit_buffer = text;
        self.edit_target = Some(target);
        self.mode = Mode::Edit;
    }

    /// Leave Edit mode without touching the session.
    pub fn end_edit(&mut self) {
        self.edit_target = None;
        self.edit_buffer.clear();
        self.edit_cursor = 0;
        self.mode = Mode::Navigate;
    }

    pub fn set_status(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.status = Some(Notice {
            level,
            message: message.into(),
        });
    }

    /// Refetch from the backend, reporting failures in the status row.
    pub fn refetch(&mut self) {
        if let Err(e) = self.board.refetch() {
            log::error!("refetch failed: {}", e);
            self.set_status(NoticeLevel::Error, format!("reload failed: {}", e));
        }
        if let Some(EditTarget::Draft(t)) = self.edit_target
            && self.board.session().draft(t).is_none()
        {
            self.end_edit();
        }
        if let Some(EditTarget::Category(id)) = self.edit_target
            && !self.board.session().is_editing(id)
        {
            self.end_edit();
        }
        let count = self.rows().len();
        self.clamp_cursor(count);
    }
}

/// Restore expanded ids and cursor from .state.json
pub fn restore_ui_state(app: &mut App) {
    use crate::io::state::read_ui_state;

    let ui_state = match app.arbor_dir.as_deref().and_then(read_ui_state) {
        Some(s) => s,
        None => return,
    };
    let known: Vec<CategoryId> = ui_state
        .expanded
        .into_iter()
        .filter(|id| app.board.tree().contains(*id))
        .collect();
    app.board.tree_mut().set_expanded(known);
    app.scroll_offset = ui_state.scroll_offset;
    if let Some(id) = ui_state.cursor {
        app.select_category(id);
    }
}

/// Save expanded ids and cursor to .state.json
pub fn save_ui_state(app: &mut App) {
    use crate::io::state::{UiState, write_ui_state};

    let Some(arbor_dir) = app.arbor_dir.clone() else {
        return;
    };
    let mut expanded: Vec<CategoryId> = app.board.tree().expanded_ids().iter().copied().collect();
    expanded.sort();
    let ui_state = UiState {
        cursor: app.cursor_category(),
        expanded,
        scroll_offset: app.scroll_offset,
    };
    if let Err(e) = write_ui_state(&arbor_dir, &ui_state) {
        log::warn!("could not save UI state: {}", e);
    }
}

/// Run the TUI application
pub fn run(workspace_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let start = match workspace_dir {
        Some(dir) => std::fs::canonicalize(dir)?,
        None => std::env::current_dir()?,
    };
    let workspace = workspace_io::open_workspace(&start)?;
    // The terminal belongs to the TUI; a broken logger only loses the log file.
    let _ = logging::init_logging(&workspace);

    let data_path = workspace.data_path();
    let store: Box<dyn CategoryBackend> = Box::new(JsonStore::open(&data_path));
    let board = CategoryBoard::load(store)?;

    let store_name = workspace.config.store.name.clone();
    let mut app = App::new(board, &store_name, &workspace.config.ui);
    app.arbor_dir = Some(workspace.arbor_dir.clone());
    restore_ui_state(&mut app);

    let watcher = start_watcher(&data_path);

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

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    save_ui_state(&mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_watcher(data_path: &Path) -> Option<StoreWatcher> {
    match StoreWatcher::start(data_path) {
        Ok(w) => Some(w),
        Err(e) => {
            log::warn!("file watcher unavailable: {}", e);
            None
        }
    }
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced state save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                save_ui_state(app);
                save_counter = 0;
            }
        }

        if let Some(w) = watcher
            && w.changed()
        {
            log::debug!("category store changed on disk");
            app.refetch();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Whether the row is the draft or category the editor is attached to
pub fn is_edit_row(app: &App, row: &ViewRow) -> bool {
    match (&row.item, app.edit_target) {
        (RowItem::Draft { temp_id, .. }, Some(EditTarget::Draft(t))) => *temp_id == t,
        (RowItem::Category { id, .. }, Some(EditTarget::Category(c))) => *id == c,
        _ => false,
    }
}
