//! Application state for the TUI.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use focusdeck_core::stats::{self, StatsSummary};
use focusdeck_core::{
    Completion, Config, Database, SessionType, StartOutcome, Subject, TimeRange, TimerEngine,
};
use ratatui::widgets::ListState;

/// Preset colors assigned to new subjects in rotation
const SUBJECT_PALETTE: &[&str] = &[
    "#4F46E5", "#16A34A", "#DC2626", "#F59E0B", "#0EA5E9", "#9333EA",
];

/// Current view mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Countdown timer view
    #[default]
    Timer,
    /// Statistics view
    Stats,
}

/// Main application state.
pub struct App {
    /// Database connection
    db: Database,
    /// The countdown state machine
    pub engine: TimerEngine,
    /// Current view mode
    pub view_mode: ViewMode,
    /// Subjects available for tagging work sessions
    pub subjects: Vec<Subject>,
    /// Whether the subject picker overlay is open
    pub picker_open: bool,
    /// Picker selection state
    pub picker_state: ListState,
    /// Name buffer for the add-subject input, when open
    pub subject_input: Option<String>,
    /// Stats loaded for the stats view
    pub stats: Option<StatsSummary>,
    /// Time range shown in the stats view
    pub stats_range: TimeRange,
    /// One-line status shown in the footer (last completion, errors)
    pub status: Option<String>,
    /// Whether completion notifications are shown
    notifications_enabled: bool,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl App {
    /// Create a new App, loading settings and subjects for the configured user.
    pub fn new(db: Database, config: &Config) -> Result<Self> {
        let user_id = config.user.id.clone();
        // Config timer defaults seed the settings row on first run only
        let settings = db.get_or_seed_settings(&user_id, &config.timer.to_settings())?;
        let subjects = db.list_subjects(&user_id)?;
        let notifications_enabled = settings.notifications_enabled;
        let engine = TimerEngine::new(user_id, settings);

        Ok(Self {
            db,
            engine,
            view_mode: ViewMode::default(),
            subjects,
            picker_open: false,
            picker_state: ListState::default(),
            subject_input: None,
            stats: None,
            stats_range: TimeRange::default(),
            status: None,
            notifications_enabled,
            should_quit: false,
        })
    }

    /// Advance the countdown by one second of wall-clock time.
    pub fn tick_timer(&mut self) {
        if let Some(completion) = self.engine.tick(&self.db) {
            self.on_completion(&completion);
        }
    }

    fn on_completion(&mut self, completion: &Completion) {
        if self.notifications_enabled {
            let mut message = match completion.session_type {
                SessionType::Work => match &completion.record {
                    Some(_) => "Work session complete and recorded".to_string(),
                    None => "Work session complete (not recorded)".to_string(),
                },
                other => format!("{} finished", other.display_name()),
            };
            if let Some(next) = completion.auto_started {
                message.push_str(&format!(", starting {}", next.display_name()));
            }
            self.status = Some(message);
        }

        // A freshly recorded session invalidates any loaded stats
        if completion.record.is_some() {
            self.stats = None;
        }
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.subject_input.is_some() {
            self.handle_subject_input_key(key);
            return;
        }
        if self.picker_open {
            self.handle_picker_key(key);
            return;
        }

        match self.view_mode {
            ViewMode::Timer => self.handle_timer_key(key),
            ViewMode::Stats => self.handle_stats_key(key),
        }
    }

    fn handle_timer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_running(),
            KeyCode::Char('r') => self.engine.reset(),
            KeyCode::Char('1') => self.engine.switch_type(SessionType::Work),
            KeyCode::Char('2') => self.engine.switch_type(SessionType::ShortBreak),
            KeyCode::Char('3') => self.engine.switch_type(SessionType::LongBreak),
            KeyCode::Char('p') => self.open_picker(),
            KeyCode::Char('a') => self.subject_input = Some(String::new()),
            KeyCode::Char('s') => self.open_stats(),
            _ => {}
        }
    }

    fn handle_subject_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.subject_input = None,
            KeyCode::Enter => self.commit_subject_input(),
            KeyCode::Backspace => {
                if let Some(input) = &mut self.subject_input {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = &mut self.subject_input {
                    input.push(c);
                }
            }
            _ => {}
        }
    }

    fn commit_subject_input(&mut self) {
        let Some(name) = self.subject_input.take() else {
            return;
        };

        // Colors cycle through a preset palette
        let color = SUBJECT_PALETTE[self.subjects.len() % SUBJECT_PALETTE.len()];
        match self
            .db
            .insert_subject(self.engine.user_id(), name.trim(), color, None)
        {
            Ok(subject) => {
                self.status = Some(format!("Added subject {}", subject.name));
                self.subjects.push(subject);
            }
            Err(e) => self.status = Some(format!("Could not add subject: {}", e)),
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('s') => self.view_mode = ViewMode::Timer,
            KeyCode::Tab | KeyCode::Char('t') => {
                self.stats_range = self.stats_range.next();
                self.load_stats();
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.picker_open = false,
            KeyCode::Up | KeyCode::Char('k') => self.picker_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.picker_next(),
            KeyCode::Enter => self.pick_selected_subject(),
            _ => {}
        }
    }

    /// Space toggles between running and paused. Starting an untagged work
    /// session opens the subject picker instead.
    fn toggle_running(&mut self) {
        if self.engine.is_running() {
            self.engine.pause();
            return;
        }

        match self.engine.start() {
            StartOutcome::Started => self.status = None,
            StartOutcome::SubjectRequired => self.open_picker(),
            StartOutcome::AlreadyRunning => {}
        }
    }

    fn open_picker(&mut self) {
        if self.subjects.is_empty() {
            self.status = Some("No subjects yet; create one before starting a study session".into());
            return;
        }
        self.picker_open = true;
        if self.picker_state.selected().is_none() {
            self.picker_state.select(Some(0));
        }
    }

    fn picker_next(&mut self) {
        let len = self.subjects.len();
        let next = match self.picker_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.picker_state.select(Some(next));
    }

    fn picker_previous(&mut self) {
        let len = self.subjects.len();
        let prev = match self.picker_state.selected() {
            Some(0) | None => len.saturating_sub(1),
            Some(i) => i - 1,
        };
        self.picker_state.select(Some(prev));
    }

    /// Tag the engine with the highlighted subject and start the countdown.
    fn pick_selected_subject(&mut self) {
        let Some(index) = self.picker_state.selected() else {
            return;
        };
        let Some(subject) = self.subjects.get(index) else {
            return;
        };

        self.engine.select_subject(Some(subject.id.clone()));
        self.picker_open = false;
        self.engine.start();
    }

    /// The subject the engine is currently tagged with, if any.
    pub fn selected_subject(&self) -> Option<&Subject> {
        let id = self.engine.selected_subject_id()?;
        self.subjects.iter().find(|s| s.id == id)
    }

    fn open_stats(&mut self) {
        self.view_mode = ViewMode::Stats;
        if self.stats.is_none() {
            self.load_stats();
        }
    }

    fn load_stats(&mut self) {
        match stats::compute_stats(&self.db, self.engine.user_id(), self.stats_range) {
            Ok(summary) => self.stats = Some(summary),
            Err(e) => {
                tracing::warn!(error = %e, "failed to compute stats");
                self.status = Some(format!("Failed to load stats: {}", e));
            }
        }
    }
}
