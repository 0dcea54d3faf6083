//! Spectator console for the Hive.
//!
//! An interactive TUI that tails the live execution stream, shows the
//! polled leaderboard, and opens per-agent history views. Spectators
//! are read-only: the input line takes slash commands, never writes.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use hive_protocol::{LeaderboardEntry, Level, LogEntry};
use hive_stream::{SessionState, SharedFeed, StreamError, StreamSession};

use crate::api::HiveApi;
use crate::config::ConsoleConfig;
use crate::poller::{spawn_leaderboard_poller, SharedLeaderboard};

/// Which main panel is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ActiveView {
    Feed,
    Profile,
}

/// A loaded per-agent history view.
#[derive(Debug, Clone)]
struct ProfileView {
    agent_id: String,
    logs: Vec<LogEntry>,
    total_forks: u64,
    latest_hashrate: String,
}

/// Single-line editable input with a char-addressed cursor.
///
/// The cursor counts chars, not bytes, so multibyte input never lands
/// an edit on a non-boundary index.
#[derive(Debug, Default)]
struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn insert(&mut self, c: char) {
        let i = self.byte_index();
        self.text.insert(i, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let i = self.byte_index();
            self.text.remove(i);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let i = self.byte_index();
            self.text.remove(i);
        }
    }

    fn left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    fn right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Replace the contents, cursor at the end.
    fn set(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Snapshot of shared state for one render pass.
struct SpectatorSnapshot {
    connected: bool,
    session: SessionState,
    malformed_lines: u64,
    entries: Vec<LogEntry>,
    leaders: Vec<LeaderboardEntry>,
}

/// The spectator console TUI state.
struct SpectatorConsole {
    api: HiveApi,
    base_url: String,
    feed_capacity: usize,
    shutdown_tx: watch::Sender<bool>,
    shared: SharedFeed,
    session_task: JoinHandle<Result<(), StreamError>>,
    leaderboard: SharedLeaderboard,
    view: ActiveView,
    profile: Option<ProfileView>,
    /// The editable input field.
    input: InputLine,
    /// Command history for up/down arrow navigation.
    history: Vec<String>,
    /// Current position in history (None = current input).
    history_pos: Option<usize>,
    /// Messages displayed in the console output area.
    console_messages: Vec<(chrono::DateTime<chrono::Utc>, String, Color)>,
    /// Last observed session state, to announce transitions once.
    last_session_state: SessionState,
}

/// Start one stream session and hand back its teardown sender, shared
/// feed, and task handle.
fn start_session(
    base_url: &str,
    feed_capacity: usize,
) -> (watch::Sender<bool>, SharedFeed, JoinHandle<Result<(), StreamError>>) {
    let (tx, rx) = watch::channel(false);
    let session = StreamSession::new(base_url, feed_capacity, rx);
    let shared = session.shared();
    let task = tokio::spawn(session.run());
    (tx, shared, task)
}

impl SpectatorConsole {
    fn new(config: &ConsoleConfig, leaderboard: SharedLeaderboard) -> Self {
        let (shutdown_tx, shared, session_task) =
            start_session(&config.base_url, config.feed_capacity);

        let mut console_messages = Vec::new();
        console_messages.push((
            chrono::Utc::now(),
            "Hive Spectator Console ready. Spectator mode is read-only.".to_string(),
            Color::Cyan,
        ));
        console_messages.push((
            chrono::Utc::now(),
            "Commands: /help, /agent <id>, /feed, /leaderboard, /reconnect, /quit".to_string(),
            Color::DarkGray,
        ));

        Self {
            api: HiveApi::new(&config.base_url),
            base_url: config.base_url.clone(),
            feed_capacity: config.feed_capacity,
            shutdown_tx,
            shared,
            session_task,
            leaderboard,
            view: ActiveView::Feed,
            profile: None,
            input: InputLine::default(),
            history: Vec::new(),
            history_pos: None,
            console_messages,
            last_session_state: SessionState::Idle,
        }
    }

    /// Take a snapshot of feed and leaderboard state for rendering.
    async fn snapshot(&self) -> SpectatorSnapshot {
        let feed_state = self.shared.read().await;
        let leaders = self.leaderboard.read().await.clone();
        SpectatorSnapshot {
            connected: feed_state.connected,
            session: feed_state.session,
            malformed_lines: feed_state.malformed_lines,
            entries: feed_state.feed.entries().cloned().collect(),
            leaders,
        }
    }

    /// Announce terminal session transitions once in the console area.
    fn note_session_transition(&mut self, current: SessionState) {
        if current == self.last_session_state {
            return;
        }
        match current {
            SessionState::Closed if self.last_session_state == SessionState::Streaming => {
                self.add_message("Stream closed by the producer.", Color::Yellow);
            }
            SessionState::Failed => {
                self.add_message(
                    "Stream lost. /reconnect starts a fresh session.",
                    Color::Red,
                );
            }
            _ => {}
        }
        self.last_session_state = current;
    }

    /// Process a line of operator input.
    async fn process_input(&mut self) {
        let input = self.input.text.trim().to_string();
        if input.is_empty() {
            return;
        }

        self.history.push(input.clone());
        self.history_pos = None;

        if input.starts_with('/') {
            self.process_command(&input).await;
        } else {
            self.add_message(
                "Spectator mode is read-only; uploads require an agent key. Type /help for commands.",
                Color::Yellow,
            );
        }

        self.input.clear();
    }

    /// Process a slash command.
    async fn process_command(&mut self, cmd: &str) {
        let parts: Vec<&str> = cmd.splitn(2, ' ').collect();
        let command = parts[0];
        let args = parts.get(1).copied().unwrap_or("").trim();

        match command {
            "/help" => {
                self.add_message("Available commands:", Color::Cyan);
                self.add_message("  /agent <id>  - Open an agent's history view", Color::White);
                self.add_message("  /feed        - Return to the live feed", Color::White);
                self.add_message("  /leaderboard - Print the current standings", Color::White);
                self.add_message("  /reconnect   - Tear down the session and start a fresh one", Color::White);
                self.add_message("  /help        - Show this help message", Color::White);
                self.add_message("  /quit        - Exit the spectator console", Color::White);
            }
            "/agent" => {
                if args.is_empty() {
                    self.add_message("Usage: /agent <agent_id>", Color::Yellow);
                } else {
                    self.open_profile(args).await;
                }
            }
            "/feed" => {
                self.view = ActiveView::Feed;
            }
            "/leaderboard" => {
                let leaders = self.leaderboard.read().await.clone();
                if leaders.is_empty() {
                    self.add_message("No standings yet.", Color::Yellow);
                } else {
                    self.add_message(
                        &format!("Top strategies ({}):", leaders.len()),
                        Color::Cyan,
                    );
                    for (rank, row) in leaders.iter().enumerate() {
                        self.add_message(
                            &format!(
                                "  #{} {} by {} - {} forks @ {}",
                                rank + 1,
                                row.strategy_name,
                                row.agent_id,
                                row.forks,
                                row.hashrate
                            ),
                            Color::White,
                        );
                    }
                }
            }
            "/reconnect" => {
                self.reconnect().await;
            }
            "/quit" | "/exit" | "/q" => {
                // Handled in the event loop.
            }
            _ => {
                self.add_message(
                    &format!("Unknown command: {}. Type /help for available commands.", command),
                    Color::Red,
                );
            }
        }
    }

    /// Fetch an agent's history and switch to the profile view.
    async fn open_profile(&mut self, agent_id: &str) {
        match self.api.fetch_agent_logs(agent_id).await {
            Ok(logs) => {
                let (total_forks, latest_hashrate) = profile_totals(&logs);
                self.add_message(
                    &format!("Loaded {} entries for {}", logs.len(), agent_id),
                    Color::Green,
                );
                self.profile = Some(ProfileView {
                    agent_id: agent_id.to_string(),
                    logs,
                    total_forks,
                    latest_hashrate,
                });
                self.view = ActiveView::Profile;
            }
            Err(e) => {
                self.add_message(&format!("History fetch failed: {e:#}"), Color::Red);
            }
        }
    }

    /// Tear down the current session and start a fresh one.
    ///
    /// The old session must stop mutating before the new one begins,
    /// so the old task is awaited between teardown and restart. The
    /// feed is recreated empty by the new session.
    async fn reconnect(&mut self) {
        let _ = self.shutdown_tx.send(true);
        let _ = (&mut self.session_task).await;

        let (shutdown_tx, shared, session_task) =
            start_session(&self.base_url, self.feed_capacity);
        self.shutdown_tx = shutdown_tx;
        self.shared = shared;
        self.session_task = session_task;
        self.last_session_state = SessionState::Idle;
        self.add_message("Reconnecting with a fresh session...", Color::Cyan);
    }

    /// Tear down the session on exit.
    async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if tokio::time::timeout(Duration::from_secs(2), &mut self.session_task)
            .await
            .is_err()
        {
            self.session_task.abort();
        }
    }

    fn add_message(&mut self, msg: &str, color: Color) {
        self.console_messages.push((chrono::Utc::now(), msg.to_string(), color));
        // Cap at 500 messages.
        if self.console_messages.len() > 500 {
            self.console_messages.remove(0);
        }
    }

    /// Render the full console layout.
    fn render(&self, frame: &mut Frame, snapshot: &SpectatorSnapshot) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Main area
                Constraint::Length(5), // Input area
            ])
            .split(frame.area());

        self.render_status_bar(frame, outer[0], snapshot);
        self.render_main_area(frame, outer[1], snapshot);
        self.render_input(frame, outer[2]);
    }

    /// Render the top status bar.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect, snap: &SpectatorSnapshot) {
        let block = Block::default()
            .title(" Hive Spectator Console ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let (conn_label, conn_color) = if snap.connected {
            ("CONNECTED", Color::Green)
        } else {
            ("DISCONNECTED", Color::Red)
        };

        let status_line = Line::from(vec![
            Span::styled("  Hive: ", Style::default().fg(Color::Gray)),
            Span::styled(&self.base_url, Style::default().fg(Color::White)),
            Span::styled("  |  Link: ", Style::default().fg(Color::Gray)),
            Span::styled(conn_label, Style::default().fg(conn_color).add_modifier(Modifier::BOLD)),
            Span::styled("  |  Session: ", Style::default().fg(Color::Gray)),
            Span::styled(format_session_state(snap.session), Style::default().fg(session_color(snap.session))),
            Span::styled("  |  Feed: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{}", snap.entries.len(), self.feed_capacity),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled("  |  Dropped: ", Style::default().fg(Color::Gray)),
            Span::styled(snap.malformed_lines.to_string(), Style::default().fg(Color::Yellow)),
        ]);

        let paragraph = Paragraph::new(status_line).block(block);
        frame.render_widget(paragraph, area);
    }

    /// Render the main area: the active view above the console output.
    fn render_main_area(&self, frame: &mut Frame, area: Rect, snap: &SpectatorSnapshot) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // Active view
                Constraint::Length(7), // Console output
            ])
            .split(area);

        match self.view {
            ActiveView::Feed => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Percentage(68), // Live feed
                        Constraint::Percentage(32), // Leaderboard
                    ])
                    .split(rows[0]);
                self.render_feed(frame, columns[0], snap);
                self.render_leaderboard(frame, columns[1], snap);
            }
            ActiveView::Profile => {
                self.render_profile(frame, rows[0]);
            }
        }

        self.render_console_output(frame, rows[1]);
    }

    /// Render the live feed table, newest entries at the bottom.
    fn render_feed(&self, frame: &mut Frame, area: Rect, snap: &SpectatorSnapshot) {
        let block = Block::default()
            .title(" Live Execution Stream ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if snap.connected {
                Color::Green
            } else {
                Color::Red
            }));

        if snap.entries.is_empty() {
            let hint = if snap.connected {
                "  Waiting for agent activity..."
            } else {
                "  Not connected. /reconnect to retry."
            };
            let text = Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(text, area);
            return;
        }

        // Tail the view: show the most recent entries that fit.
        let visible_rows = area.height.saturating_sub(3) as usize;
        let start = snap.entries.len().saturating_sub(visible_rows);

        let rows: Vec<Row> = snap.entries[start..]
            .iter()
            .map(|entry| {
                let mut activity = match entry.strategy_name.as_deref() {
                    Some(strategy) => format!("{} {}", strategy, entry.message),
                    None => entry.message.clone(),
                };
                if let Some(preview) = payload_preview(&entry.payload) {
                    activity.push(' ');
                    activity.push_str(&preview);
                }
                Row::new(vec![
                    Cell::from(Span::styled(
                        format!("  {}", clock_time(&entry.timestamp)),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Cell::from(Span::styled(
                        format!("[{}]", entry.level),
                        level_style(&entry.level),
                    )),
                    Cell::from(Span::styled(
                        truncate(&entry.agent_id, 16),
                        Style::default().fg(Color::Magenta),
                    )),
                    Cell::from(Span::styled(
                        truncate(&activity, 60),
                        Style::default().fg(Color::Gray),
                    )),
                    Cell::from(Span::styled(
                        format!("{}", entry.forks.unwrap_or(0)),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(16),
                Constraint::Min(24),
                Constraint::Length(6),
            ],
        )
        .block(block)
        .header(
            Row::new(vec!["  Time", "Level", "Agent", "Activity", "Forks"])
                .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
        );

        frame.render_widget(table, area);
    }

    /// Render the polled leaderboard panel.
    fn render_leaderboard(&self, frame: &mut Frame, area: Rect, snap: &SpectatorSnapshot) {
        let block = Block::default()
            .title(" Top Strategies ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        if snap.leaders.is_empty() {
            let text = Paragraph::new(Line::from(Span::styled(
                "  Syncing with the hive...",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(text, area);
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        for (rank, row) in snap.leaders.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  #{} ", rank + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    truncate(&row.strategy_name, 22),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("     ", Style::default()),
                Span::styled(truncate(&row.agent_id, 14), Style::default().fg(Color::Magenta)),
                Span::styled(
                    format!("  {} forks  {}", row.forks, row.hashrate),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }

        let visible_height = area.height.saturating_sub(2) as usize;
        let visible: Vec<Line> = lines.into_iter().take(visible_height).collect();
        frame.render_widget(Paragraph::new(visible).block(block), area);
    }

    /// Render the per-agent profile view: stats header plus history.
    fn render_profile(&self, frame: &mut Frame, area: Rect) {
        let Some(profile) = &self.profile else {
            let block = Block::default().title(" Agent Profile ").borders(Borders::ALL);
            let text = Paragraph::new(Line::from(Span::styled(
                "  No profile loaded. /agent <id> to open one.",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(text, area);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Stats header
                Constraint::Min(4),    // History
            ])
            .split(area);

        let header = Block::default()
            .title(" Agent Profile ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));
        let header_text = vec![
            Line::from(vec![
                Span::styled("  Agent: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    &profile.agent_id,
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Total forks: ", Style::default().fg(Color::Gray)),
                Span::styled(profile.total_forks.to_string(), Style::default().fg(Color::Magenta)),
                Span::styled("  |  Hashrate: ", Style::default().fg(Color::Gray)),
                Span::styled(&profile.latest_hashrate, Style::default().fg(Color::Green)),
                Span::styled("  |  /feed to return", Style::default().fg(Color::DarkGray)),
            ]),
        ];
        frame.render_widget(Paragraph::new(header_text).block(header), rows[0]);

        let history = Block::default()
            .title(format!(" Recent Execution Logs ({}) ", profile.logs.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let visible_rows = rows[1].height.saturating_sub(3) as usize;
        let table_rows: Vec<Row> = profile
            .logs
            .iter()
            .take(visible_rows)
            .map(|entry| {
                let activity = match entry.strategy_name.as_deref() {
                    Some(strategy) => format!("{} {}", strategy, entry.message),
                    None => entry.message.clone(),
                };
                Row::new(vec![
                    Cell::from(Span::styled(
                        format!("  {}", clock_time(&entry.timestamp)),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Cell::from(Span::styled(
                        format!("[{}]", entry.level),
                        level_style(&entry.level),
                    )),
                    Cell::from(Span::styled(
                        truncate(&activity, 70),
                        Style::default().fg(Color::Gray),
                    )),
                    Cell::from(Span::styled(
                        format!("{} forks", entry.forks.unwrap_or(0)),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            table_rows,
            [
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Min(24),
                Constraint::Length(10),
            ],
        )
        .block(history)
        .header(
            Row::new(vec!["  Time", "Level", "Activity", "Forks"])
                .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(table, rows[1]);
    }

    /// Render the console output area.
    fn render_console_output(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Console Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let inner_height = area.height.saturating_sub(2) as usize;
        let start = self.console_messages.len().saturating_sub(inner_height);
        let visible = &self.console_messages[start..];

        let lines: Vec<Line> = visible
            .iter()
            .map(|(ts, msg, color)| {
                let time_str = ts.format("%H:%M:%S").to_string();
                Line::from(vec![
                    Span::styled(
                        format!("  [{}] ", time_str),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(msg.as_str(), Style::default().fg(*color)),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }

    /// Render the input area at the bottom.
    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Command Input (/help = commands, /quit = exit) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let input_display = if self.input.text.is_empty() {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Green)),
                Span::styled(
                    "Type /agent <id> or /command...",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Green)),
                Span::styled(&self.input.text, Style::default().fg(Color::White)),
            ])
        };

        let hint_line = Line::from(vec![Span::styled(
            "  Ctrl+C or /quit to exit  |  Up/Down for history  |  Enter to submit",
            Style::default().fg(Color::DarkGray),
        )]);

        let paragraph = Paragraph::new(vec![Line::from(""), input_display, hint_line]).block(block);
        frame.render_widget(paragraph, area);

        let cursor_x = area.x + 4 + self.input.cursor as u16;
        let cursor_y = area.y + 2;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    /// Handle keyboard input. Returns `true` if the console should exit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return true,
            (KeyCode::Char(c), _) => self.input.insert(c),
            (KeyCode::Backspace, _) => self.input.backspace(),
            (KeyCode::Delete, _) => self.input.delete(),
            (KeyCode::Left, _) => self.input.left(),
            (KeyCode::Right, _) => self.input.right(),
            (KeyCode::Home, _) => self.input.home(),
            (KeyCode::End, _) => self.input.end(),
            (KeyCode::Up, _) => {
                if !self.history.is_empty() {
                    let pos = match self.history_pos {
                        Some(p) if p > 0 => p - 1,
                        Some(p) => p,
                        None => self.history.len() - 1,
                    };
                    self.history_pos = Some(pos);
                    self.input.set(self.history[pos].clone());
                }
            }
            (KeyCode::Down, _) => {
                if let Some(pos) = self.history_pos {
                    if pos + 1 < self.history.len() {
                        let new_pos = pos + 1;
                        self.history_pos = Some(new_pos);
                        self.input.set(self.history[new_pos].clone());
                    } else {
                        self.history_pos = None;
                        self.input.clear();
                    }
                }
            }
            (KeyCode::Esc, _) => {
                self.view = ActiveView::Feed;
            }
            (KeyCode::Enter, _) => {
                // Handled by caller (needs async).
            }
            _ => {}
        }
        false
    }
}

/// Wall-clock portion of a producer timestamp for compact display.
pub(crate) fn clock_time(timestamp: &str) -> &str {
    match timestamp.split('T').nth(1) {
        Some(time) => time.split('.').next().unwrap_or(time),
        None => timestamp,
    }
}

/// Style for a severity tag; unrecognized tags get the default
/// treatment.
pub(crate) fn level_style(level: &Level) -> Style {
    match level {
        Level::Success => Style::default().fg(Color::Green),
        Level::Info => Style::default().fg(Color::Cyan),
        Level::Warning => Style::default().fg(Color::Yellow),
        Level::Error => Style::default().fg(Color::Red),
        Level::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Level::Other(_) => Style::default().fg(Color::DarkGray),
    }
}

/// Compact one-line preview of a display-only payload. Null and empty
/// objects render nothing.
pub(crate) fn payload_preview(payload: &serde_json::Value) -> Option<String> {
    match payload {
        serde_json::Value::Null => None,
        serde_json::Value::Object(map) if map.is_empty() => None,
        other => Some(truncate(&other.to_string(), 48)),
    }
}

/// Aggregate stats for a profile view: total forks and the most
/// recent hashrate (history arrives most recent first).
pub(crate) fn profile_totals(logs: &[LogEntry]) -> (u64, String) {
    let total_forks = logs.iter().map(|l| l.forks.unwrap_or(0)).sum();
    let latest_hashrate = logs
        .first()
        .and_then(|l| l.hashrate.clone())
        .unwrap_or_else(|| "Offline".to_string());
    (total_forks, latest_hashrate)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

fn format_session_state(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "Idle",
        SessionState::Connecting => "Connecting",
        SessionState::Streaming => "Streaming",
        SessionState::Closed => "Closed",
        SessionState::Failed => "Failed",
    }
}

fn session_color(state: SessionState) -> Color {
    match state {
        SessionState::Idle => Color::DarkGray,
        SessionState::Connecting => Color::Yellow,
        SessionState::Streaming => Color::Green,
        SessionState::Closed => Color::Yellow,
        SessionState::Failed => Color::Red,
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the spectator console event loop.
pub async fn run_spectator_console(config: &ConsoleConfig) -> anyhow::Result<()> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!(
            "Spectator console requires a terminal (TTY); use --headless otherwise."
        ));
    }

    // Set up panic hook to restore terminal.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let leaderboard: SharedLeaderboard = Default::default();
    let poller = spawn_leaderboard_poller(
        HiveApi::new(&config.base_url),
        leaderboard.clone(),
        config.leaderboard_poll_secs,
    );

    let mut terminal = setup_terminal()?;
    let mut console = SpectatorConsole::new(config, leaderboard);

    let tick_rate = Duration::from_millis(100); // ~10fps

    loop {
        let snapshot = console.snapshot().await;
        console.note_session_transition(snapshot.session);

        terminal.draw(|frame| {
            console.render(frame, &snapshot);
        })?;

        if event::poll(tick_rate)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    if key_event.code == KeyCode::Enter {
                        let trimmed = console.input.text.trim().to_string();
                        if trimmed == "/quit" || trimmed == "/exit" || trimmed == "/q" {
                            break;
                        }
                        console.process_input().await;
                    } else if console.handle_key(key_event.code, key_event.modifiers) {
                        break; // Ctrl+C
                    }
                }
            }
        }
    }

    restore_terminal(&mut terminal)?;
    poller.abort();
    console.shutdown().await;
    Ok(())
}
