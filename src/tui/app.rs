use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::sync::mpsc::channel;
use std::sync::Arc;

use super::ui;
use crate::config::ViewerConfig;
use crate::dispatcher::{CommandSink, Dispatcher};
use crate::error::PaneError;
use crate::listing::EntryKind;
use crate::logger::Logger;
use crate::net::{self, ChannelEvent};
use crate::pane::{FileDetail, PaneId};
use crate::origin::Origin;
use crate::protocol::PreviewEvent;
use crate::workspace::Workspace;

/// Terminal guard that ensures proper cleanup on drop
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = io::stdout().flush();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    Mkdir,
    Rename,
    Update,
    Upload,
    Page,
}

impl Prompt {
    pub fn label(self) -> &'static str {
        match self {
            Prompt::Mkdir => "New directory name",
            Prompt::Rename => "Rename to",
            Prompt::Update => "Replica factor",
            Prompt::Upload => "Upload with replica factor",
            Prompt::Page => "Go to page",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UiMode {
    Normal,
    Help,
    Input(Prompt),
    ConfirmDelete,
    Detail(FileDetail),
    Preview { preview: PreviewEvent, scroll: u16 },
}

pub struct App<S> {
    pub ws: Workspace<S>,
    pub focus: PaneId,
    cursor: [usize; 2],
    pub ui_mode: UiMode,
    pub input: String,
    pub host: String,
}

/// What a cursor row points at in the combined dirs-then-files list.
pub fn row_target(dirs: usize, files: usize, row: usize) -> Option<(EntryKind, usize)> {
    if row < dirs {
        Some((EntryKind::Directory, row))
    } else if row < dirs + files {
        Some((EntryKind::File, row - dirs))
    } else {
        None
    }
}

fn slot(id: PaneId) -> usize {
    match id {
        PaneId::Local => 0,
        PaneId::Remote => 1,
    }
}

impl<S: CommandSink> App<S> {
    pub fn new(ws: Workspace<S>, host: impl Into<String>) -> Self {
        Self {
            ws,
            focus: PaneId::Local,
            cursor: [0, 0],
            ui_mode: UiMode::Normal,
            input: String::new(),
            host: host.into(),
        }
    }

    pub fn cursor(&self, id: PaneId) -> usize {
        self.cursor[slot(id)]
    }

    fn rows(&self, id: PaneId) -> usize {
        self.ws.pane(id).listing().len()
    }

    fn current(&self) -> Option<(EntryKind, usize)> {
        let listing = self.ws.pane(self.focus).listing();
        row_target(listing.dirs().len(), listing.files().len(), self.cursor(self.focus))
    }

    fn clamp_cursors(&mut self) {
        for id in [PaneId::Local, PaneId::Remote] {
            let rows = self.rows(id);
            let c = &mut self.cursor[slot(id)];
            *c = (*c).min(rows.saturating_sub(1));
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let rows = self.rows(self.focus);
        let c = &mut self.cursor[slot(self.focus)];
        *c = c.saturating_add_signed(delta).min(rows.saturating_sub(1));
    }

    pub fn on_channel(&mut self, ev: ChannelEvent) {
        match ev {
            ChannelEvent::Opened { pane } => self.ws.on_open(pane),
            ChannelEvent::Frame { pane, text } => {
                let before = self.ws.pane(pane).path().clone();
                self.ws.handle_inbound(pane, &text);
                if self.ws.pane(pane).path() != &before {
                    self.cursor[slot(pane)] = 0;
                }
            }
            ChannelEvent::Closed { pane, .. } => self.ws.on_closed(pane),
        }
        self.clamp_cursors();
        self.show_pending_preview();
    }

    /// A received preview waits in its pane until no prompt or popup is open.
    fn show_pending_preview(&mut self) {
        if !matches!(self.ui_mode, UiMode::Normal) {
            return;
        }
        for id in [self.focus, self.focus.other()] {
            if let Some(preview) = self.ws.pane_mut(id).take_preview() {
                self.ui_mode = UiMode::Preview { preview, scroll: 0 };
                return;
            }
        }
    }

    fn report(&mut self, result: Result<(), PaneError>) {
        self.ws.report(result);
    }

    fn open_prompt(&mut self, prompt: Prompt, prefill: String) {
        self.input = prefill;
        self.ui_mode = UiMode::Input(prompt);
    }

    /// Handle one key press; returns true when the viewer should exit.
    pub fn handle_key(&mut self, k: KeyEvent) -> bool {
        if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        let quit = match std::mem::replace(&mut self.ui_mode, UiMode::Normal) {
            UiMode::Input(prompt) => {
                self.input_key(prompt, k.code);
                false
            }
            UiMode::ConfirmDelete => {
                if matches!(k.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    let res = self.ws.delete(self.focus);
                    self.report(res);
                }
                false
            }
            mode @ (UiMode::Help | UiMode::Detail(_)) => {
                if !matches!(k.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::F(1)) {
                    self.ui_mode = mode;
                }
                false
            }
            UiMode::Preview { preview, scroll } => {
                match k.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.ui_mode = UiMode::Preview { preview, scroll: scroll.saturating_sub(1) };
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.ui_mode = UiMode::Preview { preview, scroll: scroll.saturating_add(1) };
                    }
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {}
                    _ => self.ui_mode = UiMode::Preview { preview, scroll },
                }
                false
            }
            UiMode::Normal => self.normal_key(k),
        };
        self.show_pending_preview();
        quit
    }

    // `ui_mode` is already Normal here; stay in the prompt unless it closes.
    fn input_key(&mut self, prompt: Prompt, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                self.submit(prompt, &text);
                return;
            }
            KeyCode::Esc => {
                self.input.clear();
                return;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        self.ui_mode = UiMode::Input(prompt);
    }

    fn submit(&mut self, prompt: Prompt, text: &str) {
        let id = self.focus;
        let res = match prompt {
            Prompt::Mkdir => self.ws.pane_mut(id).mkdir(text),
            Prompt::Rename => self.ws.pane_mut(id).rename(text),
            Prompt::Update => self.ws.update(id, Some(text)),
            Prompt::Upload => self.ws.transfer(id, Some(text)),
            Prompt::Page => match text.trim().parse::<u32>() {
                Ok(n) => self.ws.pane_mut(id).goto_page(n),
                Err(_) => Err(PaneError::InvalidInput(format!("not a page number: {:?}", text))),
            },
        };
        self.report(res);
    }

    fn normal_key(&mut self, k: KeyEvent) -> bool {
        let id = self.focus;
        let avail = self.ws.pane(id).availability();
        match k.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab | KeyCode::BackTab => self.focus = id.other(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::Char(' ') => {
                if let Some((kind, index)) = self.current() {
                    let res = self.ws.pane_mut(id).toggle(kind, index).map(|_| ());
                    self.report(res);
                }
            }
            KeyCode::Enter => match self.current() {
                Some((EntryKind::Directory, i)) => {
                    let res = self.ws.pane_mut(id).enter(i);
                    self.report(res);
                }
                Some((EntryKind::File, i)) => self.show_detail(i),
                None => {}
            },
            KeyCode::Char('i') => {
                if let Some((EntryKind::File, i)) = self.current() {
                    self.show_detail(i);
                }
            }
            KeyCode::Backspace => {
                let res = self.ws.pane_mut(id).go_parent();
                self.report(res);
            }
            KeyCode::Char('~') => {
                let res = self.ws.pane_mut(id).go_home();
                self.report(res);
            }
            KeyCode::Char('r') | KeyCode::F(5) => {
                let res = self.ws.pane_mut(id).refresh();
                self.report(res);
            }
            KeyCode::Char('[') => {
                let res = self.ws.pane_mut(id).previous_page();
                self.report(res);
            }
            KeyCode::Char(']') => {
                let res = self.ws.pane_mut(id).next_page();
                self.report(res);
            }
            KeyCode::Char('g') => self.open_prompt(Prompt::Page, String::new()),
            KeyCode::Char('n') if avail.create => self.open_prompt(Prompt::Mkdir, String::new()),
            KeyCode::F(2) if avail.rename => {
                let name = self.ws.pane(id).rename_candidate().unwrap_or_default().to_string();
                self.open_prompt(Prompt::Rename, name);
            }
            KeyCode::Char('d') | KeyCode::Delete if avail.delete => self.ui_mode = UiMode::ConfirmDelete,
            KeyCode::Char('x') => {
                let res = self.ws.cut(id);
                self.report(res);
            }
            KeyCode::Char('c') => {
                let res = self.ws.copy(id);
                self.report(res);
            }
            KeyCode::Char('v') => {
                let res = self.ws.paste(id);
                self.report(res);
            }
            KeyCode::Char('t') => {
                if id == PaneId::Local && avail.transfer {
                    let prefill = self.ws.default_replica().to_string();
                    self.open_prompt(Prompt::Upload, prefill);
                } else {
                    let res = self.ws.transfer(id, None);
                    self.report(res);
                }
            }
            KeyCode::Char('u') if avail.update => {
                let prefill = self.ws.default_replica().to_string();
                self.open_prompt(Prompt::Update, prefill);
            }
            KeyCode::Char('p') => {
                let res = self.ws.preview(id);
                self.report(res);
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.ui_mode = UiMode::Help,
            _ => {}
        }
        false
    }

    fn show_detail(&mut self, file_index: usize) {
        match self.ws.pane(self.focus).detail(file_index) {
            Ok(d) => self.ui_mode = UiMode::Detail(d),
            Err(e) => self.report(Err(e)),
        }
    }
}

pub fn run(cfg: ViewerConfig, logger: Arc<dyn Logger>) -> Result<()> {
    let origin = Origin::parse(&cfg.origin)?;

    // Install panic hook to restore terminal on panic
    let original_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = io::stdout().flush();
        original_panic(info);
    }));

    let _guard = TerminalGuard;
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = channel();
    let dispatcher = |id: PaneId| {
        let sink = net::open_channel(id, origin.channel_url(id), tx.clone(), logger.clone());
        Dispatcher::new(id, sink, logger.clone())
    };
    let ws = Workspace::new(dispatcher(PaneId::Local), dispatcher(PaneId::Remote), &cfg);
    let mut app = App::new(ws, origin.host());
    let res = app.ws.begin_connect();
    app.report(res);

    loop {
        while let Ok(ev) = rx.try_recv() {
            app.on_channel(ev);
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press && app.handle_key(k) {
                    break;
                }
            }
        }
    }

    terminal.show_cursor()?;
    Ok(())
}
