//! One browsing pane and its connection state machine
//!
//! Local and remote panes are the same controller with different
//! [`Capabilities`]. The live path, listing, selection and page window are
//! only ever replaced by an `init` event; commands never mutate them
//! optimistically.

use std::fmt;

use crate::clipboard::{parse_replica, ClipMode, Clipboard, ClipboardEntry};
use crate::dispatcher::{CommandSink, Dispatcher};
use crate::error::{PaneError, ProtocolError};
use crate::listing::{Entry, EntryKind, EntryRef, Listing};
use crate::pagination::Pagination;
use crate::path::{DirPath, Segment};
use crate::protocol::{
    Command, Event, ListingEvent, OpKind, PreviewEvent, PreviewFile, LOCAL_CHANNEL_PATH,
    REMOTE_CHANNEL_PATH,
};
use crate::selection::{gate, Action, ActionAvailability, Capabilities, Selection};
use crate::status_log::StatusLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    Local,
    Remote,
}

impl PaneId {
    pub fn capabilities(self) -> Capabilities {
        match self {
            PaneId::Local => Capabilities::LOCAL,
            PaneId::Remote => Capabilities::REMOTE,
        }
    }

    pub fn channel_path(self) -> &'static str {
        match self {
            PaneId::Local => LOCAL_CHANNEL_PATH,
            PaneId::Remote => REMOTE_CHANNEL_PATH,
        }
    }

    pub fn other(self) -> PaneId {
        match self {
            PaneId::Local => PaneId::Remote,
            PaneId::Remote => PaneId::Local,
        }
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaneId::Local => "local",
            PaneId::Remote => "remote",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneState {
    Disconnected,
    Connecting,
    Browsing,
    AwaitingServerAck(OpKind),
}

/// Everything the detail view shows for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetail {
    pub name: String,
    pub file_type: String,
    pub size: String,
    pub created: String,
    pub modified: String,
    pub current_replicas: Option<u32>,
    pub desired_replicas: Option<u32>,
}

impl FileDetail {
    fn of(entry: &Entry) -> Self {
        let stamp = |t: Option<chrono::NaiveDateTime>| {
            t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default()
        };
        Self {
            name: entry.name.clone(),
            file_type: entry.file_type.clone(),
            size: entry.size.as_ref().map(|s| s.display()).unwrap_or_default(),
            created: stamp(entry.created_at),
            modified: stamp(entry.modified_at),
            current_replicas: entry.current_replicas,
            desired_replicas: entry.desired_replicas,
        }
    }
}

pub struct PaneController<S> {
    id: PaneId,
    caps: Capabilities,
    dispatcher: Dispatcher<S>,
    state: PaneState,
    connection_lost: bool,
    path: DirPath,
    home: Option<DirPath>,
    listing: Listing,
    selection: Selection,
    pagination: Pagination,
    requested_page: u32,
    paste_enabled: bool,
    paste_pending: bool,
    preview: Option<PreviewEvent>,
}

impl<S: CommandSink> PaneController<S> {
    pub fn new(dispatcher: Dispatcher<S>, id: PaneId, pagination: Pagination) -> Self {
        Self {
            id,
            caps: id.capabilities(),
            dispatcher,
            state: PaneState::Disconnected,
            connection_lost: false,
            path: DirPath::default(),
            home: None,
            listing: Listing::default(),
            selection: Selection::default(),
            pagination,
            requested_page: 1,
            paste_enabled: false,
            paste_pending: false,
            preview: None,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn state(&self) -> PaneState {
        self.state
    }

    pub fn is_connection_lost(&self) -> bool {
        self.connection_lost
    }

    /// Live path, as of the last listing.
    pub fn path(&self) -> &DirPath {
        &self.path
    }

    pub fn home(&self) -> Option<&DirPath> {
        self.home.as_ref()
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn preview(&self) -> Option<&PreviewEvent> {
        self.preview.as_ref()
    }

    pub fn take_preview(&mut self) -> Option<PreviewEvent> {
        self.preview.take()
    }

    pub fn paste_enabled(&self) -> bool {
        self.paste_enabled && !self.paste_pending
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    // ---- connection lifecycle ----

    pub fn begin_connect(&mut self) -> Result<(), PaneError> {
        if self.connection_lost {
            return Err(PaneError::Disconnected);
        }
        if self.state == PaneState::Disconnected {
            self.state = PaneState::Connecting;
        }
        Ok(())
    }

    pub fn on_open(&mut self) {
        self.paste_enabled = false;
    }

    pub fn on_closed(&mut self, log: &mut StatusLog) {
        if self.connection_lost {
            return;
        }
        self.state = PaneState::Disconnected;
        self.connection_lost = true;
        self.paste_enabled = false;
        log.error(format!("Lost connection to {} storage, please restart the viewer!", self.id));
    }

    // ---- inbound ----

    /// Decode one frame and apply it. Malformed frames land in `log`.
    pub fn handle_frame(
        &mut self,
        frame: &str,
        log: &mut StatusLog,
        clipboard: &mut Clipboard,
    ) -> Result<(), ProtocolError> {
        match self.dispatcher.decode(frame) {
            Ok(event) => {
                self.handle_event(event, log, clipboard);
                Ok(())
            }
            Err(e) => {
                log.error(format!("{} channel: {}", self.id, e));
                Err(e)
            }
        }
    }

    pub fn handle_event(&mut self, event: Event, log: &mut StatusLog, clipboard: &mut Clipboard) {
        if self.connection_lost {
            return;
        }
        match event {
            Event::Init(listing) => self.replace_listing(listing),
            Event::Status { level, text } => log.push(level, text),
            Event::Paste => {
                self.paste_enabled = true;
                if self.paste_pending {
                    self.paste_pending = false;
                    clipboard.consume(self.id);
                }
                // answers cut, copy and paste only
                if let PaneState::AwaitingServerAck(OpKind::Cut | OpKind::Copy | OpKind::Paste) = self.state {
                    self.state = PaneState::Browsing;
                }
            }
            Event::NeedRefresh { dir_path } => {
                if !self.path.is_empty() && dir_path.join() == self.path.join() {
                    if let Err(e) = self.refresh() {
                        log.error(e.to_string());
                    }
                }
            }
            Event::Preview(preview) => {
                log.info(format!("Load file [{}] preview info success", preview.file_path));
                self.preview = Some(preview);
            }
        }
    }

    fn replace_listing(&mut self, ev: ListingEvent) {
        self.path = ev.dir_path;
        if ev.home_path.is_some() {
            self.home = ev.home_path;
        }
        self.listing = ev.listing;
        self.selection.clear();
        self.pagination = self.pagination.rebuilt(self.requested_page, ev.total);
        self.state = PaneState::Browsing;
    }

    // ---- outbound plumbing ----

    fn ready(&self) -> Result<(), PaneError> {
        if self.connection_lost {
            return Err(PaneError::Disconnected);
        }
        match self.state {
            PaneState::Disconnected => Err(PaneError::Disconnected),
            PaneState::Connecting => Err(PaneError::NotReady),
            PaneState::Browsing | PaneState::AwaitingServerAck(_) => Ok(()),
        }
    }

    fn require(&self, action: Action) -> Result<(), PaneError> {
        self.ready()?;
        if self.availability().allows(action) {
            Ok(())
        } else {
            Err(PaneError::Unavailable(action))
        }
    }

    fn send(&mut self, cmd: Command) -> Result<(), PaneError> {
        self.dispatcher.send(&cmd)?;
        if let Some(op) = cmd.op_kind() {
            self.state = PaneState::AwaitingServerAck(op);
        }
        Ok(())
    }

    fn request_page(&mut self, page: u32, dir_path: DirPath, kind: PageRequest) -> Result<(), PaneError> {
        let page = page.max(1);
        let (offset, limit) = self.pagination.window(page);
        let cmd = match kind {
            PageRequest::Cd => Command::Cd { dir_path, offset, limit },
            PageRequest::Refresh => Command::Refresh { dir_path, offset, limit },
            PageRequest::ChangePage => Command::ChangePage { dir_path, offset, limit },
        };
        self.send(cmd)?;
        self.requested_page = page;
        Ok(())
    }

    fn log_each(&self, log: &mut StatusLog, verb: &str, dirs: &[EntryRef], files: &[EntryRef], suffix: &str) {
        for (kind, refs) in [("directory", dirs), ("file", files)] {
            for r in refs {
                log.info(format!(
                    "{} {} {} [{}]{} ...",
                    verb,
                    self.id,
                    kind,
                    self.path.join_name(&r.name),
                    suffix
                ));
            }
        }
    }

    // ---- navigation ----

    pub fn enter(&mut self, dir_index: usize) -> Result<(), PaneError> {
        self.ready()?;
        let name = self
            .listing
            .get(EntryKind::Directory, dir_index)
            .ok_or(PaneError::NoSuchEntry(dir_index))?
            .name
            .clone();
        let target = self.path.child(Segment::new(name)?);
        self.request_page(1, target, PageRequest::Cd)
    }

    pub fn go_home(&mut self) -> Result<(), PaneError> {
        self.ready()?;
        let target = match &self.home {
            Some(home) => home.clone(),
            None => {
                let mut root = self.path.clone();
                root.pop_to(1);
                root
            }
        };
        self.request_page(1, target, PageRequest::Cd)
    }

    pub fn go_parent(&mut self) -> Result<(), PaneError> {
        self.ready()?;
        let target = self.path.parent();
        self.request_page(1, target, PageRequest::Cd)
    }

    pub fn refresh(&mut self) -> Result<(), PaneError> {
        self.ready()?;
        let page = self.requested_page;
        self.request_page(page, self.path.clone(), PageRequest::Refresh)
    }

    pub fn goto_page(&mut self, page: u32) -> Result<(), PaneError> {
        self.ready()?;
        self.request_page(page, self.path.clone(), PageRequest::ChangePage)
    }

    pub fn previous_page(&mut self) -> Result<(), PaneError> {
        self.goto_page(self.requested_page.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> Result<(), PaneError> {
        self.goto_page(self.requested_page.saturating_add(1))
    }

    // ---- selection ----

    pub fn toggle(&mut self, kind: EntryKind, index: usize) -> Result<bool, PaneError> {
        self.ready()?;
        if self.listing.get(kind, index).is_none() {
            return Err(PaneError::NoSuchEntry(index));
        }
        Ok(self.selection.toggle(kind, index))
    }

    pub fn toggle_dir(&mut self, index: usize) -> Result<bool, PaneError> {
        self.toggle(EntryKind::Directory, index)
    }

    pub fn toggle_file(&mut self, index: usize) -> Result<bool, PaneError> {
        self.toggle(EntryKind::File, index)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Current toolbar state. Everything is off once the connection is gone.
    pub fn availability(&self) -> ActionAvailability {
        if self.connection_lost || matches!(self.state, PaneState::Disconnected | PaneState::Connecting) {
            return ActionAvailability::default();
        }
        gate(self.selection.counts())
            .restrict(self.caps)
            .with_paste(self.paste_enabled())
    }

    /// Name to prefill the rename prompt with.
    pub fn rename_candidate(&self) -> Option<&str> {
        let (kind, index) = self.selection.single()?;
        self.listing.get(kind, index).map(|e| e.name.as_str())
    }

    pub fn detail(&self, file_index: usize) -> Result<FileDetail, PaneError> {
        self.listing
            .get(EntryKind::File, file_index)
            .map(FileDetail::of)
            .ok_or(PaneError::NoSuchEntry(file_index))
    }

    // ---- mutations ----

    pub fn mkdir(&mut self, name: &str) -> Result<(), PaneError> {
        self.require(Action::Create)?;
        let name = Segment::new(name.trim())?;
        self.send(Command::Mkdir {
            name: name.as_str().to_string(),
            dir_path: self.path.clone(),
        })
    }

    pub fn rename(&mut self, new_name: &str) -> Result<(), PaneError> {
        self.require(Action::Rename)?;
        let old_name = self
            .rename_candidate()
            .ok_or(PaneError::Unavailable(Action::Rename))?
            .to_string();
        let new_name = Segment::new(new_name.trim())?;
        self.send(Command::Rename {
            old_name,
            new_name: new_name.as_str().to_string(),
            dir_path: self.path.clone(),
        })
    }

    pub fn delete(&mut self, log: &mut StatusLog) -> Result<(), PaneError> {
        self.require(Action::Delete)?;
        let (dirs, files) = self.selection.refs(&self.listing);
        self.send(Command::Delete {
            dirs: dirs.clone(),
            files: files.clone(),
            dir_path: self.path.clone(),
        })?;
        self.log_each(log, "Deleting", &dirs, &files, "");
        Ok(())
    }

    pub fn cut(&mut self, clipboard: &mut Clipboard) -> Result<(), PaneError> {
        self.clip(ClipMode::Cut, clipboard)
    }

    pub fn copy(&mut self, clipboard: &mut Clipboard) -> Result<(), PaneError> {
        self.clip(ClipMode::Copy, clipboard)
    }

    fn clip(&mut self, mode: ClipMode, clipboard: &mut Clipboard) -> Result<(), PaneError> {
        self.require(match mode {
            ClipMode::Cut => Action::Cut,
            ClipMode::Copy => Action::Copy,
        })?;
        let (dirs, files) = self.selection.refs(&self.listing);
        let dir_path = self.path.clone();
        let cmd = match mode {
            ClipMode::Cut => Command::Cut { dirs: dirs.clone(), files: files.clone(), dir_path: dir_path.clone() },
            ClipMode::Copy => Command::Copy { dirs: dirs.clone(), files: files.clone(), dir_path: dir_path.clone() },
        };
        self.send(cmd)?;
        clipboard.record(ClipboardEntry {
            source: self.id,
            source_path: dir_path,
            mode,
            dirs,
            files,
        });
        Ok(())
    }

    pub fn paste(&mut self, log: &mut StatusLog) -> Result<(), PaneError> {
        self.require(Action::Paste)?;
        self.send(Command::Paste { dir_path: self.path.clone() })?;
        self.paste_pending = true;
        log.info(format!("Pasting {} files & directories ...", self.id));
        Ok(())
    }

    pub fn update(&mut self, replica: Option<&str>, default_replica: u32, log: &mut StatusLog) -> Result<(), PaneError> {
        self.require(Action::Update)?;
        let replica = parse_replica(replica, default_replica)?;
        let (dirs, files) = self.selection.refs(&self.listing);
        self.send(Command::Update {
            dirs: dirs.clone(),
            files: files.clone(),
            dir_path: self.path.clone(),
            replica,
        })?;
        self.log_each(log, "Updating", &dirs, &files, "");
        Ok(())
    }

    pub fn request_preview(&mut self, log: &mut StatusLog) -> Result<(), PaneError> {
        self.require(Action::Preview)?;
        let (kind, index) = self
            .selection
            .single()
            .ok_or(PaneError::Unavailable(Action::Preview))?;
        let entry = self
            .listing
            .get(kind, index)
            .ok_or(PaneError::NoSuchEntry(index))?;
        let file = PreviewFile {
            name: entry.name.clone(),
            sha1: entry.content_hash.clone(),
            file_type: entry.file_type.clone(),
        };
        let shown = self.path.join_name(&file.name);
        self.send(Command::Preview { file, dir_path: self.path.clone() })?;
        log.info(format!("Loading file [{}] preview info ...", shown));
        Ok(())
    }

    /// Send this pane's selection to the other pane's live directory:
    /// upload from local, download from remote.
    pub fn transfer(
        &mut self,
        target: &DirPath,
        replica: Option<&str>,
        default_replica: u32,
        log: &mut StatusLog,
    ) -> Result<(), PaneError> {
        let action = self
            .caps
            .transfer()
            .ok_or(PaneError::Unavailable(Action::Upload))?;
        self.require(action)?;
        if target.is_empty() {
            return Err(PaneError::NotReady);
        }
        let (dirs, files) = self.selection.refs(&self.listing);
        let cmd = match action {
            Action::Upload => Command::Upload {
                dirs: dirs.clone(),
                files: files.clone(),
                local_path: self.path.clone(),
                remote_path: target.clone(),
                replica: parse_replica(replica, default_replica)?,
            },
            _ => Command::Download {
                dirs: dirs.clone(),
                files: files.clone(),
                remote_path: self.path.clone(),
                local_path: target.clone(),
            },
        };
        self.send(cmd)?;
        let verb = if action == Action::Upload { "Uploading" } else { "Downloading" };
        self.log_each(log, verb, &dirs, &files, &format!(" to [{}]", target.join()));
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum PageRequest {
    Cd,
    Refresh,
    ChangePage,
}
