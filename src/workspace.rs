//! The two panes plus what they share: clipboard and status log

use crate::clipboard::Clipboard;
use crate::config::ViewerConfig;
use crate::dispatcher::{CommandSink, Dispatcher};
use crate::error::PaneError;
use crate::pagination::Pagination;
use crate::pane::{PaneController, PaneId};
use crate::status_log::StatusLog;

struct Panes<S> {
    local: PaneController<S>,
    remote: PaneController<S>,
}

impl<S> Panes<S> {
    fn get(&self, id: PaneId) -> &PaneController<S> {
        match id {
            PaneId::Local => &self.local,
            PaneId::Remote => &self.remote,
        }
    }

    fn get_mut(&mut self, id: PaneId) -> &mut PaneController<S> {
        match id {
            PaneId::Local => &mut self.local,
            PaneId::Remote => &mut self.remote,
        }
    }

    /// `(id, other)` borrowed together.
    fn pair_mut(&mut self, id: PaneId) -> (&mut PaneController<S>, &mut PaneController<S>) {
        match id {
            PaneId::Local => (&mut self.local, &mut self.remote),
            PaneId::Remote => (&mut self.remote, &mut self.local),
        }
    }
}

pub struct Workspace<S> {
    panes: Panes<S>,
    clipboard: Clipboard,
    log: StatusLog,
    default_replica: u32,
}

impl<S: CommandSink> Workspace<S> {
    pub fn new(local: Dispatcher<S>, remote: Dispatcher<S>, cfg: &ViewerConfig) -> Self {
        let pagination = Pagination::new(cfg.page_size, cfg.link_span);
        Self {
            panes: Panes {
                local: PaneController::new(local, PaneId::Local, pagination),
                remote: PaneController::new(remote, PaneId::Remote, pagination),
            },
            clipboard: Clipboard::default(),
            log: StatusLog::new(cfg.log_capacity),
            default_replica: cfg.default_replica.max(1),
        }
    }

    pub fn pane(&self, id: PaneId) -> &PaneController<S> {
        self.panes.get(id)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> &mut PaneController<S> {
        self.panes.get_mut(id)
    }

    pub fn log(&self) -> &StatusLog {
        &self.log
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn default_replica(&self) -> u32 {
        self.default_replica
    }

    pub fn begin_connect(&mut self) -> Result<(), PaneError> {
        self.panes.local.begin_connect()?;
        self.panes.remote.begin_connect()
    }

    pub fn on_open(&mut self, id: PaneId) {
        self.panes.get_mut(id).on_open();
    }

    pub fn on_closed(&mut self, id: PaneId) {
        self.panes.get_mut(id).on_closed(&mut self.log);
    }

    /// Route one inbound frame to the pane whose channel it arrived on.
    pub fn handle_inbound(&mut self, id: PaneId, frame: &str) {
        // decode failures are already in the status log
        let _ = self
            .panes
            .get_mut(id)
            .handle_frame(frame, &mut self.log, &mut self.clipboard);
    }

    /// Record a refused action for the operator.
    pub fn report(&mut self, result: Result<(), PaneError>) {
        if let Err(e) = result {
            self.log.error(e.to_string());
        }
    }

    pub fn delete(&mut self, id: PaneId) -> Result<(), PaneError> {
        self.panes.get_mut(id).delete(&mut self.log)
    }

    pub fn cut(&mut self, id: PaneId) -> Result<(), PaneError> {
        self.panes.get_mut(id).cut(&mut self.clipboard)
    }

    pub fn copy(&mut self, id: PaneId) -> Result<(), PaneError> {
        self.panes.get_mut(id).copy(&mut self.clipboard)
    }

    pub fn paste(&mut self, id: PaneId) -> Result<(), PaneError> {
        self.panes.get_mut(id).paste(&mut self.log)
    }

    pub fn update(&mut self, id: PaneId, replica: Option<&str>) -> Result<(), PaneError> {
        self.panes
            .get_mut(id)
            .update(replica, self.default_replica, &mut self.log)
    }

    pub fn preview(&mut self, id: PaneId) -> Result<(), PaneError> {
        self.panes.get_mut(id).request_preview(&mut self.log)
    }

    /// Upload (local to remote) or download (remote to local) the selection
    /// of `from` into the other pane's live directory.
    pub fn transfer(&mut self, from: PaneId, replica: Option<&str>) -> Result<(), PaneError> {
        let (source, target) = self.panes.pair_mut(from);
        if target.is_connection_lost() {
            return Err(PaneError::Disconnected);
        }
        let target_path = target.path().clone();
        source.transfer(&target_path, replica, self.default_replica, &mut self.log)
    }
}
