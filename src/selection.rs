//! Marked entries and the action gate derived from them

use std::collections::BTreeSet;
use std::fmt;

use crate::listing::{EntryKind, EntryRef, Listing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Rename,
    Create,
    Upload,
    Download,
    Preview,
    Update,
    Cut,
    Copy,
    Delete,
    Paste,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Rename => "rename",
            Action::Create => "create",
            Action::Upload => "upload",
            Action::Download => "download",
            Action::Preview => "preview",
            Action::Update => "update",
            Action::Cut => "cut",
            Action::Copy => "copy",
            Action::Delete => "delete",
            Action::Paste => "paste",
        };
        f.write_str(s)
    }
}

/// What a pane is able to do at all, independent of selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub upload: bool,
    pub download: bool,
    pub preview: bool,
    pub update: bool,
    pub copy: bool,
}

impl Capabilities {
    pub const LOCAL: Capabilities = Capabilities {
        upload: true,
        download: false,
        preview: false,
        update: false,
        copy: true,
    };

    pub const REMOTE: Capabilities = Capabilities {
        upload: false,
        download: true,
        preview: true,
        update: true,
        copy: false,
    };

    pub fn allows(self, action: Action) -> bool {
        match action {
            Action::Upload => self.upload,
            Action::Download => self.download,
            Action::Preview => self.preview,
            Action::Update => self.update,
            Action::Copy => self.copy,
            Action::Rename | Action::Create | Action::Cut | Action::Delete | Action::Paste => true,
        }
    }

    /// The cross-pane transfer this pane originates, if any.
    pub fn transfer(self) -> Option<Action> {
        if self.upload {
            Some(Action::Upload)
        } else if self.download {
            Some(Action::Download)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCounts {
    pub dirs: usize,
    pub files: usize,
}

/// Enabled state of every toolbar action for one pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionAvailability {
    pub rename: bool,
    pub create: bool,
    pub transfer: bool,
    pub preview: bool,
    pub update: bool,
    pub cut: bool,
    pub copy: bool,
    pub delete: bool,
    pub paste: bool,
}

impl ActionAvailability {
    /// Mask out actions the pane cannot perform.
    pub fn restrict(mut self, caps: Capabilities) -> Self {
        self.transfer &= caps.transfer().is_some();
        self.preview &= caps.preview;
        self.update &= caps.update;
        self.copy &= caps.copy;
        self
    }

    pub fn with_paste(mut self, enabled: bool) -> Self {
        self.paste = enabled;
        self
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Rename => self.rename,
            Action::Create => self.create,
            Action::Upload | Action::Download => self.transfer,
            Action::Preview => self.preview,
            Action::Update => self.update,
            Action::Cut => self.cut,
            Action::Copy => self.copy,
            Action::Delete => self.delete,
            Action::Paste => self.paste,
        }
    }
}

/// Selection-count decision table. Paste is never decided here.
pub fn gate(counts: SelectionCounts) -> ActionAvailability {
    let mutate = |rename: bool, preview: bool| ActionAvailability {
        rename,
        create: false,
        transfer: true,
        preview,
        update: true,
        cut: true,
        copy: true,
        delete: true,
        paste: false,
    };
    match (counts.dirs, counts.files) {
        (0, 0) => ActionAvailability {
            create: true,
            ..ActionAvailability::default()
        },
        (0, 1) => mutate(true, true),
        (1, 0) => mutate(true, false),
        _ => mutate(false, false),
    }
}

/// Marked (kind, index) pairs, valid only against the listing they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    marked: BTreeSet<(EntryKind, usize)>,
}

impl Selection {
    pub fn toggle(&mut self, kind: EntryKind, index: usize) -> bool {
        if self.marked.remove(&(kind, index)) {
            false
        } else {
            self.marked.insert((kind, index));
            true
        }
    }

    pub fn is_marked(&self, kind: EntryKind, index: usize) -> bool {
        self.marked.contains(&(kind, index))
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn counts(&self) -> SelectionCounts {
        let dirs = self.indices(EntryKind::Directory).count();
        SelectionCounts {
            dirs,
            files: self.marked.len() - dirs,
        }
    }

    pub fn indices(&self, kind: EntryKind) -> impl Iterator<Item = usize> + '_ {
        self.marked
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, i)| *i)
    }

    /// The only marked entry, when exactly one is marked.
    pub fn single(&self) -> Option<(EntryKind, usize)> {
        if self.marked.len() == 1 {
            self.marked.iter().next().copied()
        } else {
            None
        }
    }

    /// Resolve marked indices into wire references against `listing`.
    pub fn refs(&self, listing: &Listing) -> (Vec<EntryRef>, Vec<EntryRef>) {
        let collect = |kind: EntryKind| -> Vec<EntryRef> {
            self.indices(kind)
                .filter_map(|i| listing.get(kind, i))
                .map(|e| e.to_ref())
                .collect()
        };
        (collect(EntryKind::Directory), collect(EntryKind::File))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(dirs: usize, files: usize) -> SelectionCounts {
        SelectionCounts { dirs, files }
    }

    #[test]
    fn nothing_selected_only_creates() {
        let a = gate(counts(0, 0));
        assert!(a.create);
        assert!(!a.rename && !a.transfer && !a.preview);
        assert!(!a.cut && !a.copy && !a.delete && !a.update);
    }

    #[test]
    fn single_file_enables_preview_and_rename() {
        let a = gate(counts(0, 1));
        assert!(a.rename && a.preview && a.transfer);
        assert!(a.cut && a.copy && a.delete && a.update);
        assert!(!a.create);
    }

    #[test]
    fn many_files_disable_rename_and_preview() {
        let a = gate(counts(0, 4));
        assert!(!a.rename && !a.preview && !a.create);
        assert!(a.transfer && a.cut && a.delete);
    }

    #[test]
    fn single_dir_renames_without_preview() {
        let a = gate(counts(1, 0));
        assert!(a.rename && !a.preview && a.transfer && a.delete);
    }

    #[test]
    fn mixed_selection_falls_into_combined_row() {
        for (d, f) in [(1, 1), (2, 0), (3, 7), (1, 5)] {
            let a = gate(counts(d, f));
            assert!(!a.rename && !a.preview && !a.create, "({d},{f})");
            assert!(a.delete && a.cut && a.copy && a.transfer, "({d},{f})");
        }
    }

    #[test]
    fn create_is_exclusive_to_empty_selection() {
        for d in 0..4 {
            for f in 0..4 {
                assert_eq!(gate(counts(d, f)).create, d == 0 && f == 0);
            }
        }
    }

    #[test]
    fn capabilities_mask_actions() {
        let local = gate(counts(0, 1)).restrict(Capabilities::LOCAL);
        assert!(!local.preview && !local.update && local.copy && local.transfer);
        let remote = gate(counts(0, 1)).restrict(Capabilities::REMOTE);
        assert!(remote.preview && remote.update && !remote.copy && remote.transfer);
        assert!(remote.allows(Action::Download));
        assert_eq!(Capabilities::LOCAL.transfer(), Some(Action::Upload));
        assert_eq!(Capabilities::REMOTE.transfer(), Some(Action::Download));
    }

    #[test]
    fn gate_never_enables_paste() {
        assert!(!gate(counts(0, 0)).paste);
        assert!(gate(counts(0, 0)).with_paste(true).allows(Action::Paste));
    }

    #[test]
    fn toggle_and_counts() {
        let mut sel = Selection::default();
        assert!(sel.toggle(EntryKind::File, 2));
        assert!(sel.toggle(EntryKind::Directory, 0));
        assert_eq!(sel.counts(), counts(1, 1));
        assert!(!sel.toggle(EntryKind::File, 2));
        assert_eq!(sel.single(), Some((EntryKind::Directory, 0)));
        sel.clear();
        assert!(sel.is_empty());
    }
}
