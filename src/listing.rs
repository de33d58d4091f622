//! Directory contents as last reported by the server

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

/// Entry size: a byte count, or the display string some servers pre-format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Size {
    Bytes(u64),
    Text(String),
}

impl Size {
    pub fn display(&self) -> String {
        match self {
            Size::Bytes(n) => format_size(*n),
            Size::Text(s) => s.clone(),
        }
    }
}

pub fn format_size(size: u64) -> String {
    const K: f64 = 1024.0;
    let s = size as f64;
    if s > K * K * K {
        format!("{:.3} G", s / K / K / K)
    } else if s > K * K {
        format!("{:.3} M", s / K / K)
    } else if s > K {
        format!("{:.3} K", s / K)
    } else {
        format!("{} B", size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireEntry")]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    /// Extension reported for files (`.txt`), empty for directories
    pub file_type: String,
    pub size: Option<Size>,
    pub created_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
    pub content_hash: String,
    pub current_replicas: Option<u32>,
    pub desired_replicas: Option<u32>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn to_ref(&self) -> EntryRef {
        EntryRef {
            name: self.name.clone(),
            sha1: self.content_hash.clone(),
        }
    }
}

#[derive(Deserialize)]
struct WireEntry {
    name: String,
    #[serde(default)]
    sha1: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    size: Option<Size>,
    #[serde(default, deserialize_with = "timestamp")]
    ctime: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamp")]
    mtime: Option<NaiveDateTime>,
    #[serde(default)]
    current_replica: Option<u32>,
    #[serde(default)]
    replica: Option<u32>,
}

impl From<WireEntry> for Entry {
    fn from(w: WireEntry) -> Self {
        let is_dir = w.kind.eq_ignore_ascii_case("directory");
        Entry {
            name: w.name,
            kind: if is_dir { EntryKind::Directory } else { EntryKind::File },
            file_type: if is_dir { String::new() } else { w.kind },
            size: w.size,
            created_at: w.ctime,
            modified_at: w.mtime,
            content_hash: w.sha1,
            current_replicas: w.current_replica,
            desired_replicas: w.replica,
        }
    }
}

// Servers send "" for unknown times; anything unparsable is treated the same way.
fn timestamp<'de, D>(d: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()))
}

/// Identity of an entry in mutating commands: name plus content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    pub name: String,
    pub sha1: String,
}

/// One directory's entries, directories and files kept apart so local
/// indices stay stable for the selection tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    dirs: Vec<Entry>,
    files: Vec<Entry>,
}

impl Listing {
    /// Partition a mixed item list, keeping server order within each kind.
    pub fn from_items(items: Vec<Entry>) -> Self {
        let (dirs, files) = items.into_iter().partition(Entry::is_dir);
        Self { dirs, files }
    }

    pub fn from_parts(dirs: Vec<Entry>, files: Vec<Entry>) -> Self {
        let mut all = dirs;
        all.extend(files);
        Self::from_items(all)
    }

    pub fn dirs(&self) -> &[Entry] {
        &self.dirs
    }

    pub fn files(&self) -> &[Entry] {
        &self.files
    }

    pub fn get(&self, kind: EntryKind, index: usize) -> Option<&Entry> {
        match kind {
            EntryKind::Directory => self.dirs.get(index),
            EntryKind::File => self.files.get(index),
        }
    }

    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: EntryKind) -> usize {
        match kind {
            EntryKind::Directory => self.dirs.len(),
            EntryKind::File => self.files.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(json: &str) -> Vec<Entry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn partition_keeps_server_order() {
        let items = entries(
            r#"[
                {"name":"b.txt","type":".txt","sha1":"h1","size":10},
                {"name":"zdir","type":"Directory","sha1":"h2","size":0},
                {"name":"a.txt","type":".txt","sha1":"h3","size":2048},
                {"name":"adir","type":"Directory","sha1":"h4","size":0}
            ]"#,
        );
        let listing = Listing::from_items(items);
        let dirs: Vec<_> = listing.dirs().iter().map(|e| e.name.as_str()).collect();
        let files: Vec<_> = listing.files().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(dirs, ["zdir", "adir"]);
        assert_eq!(files, ["b.txt", "a.txt"]);
        assert_eq!(listing.len(), 4);
    }

    #[test]
    fn wire_fields_map_to_entry() {
        let e = &entries(
            r#"[{"num":1,"name":"r.bin","type":".bin","sha1":"abc","size":"1.000 K",
                 "ctime":"2021-03-04 05:06:07","mtime":"","current_replica":1,"replica":3}]"#,
        )[0];
        assert_eq!(e.kind, EntryKind::File);
        assert_eq!(e.file_type, ".bin");
        assert_eq!(e.size, Some(Size::Text("1.000 K".into())));
        assert!(e.created_at.is_some());
        assert!(e.modified_at.is_none());
        assert_eq!(e.current_replicas, Some(1));
        assert_eq!(e.desired_replicas, Some(3));
        assert_eq!(e.to_ref(), EntryRef { name: "r.bin".into(), sha1: "abc".into() });
    }

    #[test]
    fn sizes_render_like_the_server() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.000 K");
        assert_eq!(format_size(3 * 1024 * 1024 + 1), "3.000 M");
        assert_eq!(Size::Bytes(0).display(), "0 B");
    }
}
