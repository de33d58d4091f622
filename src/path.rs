//! Directory locations as ordered segment lists
//!
//! The server reports paths the way it split them, root anchor first
//! (`["/", "home", "alice"]`). Every path that goes back on the wire is
//! built from validated segments, so it never carries empty segments or
//! doubled separators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

pub const SEPARATOR: char = '/';

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Root anchors are the only segments allowed to contain separators (`/`, `C:\`).
fn is_anchor(s: &str) -> bool {
    s.ends_with(is_separator)
}

/// One validated path component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(String);

impl Segment {
    pub fn new(s: impl Into<String>) -> Result<Self, PathError> {
        let s = s.into();
        if s.is_empty() {
            return Err(PathError::EmptySegment);
        }
        if s.contains(is_separator) {
            return Err(PathError::Separator(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DirPath {
    segments: Vec<String>,
}

impl DirPath {
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for (i, seg) in segments.into_iter().enumerate() {
            let seg = seg.into();
            if i == 0 && is_anchor(&seg) {
                out.push(seg);
                continue;
            }
            out.push(Segment::new(seg)?.0);
        }
        Ok(Self { segments: out })
    }

    /// Parse a display string such as `/home/alice` (duplicate separators collapse).
    pub fn parse(display: &str) -> Self {
        let mut segments = Vec::new();
        if display.starts_with(SEPARATOR) {
            segments.push(SEPARATOR.to_string());
        }
        segments.extend(
            display
                .split(is_separator)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment.0);
    }

    pub fn child(&self, segment: Segment) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Truncate to `depth` segments, never below one.
    pub fn pop_to(&mut self, depth: usize) {
        self.segments.truncate(depth.max(1));
    }

    pub fn parent(&self) -> Self {
        let mut up = self.clone();
        up.pop_to(self.depth().saturating_sub(1));
        up
    }

    pub fn join(&self) -> String {
        let raw = self.segments.join("/");
        let mut out = String::with_capacity(raw.len());
        let mut last_sep = false;
        for c in raw.chars() {
            let sep = c == SEPARATOR;
            if !(sep && last_sep) {
                out.push(c);
            }
            last_sep = sep;
        }
        out
    }

    /// Join an entry name under this directory, for log lines.
    pub fn join_name(&self, name: &str) -> String {
        let base = self.join();
        if base.is_empty() {
            name.to_string()
        } else if base.ends_with(SEPARATOR) {
            format!("{base}{name}")
        } else {
            format!("{base}{SEPARATOR}{name}")
        }
    }
}

impl TryFrom<Vec<String>> for DirPath {
    type Error = PathError;

    fn try_from(v: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_segments(v)
    }
}

impl From<DirPath> for Vec<String> {
    fn from(p: DirPath) -> Self {
        p.segments
    }
}

impl fmt::Display for DirPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(segs: &[&str]) -> DirPath {
        DirPath::from_segments(segs.iter().copied()).unwrap()
    }

    #[test]
    fn join_collapses_root_anchor() {
        assert_eq!(p(&["/", "home", "alice"]).join(), "/home/alice");
        assert_eq!(p(&["/"]).join(), "/");
        assert_eq!(p(&["data", "logs"]).join(), "data/logs");
    }

    #[test]
    fn pop_to_floors_at_one() {
        let mut path = p(&["/", "home", "alice"]);
        path.pop_to(2);
        assert_eq!(path, p(&["/", "home"]));
        path.pop_to(0);
        assert_eq!(path, p(&["/"]));
        assert_eq!(path.parent(), p(&["/"]));
    }

    #[test]
    fn parent_drops_last_segment() {
        assert_eq!(p(&["/", "a", "b"]).parent(), p(&["/", "a"]));
    }

    #[test]
    fn segments_reject_separators_and_empties() {
        assert_eq!(Segment::new(""), Err(PathError::EmptySegment));
        assert!(matches!(Segment::new("a/b"), Err(PathError::Separator(_))));
        assert!(DirPath::from_segments(["/", ""]).is_err());
        assert!(DirPath::from_segments(["/", "x/y"]).is_err());
        assert!(DirPath::from_segments(["C:\\", "Users"]).is_ok());
    }

    #[test]
    fn parse_matches_segments() {
        assert_eq!(DirPath::parse("//home///alice/"), p(&["/", "home", "alice"]));
        assert_eq!(DirPath::parse("/"), p(&["/"]));
        assert!(DirPath::parse("").is_empty());
    }

    #[test]
    fn child_and_join_name() {
        let base = p(&["/", "srv"]);
        let next = base.child(Segment::new("www").unwrap());
        assert_eq!(next.join(), "/srv/www");
        assert_eq!(base.join_name("a.txt"), "/srv/a.txt");
        assert_eq!(p(&["/"]).join_name("a.txt"), "/a.txt");
    }

    #[test]
    fn wire_form_is_segment_array() {
        let path: DirPath = serde_json::from_str(r#"["/","tmp"]"#).unwrap();
        assert_eq!(serde_json::to_string(&path).unwrap(), r#"["/","tmp"]"#);
        assert!(serde_json::from_str::<DirPath>(r#"["/",""]"#).is_err());
    }
}
