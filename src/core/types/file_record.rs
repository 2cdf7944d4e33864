//! File objects found by the file scan plugin

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared platform of the analysed image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(String);

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Profile(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Which address space the file scan offsets live in for this profile
    pub fn offset_kind(&self) -> OffsetKind {
        if self.0 == "win10" {
            OffsetKind::Virtual
        } else {
            OffsetKind::Physical
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::new("win10")
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address space of a file offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetKind {
    Physical,
    Virtual,
}

impl OffsetKind {
    /// Flag the dump plugin expects in front of an offset of this kind
    pub fn dump_flag(&self) -> &'static str {
        match self {
            OffsetKind::Physical => "--physaddr",
            OffsetKind::Virtual => "--virtaddr",
        }
    }
}

/// Offset of a file object, kept as the tool printed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FileOffset {
    Physical(String),
    Virtual(String),
}

impl FileOffset {
    pub fn new(kind: OffsetKind, value: impl Into<String>) -> Self {
        match kind {
            OffsetKind::Physical => FileOffset::Physical(value.into()),
            OffsetKind::Virtual => FileOffset::Virtual(value.into()),
        }
    }

    pub fn kind(&self) -> OffsetKind {
        match self {
            FileOffset::Physical(_) => OffsetKind::Physical,
            FileOffset::Virtual(_) => OffsetKind::Virtual,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FileOffset::Physical(value) | FileOffset::Virtual(value) => value,
        }
    }
}

/// A file object recorded in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub offset: Option<FileOffset>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, offset: FileOffset) -> Self {
        FileRecord {
            path: path.into(),
            offset: Some(offset),
        }
    }

    /// A record whose offset was lost; it cannot be extracted
    pub fn without_offset(path: impl Into<String>) -> Self {
        FileRecord {
            path: path.into(),
            offset: None,
        }
    }

    /// Offset usable for extraction, if any
    pub fn dump_offset(&self) -> Option<&FileOffset> {
        self.offset.as_ref().filter(|offset| !offset.value().is_empty())
    }
}
