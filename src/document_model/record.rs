use chrono::{DateTime, FixedOffset, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::JotError;

/// Tag stored in `type` for every document record.
pub const DOC_TYPE: &str = "doc";
/// Store key of the shared options record.
pub const OPTIONS_KEY: &str = "options";
pub const DEFAULT_TITLE_LENGTH: usize = 75;

/// A persisted document, field names as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub caret: usize,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub modified: String,
}

impl DocumentRecord {
    /// Parse a stored value; anything that is not a document yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("type").and_then(Value::as_str) != Some(DOC_TYPE) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        Self::from_value(&Value::Object(map.clone()))
    }

    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.modified)
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.created)
    }
}

/// First line of the trimmed text, cut to `max_chars`, trailing space removed.
pub fn derive_title(text: &str, max_chars: usize) -> String {
    let first_line = text.trim().split('\n').next().unwrap_or_default();
    let truncated: String = first_line.chars().take(max_chars).collect();
    truncated.trim_end().to_string()
}

pub fn now_timestamp() -> String {
    Local::now().to_rfc3339()
}

/// Accepts RFC 3339 and the `Date.toString()` form older records carry,
/// e.g. `Mon Oct 19 2026 10:00:00 GMT+0200 (Central European Summer Time)`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }
    let without_zone_name = value.split(" (").next().unwrap_or(value).trim();
    DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z").ok()
}

/// Text-length bucket used for the document icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LengthClass {
    Short = 1,
    Medium = 2,
    Long = 3,
    VeryLong = 4,
}

impl LengthClass {
    pub fn for_text(text: &str) -> Self {
        match text.chars().count() {
            0..100 => LengthClass::Short,
            100..800 => LengthClass::Medium,
            800..1200 => LengthClass::Long,
            _ => LengthClass::VeryLong,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            LengthClass::Short => "▁",
            LengthClass::Medium => "▃",
            LengthClass::Long => "▅",
            LengthClass::VeryLong => "▇",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Title,
    #[default]
    Modified,
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineLength {
    #[default]
    Narrow,
    Wide,
}

impl fmt::Display for LineLength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineLength::Narrow => write!(f, "narrow"),
            LineLength::Wide => write!(f, "wide"),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortOrder::Title => write!(f, "title"),
            SortOrder::Modified => write!(f, "modified"),
            SortOrder::Created => write!(f, "created"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortOrder::Title),
            "modified" => Ok(SortOrder::Modified),
            "created" => Ok(SortOrder::Created),
            other => Err(JotError::InvalidOption(format!("sort={other}"))),
        }
    }
}

/// The shared options record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub spell_check: bool,
    pub sort: SortOrder,
    pub line_length: LineLength,
    pub auto_list: bool,
    pub auto_closure: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            spell_check: true,
            sort: SortOrder::Modified,
            line_length: LineLength::Narrow,
            auto_list: true,
            auto_closure: false,
        }
    }
}

impl Options {
    /// Every field as an explicit default, for `DocumentStore::load`.
    pub fn defaults_map() -> Map<String, Value> {
        match serde_json::to_value(Options::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Read options from a loaded record; fields that fail to parse fall
    /// back to their defaults one by one.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        fn field<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Option<T> {
            map.get(name)
                .and_then(|value| serde_json::from_value(value.clone()).ok())
        }

        let defaults = Options::default();
        Options {
            spell_check: field(map, "spellCheck").unwrap_or(defaults.spell_check),
            sort: field(map, "sort").unwrap_or(defaults.sort),
            line_length: field(map, "lineLength").unwrap_or(defaults.line_length),
            auto_list: field(map, "autoList").unwrap_or(defaults.auto_list),
            auto_closure: field(map, "autoClosure").unwrap_or(defaults.auto_closure),
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
