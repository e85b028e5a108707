use regex::Regex;
use std::sync::LazyLock;

// Anchored to a single line; `(.+)?` is the content and may be absent.
static CHECKLIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((\t*- ?\[x? ?\]) +)(.+)?$").expect("checklist pattern compiles")
});
static UNORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((\t*[-*]+) +)(.+)?$").expect("unordered pattern compiles"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((\t*[0-9]+)\. +)(.+)?$").expect("ordered pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
    Checklist,
}

/// A line recognized as a list item.
///
/// `prefix` is everything up to the content (marker plus separator spaces),
/// `marker` is the bullet, number or checkbox including leading tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMatch {
    pub kind: ListKind,
    pub prefix: String,
    pub marker: String,
    pub content: String,
}

impl ListMatch {
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Length of the prefix in chars, i.e. how many backward deletes remove it.
    pub fn prefix_len(&self) -> usize {
        self.prefix.chars().count()
    }

    /// Text that starts the next list line, separator space included.
    pub fn continuation(&self) -> String {
        match self.kind {
            ListKind::Unordered => format!("{} ", self.marker),
            ListKind::Checklist => format!("{} ", self.marker.replace('x', " ")),
            ListKind::Ordered => {
                let digits = self.marker.trim_start_matches('\t');
                let tabs = &self.marker[..self.marker.len() - digits.len()];
                format!("{tabs}{}. ", increment_decimal(digits))
            }
        }
    }
}

/// Classify a single line. Checklist wins over unordered, unordered over ordered.
pub fn match_list_line(line: &str) -> Option<ListMatch> {
    [
        (ListKind::Checklist, &*CHECKLIST),
        (ListKind::Unordered, &*UNORDERED),
        (ListKind::Ordered, &*ORDERED),
    ]
    .into_iter()
    .find_map(|(kind, regex)| {
        regex.captures(line).map(|caps| ListMatch {
            kind,
            prefix: caps[1].to_string(),
            marker: caps[2].to_string(),
            content: caps.get(3).map_or_else(String::new, |m| m.as_str().to_string()),
        })
    })
}

/// Add one to a run of ASCII digits of any length. Leading zeros are
/// dropped the way an integer parse would drop them.
fn increment_decimal(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let mut bytes: Vec<u8> = if trimmed.is_empty() {
        vec![b'0']
    } else {
        trimmed.bytes().collect()
    };

    let mut idx = bytes.len();
    loop {
        if idx == 0 {
            bytes.insert(0, b'1');
            break;
        }
        idx -= 1;
        if bytes[idx] == b'9' {
            bytes[idx] = b'0';
        } else {
            bytes[idx] += 1;
            break;
        }
    }

    String::from_utf8(bytes).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    Bracket,
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub open: char,
    pub close: char,
    pub kind: PairKind,
}

const fn pair(open: char, close: char, kind: PairKind) -> Pair {
    Pair { open, close, kind }
}

/// Auto-closing pairs in lookup order. Square brackets are listed twice;
/// lookups stop at the first hit so the second entry is never reached.
pub const PAIRS: [Pair; 9] = [
    pair('(', ')', PairKind::Bracket),
    pair('{', '}', PairKind::Bracket),
    pair('[', ']', PairKind::Bracket),
    pair('[', ']', PairKind::Bracket),
    pair('«', '»', PairKind::Quote),
    pair('‹', '›', PairKind::Quote),
    pair('\'', '\'', PairKind::Quote),
    pair('`', '`', PairKind::Quote),
    pair('"', '"', PairKind::Quote),
];

pub fn pair_for_open(c: char) -> Option<&'static Pair> {
    PAIRS.iter().find(|p| p.open == c)
}

pub fn pair_for_close(c: char) -> Option<&'static Pair> {
    PAIRS.iter().find(|p| p.close == c)
}

/// True when `c` opens or closes any pair.
pub fn is_pair_char(c: char) -> bool {
    pair_for_open(c).is_some() || pair_for_close(c).is_some()
}
