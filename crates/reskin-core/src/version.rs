//! Maven-style artifact versions
//!
//! Ordering follows the comparable-version rules used by Maven repositories:
//! numeric tokens compare numerically, known qualifiers follow
//! `alpha < beta < milestone < rc < snapshot < (release) < sp`, and unknown
//! qualifiers sort after all known ones, lexically.
//!
//! The `major.minor.incremental-qualifier` split is kept separately because
//! the snapshot filter looks at the qualifier exactly as the repository
//! tooling reports it (`1.2-SNAPSHOT` has qualifier `SNAPSHOT`, while
//! `1.2.3.4-SNAPSHOT` has the whole string as qualifier).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Known qualifiers in ascending order. The empty string is a plain release.
const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Position of the release qualifier in [`QUALIFIERS`]
const RELEASE_INDEX: &str = "5";

/// A version as published in an artifact repository
#[derive(Debug, Clone)]
pub struct ArtifactVersion {
    raw: String,
    items: Vec<Item>,
    major: Option<u32>,
    minor: Option<u32>,
    incremental: Option<u32>,
    build_number: Option<u32>,
    qualifier: Option<String>,
}

impl ArtifactVersion {
    /// Parse a version string. Every string is a valid version; unusual
    /// shapes simply end up in the qualifier.
    pub fn new(version: &str) -> Self {
        let components = Components::parse(version);
        Self {
            raw: version.to_string(),
            items: parse_items(version),
            major: components.major,
            minor: components.minor,
            incremental: components.incremental,
            build_number: components.build_number,
            qualifier: components.qualifier,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u32 {
        self.major.unwrap_or(0)
    }

    pub fn minor(&self) -> u32 {
        self.minor.unwrap_or(0)
    }

    pub fn incremental(&self) -> u32 {
        self.incremental.unwrap_or(0)
    }

    pub fn build_number(&self) -> u32 {
        self.build_number.unwrap_or(0)
    }

    /// Qualifier as reported by the default version split
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Whether this version is explicitly tagged as an unreleased snapshot.
    ///
    /// Only the exact `SNAPSHOT` qualifier counts; other pre-release
    /// spellings are treated as published versions.
    pub fn is_snapshot(&self) -> bool {
        self.qualifier() == Some("SNAPSHOT")
    }
}

impl PartialEq for ArtifactVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArtifactVersion {}

impl Hash for ArtifactVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

impl PartialOrd for ArtifactVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArtifactVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lists(&self.items, &other.items)
    }
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ArtifactVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for ArtifactVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for ArtifactVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ArtifactVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

// =========================================================================
// Default split: major.minor.incremental-buildNumber|qualifier
// =========================================================================

#[derive(Debug, Default)]
struct Components {
    major: Option<u32>,
    minor: Option<u32>,
    incremental: Option<u32>,
    build_number: Option<u32>,
    qualifier: Option<String>,
}

impl Components {
    fn parse(version: &str) -> Self {
        let mut parsed = Components::default();

        let (head, tail) = match version.split_once('-') {
            Some((head, tail)) => (head, Some(tail)),
            None => (version, None),
        };

        if let Some(tail) = tail {
            if tail.len() == 1 || !tail.starts_with('0') {
                parsed.build_number = tail.parse().ok();
                if parsed.build_number.is_none() {
                    parsed.qualifier = Some(tail.to_string());
                }
            } else {
                parsed.qualifier = Some(tail.to_string());
            }
        }

        if !head.contains('.') && !head.starts_with('0') {
            parsed.major = head.parse().ok();
            if parsed.major.is_none() {
                parsed.qualifier = Some(version.to_string());
                parsed.build_number = None;
            }
            return parsed;
        }

        let mut fallback = false;
        let mut tokens = head.split('.').filter(|t| !t.is_empty());

        match tokens.next().map(integer_token) {
            Some(Some(major)) => parsed.major = Some(major),
            _ => fallback = true,
        }
        if let Some(token) = tokens.next() {
            match integer_token(token) {
                Some(minor) => parsed.minor = Some(minor),
                None => fallback = true,
            }
        }
        if let Some(token) = tokens.next() {
            match integer_token(token) {
                Some(incremental) => parsed.incremental = Some(incremental),
                None => fallback = true,
            }
        }
        if let Some(token) = tokens.next() {
            parsed.qualifier = Some(token.to_string());
            fallback = token.chars().all(|c| c.is_ascii_digit());
        }
        if head.contains("..") || head.starts_with('.') || head.ends_with('.') {
            fallback = true;
        }

        if fallback {
            return Components {
                qualifier: Some(version.to_string()),
                ..Components::default()
            };
        }
        parsed
    }
}

fn integer_token(token: &str) -> Option<u32> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

// =========================================================================
// Comparable items
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Item {
    /// Digits without leading zeros; empty means zero
    Int(String),
    /// Normalised qualifier
    Str(String),
    List(Vec<Item>),
}

impl Item {
    fn is_null(&self) -> bool {
        match self {
            Item::Int(digits) => digits.is_empty(),
            Item::Str(value) => comparable_qualifier(value) == RELEASE_INDEX,
            Item::List(items) => items.is_empty(),
        }
    }

    fn compare(&self, other: Option<&Item>) -> Ordering {
        match (self, other) {
            (Item::Int(digits), None) => {
                if digits.is_empty() {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            (Item::Int(a), Some(Item::Int(b))) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Item::Int(_), Some(_)) => Ordering::Greater,

            (Item::Str(value), None) => {
                comparable_qualifier(value).as_str().cmp(RELEASE_INDEX)
            }
            (Item::Str(_), Some(Item::Int(_))) => Ordering::Less,
            (Item::Str(a), Some(Item::Str(b))) => {
                comparable_qualifier(a).cmp(&comparable_qualifier(b))
            }
            (Item::Str(_), Some(Item::List(_))) => Ordering::Less,

            (Item::List(items), None) => items
                .iter()
                .map(|item| item.compare(None))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal),
            (Item::List(_), Some(Item::Int(_))) => Ordering::Less,
            (Item::List(_), Some(Item::Str(_))) => Ordering::Greater,
            (Item::List(a), Some(Item::List(b))) => compare_lists(a, b),
        }
    }
}

fn compare_lists(left: &[Item], right: &[Item]) -> Ordering {
    let len = left.len().max(right.len());
    for i in 0..len {
        let result = match (left.get(i), right.get(i)) {
            (Some(l), r) => l.compare(r),
            (None, Some(r)) => r.compare(None).reverse(),
            (None, None) => Ordering::Equal,
        };
        if result != Ordering::Equal {
            return result;
        }
    }
    Ordering::Equal
}

fn comparable_qualifier(qualifier: &str) -> String {
    match QUALIFIERS.iter().position(|q| *q == qualifier) {
        Some(index) => index.to_string(),
        None => format!("{}-{}", QUALIFIERS.len(), qualifier),
    }
}

fn string_item(value: &str, followed_by_digit: bool) -> Item {
    let value = if followed_by_digit && value.len() == 1 {
        match value {
            "a" => "alpha",
            "b" => "beta",
            "m" => "milestone",
            other => other,
        }
    } else {
        value
    };
    let value = match value {
        "ga" | "final" | "release" => "",
        "cr" => "rc",
        other => other,
    };
    Item::Str(value.to_string())
}

fn parse_item(is_digit: bool, buf: &str) -> Item {
    if is_digit {
        Item::Int(buf.trim_start_matches('0').to_string())
    } else {
        string_item(buf, false)
    }
}

fn normalize(items: &mut Vec<Item>) {
    let mut i = items.len();
    while i > 0 {
        i -= 1;
        if items[i].is_null() {
            items.remove(i);
        } else if !matches!(items[i], Item::List(_)) {
            break;
        }
    }
}

fn parse_items(version: &str) -> Vec<Item> {
    let version = version.to_lowercase();
    let chars: Vec<(usize, char)> = version.char_indices().collect();

    // Innermost list last; every nested list is the final item of its parent.
    let mut stack: Vec<Vec<Item>> = vec![Vec::new()];
    let mut is_digit = false;
    let mut start = 0usize;

    for &(i, c) in &chars {
        match c {
            '.' => {
                let item = if i == start {
                    Item::Int(String::new())
                } else {
                    parse_item(is_digit, &version[start..i])
                };
                push_item(&mut stack, item);
                start = i + c.len_utf8();
            }
            '-' => {
                let item = if i == start {
                    Item::Int(String::new())
                } else {
                    parse_item(is_digit, &version[start..i])
                };
                push_item(&mut stack, item);
                start = i + c.len_utf8();
                stack.push(Vec::new());
            }
            c if c.is_ascii_digit() => {
                if !is_digit && i > start {
                    push_item(&mut stack, string_item(&version[start..i], true));
                    start = i;
                    stack.push(Vec::new());
                }
                is_digit = true;
            }
            _ => {
                if is_digit && i > start {
                    push_item(&mut stack, parse_item(true, &version[start..i]));
                    start = i;
                    stack.push(Vec::new());
                }
                is_digit = false;
            }
        }
    }

    if version.len() > start {
        push_item(&mut stack, parse_item(is_digit, &version[start..]));
    }

    let mut current = stack.pop().unwrap_or_default();
    normalize(&mut current);
    while let Some(mut parent) = stack.pop() {
        parent.push(Item::List(current));
        normalize(&mut parent);
        current = parent;
    }
    current
}

fn push_item(stack: &mut [Vec<Item>], item: Item) {
    if let Some(list) = stack.last_mut() {
        list.push(item);
    }
}
