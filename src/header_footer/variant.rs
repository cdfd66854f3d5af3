//! Canonical header/footer variants and id-table lookup rules

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Whether a record is a header or a footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Footer,
}

impl SectionKind {
    pub const ALL: [SectionKind; 2] = [SectionKind::Header, SectionKind::Footer];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Footer => "footer",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown section kind `{s}`"))
    }
}

/// Canonical role a header/footer plays in a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    First,
    Even,
    Odd,
    Last,
}

impl Variant {
    /// Seeding order
    pub const ALL: [Variant; 5] = [
        Variant::Default,
        Variant::First,
        Variant::Even,
        Variant::Odd,
        Variant::Last,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Default => "default",
            Variant::First => "first",
            Variant::Even => "even",
            Variant::Odd => "odd",
            Variant::Last => "last",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown header/footer variant `{s}`"))
    }
}

/// Legacy id-table keys written by older importers, compared case-insensitively
pub const LEGACY_ALIASES: &[(&str, Variant)] = &[
    ("titlePg", Variant::First),
    ("titlePage", Variant::First),
    ("firstPage", Variant::First),
    ("evenPage", Variant::Even),
    ("evenPages", Variant::Even),
    ("oddPage", Variant::Odd),
    ("oddPages", Variant::Odd),
    ("lastPage", Variant::Last),
    ("primary", Variant::Default),
];

/// Last-resort keyword scan over arbitrary id-table keys.
/// A key is classified by the first keyword it contains, in table order.
pub const KEYWORD_VARIANTS: &[(&str, Variant)] = &[
    ("even", Variant::Even),
    ("odd", Variant::Odd),
    ("first", Variant::First),
    ("title", Variant::First),
    ("last", Variant::Last),
    ("default", Variant::Default),
    ("body", Variant::Default),
    ("normal", Variant::Default),
];

/// Classify an arbitrary id-table key by keyword
pub fn classify_key(key: &str) -> Option<Variant> {
    let lower = key.to_ascii_lowercase();
    KEYWORD_VARIANTS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, variant)| *variant)
}

/// Canonical variant for a legacy alias key
pub fn legacy_alias(key: &str) -> Option<Variant> {
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
        .map(|(_, variant)| *variant)
}

/// Resolve the record id bound to `variant` in an id table.
///
/// Tries the exact canonical key, then legacy aliases, then the keyword
/// scan. Only string values naming an existing record count; the first
/// match wins.
pub fn resolve_variant_id<'a>(
    table: &'a BTreeMap<String, Value>,
    variant: Variant,
    exists: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    let usable = |value: &'a Value| value.as_str().filter(|id| exists(id));

    if let Some(id) = table.get(variant.as_str()).and_then(usable) {
        return Some(id);
    }

    let alias_hit = table
        .iter()
        .filter(|(key, _)| legacy_alias(key) == Some(variant))
        .find_map(|(_, value)| usable(value));
    if alias_hit.is_some() {
        return alias_hit;
    }

    table
        .iter()
        .filter(|(key, _)| key.as_str() != variant.as_str() && classify_key(key) == Some(variant))
        .find_map(|(_, value)| usable(value))
}
