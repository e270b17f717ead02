use crate::core::version::{VersionSet, VhdlVersion};
use crate::util::strcmp;
use std::str::FromStr;

/// Whether a file may participate in simulation, synthesis, or both.
///
/// Derived from the `sim`/`syn` filename tags: one of them restricts the
/// file, both (or neither) leave it universal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Universal,
    SimOnly,
    SynOnly,
}

impl Default for Usage {
    fn default() -> Self {
        Self::Universal
    }
}

/// The attributes encoded in a filename.
#[derive(Debug, Default, PartialEq)]
pub struct Tags {
    versions: VersionSet,
    usage: Usage,
}

impl Tags {
    pub fn get_versions(&self) -> &VersionSet {
        &self.versions
    }

    pub fn get_usage(&self) -> Usage {
        self.usage
    }

    pub fn into_parts(self) -> (VersionSet, Usage) {
        (self.versions, self.usage)
    }
}

/// Reads the dot-separated tags from a file name.
///
/// Every segment except the first (the stem) and the last (the extension)
/// is a tag: a two-digit tag names a compatible VHDL version, `sim`/`syn`
/// restrict the usage, anything else is reserved and skipped.
pub fn parse_tags(file_name: &str) -> Tags {
    let segments: Vec<&str> = file_name.split('.').collect();
    if segments.len() < 3 {
        return Tags::default();
    }
    let mut versions = VersionSet::new();
    let mut sim = false;
    let mut syn = false;
    for tag in &segments[1..segments.len() - 1] {
        if tag.len() == 2 && tag.chars().all(|c| c.is_ascii_digit()) == true {
            // the parse cannot fail for two digits
            versions.insert(VhdlVersion::from_str(tag).unwrap());
        } else if strcmp::cmp_ignore_case(tag, "sim") == true {
            sim = true;
        } else if strcmp::cmp_ignore_case(tag, "syn") == true {
            syn = true;
        }
    }
    let usage = match (sim, syn) {
        (true, false) => Usage::SimOnly,
        (false, true) => Usage::SynOnly,
        _ => Usage::Universal,
    };
    Tags {
        versions: versions,
        usage: usage,
    }
}

/// The portion of a file name the style checker compares against the primary
/// design unit: the stem before any tags and the extension.
pub fn stem(file_name: &str) -> &str {
    match file_name.split_once('.') {
        Some((stem, _)) => stem,
        None => file_name,
    }
}

/// Checks if the `file` is a VHDL file (ending with .vhd or .vhdl).
pub fn is_vhdl(file: &str) -> bool {
    if let Some((_, ending)) = file.rsplit_once('.') {
        strcmp::cmp_ascii_ignore_case(ending, "vhd") || strcmp::cmp_ascii_ignore_case(ending, "vhdl")
    } else {
        false
    }
}

/// The options every filename pattern is matched with.
pub fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

/// Checks a bare file name against an optional directive pattern, falling
/// back to the default VHDL extensions.
pub fn matches_pattern(file_name: &str, pattern: Option<&glob::Pattern>) -> bool {
    match pattern {
        Some(p) => p.matches_with(file_name, match_options()),
        None => is_vhdl(file_name),
    }
}
