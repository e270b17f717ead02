use serde_derive::Serialize;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

/// A revision year of the VHDL standard.
///
/// Stored as the full four-digit year. Two-digit years map onto the century
/// they belong to: `93` is 1993, `08` is 2008.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VhdlVersion(u16);

/// The set of revisions a file is tagged compatible with; empty means the
/// file is universal.
pub type VersionSet = BTreeSet<VhdlVersion>;

impl VhdlVersion {
    pub const V1987: VhdlVersion = VhdlVersion(1987);
    pub const V1993: VhdlVersion = VhdlVersion(1993);
    pub const V2002: VhdlVersion = VhdlVersion(2002);
    pub const V2008: VhdlVersion = VhdlVersion(2008);
    pub const V2019: VhdlVersion = VhdlVersion(2019);

    /// Creates a version from a 2- or 4-digit year.
    pub fn new(year: u16) -> Self {
        if year < 70 {
            Self(year + 2000)
        } else if year < 100 {
            Self(year + 1900)
        } else {
            Self(year)
        }
    }

    pub fn get_year(&self) -> u16 {
        self.0
    }

    /// Selects the greatest version of `set` that does not exceed `desired`.
    pub fn closest_below(set: &VersionSet, desired: VhdlVersion) -> Option<VhdlVersion> {
        set.range(..=desired).next_back().copied()
    }
}

impl Default for VhdlVersion {
    fn default() -> Self {
        Self::V2008
    }
}

impl Display for VhdlVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

#[derive(Debug, PartialEq)]
pub enum VersionError {
    NotANumber(String),
    UnknownYear(u16),
}

impl std::error::Error for VersionError {}

impl Display for VersionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber(s) => write!(f, "'{}' is not a year", s),
            Self::UnknownYear(y) => write!(f, "'{}' is not a VHDL revision year", y),
        }
    }
}

impl FromStr for VhdlVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year: u16 = s
            .parse()
            .map_err(|_| VersionError::NotANumber(s.to_string()))?;
        // accept 2-digit tags and full years within the language's lifetime
        if s.len() != 2 && (year < 1970 || year > 2069) {
            return Err(VersionError::UnknownYear(year));
        }
        Ok(Self::new(year))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_two_digits() {
        assert_eq!(VhdlVersion::from_str("93"), Ok(VhdlVersion::V1993));
        assert_eq!(VhdlVersion::from_str("08"), Ok(VhdlVersion::V2008));
        assert_eq!(VhdlVersion::from_str("02"), Ok(VhdlVersion::V2002));
        assert_eq!(VhdlVersion::from_str("87"), Ok(VhdlVersion::V1987));
        assert_eq!(VhdlVersion::from_str("19"), Ok(VhdlVersion::V2019));
    }

    #[test]
    fn from_four_digits() {
        assert_eq!(VhdlVersion::from_str("1993"), Ok(VhdlVersion::V1993));
        assert_eq!(VhdlVersion::from_str("2008"), Ok(VhdlVersion::V2008));
        assert_eq!(
            VhdlVersion::from_str("1901"),
            Err(VersionError::UnknownYear(1901))
        );
        assert_eq!(
            VhdlVersion::from_str("199x"),
            Err(VersionError::NotANumber(String::from("199x")))
        );
    }

    #[test]
    fn displays_full_year() {
        assert_eq!(VhdlVersion::V1993.to_string(), "1993");
        assert_eq!(VhdlVersion::new(8).to_string(), "2008");
    }

    #[test]
    fn closest_selection() {
        let set: VersionSet = [VhdlVersion::V1993, VhdlVersion::V2008]
            .into_iter()
            .collect();
        assert_eq!(
            VhdlVersion::closest_below(&set, VhdlVersion::V2008),
            Some(VhdlVersion::V2008)
        );
        assert_eq!(
            VhdlVersion::closest_below(&set, VhdlVersion::V2002),
            Some(VhdlVersion::V1993)
        );
        assert_eq!(VhdlVersion::closest_below(&set, VhdlVersion::V1987), None);
    }
}
