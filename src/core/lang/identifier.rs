//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::util::strcmp;
use serde_derive::Serialize;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;

/// A VHDL identifier.
///
/// Basic identifiers are case-insensitive; the original spelling is kept for
/// display only. Extended identifiers (`\...\`) compare verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    Basic(String),
    Extended(String),
}

impl Identifier {
    /// Creates a new basic identifier for the working library: `work`.
    pub fn new_working() -> Self {
        Self::Basic(String::from("work"))
    }

    // Returns the reference to the inner `String` struct.
    fn as_str(&self) -> &str {
        match self {
            Self::Basic(id) => id.as_ref(),
            Self::Extended(id) => id.as_ref(),
        }
    }

    /// Checks if `self` is an extended identifier or not.
    fn is_extended(&self) -> bool {
        match self {
            Self::Extended(_) => true,
            Self::Basic(_) => false,
        }
    }

    /// Checks if the identifier names the implicit working library.
    pub fn is_work(&self) -> bool {
        self.is_extended() == false && strcmp::cmp_ignore_case(self.as_str(), "work")
    }

    /// Produces the form used for ordering and hashing.
    pub fn folded(&self) -> String {
        match self {
            Self::Basic(id) => strcmp::fold(id),
            Self::Extended(id) => id.clone(),
        }
    }
}

impl std::cmp::Eq for Identifier {}

impl std::cmp::PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        // instantly not equal if they are not of same type
        if self.is_extended() != other.is_extended() {
            return false;
        }
        // compare with case sensitivity
        if self.is_extended() == true {
            self.as_str() == other.as_str()
        // compare without case sensitivity
        } else {
            strcmp::cmp_ignore_case(self.as_str(), other.as_str())
        }
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Basic(id) => strcmp::fold(id).hash(state),
            Self::Extended(id) => id.hash(state),
        }
    }
}

impl std::cmp::PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Identifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.folded().cmp(&other.folded())
    }
}

#[derive(Debug, PartialEq)]
pub enum IdentifierError {
    Empty,
    InvalidFirstChar(char),
    InvalidChar(char),
    UnclosedExtended,
    CharsAfterDelimiter(String),
}

impl std::error::Error for IdentifierError {}

impl Display for IdentifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty identifier"),
            Self::InvalidFirstChar(c) => {
                write!(f, "first character must be letter but found '{}'", c)
            }
            Self::InvalidChar(c) => write!(f, "invalid character '{}'", c),
            Self::UnclosedExtended => write!(f, "missing closing backslash"),
            Self::CharsAfterDelimiter(s) => write!(
                f,
                "characters '{}' found following closing extended backslash",
                s
            ),
        }
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars().peekable();
        match chars.next() {
            Some('\\') => {
                // collect until the closing backslash; a doubled backslash is literal
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.peek() {
                            Some('\\') => {
                                inner.push(chars.next().unwrap());
                            }
                            _ => break,
                        },
                        Some(c) => inner.push(c),
                        None => return Err(Self::Err::UnclosedExtended),
                    }
                }
                let rem: String = chars.collect();
                match rem.is_empty() {
                    true => Ok(Self::Extended(inner)),
                    false => Err(Self::Err::CharsAfterDelimiter(rem)),
                }
            }
            Some(c) => {
                if c.is_alphabetic() == false {
                    return Err(Self::Err::InvalidFirstChar(c));
                }
                let mut inner = String::from(c);
                for c in chars {
                    if c.is_alphanumeric() == true || c == '_' {
                        inner.push(c);
                    } else {
                        return Err(Self::Err::InvalidChar(c));
                    }
                }
                Ok(Self::Basic(inner))
            }
            None => Err(Self::Err::Empty),
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic(id) => write!(f, "{}", id),
            Self::Extended(id) => write!(f, "\\{}\\", id.replace('\\', r#"\\"#)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn case_insensitive_equality() {
        let a = Identifier::from_str("ADDER").unwrap();
        let b = Identifier::from_str("adder").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.folded(), b.folded());
    }

    #[test]
    fn extended_is_case_sensitive() {
        let a = Identifier::from_str(r"\Adder\").unwrap();
        let b = Identifier::from_str(r"\adder\").unwrap();
        assert_ne!(a, b);
        // an extended identifier never equals a basic one
        assert_ne!(a, Identifier::from_str("Adder").unwrap());
    }

    #[test]
    fn parse_rejections() {
        assert_eq!(Identifier::from_str(""), Err(IdentifierError::Empty));
        assert_eq!(
            Identifier::from_str("2fast"),
            Err(IdentifierError::InvalidFirstChar('2'))
        );
        assert_eq!(
            Identifier::from_str("a-b"),
            Err(IdentifierError::InvalidChar('-'))
        );
        assert_eq!(
            Identifier::from_str(r"\abc"),
            Err(IdentifierError::UnclosedExtended)
        );
        assert_eq!(
            Identifier::from_str(r"\abc\xyz"),
            Err(IdentifierError::CharsAfterDelimiter(String::from("xyz")))
        );
    }

    #[test]
    fn displays_original_spelling() {
        assert_eq!(
            Identifier::from_str("MyEntity").unwrap().to_string(),
            "MyEntity"
        );
        assert_eq!(
            Identifier::from_str(r"\My Entity\").unwrap().to_string(),
            r"\My Entity\"
        );
    }

    #[test]
    fn working_library() {
        assert_eq!(Identifier::new_working().is_work(), true);
        assert_eq!(Identifier::from_str("WORK").unwrap().is_work(), true);
        assert_eq!(Identifier::from_str("worker").unwrap().is_work(), false);
    }
}
