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

use super::identifier::Identifier;
use std::str::FromStr;

/// An inline pragma carried by a comment.
///
/// Ignore pragmas mark a reference as satisfied during resolution. The
/// simulation timeout is passed through verbatim for downstream simulators.
#[derive(Debug, Clone, PartialEq)]
pub enum Pragma {
    IgnoreEntity(Identifier),
    IgnoreComponent(Identifier),
    IgnorePackage(Identifier),
    SimulationTimeout(String),
}

impl Pragma {
    /// Tries to interpret one comment's text as a pragma.
    ///
    /// Anything that is not a recognized pragma yields `None`; unknown
    /// pragma bodies are silently ignored.
    pub fn scan(comment: &str) -> Option<Pragma> {
        let mut words = comment.split_whitespace();
        if words.next()? != "pragma" {
            return None;
        }
        match words.next()? {
            "vhdeps" => {
                if words.next()? != "ignore" {
                    return None;
                }
                let kind = words.next()?;
                // a dotted name keeps only its final segment; matching is
                // done on bare unit names
                let name = words.next()?;
                let name = name.rsplit_once('.').map(|(_, n)| n).unwrap_or(name);
                let name = Identifier::from_str(name).ok()?;
                match kind {
                    "entity" => Some(Self::IgnoreEntity(name)),
                    "component" => Some(Self::IgnoreComponent(name)),
                    "package" => Some(Self::IgnorePackage(name)),
                    _ => None,
                }
            }
            "simulation" => {
                if words.next()? != "timeout" {
                    return None;
                }
                let value = words.next()?;
                let unit = words.next()?;
                if is_time_value(value) == false || is_time_unit(unit) == false {
                    return None;
                }
                Some(Self::SimulationTimeout(format!("{} {}", value, unit)))
            }
            _ => None,
        }
    }
}

/// Checks for `digits` optionally followed by `.digits`.
fn is_time_value(s: &str) -> bool {
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (s, None),
    };
    if whole.is_empty() == true || whole.chars().all(|c| c.is_ascii_digit()) == false {
        return false;
    }
    match frac {
        Some(f) => f.chars().all(|c| c.is_ascii_digit()),
        None => true,
    }
}

fn is_time_unit(s: &str) -> bool {
    match s {
        "s" | "ms" | "us" | "ns" | "ps" => true,
        _ => false,
    }
}
