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
use serde_derive::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Classifies a design unit declaration.
///
/// An architecture carries the entity it is bound to, which keeps two
/// same-named architectures of different entities apart in the index. A
/// package body shares its package's name by language rule, and a
/// configuration is referenced by bare name, so neither needs an owner
/// field; their binding to the primary unit travels as a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum UnitKind {
    Entity,
    Architecture { entity: Identifier },
    Package,
    PackageBody,
    Configuration,
}

impl UnitKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Architecture { .. } => "architecture",
            Self::Package => "package",
            Self::PackageBody => "package-body",
            Self::Configuration => "configuration",
        }
    }

    /// Checks if units of this kind are named at library scope.
    pub fn is_primary(&self) -> bool {
        match self {
            Self::Entity | Self::Package | Self::Configuration => true,
            Self::Architecture { .. } | Self::PackageBody => false,
        }
    }
}

/// A fully-qualified design unit declaration.
///
/// Doubles as the unit index key: two declarations collide exactly when
/// library, kind, and name all match (case-folded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DesignUnit {
    library: Identifier,
    name: Identifier,
    kind: UnitKind,
}

impl DesignUnit {
    pub fn new(library: Identifier, name: Identifier, kind: UnitKind) -> Self {
        Self {
            library: library,
            name: name,
            kind: kind,
        }
    }

    pub fn entity(library: Identifier, name: Identifier) -> Self {
        Self::new(library, name, UnitKind::Entity)
    }

    pub fn package(library: Identifier, name: Identifier) -> Self {
        Self::new(library, name, UnitKind::Package)
    }

    pub fn architecture(library: Identifier, name: Identifier, entity: Identifier) -> Self {
        Self::new(library, name, UnitKind::Architecture { entity: entity })
    }

    pub fn package_body(library: Identifier, package: Identifier) -> Self {
        Self::new(library, package, UnitKind::PackageBody)
    }

    pub fn configuration(library: Identifier, name: Identifier) -> Self {
        Self::new(library, name, UnitKind::Configuration)
    }

    pub fn get_library(&self) -> &Identifier {
        &self.library
    }

    pub fn get_name(&self) -> &Identifier {
        &self.name
    }

    pub fn get_kind(&self) -> &UnitKind {
        &self.kind
    }
}

impl Display for DesignUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            UnitKind::Architecture { entity } => write!(
                f,
                "{} {}.{}({})",
                self.kind.describe(),
                self.library,
                self.name,
                entity
            ),
            _ => write!(
                f,
                "{} {}.{}",
                self.kind.describe(),
                self.library,
                self.name
            ),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum UnitParseError {
    MissingKind,
    UnknownKind(String),
    MissingName,
    BadIdentifier(String),
    MissingOwner,
}

impl std::error::Error for UnitParseError {}

impl Display for UnitParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKind => write!(f, "missing design unit kind"),
            Self::UnknownKind(s) => write!(f, "unknown design unit kind '{}'", s),
            Self::MissingName => write!(f, "missing library-qualified name"),
            Self::BadIdentifier(s) => write!(f, "bad identifier '{}'", s),
            Self::MissingOwner => write!(f, "missing primary unit name"),
        }
    }
}

fn parse_iden(s: &str) -> Result<Identifier, UnitParseError> {
    Identifier::from_str(s).map_err(|_| UnitParseError::BadIdentifier(s.to_string()))
}

/// Splits `lib.name(owner)` notation into its parts.
fn parse_qualified(
    s: &str,
) -> Result<(Identifier, Identifier, Option<Identifier>), UnitParseError> {
    let (stem, owner) = match s.split_once('(') {
        Some((stem, rest)) => match rest.strip_suffix(')') {
            Some(inner) => (stem, Some(parse_iden(inner)?)),
            None => return Err(UnitParseError::BadIdentifier(s.to_string())),
        },
        None => (s, None),
    };
    let (lib, name) = stem
        .split_once('.')
        .ok_or(UnitParseError::MissingName)?;
    Ok((parse_iden(lib)?, parse_iden(name)?, owner))
}

impl FromStr for DesignUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .trim()
            .split_once(' ')
            .ok_or(UnitParseError::MissingKind)?;
        let (library, name, owner) = parse_qualified(rest.trim())?;
        let kind = match kind {
            "entity" => UnitKind::Entity,
            "package" => UnitKind::Package,
            "package-body" => UnitKind::PackageBody,
            "architecture" => UnitKind::Architecture {
                entity: owner.ok_or(UnitParseError::MissingOwner)?,
            },
            "configuration" => UnitKind::Configuration,
            _ => return Err(UnitParseError::UnknownKind(kind.to_string())),
        };
        Ok(Self::new(library, name, kind))
    }
}

/// A requirement one file places on a design unit somewhere else.
///
/// The `work` library has already been replaced with the consumer's target
/// library by the time one of these exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Reference {
    /// Direct instantiation: `: entity lib.name(arch)`.
    Entity {
        library: Identifier,
        name: Identifier,
        architecture: Option<Identifier>,
    },
    /// Direct instantiation of a configuration: `: configuration lib.name`.
    Configuration {
        library: Identifier,
        name: Identifier,
    },
    /// Package import: `use lib.name.all`.
    Package {
        library: Identifier,
        name: Identifier,
    },
    /// Bare component instantiation, resolved against the libraries in scope.
    Component { name: Identifier },
    /// Implicit edge from an architecture to its entity.
    ArchitectureOf {
        library: Identifier,
        entity: Identifier,
    },
    /// Implicit edge from a package body to its package.
    BodyOf {
        library: Identifier,
        package: Identifier,
    },
}

impl Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entity {
                library,
                name,
                architecture,
            } => match architecture {
                Some(a) => write!(f, "entity {}.{}({})", library, name, a),
                None => write!(f, "entity {}.{}", library, name),
            },
            Self::Configuration { library, name } => {
                write!(f, "configuration {}.{}", library, name)
            }
            Self::Package { library, name } => write!(f, "package {}.{}", library, name),
            Self::Component { name } => write!(f, "component {}", name),
            Self::ArchitectureOf { library, entity } => {
                write!(f, "architecture-of {}.{}", library, entity)
            }
            Self::BodyOf { library, package } => write!(f, "body-of {}.{}", library, package),
        }
    }
}

impl FromStr for Reference {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .trim()
            .split_once(' ')
            .ok_or(UnitParseError::MissingKind)?;
        let rest = rest.trim();
        if kind == "component" {
            return Ok(Self::Component {
                name: parse_iden(rest)?,
            });
        }
        let (library, name, owner) = parse_qualified(rest)?;
        Ok(match kind {
            "entity" => Self::Entity {
                library: library,
                name: name,
                architecture: owner,
            },
            "configuration" => Self::Configuration {
                library: library,
                name: name,
            },
            "package" => Self::Package {
                library: library,
                name: name,
            },
            "architecture-of" => Self::ArchitectureOf {
                library: library,
                entity: name,
            },
            "body-of" => Self::BodyOf {
                library: library,
                package: name,
            },
            _ => return Err(UnitParseError::UnknownKind(kind.to_string())),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn iden(s: &str) -> Identifier {
        Identifier::from_str(s).unwrap()
    }

    #[test]
    fn unit_round_trip() {
        let units = vec![
            DesignUnit::entity(iden("work"), iden("adder")),
            DesignUnit::package(iden("util"), iden("mem_pkg")),
            DesignUnit::package_body(iden("util"), iden("mem_pkg")),
            DesignUnit::architecture(iden("work"), iden("rtl"), iden("adder")),
            DesignUnit::configuration(iden("work"), iden("cfg")),
        ];
        for unit in units {
            let text = unit.to_string();
            assert_eq!(DesignUnit::from_str(&text), Ok(unit), "text was {}", text);
        }
    }

    #[test]
    fn reference_round_trip() {
        let refs = vec![
            Reference::Entity {
                library: iden("work"),
                name: iden("adder"),
                architecture: None,
            },
            Reference::Entity {
                library: iden("work"),
                name: iden("adder"),
                architecture: Some(iden("rtl")),
            },
            Reference::Configuration {
                library: iden("work"),
                name: iden("cfg"),
            },
            Reference::Package {
                library: iden("util"),
                name: iden("mem_pkg"),
            },
            Reference::Component { name: iden("fifo") },
            Reference::ArchitectureOf {
                library: iden("work"),
                entity: iden("adder"),
            },
            Reference::BodyOf {
                library: iden("util"),
                package: iden("mem_pkg"),
            },
        ];
        for r in refs {
            let text = r.to_string();
            assert_eq!(Reference::from_str(&text), Ok(r), "text was {}", text);
        }
    }

    #[test]
    fn unit_display() {
        assert_eq!(
            DesignUnit::architecture(iden("work"), iden("rtl"), iden("adder")).to_string(),
            "architecture work.rtl(adder)"
        );
        assert_eq!(
            DesignUnit::package_body(iden("work"), iden("mem_pkg")).to_string(),
            "package-body work.mem_pkg"
        );
    }

    #[test]
    fn keys_fold_case() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(DesignUnit::entity(iden("WORK"), iden("Adder")), 1);
        assert_eq!(
            map.get(&DesignUnit::entity(iden("work"), iden("adder"))),
            Some(&1)
        );
    }
}
