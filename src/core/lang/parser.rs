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

//! Recognizes the handful of top-level VHDL constructs the dependency
//! analysis cares about.
//!
//! The recognition is a single pass over the reduced token stream; it makes
//! no attempt to follow the grammar beyond the patterns below. `work` is
//! replaced with the file's target library in everything produced here.

use super::identifier::Identifier;
use super::lexer::{Lexeme, Scan};
use super::unit::{DesignUnit, Reference};
use std::collections::HashSet;
use std::str::FromStr;

/// A design unit declaration found in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidedUnit {
    unit: DesignUnit,
    line: usize,
}

impl ProvidedUnit {
    pub fn get_unit(&self) -> &DesignUnit {
        &self.unit
    }

    pub fn get_line(&self) -> usize {
        self.line
    }
}

/// A requirement found in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredRef {
    reference: Reference,
    line: usize,
}

impl RequiredRef {
    pub fn get_reference(&self) -> &Reference {
        &self.reference
    }

    pub fn get_line(&self) -> usize {
        self.line
    }
}

#[derive(Debug, PartialEq)]
pub struct ParsedSource {
    provided: Vec<ProvidedUnit>,
    required: Vec<RequiredRef>,
    scope: Vec<Identifier>,
}

impl ParsedSource {
    pub fn get_provided(&self) -> &Vec<ProvidedUnit> {
        &self.provided
    }

    pub fn get_required(&self) -> &Vec<RequiredRef> {
        &self.required
    }

    /// The libraries visible to bare component instantiations, in
    /// declaration order. The file's own target library always leads.
    pub fn get_scope(&self) -> &Vec<Identifier> {
        &self.scope
    }

    pub fn into_parts(self) -> (Vec<ProvidedUnit>, Vec<RequiredRef>, Vec<Identifier>) {
        (self.provided, self.required, self.scope)
    }
}

fn word_at(tokens: &[Lexeme], i: usize) -> Option<Identifier> {
    Identifier::from_str(tokens.get(i)?.as_word()?).ok()
}

fn keyword_at(tokens: &[Lexeme], i: usize, kw: &str) -> bool {
    match tokens.get(i) {
        Some(t) => t.check_keyword(kw),
        None => false,
    }
}

fn delim_at(tokens: &[Lexeme], i: usize, d: char) -> bool {
    match tokens.get(i) {
        Some(t) => t.is_delim(d),
        None => false,
    }
}

fn is_builtin(library: &Identifier) -> bool {
    let folded = library.folded();
    folded == "ieee" || folded == "std"
}

/// Extracts the provided units and requirements from a scanned file.
pub fn parse(scan: &Scan, library: &Identifier) -> ParsedSource {
    let tokens = scan.get_tokens().as_slice();
    let mut provided: Vec<ProvidedUnit> = Vec::new();
    let mut required: Vec<RequiredRef> = Vec::new();
    let mut seen: HashSet<Reference> = HashSet::new();
    let mut scope: Vec<Identifier> = vec![library.clone()];

    // substitute the target library for the working library
    let resolve_lib = |lib: Option<Identifier>| -> Identifier {
        match lib {
            Some(l) => match l.is_work() {
                true => library.clone(),
                false => l,
            },
            None => library.clone(),
        }
    };

    let mut require = |reference: Reference, line: usize| {
        if seen.insert(reference.clone()) == true {
            required.push(RequiredRef {
                reference: reference,
                line: line,
            });
        }
    };

    let mut i = 0;
    while i < tokens.len() {
        let line = tokens[i].get_line();
        if tokens[i].is_delim(':') == true {
            // an instantiation statement of some form may follow a colon
            if let Some((reference, consumed)) = instantiation(tokens, i + 1, &resolve_lib) {
                require(reference, line);
                i += 1 + consumed;
            } else {
                i += 1;
            }
        } else if keyword_at(tokens, i, "entity") == true {
            if let Some(name) = word_at(tokens, i + 1) {
                if keyword_at(tokens, i + 2, "is") == true {
                    provided.push(ProvidedUnit {
                        unit: DesignUnit::entity(library.clone(), name),
                        line: line,
                    });
                    i += 3;
                    continue;
                }
            }
            i += 1;
        } else if keyword_at(tokens, i, "architecture") == true {
            match (word_at(tokens, i + 1), word_at(tokens, i + 3)) {
                (Some(name), Some(entity))
                    if keyword_at(tokens, i + 2, "of") == true
                        && keyword_at(tokens, i + 4, "is") == true =>
                {
                    provided.push(ProvidedUnit {
                        unit: DesignUnit::architecture(
                            library.clone(),
                            name,
                            entity.clone(),
                        ),
                        line: line,
                    });
                    require(
                        Reference::ArchitectureOf {
                            library: library.clone(),
                            entity: entity,
                        },
                        line,
                    );
                    i += 5;
                }
                _ => i += 1,
            }
        } else if keyword_at(tokens, i, "package") == true {
            if keyword_at(tokens, i + 1, "body") == true {
                match word_at(tokens, i + 2) {
                    Some(name) if keyword_at(tokens, i + 3, "is") == true => {
                        provided.push(ProvidedUnit {
                            unit: DesignUnit::package_body(library.clone(), name.clone()),
                            line: line,
                        });
                        require(
                            Reference::BodyOf {
                                library: library.clone(),
                                package: name,
                            },
                            line,
                        );
                        i += 4;
                    }
                    _ => i += 1,
                }
            } else {
                match word_at(tokens, i + 1) {
                    Some(name) if keyword_at(tokens, i + 2, "is") == true => {
                        provided.push(ProvidedUnit {
                            unit: DesignUnit::package(library.clone(), name),
                            line: line,
                        });
                        i += 3;
                    }
                    _ => i += 1,
                }
            }
        } else if keyword_at(tokens, i, "configuration") == true {
            match (word_at(tokens, i + 1), word_at(tokens, i + 3)) {
                (Some(name), Some(entity))
                    if keyword_at(tokens, i + 2, "of") == true
                        && keyword_at(tokens, i + 4, "is") == true =>
                {
                    provided.push(ProvidedUnit {
                        unit: DesignUnit::configuration(library.clone(), name),
                        line: line,
                    });
                    require(
                        Reference::Entity {
                            library: library.clone(),
                            name: entity,
                            architecture: None,
                        },
                        line,
                    );
                    i += 5;
                }
                _ => i += 1,
            }
        } else if keyword_at(tokens, i, "library") == true {
            // `library L1, L2;` extends the component lookup scope
            let mut j = i + 1;
            while let Some(l) = word_at(tokens, j) {
                if l.is_work() == false && scope.contains(&l) == false {
                    scope.push(l);
                }
                j += 1;
                if delim_at(tokens, j, ',') == true {
                    j += 1;
                } else {
                    break;
                }
            }
            i = j;
        } else if keyword_at(tokens, i, "use") == true {
            match (word_at(tokens, i + 1), word_at(tokens, i + 3)) {
                (Some(lib), Some(name)) if delim_at(tokens, i + 2, '.') == true => {
                    // built-in libraries are satisfied by fiat
                    if is_builtin(&lib) == false {
                        require(
                            Reference::Package {
                                library: resolve_lib(Some(lib)),
                                name: name,
                            },
                            line,
                        );
                    }
                    i += 4;
                }
                _ => i += 1,
            }
        } else {
            i += 1;
        }
    }

    ParsedSource {
        provided: provided,
        required: required,
        scope: scope,
    }
}

/// Tries to read one instantiation form starting just past a colon.
///
/// Returns the reference and the number of tokens consumed past the colon.
fn instantiation<F>(tokens: &[Lexeme], j: usize, resolve_lib: &F) -> Option<(Reference, usize)>
where
    F: Fn(Option<Identifier>) -> Identifier,
{
    if keyword_at(tokens, j, "entity") == true {
        let first = word_at(tokens, j + 1)?;
        let (library, name, mut consumed) =
            if delim_at(tokens, j + 2, '.') == true && word_at(tokens, j + 3).is_some() {
                (Some(first), word_at(tokens, j + 3)?, 4)
            } else {
                (None, first, 2)
            };
        // an optional architecture selection trails in parentheses
        let architecture = if delim_at(tokens, j + consumed, '(') == true
            && delim_at(tokens, j + consumed + 2, ')') == true
        {
            let arch = word_at(tokens, j + consumed + 1)?;
            consumed += 3;
            Some(arch)
        } else {
            None
        };
        Some((
            Reference::Entity {
                library: resolve_lib(library),
                name: name,
                architecture: architecture,
            },
            consumed,
        ))
    } else if keyword_at(tokens, j, "configuration") == true {
        let first = word_at(tokens, j + 1)?;
        let (library, name, consumed) =
            if delim_at(tokens, j + 2, '.') == true && word_at(tokens, j + 3).is_some() {
                (Some(first), word_at(tokens, j + 3)?, 4)
            } else {
                (None, first, 2)
            };
        Some((
            Reference::Configuration {
                library: resolve_lib(library),
                name: name,
            },
            consumed,
        ))
    } else if keyword_at(tokens, j, "component") == true {
        Some((
            Reference::Component {
                name: word_at(tokens, j + 1)?,
            },
            2,
        ))
    } else {
        // `label : name port map` / `label : name generic map`
        let name = word_at(tokens, j)?;
        let map_follows = (keyword_at(tokens, j + 1, "port") == true
            || keyword_at(tokens, j + 1, "generic") == true)
            && keyword_at(tokens, j + 2, "map") == true;
        match map_follows {
            true => Some((Reference::Component { name: name }, 3)),
            false => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::lang::lexer;

    fn iden(s: &str) -> Identifier {
        Identifier::from_str(s).unwrap()
    }

    fn parse_str(src: &str) -> ParsedSource {
        parse(&lexer::scan(src), &Identifier::new_working())
    }

    fn units(p: &ParsedSource) -> Vec<DesignUnit> {
        p.get_provided().iter().map(|u| u.get_unit().clone()).collect()
    }

    fn refs(p: &ParsedSource) -> Vec<Reference> {
        p.get_required()
            .iter()
            .map(|r| r.get_reference().clone())
            .collect()
    }

    #[test]
    fn entity_declaration() {
        let p = parse_str("entity adder is\nport (a : in bit);\nend entity adder;");
        assert_eq!(units(&p), vec![DesignUnit::entity(iden("work"), iden("adder"))]);
        assert_eq!(refs(&p).is_empty(), true);
    }

    #[test]
    fn architecture_requires_entity() {
        let p = parse_str("architecture rtl of adder is\nbegin\nend;");
        assert_eq!(
            units(&p),
            vec![DesignUnit::architecture(iden("work"), iden("rtl"), iden("adder"))]
        );
        assert_eq!(
            refs(&p),
            vec![Reference::ArchitectureOf {
                library: iden("work"),
                entity: iden("adder"),
            }]
        );
    }

    #[test]
    fn package_and_body() {
        let p = parse_str("package util_pkg is\nend package;\npackage body util_pkg is\nend;");
        assert_eq!(
            units(&p),
            vec![
                DesignUnit::package(iden("work"), iden("util_pkg")),
                DesignUnit::package_body(iden("work"), iden("util_pkg")),
            ]
        );
        assert_eq!(
            refs(&p),
            vec![Reference::BodyOf {
                library: iden("work"),
                package: iden("util_pkg"),
            }]
        );
    }

    #[test]
    fn use_clauses_skip_builtins() {
        let p = parse_str(
            "library ieee;\nuse ieee.std_logic_1164.all;\nuse work.util_pkg.all;\nentity t is end;",
        );
        assert_eq!(
            refs(&p),
            vec![Reference::Package {
                library: iden("work"),
                name: iden("util_pkg"),
            }]
        );
        // `ieee` still lands in the component scope after the target library
        assert_eq!(p.get_scope(), &vec![iden("work"), iden("ieee")]);
    }

    #[test]
    fn direct_instantiations() {
        let p = parse_str(
            "architecture a of t is begin\n\
             u0 : entity work.adder(rtl) port map (x, y);\n\
             u1 : entity sub port map (x);\n\
             u2 : configuration work.adder_cfg;\n\
             end;",
        );
        let r = refs(&p);
        assert_eq!(r.contains(&Reference::Entity {
            library: iden("work"),
            name: iden("adder"),
            architecture: Some(iden("rtl")),
        }), true);
        assert_eq!(r.contains(&Reference::Entity {
            library: iden("work"),
            name: iden("sub"),
            architecture: None,
        }), true);
        assert_eq!(r.contains(&Reference::Configuration {
            library: iden("work"),
            name: iden("adder_cfg"),
        }), true);
    }

    #[test]
    fn component_instantiations() {
        let p = parse_str(
            "architecture a of t is begin\n\
             u0 : component fifo;\n\
             u1 : clk_gate port map (clk);\n\
             u2 : regfile generic map (W => 8);\n\
             end;",
        );
        assert_eq!(
            refs(&p),
            vec![
                Reference::ArchitectureOf {
                    library: iden("work"),
                    entity: iden("t"),
                },
                Reference::Component { name: iden("fifo") },
                Reference::Component {
                    name: iden("clk_gate")
                },
                Reference::Component {
                    name: iden("regfile")
                },
            ]
        );
    }

    #[test]
    fn signal_declarations_are_not_components() {
        let p = parse_str(
            "architecture a of t is\nsignal s : std_logic;\nconstant c : integer := 0;\nbegin\nend;",
        );
        assert_eq!(
            refs(&p),
            vec![Reference::ArchitectureOf {
                library: iden("work"),
                entity: iden("t"),
            }]
        );
    }

    #[test]
    fn configuration_declaration() {
        let p = parse_str("configuration cfg of adder is\nfor rtl\nend for;\nend;");
        assert_eq!(
            units(&p),
            vec![DesignUnit::configuration(iden("work"), iden("cfg"))]
        );
        assert_eq!(
            refs(&p),
            vec![Reference::Entity {
                library: iden("work"),
                name: iden("adder"),
                architecture: None,
            }]
        );
    }

    #[test]
    fn target_library_overrides_work() {
        let p = parse(
            &lexer::scan("entity e is end;\narchitecture a of e is begin\nu : entity work.sub;\nend;"),
            &iden("mylib"),
        );
        assert_eq!(
            units(&p),
            vec![
                DesignUnit::entity(iden("mylib"), iden("e")),
                DesignUnit::architecture(iden("mylib"), iden("a"), iden("e")),
            ]
        );
        assert_eq!(refs(&p).contains(&Reference::Entity {
            library: iden("mylib"),
            name: iden("sub"),
            architecture: None,
        }), true);
    }

    #[test]
    fn duplicate_requirements_collapse() {
        let p = parse_str(
            "use work.util_pkg.all;\nuse work.util_pkg.all;\nentity t is end;",
        );
        assert_eq!(refs(&p).len(), 1);
    }

    #[test]
    fn end_entity_is_not_a_declaration() {
        let p = parse_str("entity t is\nend entity t;\npackage p_pkg is\nend package p_pkg;");
        assert_eq!(
            units(&p),
            vec![
                DesignUnit::entity(iden("work"), iden("t")),
                DesignUnit::package(iden("work"), iden("p_pkg")),
            ]
        );
    }
}
