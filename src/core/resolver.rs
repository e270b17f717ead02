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

//! Reverse reachability from the toplevel set.
//!
//! Every requirement of every reached file is pushed through the unit index;
//! the providers that answer become nodes and edges of the file graph. An
//! edge `u -> v` means "u must be compiled before v".

use crate::core::index::{Filters, Lookup, UnitIndex};
use crate::core::include::InclusionMode;
use crate::core::lang::identifier::Identifier;
use crate::core::lang::unit::{DesignUnit, Reference, UnitKind};
use crate::core::source::SourceFile;
use crate::error::{Diagnostic, DiagnosticList, Locus};
use crate::util::graphmap::GraphMap;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

/// Why one file must precede another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeKind {
    PackageUse,
    DirectInstantiation,
    ComponentInstantiation,
    ArchitectureOf,
    BodyOf,
}

/// The file-level dependency DAG of one resolution.
#[derive(Debug)]
pub struct Resolved {
    pub(crate) graph: GraphMap<PathBuf, usize, EdgeKind>,
    pub(crate) topset: HashSet<usize>,
    pub(crate) diagnostics: DiagnosticList,
}

struct Walker<'a> {
    index: &'a UnitIndex<'a>,
    files: &'a [SourceFile],
    filters: &'a Filters,
    ignored: &'a [Identifier],
    graph: GraphMap<PathBuf, usize, EdgeKind>,
    topset: HashSet<usize>,
    diagnostics: DiagnosticList,
    queue: VecDeque<usize>,
    seen: HashSet<usize>,
}

/// Builds the dependency graph reachable from the `seeds` files.
pub(crate) fn resolve(
    index: &UnitIndex,
    filters: &Filters,
    ignored: &[Identifier],
    seeds: &[usize],
) -> Resolved {
    let mut walker = Walker {
        index: index,
        files: index.get_files(),
        filters: filters,
        ignored: ignored,
        graph: GraphMap::new(),
        topset: seeds.iter().copied().collect(),
        diagnostics: DiagnosticList::new(),
        queue: VecDeque::new(),
        seen: HashSet::new(),
    };
    for &seed in seeds {
        walker.reach(seed);
    }
    while let Some(f) = walker.queue.pop_front() {
        walker.visit(f);
    }
    // only cross-file cycles can exist here; an intra-file
    // architecture/entity or body/package pair never forms an edge
    for cycle in walker.graph.get_graph().find_cycles() {
        let members = cycle
            .into_iter()
            .map(|n| walker.graph.get_key_by_index(n).unwrap().clone())
            .collect();
        walker.diagnostics.push(Diagnostic::Cycle(members));
    }
    Resolved {
        graph: walker.graph,
        topset: walker.topset,
        diagnostics: walker.diagnostics,
    }
}

impl<'a> Walker<'a> {
    /// Admits a file into the graph and schedules its first visit.
    fn reach(&mut self, f: usize) {
        self.graph.add_node(self.files[f].get_path().clone(), f);
        if self.seen.insert(f) == true {
            self.queue.push_back(f);
        }
    }

    /// Records that `provider` must be compiled before `consumer`.
    ///
    /// A file satisfying its own reference needs no edge; its internal
    /// declaration order is taken as given.
    fn connect(&mut self, provider: usize, consumer: usize, kind: EdgeKind) {
        if provider == consumer {
            return;
        }
        self.reach(provider);
        self.graph.add_edge_by_key(
            self.files[provider].get_path(),
            self.files[consumer].get_path(),
            kind,
        );
    }

    fn is_ignored_library(&self, library: &Identifier) -> bool {
        self.ignored.iter().any(|l| l == library)
    }

    /// Processes one lookup result for `consumer`.
    fn admit(
        &mut self,
        consumer: usize,
        unit: &DesignUnit,
        lookup: Lookup,
        kind: EdgeKind,
        reference: &Reference,
        line: usize,
    ) {
        match lookup {
            Lookup::Hit(p) => self.connect(p, consumer, kind),
            Lookup::Ambiguous { chosen, candidates } => {
                self.diagnostics.push(Diagnostic::DuplicateProvider {
                    unit: unit.to_string(),
                    candidates: candidates
                        .into_iter()
                        .map(|c| self.files[c].get_path().clone())
                        .collect(),
                });
                // the deterministic pick keeps the analysis going so later
                // diagnostics still surface in the same run
                self.connect(chosen, consumer, kind);
            }
            Lookup::Miss { filtered, dropped } => {
                self.unresolved(consumer, reference, line, filtered, dropped);
            }
        }
    }

    /// Reports a reference nothing qualified to provide.
    ///
    /// Black-box mode only excuses component instantiations and package
    /// imports. A direct instantiation must name a concrete provider, and
    /// the implicit secondary-unit edges bind by language rule, so those
    /// stay fatal in every mode.
    fn unresolved(
        &mut self,
        consumer: usize,
        reference: &Reference,
        line: usize,
        filtered: Vec<String>,
        dropped: Vec<usize>,
    ) {
        let file = &self.files[consumer];
        let permitted = match reference {
            Reference::Component { .. } | Reference::Package { .. } => {
                file.get_mode() == InclusionMode::BlackBox
            }
            _ => false,
        };
        let locus = Locus::with_line(file.get_path().clone(), line);
        let mut details = filtered;
        for d in dropped {
            details.push(format!(
                "a provider in {} was dropped for parse anomalies",
                self.files[d].get_path().display()
            ));
        }
        self.diagnostics.push(Diagnostic::UnresolvedReference {
            locus: locus,
            reference: reference.to_string(),
            details: details,
            permitted: permitted,
        });
    }

    /// Resolves a bare component instantiation.
    ///
    /// Tries each library in the consumer's scope, in declaration order, for
    /// an entity of the component's name; the first hit binds. A component
    /// with no matching entity anywhere is a black box.
    fn component(&mut self, consumer: usize, name: &Identifier, reference: &Reference, line: usize) {
        let files = self.files;
        let mut misses = Vec::new();
        for library in files[consumer].get_scope() {
            if self.is_ignored_library(library) == true {
                continue;
            }
            let unit = DesignUnit::entity(library.clone(), name.clone());
            match self.index.lookup(&unit, self.filters) {
                Lookup::Miss { mut filtered, mut dropped } => {
                    misses.append(&mut filtered);
                    for d in dropped.drain(..) {
                        misses.push(format!(
                            "a provider in {} was dropped for parse anomalies",
                            files[d].get_path().display()
                        ));
                    }
                }
                lookup => {
                    self.admit(
                        consumer,
                        &unit,
                        lookup,
                        EdgeKind::ComponentInstantiation,
                        reference,
                        line,
                    );
                    return;
                }
            }
        }
        let searched = files[consumer]
            .get_scope()
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        misses.push(format!("no matching entity in scope ({})", searched));
        self.unresolved(consumer, reference, line, misses, Vec::new());
    }

    /// Resolves every requirement of `f` and pulls in the secondary units
    /// belonging to what it provides.
    fn visit(&mut self, f: usize) {
        let files = self.files;
        let file = &files[f];

        for req in file.get_required() {
            let line = req.get_line();
            let reference = req.get_reference();
            if file.ignores(reference) == true {
                self.diagnostics.push(Diagnostic::UnresolvedReference {
                    locus: Locus::with_line(file.get_path().clone(), line),
                    reference: reference.to_string(),
                    details: vec![String::from("satisfied by an ignore pragma")],
                    permitted: true,
                });
                continue;
            }
            match reference {
                Reference::Package { library, name } => {
                    if self.is_ignored_library(library) == true {
                        continue;
                    }
                    let unit = DesignUnit::package(library.clone(), name.clone());
                    let lookup = self.index.lookup(&unit, self.filters);
                    self.admit(f, &unit, lookup, EdgeKind::PackageUse, reference, line);
                }
                Reference::Entity {
                    library,
                    name,
                    architecture,
                } => {
                    if self.is_ignored_library(library) == true {
                        continue;
                    }
                    let unit = DesignUnit::entity(library.clone(), name.clone());
                    let lookup = self.index.lookup(&unit, self.filters);
                    self.admit(
                        f,
                        &unit,
                        lookup,
                        EdgeKind::DirectInstantiation,
                        reference,
                        line,
                    );
                    // a named architecture must exist on its own account
                    if let Some(arch) = architecture {
                        let unit = DesignUnit::architecture(
                            library.clone(),
                            arch.clone(),
                            name.clone(),
                        );
                        let lookup = self.index.lookup(&unit, self.filters);
                        self.admit(
                            f,
                            &unit,
                            lookup,
                            EdgeKind::DirectInstantiation,
                            reference,
                            line,
                        );
                    }
                }
                Reference::Configuration { library, name } => {
                    if self.is_ignored_library(library) == true {
                        continue;
                    }
                    let unit = DesignUnit::configuration(library.clone(), name.clone());
                    let lookup = self.index.lookup(&unit, self.filters);
                    self.admit(
                        f,
                        &unit,
                        lookup,
                        EdgeKind::DirectInstantiation,
                        reference,
                        line,
                    );
                }
                Reference::Component { name } => {
                    self.component(f, name, reference, line);
                }
                Reference::ArchitectureOf { library, entity } => {
                    let unit = DesignUnit::entity(library.clone(), entity.clone());
                    let lookup = self.index.lookup(&unit, self.filters);
                    self.admit(f, &unit, lookup, EdgeKind::ArchitectureOf, reference, line);
                }
                Reference::BodyOf { library, package } => {
                    let unit = DesignUnit::package(library.clone(), package.clone());
                    let lookup = self.index.lookup(&unit, self.filters);
                    self.admit(f, &unit, lookup, EdgeKind::BodyOf, reference, line);
                }
            }
        }

        self.pull_secondaries(f);
    }

    /// A selected entity brings its known architectures along; a selected
    /// package brings its body. Toplevel membership follows, so the final
    /// compile step of a toplevel entity is its architecture file.
    fn pull_secondaries(&mut self, f: usize) {
        let files = self.files;
        let file = &files[f];
        for provided in file.get_provided() {
            let unit = provided.get_unit();
            match unit.get_kind() {
                UnitKind::Entity => {
                    let decls = self.index.architectures_of(
                        unit.get_library(),
                        unit.get_name(),
                        self.filters,
                    );
                    for (arch, lookup) in decls {
                        match lookup {
                            Lookup::Hit(af) => {
                                self.include_secondary(f, af, EdgeKind::ArchitectureOf)
                            }
                            Lookup::Ambiguous { chosen, candidates } => {
                                self.diagnostics.push(Diagnostic::DuplicateProvider {
                                    unit: arch.to_string(),
                                    candidates: candidates
                                        .into_iter()
                                        .map(|c| self.files[c].get_path().clone())
                                        .collect(),
                                });
                                self.include_secondary(f, chosen, EdgeKind::ArchitectureOf);
                            }
                            // an architecture only available in filtered-out
                            // files is simply not selected
                            Lookup::Miss { .. } => (),
                        }
                    }
                }
                UnitKind::Package => {
                    let lookup =
                        self.index
                            .body_of(unit.get_library(), unit.get_name(), self.filters);
                    match lookup {
                        Some(Lookup::Hit(bf)) => self.include_secondary(f, bf, EdgeKind::BodyOf),
                        Some(Lookup::Ambiguous { chosen, candidates }) => {
                            self.diagnostics.push(Diagnostic::DuplicateProvider {
                                unit: DesignUnit::package_body(
                                    unit.get_library().clone(),
                                    unit.get_name().clone(),
                                )
                                .to_string(),
                                candidates: candidates
                                    .into_iter()
                                    .map(|c| self.files[c].get_path().clone())
                                    .collect(),
                            });
                            self.include_secondary(f, chosen, EdgeKind::BodyOf);
                        }
                        _ => (),
                    }
                }
                _ => (),
            }
        }
    }

    /// Includes the file of a secondary unit behind the primary's file.
    fn include_secondary(&mut self, primary: usize, secondary: usize, kind: EdgeKind) {
        if primary == secondary {
            return;
        }
        self.reach(secondary);
        self.graph.add_edge_by_key(
            self.files[primary].get_path(),
            self.files[secondary].get_path(),
            kind,
        );
        // the architecture of a toplevel entity is itself a toplevel file
        if self.topset.contains(&primary) == true {
            self.topset.insert(secondary);
        }
    }
}
