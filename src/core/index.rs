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

use crate::core::lang::identifier::Identifier;
use crate::core::lang::unit::{DesignUnit, UnitKind};
use crate::core::project::Context;
use crate::core::source::SourceFile;
use crate::core::version::VhdlVersion;
use std::collections::HashMap;

/// The filters one resolution applies to every provider lookup.
#[derive(Debug, Clone, Copy)]
pub struct Filters {
    pub context: Context,
    pub desired: VhdlVersion,
    pub required: Option<VhdlVersion>,
}

/// The outcome of resolving a design unit to a providing file.
///
/// File indices refer to the slice the index was built over. `Ambiguous`
/// still names a deterministic choice (the lexicographically smallest path)
/// so the caller can keep analyzing after recording the conflict.
#[derive(Debug, PartialEq)]
pub enum Lookup {
    Hit(usize),
    Ambiguous {
        chosen: usize,
        candidates: Vec<usize>,
    },
    Miss {
        filtered: Vec<String>,
        dropped: Vec<usize>,
    },
}

impl Lookup {
    /// The file to continue the analysis with, when any qualified.
    pub fn best(&self) -> Option<usize> {
        match self {
            Self::Hit(f) => Some(*f),
            Self::Ambiguous { chosen, .. } => Some(*chosen),
            Self::Miss { .. } => None,
        }
    }
}

/// Maps every declared design unit to the files providing it.
///
/// Built once after parsing; read-only afterwards, so independent
/// resolutions may share one index.
#[derive(Debug)]
pub struct UnitIndex<'a> {
    files: &'a [SourceFile],
    providers: HashMap<DesignUnit, Vec<usize>>,
    // (library, entity) -> architecture declarations seen for it
    architectures: HashMap<(Identifier, Identifier), Vec<DesignUnit>>,
    // units only found in files excluded for parse anomalies
    dropped: HashMap<DesignUnit, Vec<usize>>,
}

impl<'a> UnitIndex<'a> {
    /// Indexes every provided unit of `files`.
    ///
    /// `files` must be sorted by path; index order doubles as the
    /// lexicographic tie-break.
    pub fn build(files: &'a [SourceFile]) -> Self {
        let mut providers: HashMap<DesignUnit, Vec<usize>> = HashMap::new();
        let mut architectures: HashMap<(Identifier, Identifier), Vec<DesignUnit>> = HashMap::new();
        let mut dropped: HashMap<DesignUnit, Vec<usize>> = HashMap::new();
        for (i, file) in files.iter().enumerate() {
            for provided in file.get_provided() {
                let unit = provided.get_unit();
                if file.is_excluded() == true {
                    dropped.entry(unit.clone()).or_default().push(i);
                    continue;
                }
                providers.entry(unit.clone()).or_default().push(i);
                if let UnitKind::Architecture { entity } = unit.get_kind() {
                    let key = (unit.get_library().clone(), entity.clone());
                    let decls = architectures.entry(key).or_default();
                    if decls.contains(unit) == false {
                        decls.push(unit.clone());
                    }
                }
            }
        }
        Self {
            files: files,
            providers: providers,
            architectures: architectures,
            dropped: dropped,
        }
    }

    pub fn get_files(&self) -> &'a [SourceFile] {
        self.files
    }

    /// Selects at most one provider for `unit`.
    ///
    /// Candidates are narrowed by context, then by the hard version
    /// requirement, then by closeness to the desired version (exact
    /// containment first, highest version not above the request wins).
    /// A candidate tagged only for versions newer than the request can
    /// never be chosen; when nothing else remains the unit is a miss.
    /// Remaining ties prefer caller-designated toplevel files and finally
    /// the smallest path; if distinct files still coexist the lookup is
    /// ambiguous.
    pub fn lookup(&self, unit: &DesignUnit, filters: &Filters) -> Lookup {
        let candidates = match self.providers.get(unit) {
            Some(c) => c,
            None => {
                return Lookup::Miss {
                    filtered: Vec::new(),
                    dropped: self.dropped.get(unit).cloned().unwrap_or_default(),
                }
            }
        };
        let mut filtered = Vec::new();
        let mut eligible = Vec::new();
        for &f in candidates {
            match self.files[f].filter_reason(filters.context, filters.required) {
                Some(reason) => filtered.push(reason),
                None => eligible.push(f),
            }
        }
        if eligible.is_empty() == true {
            return Lookup::Miss {
                filtered: filtered,
                dropped: self.dropped.get(unit).cloned().unwrap_or_default(),
            };
        }

        // prefer files tagged (or universal) for the desired version; fall
        // back to anything inside the permitted range
        let exact: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&f| {
                let versions = self.files[f].get_versions();
                versions.is_empty() == true || versions.contains(&filters.desired) == true
            })
            .collect();
        let mut pool = match exact.is_empty() {
            true => eligible,
            false => exact,
        };

        // highest compatible version not above the request; a universal file
        // counts as matching the request itself
        let score = |f: usize| -> Option<VhdlVersion> {
            let versions = self.files[f].get_versions();
            match versions.is_empty() {
                true => Some(filters.desired),
                false => VhdlVersion::closest_below(versions, filters.desired),
            }
        };
        let best = pool.iter().map(|&f| score(f)).max().unwrap();
        // every surviving tag lies above the requested version; the unit is
        // only available in files the request cannot use
        if best.is_none() == true {
            for &f in &pool {
                filtered.push(format!(
                    "{} is not compatible with VHDL {} or older",
                    self.files[f].get_path().display(),
                    filters.desired
                ));
            }
            return Lookup::Miss {
                filtered: filtered,
                dropped: self.dropped.get(unit).cloned().unwrap_or_default(),
            };
        }
        pool.retain(|&f| score(f) == best);

        if pool.iter().any(|&f| self.files[f].is_top_marked() == true) == true {
            pool.retain(|&f| self.files[f].is_top_marked() == true);
        }

        // files are path-sorted, so index order is the lexicographic order
        pool.sort();
        pool.dedup();
        let chosen = *pool.first().unwrap();
        match pool.len() {
            1 => Lookup::Hit(chosen),
            _ => Lookup::Ambiguous {
                chosen: chosen,
                candidates: pool,
            },
        }
    }

    /// The architecture declarations known for an entity, each paired with
    /// its own provider lookup.
    pub fn architectures_of(
        &self,
        library: &Identifier,
        entity: &Identifier,
        filters: &Filters,
    ) -> Vec<(DesignUnit, Lookup)> {
        match self.architectures.get(&(library.clone(), entity.clone())) {
            Some(decls) => decls
                .iter()
                .map(|unit| (unit.clone(), self.lookup(unit, filters)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Looks up the body of a package, when one was declared anywhere.
    pub fn body_of(
        &self,
        library: &Identifier,
        package: &Identifier,
        filters: &Filters,
    ) -> Option<Lookup> {
        let unit = DesignUnit::package_body(library.clone(), package.clone());
        match self.providers.contains_key(&unit) {
            true => Some(self.lookup(&unit, filters)),
            false => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::discover::discover;
    use crate::core::include::Include;
    use std::path::Path;
    use std::str::FromStr;

    fn iden(s: &str) -> Identifier {
        Identifier::from_str(s).unwrap()
    }

    fn filters() -> Filters {
        Filters {
            context: Context::Simulation,
            desired: VhdlVersion::V2008,
            required: None,
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn version_disambiguation() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "u.93.vhd", "package u is end;");
        write(dir.path(), "u.08.vhd", "package u is end;");
        let d = discover(&[Include::new(dir.path())]).unwrap();
        let index = UnitIndex::build(&d.files);
        let key = DesignUnit::package(iden("work"), iden("u"));

        // desired 2008 picks the 2008 file
        let hit = index.lookup(&key, &filters());
        let chosen = hit.best().unwrap();
        assert_eq!(matches!(hit, Lookup::Hit(_)), true);
        assert_eq!(
            d.files[chosen].get_path().file_name().unwrap().to_string_lossy(),
            "u.08.vhd"
        );

        // desired 1993 picks the 1993 file
        let f93 = Filters {
            desired: VhdlVersion::V1993,
            ..filters()
        };
        let chosen = index.lookup(&key, &f93).best().unwrap();
        assert_eq!(
            d.files[chosen].get_path().file_name().unwrap().to_string_lossy(),
            "u.93.vhd"
        );
    }

    #[test]
    fn duplicate_same_version_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.vhd", "package u is end;");
        write(dir.path(), "b.vhd", "package u is end;");
        let d = discover(&[Include::new(dir.path())]).unwrap();
        let index = UnitIndex::build(&d.files);
        let key = DesignUnit::package(iden("work"), iden("u"));

        match index.lookup(&key, &filters()) {
            Lookup::Ambiguous { chosen, candidates } => {
                // the lexicographically smallest path continues the analysis
                assert_eq!(
                    d.files[chosen].get_path().file_name().unwrap().to_string_lossy(),
                    "a.vhd"
                );
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn context_filter_reports_reason() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "u.syn.vhd", "package u is end;");
        let d = discover(&[Include::new(dir.path())]).unwrap();
        let index = UnitIndex::build(&d.files);
        let key = DesignUnit::package(iden("work"), iden("u"));

        match index.lookup(&key, &filters()) {
            Lookup::Miss { filtered, dropped } => {
                assert_eq!(filtered.len(), 1);
                assert_eq!(filtered[0].contains("synthesis-only"), true);
                assert_eq!(dropped.is_empty(), true);
            }
            other => panic!("expected miss, got {:?}", other),
        }
    }

    #[test]
    fn required_version_filters_hard() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "u.08.vhd", "package u is end;");
        let d = discover(&[Include::new(dir.path())]).unwrap();
        let index = UnitIndex::build(&d.files);
        let key = DesignUnit::package(iden("work"), iden("u"));

        let f = Filters {
            required: Some(VhdlVersion::V1993),
            desired: VhdlVersion::V1993,
            ..filters()
        };
        assert_eq!(matches!(index.lookup(&key, &f), Lookup::Miss { .. }), true);
    }

    #[test]
    fn all_tags_above_desired_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "u.08.vhd", "package u is end;");
        let d = discover(&[Include::new(dir.path())]).unwrap();
        let index = UnitIndex::build(&d.files);
        let key = DesignUnit::package(iden("work"), iden("u"));

        // only a 2008 tag exists, so a 1993 request cannot use the file
        let f93 = Filters {
            desired: VhdlVersion::V1993,
            ..filters()
        };
        match index.lookup(&key, &f93) {
            Lookup::Miss { filtered, .. } => {
                assert_eq!(filtered.len(), 1);
                assert_eq!(filtered[0].contains("VHDL 1993"), true);
            }
            other => panic!("expected miss, got {:?}", other),
        }

        // the same file satisfies a 2008 request
        assert_eq!(
            matches!(index.lookup(&key, &filters()), Lookup::Hit(_)),
            true
        );
    }

    #[test]
    fn anomalous_provider_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "u.vhd", "package u is\nconstant s : string := \"oops;\nend;");
        let d = discover(&[Include::new(dir.path())]).unwrap();
        let index = UnitIndex::build(&d.files);
        let key = DesignUnit::package(iden("work"), iden("u"));

        match index.lookup(&key, &filters()) {
            Lookup::Miss { dropped, .. } => assert_eq!(dropped.len(), 1),
            other => panic!("expected miss, got {:?}", other),
        }
    }
}
