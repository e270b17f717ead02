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

use crate::core::fileset;
use crate::core::include::{self, Include, InclusionMode};
use crate::core::lang::identifier::Identifier;
use crate::core::source::SourceFile;
use crate::core::version::VhdlVersion;
use crate::error::{Diagnostic, DiagnosticList, Locus};
use crate::util::filesystem;
use ignore::WalkBuilder;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Discovery {
    pub(crate) files: Vec<SourceFile>,
    pub(crate) diagnostics: DiagnosticList,
}

/// The attributes a file accumulates while directives claim it.
#[derive(Debug)]
struct Candidate {
    library: Identifier,
    mode: InclusionMode,
    top: bool,
    version: Option<VhdlVersion>,
}

/// Expands the directive list (plus the environment's) into parsed source
/// files, sorted by canonical path.
///
/// A missing literal root is fatal. All remaining problems (library
/// conflicts, parse anomalies, an empty result) accumulate as warnings.
pub(crate) fn discover(includes: &[Include]) -> Result<Discovery, Diagnostic> {
    let mut directives: Vec<Include> = includes.to_vec();
    directives.append(&mut include::environment_includes());

    let mut diagnostics = DiagnosticList::new();
    // keyed by the standardized path string for platform-independent order
    let mut candidates: BTreeMap<String, (PathBuf, Candidate)> = BTreeMap::new();

    for directive in &directives {
        for path in expand(directive)? {
            let path = std::fs::canonicalize(&path)
                .map_err(|e| Diagnostic::IoFailure(path.clone(), e.to_string()))?;
            let key = filesystem::into_std_str(path.clone());
            match candidates.entry(key) {
                Entry::Occupied(mut claimed) => {
                    let (_, existing) = claimed.get_mut();
                    // strongest mode wins across directives
                    if directive.get_mode().strength() > existing.mode.strength() {
                        existing.mode = directive.get_mode();
                    }
                    if directive.get_mode() == InclusionMode::Top {
                        existing.top = true;
                    }
                    // the first directive's library is pinned
                    if directive.get_library() != &existing.library {
                        diagnostics.push(Diagnostic::LibraryConflict {
                            locus: Locus::new(path),
                            assigned: existing.library.to_string(),
                            requested: directive.get_library().to_string(),
                        });
                    }
                }
                Entry::Vacant(open) => {
                    open.insert((
                        path,
                        Candidate {
                            library: directive.get_library().clone(),
                            mode: directive.get_mode(),
                            top: directive.get_mode() == InclusionMode::Top,
                            version: directive.get_version(),
                        },
                    ));
                }
            }
        }
    }

    if candidates.is_empty() == true {
        diagnostics.push(Diagnostic::EmptyDiscovery);
    }

    let mut files = Vec::with_capacity(candidates.len());
    for (_, (path, cand)) in candidates {
        // `Top` only flags the file; it parses like a normal inclusion
        let mode = match cand.mode {
            InclusionMode::Top => InclusionMode::Normal,
            m => m,
        };
        let file = SourceFile::read(path, cand.library, mode, cand.top, cand.version)?;
        for (line, message) in file.get_anomalies() {
            diagnostics.push(Diagnostic::ParseAnomaly(
                Locus::with_line(file.get_path().clone(), *line),
                message.clone(),
            ));
        }
        files.push(file);
    }

    Ok(Discovery {
        files: files,
        diagnostics: diagnostics,
    })
}

/// Turns one directive into the concrete file paths it names.
fn expand(directive: &Include) -> Result<Vec<PathBuf>, Diagnostic> {
    let root = directive.get_path();
    let root_str = root.to_string_lossy();
    // a root carrying glob metacharacters is a non-recursive file glob
    if root_str.contains(&['*', '?', '['][..]) == true {
        let paths = glob::glob(&root_str)
            .map_err(|e| Diagnostic::IoFailure(root.clone(), e.to_string()))?;
        return Ok(paths
            .filter_map(|p| p.ok())
            .filter(|p| p.is_file() == true)
            .collect());
    }
    let meta = std::fs::metadata(root)
        .map_err(|e| Diagnostic::IoFailure(root.clone(), e.to_string()))?;
    if meta.is_file() == true {
        // an explicitly named file skips the pattern filter
        return Ok(vec![root.clone()]);
    }
    Ok(walk(root, directive))
}

/// Collects the files under `root` that match the directive's pattern.
fn walk(root: &Path, directive: &Include) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .max_depth(match directive.is_recursive() {
            true => None,
            false => Some(1),
        })
        .build();
    walker
        .filter_map(|entry| {
            let entry = entry.ok()?;
            if entry.path().is_file() == false {
                return None;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match fileset::matches_pattern(&name, directive.get_pattern()) {
                true => Some(entry.into_path()),
                false => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn walks_recursively_by_default() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.vhd", "entity a is end;");
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "b.vhdl", "entity b is end;");
        touch(dir.path(), "notes.txt", "not vhdl");

        let d = discover(&[Include::new(dir.path())]).unwrap();
        let names: Vec<String> = d
            .files
            .iter()
            .map(|f| f.get_path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.vhd", "b.vhdl"]);
        assert_eq!(d.diagnostics.is_empty(), true);
    }

    #[test]
    fn non_recursive_stays_shallow() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.vhd", "entity a is end;");
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "b.vhd", "entity b is end;");

        let d = discover(&[Include::new(dir.path()).non_recursive()]).unwrap();
        assert_eq!(d.files.len(), 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover(&[Include::new(dir.path().join("nope"))]);
        assert!(matches!(result, Err(Diagnostic::IoFailure(..))));
    }

    #[test]
    fn glob_roots_expand_flat() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bar.vhd", "entity bar is end;");
        touch(dir.path(), "baz.vhd", "entity baz is end;");
        touch(dir.path(), "foo.vhd", "entity foo is end;");

        let pattern = dir.path().join("ba*.vhd");
        let d = discover(&[Include::new(pattern)]).unwrap();
        assert_eq!(d.files.len(), 2);
    }

    #[test]
    fn strongest_mode_and_first_library_win() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.vhd", "entity a is end;");
        let lib = Identifier::Basic(String::from("vendor"));

        let d = discover(&[
            Include::new(dir.path()),
            Include::new(dir.path())
                .mode(InclusionMode::BlackBox)
                .library(lib),
        ])
        .unwrap();
        assert_eq!(d.files[0].get_mode(), InclusionMode::BlackBox);
        assert_eq!(d.files[0].get_library().is_work(), true);
        // the conflicting library assignment is reported
        assert_eq!(d.diagnostics.len(), 1);
        assert_eq!(d.diagnostics.is_fatal(), false);
    }

    #[test]
    fn empty_discovery_warns() {
        let dir = tempfile::tempdir().unwrap();
        let d = discover(&[Include::new(dir.path())]).unwrap();
        assert_eq!(d.files.is_empty(), true);
        assert_eq!(d.diagnostics.iter().next(), Some(&Diagnostic::EmptyDiscovery));
        assert_eq!(d.diagnostics.is_fatal(), false);
    }
}
