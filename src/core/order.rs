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
use crate::core::resolver::{EdgeKind, Resolved};
use crate::core::source::SourceFile;
use crate::core::version::VhdlVersion;
use crate::error::Diagnostic;
use crate::util::filesystem;
use serde_derive::Serialize;
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;

/// Marks a compile step as a toplevel endpoint or a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Dep,
    Top,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dep => write!(f, "dep"),
            Self::Top => write!(f, "top"),
        }
    }
}

/// One row of the compile order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileStep {
    role: Role,
    library: Identifier,
    version: Option<VhdlVersion>,
    path: PathBuf,
}

impl CompileStep {
    pub fn get_role(&self) -> Role {
        self.role
    }

    pub fn get_library(&self) -> &Identifier {
        &self.library
    }

    /// The version the file is to be compiled with; `None` for a universal
    /// file.
    pub fn get_version(&self) -> Option<VhdlVersion> {
        self.version
    }

    pub fn get_path(&self) -> &PathBuf {
        &self.path
    }
}

impl Display for CompileStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ", self.role, self.library)?;
        match self.version {
            Some(v) => write!(f, "{}", v)?,
            None => write!(f, "----")?,
        }
        write!(f, " {}", filesystem::into_std_str(self.path.clone()))
    }
}

/// The linearized result of a resolution.
///
/// The line-oriented text format written by [`CompileOrder::write`] is
/// frozen: `<role> <library> <version> <absolute-path>`, one step per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileOrder {
    steps: Vec<CompileStep>,
}

impl CompileOrder {
    pub fn get_steps(&self) -> &Vec<CompileStep> {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Writes the frozen line format.
    pub fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for step in &self.steps {
            writeln!(out, "{}", step)?;
        }
        Ok(())
    }
}

impl Display for CompileOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// Linearizes the resolved file graph.
///
/// Kahn layering keeps every dependency ahead of its consumers; inside a
/// layer rows sort by (library, path) so the order is reproducible across
/// runs and filesystems. The two VHDL ordering rules are re-verified on the
/// way out.
pub(crate) fn schedule(
    files: &[SourceFile],
    resolved: &Resolved,
    desired: VhdlVersion,
) -> Result<CompileOrder, Diagnostic> {
    let graph = resolved.graph.get_graph();
    let order = graph
        .layered_sort(|n| {
            let f = *resolved.graph.get_node_by_index(n).unwrap().as_ref();
            (
                files[f].get_library().folded(),
                filesystem::into_std_str(files[f].get_path().clone()),
            )
        })
        .map_err(|leftover| {
            Diagnostic::Cycle(
                leftover
                    .into_iter()
                    .map(|n| resolved.graph.get_key_by_index(n).unwrap().clone())
                    .collect(),
            )
        })?;

    let mut position = vec![0; graph.node_count()];
    for (pos, &n) in order.iter().enumerate() {
        position[n] = pos;
    }
    // entity before architecture, package before body
    for (source, target, kind) in graph.edges() {
        if position[source] > position[target] {
            let rule = match kind {
                EdgeKind::ArchitectureOf => "an architecture precedes its entity",
                EdgeKind::BodyOf => "a package body precedes its package",
                _ => "a file precedes one of its dependencies",
            };
            return Err(Diagnostic::InconsistentIndex(format!(
                "{}: {} placed after {}",
                rule,
                resolved.graph.get_key_by_index(source).unwrap().display(),
                resolved.graph.get_key_by_index(target).unwrap().display(),
            )));
        }
    }

    let steps = order
        .into_iter()
        .map(|n| {
            let f = *resolved.graph.get_node_by_index(n).unwrap().as_ref();
            // a toplevel file is one of the requested tops that no other
            // emitted file depends on
            let role = match resolved.topset.contains(&f) == true
                && graph.out_degree(n) == 0
            {
                true => Role::Top,
                false => Role::Dep,
            };
            CompileStep {
                role: role,
                library: files[f].get_library().clone(),
                version: files[f].choose_version(desired),
                path: files[f].get_path().clone(),
            }
        })
        .collect();
    Ok(CompileOrder { steps: steps })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn step_format_is_frozen() {
        let step = CompileStep {
            role: Role::Dep,
            library: Identifier::from_str("work").unwrap(),
            version: Some(VhdlVersion::V1993),
            path: PathBuf::from("/proj/rtl/a_pkg.vhd"),
        };
        assert_eq!(step.to_string(), "dep work 1993 /proj/rtl/a_pkg.vhd");

        let step = CompileStep {
            role: Role::Top,
            library: Identifier::from_str("util").unwrap(),
            version: None,
            path: PathBuf::from("/proj/rtl/top_tc.vhd"),
        };
        assert_eq!(step.to_string(), "top util ---- /proj/rtl/top_tc.vhd");
    }

    #[test]
    fn write_matches_display() {
        let order = CompileOrder {
            steps: vec![CompileStep {
                role: Role::Top,
                library: Identifier::from_str("work").unwrap(),
                version: None,
                path: PathBuf::from("/a.vhd"),
            }],
        };
        let mut buf = Vec::new();
        order.write(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), order.to_string());
        assert_eq!(order.to_string(), "top work ---- /a.vhd\n");
    }
}
