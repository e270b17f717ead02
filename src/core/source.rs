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

use crate::core::fileset::{self, Usage};
use crate::core::include::InclusionMode;
use crate::core::lang::identifier::Identifier;
use crate::core::lang::lexer;
use crate::core::lang::parser::{self, ProvidedUnit, RequiredRef};
use crate::core::lang::pragma::Pragma;
use crate::core::lang::unit::{Reference, UnitKind};
use crate::core::project::Context;
use crate::core::version::{VersionSet, VhdlVersion};
use crate::error::Diagnostic;
use std::hash::Hash;
use std::path::PathBuf;

/// One VHDL file after discovery and parsing. Immutable from then on.
///
/// Identity is the canonical path.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    library: Identifier,
    versions: VersionSet,
    usage: Usage,
    mode: InclusionMode,
    top_marked: bool,
    provided: Vec<ProvidedUnit>,
    required: Vec<RequiredRef>,
    scope: Vec<Identifier>,
    pragmas: Vec<Pragma>,
    anomalies: Vec<(usize, String)>,
    sim_timeout: Option<String>,
}

impl SourceFile {
    /// Reads and parses the file at the canonical `path`.
    ///
    /// `version` pins the compatible set, overriding filename tags, when the
    /// originating directive carried an override.
    pub(crate) fn read(
        path: PathBuf,
        library: Identifier,
        mode: InclusionMode,
        top_marked: bool,
        version: Option<VhdlVersion>,
    ) -> Result<Self, Diagnostic> {
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Diagnostic::IoFailure(path.clone(), e.to_string()))?;
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (tag_versions, usage) = fileset::parse_tags(&file_name).into_parts();
        let versions = match version {
            Some(v) => [v].into_iter().collect(),
            None => tag_versions,
        };

        let scan = lexer::scan(&contents);
        let pragmas: Vec<Pragma> = scan
            .get_comments()
            .iter()
            .filter_map(|(_, text)| Pragma::scan(text))
            .collect();
        let sim_timeout = pragmas.iter().find_map(|p| match p {
            Pragma::SimulationTimeout(t) => Some(t.clone()),
            _ => None,
        });
        let anomalies = scan.get_anomalies().clone();
        let (provided, required, scope) = parser::parse(&scan, &library).into_parts();

        Ok(Self {
            path: path,
            library: library,
            versions: versions,
            usage: usage,
            mode: mode,
            top_marked: top_marked,
            provided: provided,
            required: required,
            scope: scope,
            pragmas: pragmas,
            anomalies: anomalies,
            sim_timeout: sim_timeout,
        })
    }

    pub fn get_path(&self) -> &PathBuf {
        &self.path
    }

    pub fn get_library(&self) -> &Identifier {
        &self.library
    }

    pub fn get_versions(&self) -> &VersionSet {
        &self.versions
    }

    pub fn get_usage(&self) -> Usage {
        self.usage
    }

    pub fn get_mode(&self) -> InclusionMode {
        self.mode
    }

    /// Checks if the caller explicitly listed this file as a toplevel.
    pub fn is_top_marked(&self) -> bool {
        self.top_marked
    }

    pub fn get_provided(&self) -> &Vec<ProvidedUnit> {
        &self.provided
    }

    pub fn get_required(&self) -> &Vec<RequiredRef> {
        &self.required
    }

    pub fn get_scope(&self) -> &Vec<Identifier> {
        &self.scope
    }

    pub fn get_anomalies(&self) -> &Vec<(usize, String)> {
        &self.anomalies
    }

    /// The value of the simulation timeout pragma, if one was given.
    pub fn sim_timeout(&self) -> Option<&str> {
        self.sim_timeout.as_deref()
    }

    /// Files with parse anomalies are dropped from the unit index.
    pub fn is_excluded(&self) -> bool {
        self.anomalies.is_empty() == false
    }

    /// Checks if the file may be compiled under the given context.
    pub fn supports_context(&self, context: Context) -> bool {
        match (self.usage, context) {
            (Usage::Universal, _) => true,
            (Usage::SimOnly, Context::Simulation) => true,
            (Usage::SynOnly, Context::Synthesis) => true,
            _ => false,
        }
    }

    /// Checks the compatible set against a hard version requirement.
    pub fn supports_version(&self, required: Option<VhdlVersion>) -> bool {
        match required {
            Some(v) => self.versions.is_empty() == true || self.versions.contains(&v) == true,
            None => true,
        }
    }

    /// Explains why the file cannot serve the given filters, if it cannot.
    pub fn filter_reason(
        &self,
        context: Context,
        required: Option<VhdlVersion>,
    ) -> Option<String> {
        if self.supports_context(context) == false {
            return Some(match self.usage {
                Usage::SimOnly => format!("{} is simulation-only", self.path.display()),
                _ => format!("{} is synthesis-only", self.path.display()),
            });
        }
        if self.supports_version(required) == false {
            return Some(format!(
                "{} is not compatible with VHDL {}",
                self.path.display(),
                required.unwrap()
            ));
        }
        None
    }

    /// The version this file would be compiled with, or `None` for a
    /// universal file.
    ///
    /// The greatest compatible version not above `desired`. A file whose
    /// every tag is newer than `desired` has no usable version and is never
    /// selected in the first place.
    pub fn choose_version(&self, desired: VhdlVersion) -> Option<VhdlVersion> {
        if self.versions.is_empty() == true {
            return None;
        }
        VhdlVersion::closest_below(&self.versions, desired)
    }

    /// Checks if the file has a version usable at or below `desired`.
    /// Universal files always do.
    pub fn supports_desired(&self, desired: VhdlVersion) -> bool {
        self.versions.is_empty() == true
            || VhdlVersion::closest_below(&self.versions, desired).is_some()
    }

    /// Checks if an ignore pragma marks the reference as satisfied.
    pub fn ignores(&self, reference: &Reference) -> bool {
        self.pragmas.iter().any(|p| match (p, reference) {
            (Pragma::IgnoreEntity(n), Reference::Entity { name, .. }) => n == name,
            (Pragma::IgnoreComponent(n), Reference::Component { name }) => n == name,
            (Pragma::IgnorePackage(n), Reference::Package { name, .. }) => n == name,
            _ => false,
        })
    }

    /// Iterates the entities this file declares.
    pub fn entities(&self) -> impl Iterator<Item = &ProvidedUnit> {
        self.provided
            .iter()
            .filter(|p| p.get_unit().get_kind() == &UnitKind::Entity)
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for SourceFile {}

impl Hash for SourceFile {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path.hash(state)
    }
}
