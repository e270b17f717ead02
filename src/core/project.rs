use crate::core::discover;
use crate::core::fileset;
use crate::core::include::Include;
use crate::core::index::{Filters, UnitIndex};
use crate::core::lang::identifier::Identifier;
use crate::core::lang::unit::DesignUnit;
use crate::core::order::{self, CompileOrder};
use crate::core::resolver;
use crate::core::source::SourceFile;
use crate::core::version::VhdlVersion;
use crate::error::{Diagnostic, DiagnosticList};
use std::str::FromStr;

/// Whether the compile order targets a simulator or a synthesis tool.
///
/// Controls which `sim`/`syn`-tagged files are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Simulation,
    Synthesis,
}

impl Default for Context {
    fn default() -> Self {
        Self::Simulation
    }
}

/// The default pattern used to recognize test-case entities as toplevels.
pub const DEFAULT_TOP_PATTERN: &str = "*_tc";

/// The full configuration of one dependency analysis.
///
/// Collect inclusion directives and options, then call [`Project::resolve`]
/// (one order covering every toplevel) or [`Project::resolve_each`] (one
/// order per toplevel unit).
#[derive(Debug)]
pub struct Project {
    includes: Vec<Include>,
    tops: Vec<glob::Pattern>,
    desired: VhdlVersion,
    required: Option<VhdlVersion>,
    context: Context,
    ignored: Vec<Identifier>,
    demote_style: bool,
}

/// One successful resolution: the compile order plus the warnings that rode
/// along.
#[derive(Debug)]
pub struct Resolution {
    top: Vec<DesignUnit>,
    order: CompileOrder,
    warnings: Vec<Diagnostic>,
}

impl Resolution {
    /// The toplevel units this order was computed for.
    pub fn get_tops(&self) -> &Vec<DesignUnit> {
        &self.top
    }

    pub fn get_order(&self) -> &CompileOrder {
        &self.order
    }

    pub fn get_warnings(&self) -> &Vec<Diagnostic> {
        &self.warnings
    }

    pub fn into_order(self) -> CompileOrder {
        self.order
    }
}

impl Project {
    pub fn new() -> Self {
        Self {
            includes: Vec::new(),
            tops: Vec::new(),
            desired: VhdlVersion::default(),
            required: None,
            context: Context::default(),
            ignored: vec![
                Identifier::from_str("ieee").unwrap(),
                Identifier::from_str("std").unwrap(),
            ],
            demote_style: false,
        }
    }

    /// Appends an inclusion directive.
    pub fn include(mut self, directive: Include) -> Self {
        self.includes.push(directive);
        self
    }

    /// Appends a glob pattern matched against provided entity names to pick
    /// toplevels. Without any, `*_tc` applies.
    pub fn top(mut self, pattern: &str) -> Result<Self, glob::PatternError> {
        self.tops.push(glob::Pattern::new(pattern)?);
        Ok(self)
    }

    /// The version preferred when several providers coexist. Defaults to
    /// 2008.
    pub fn desired_version(mut self, version: VhdlVersion) -> Self {
        self.desired = version;
        self
    }

    /// Requires every selected file to be compatible with `version`; also
    /// makes it the desired version.
    pub fn require_version(mut self, version: VhdlVersion) -> Self {
        self.required = Some(version);
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Treats `library` like a built-in: references into it are satisfied by
    /// fiat. `ieee` and `std` are always ignored.
    pub fn ignore_library(mut self, library: Identifier) -> Self {
        self.ignored.push(library);
        self
    }

    /// Reports strict-mode style violations as warnings instead of errors.
    pub fn demote_style(mut self) -> Self {
        self.demote_style = true;
        self
    }

    fn filters(&self) -> Filters {
        Filters {
            context: self.context,
            desired: self.required.unwrap_or(self.desired),
            required: self.required,
        }
    }

    fn top_patterns(&self) -> Vec<glob::Pattern> {
        match self.tops.is_empty() {
            true => vec![glob::Pattern::new(DEFAULT_TOP_PATTERN).unwrap()],
            false => self.tops.clone(),
        }
    }

    /// Matches the toplevel patterns against every eligible entity.
    ///
    /// Entities of files included under `top` mode join unconditionally.
    /// Returns (unit, providing file) pairs ordered by unit name.
    fn match_tops(&self, files: &[SourceFile]) -> Vec<(DesignUnit, usize)> {
        let patterns = self.top_patterns();
        let filters = self.filters();
        let mut tops = Vec::new();
        for (i, file) in files.iter().enumerate() {
            if file.is_excluded() == true
                || file.supports_context(filters.context) == false
                || file.supports_version(filters.required) == false
                || file.supports_desired(filters.desired) == false
            {
                continue;
            }
            for provided in file.entities() {
                let name = provided.get_unit().get_name().folded();
                let matched = file.is_top_marked() == true
                    || patterns
                        .iter()
                        .any(|p| p.matches_with(&name, fileset::match_options()) == true);
                if matched == true {
                    tops.push((provided.get_unit().clone(), i));
                }
            }
        }
        tops.sort_by_key(|(unit, i)| (unit.get_name().folded(), *i));
        tops
    }

    /// Produces one compile order containing every matched toplevel and all
    /// of its dependencies.
    pub fn resolve(&self) -> Result<Resolution, DiagnosticList> {
        let discovery = discover::discover(&self.includes).map_err(DiagnosticList::from)?;
        let mut diagnostics = discovery.diagnostics;
        let files = discovery.files;
        diagnostics.append(crate::core::style::check(&files, self.demote_style));

        let index = UnitIndex::build(&files);
        let tops = self.match_tops(&files);
        if tops.is_empty() == true {
            diagnostics.push(Diagnostic::NoTop(
                self.top_patterns()
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect(),
            ));
            return Err(diagnostics);
        }
        let mut seen = std::collections::HashSet::new();
        let seeds: Vec<usize> = tops
            .iter()
            .map(|(_, i)| *i)
            .filter(|i| seen.insert(*i) == true)
            .collect();

        let resolved = resolver::resolve(&index, &self.filters(), &self.ignored, &seeds);
        diagnostics.append(resolved.diagnostics.clone());
        if diagnostics.is_fatal() == true {
            return Err(diagnostics);
        }
        let order = order::schedule(&files, &resolved, self.filters().desired).map_err(|d| {
            let mut fatal = diagnostics.clone();
            fatal.push(d);
            fatal
        })?;
        Ok(Resolution {
            top: tops.into_iter().map(|(unit, _)| unit).collect(),
            order: order,
            warnings: diagnostics.into_warnings(),
        })
    }

    /// Produces one compile order per matched toplevel unit, the way a
    /// test-case runner consumes them.
    ///
    /// Shares one discovery and one unit index across the runs. If any run
    /// fails, the combined diagnostics of all runs are returned.
    pub fn resolve_each(&self) -> Result<Vec<Resolution>, DiagnosticList> {
        let discovery = discover::discover(&self.includes).map_err(DiagnosticList::from)?;
        let mut diagnostics = discovery.diagnostics;
        let files = discovery.files;
        diagnostics.append(crate::core::style::check(&files, self.demote_style));

        let index = UnitIndex::build(&files);
        let tops = self.match_tops(&files);
        if tops.is_empty() == true {
            diagnostics.push(Diagnostic::NoTop(
                self.top_patterns()
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect(),
            ));
            return Err(diagnostics);
        }

        let mut results = Vec::with_capacity(tops.len());
        let mut all = diagnostics.clone();
        for (unit, seed) in tops {
            let resolved = resolver::resolve(&index, &self.filters(), &self.ignored, &[seed]);
            all.append(resolved.diagnostics.clone());
            if resolved.diagnostics.is_fatal() == true || diagnostics.is_fatal() == true {
                continue;
            }
            match order::schedule(&files, &resolved, self.filters().desired) {
                Ok(order) => {
                    let mut warnings = diagnostics.clone().into_warnings();
                    warnings.append(&mut resolved.diagnostics.into_warnings());
                    results.push(Resolution {
                        top: vec![unit],
                        order: order,
                        warnings: warnings,
                    });
                }
                Err(d) => all.push(d),
            }
        }
        match all.is_fatal() {
            true => Err(all),
            false => Ok(results),
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}
