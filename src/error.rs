use crate::util::filesystem;
use colored::Colorize;
use std::fmt::Display;
use std::path::PathBuf;

pub type Fault = Box<dyn std::error::Error>;

/// How a diagnostic affects the outcome of a resolution.
///
/// A `Fatal` diagnostic suppresses the compile order; `Warning`s ride along
/// with a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "{}", "warning".yellow().bold()),
            Self::Fatal => write!(f, "{}", "error".red().bold()),
        }
    }
}

/// A place in the source tree a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    path: PathBuf,
    line: Option<usize>,
}

impl Locus {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: path,
            line: None,
        }
    }

    pub fn with_line(path: PathBuf, line: usize) -> Self {
        Self {
            path: path,
            line: Some(line),
        }
    }

    pub fn get_path(&self) -> &PathBuf {
        &self.path
    }

    pub fn get_line(&self) -> Option<usize> {
        self.line
    }
}

impl Display for Locus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(l) => write!(f, "{}:{}", filesystem::into_std_str(self.path.clone()), l),
            None => write!(f, "{}", filesystem::into_std_str(self.path.clone())),
        }
    }
}

fn item_list(paths: &Vec<PathBuf>) -> String {
    paths.iter().fold(String::new(), |mut acc, p| {
        acc.push_str("\n - ");
        acc.push_str(&filesystem::into_std_str(p.clone()));
        acc
    })
}

fn reason_list(reasons: &Vec<String>) -> String {
    reasons.iter().fold(String::new(), |mut acc, r| {
        acc.push_str("\n - ");
        acc.push_str(r);
        acc
    })
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    #[error("failed to access {0:?}: {1}")]
    IoFailure(PathBuf, String),
    #[error("{0}: {1}")]
    ParseAnomaly(Locus, String),
    #[error("{unit} is defined in multiple ambiguous files:{list}", list = item_list(.candidates))]
    DuplicateProvider { unit: String, candidates: Vec<PathBuf> },
    #[error("{locus}: could not resolve {reference}{list}", list = reason_list(.details))]
    UnresolvedReference {
        locus: Locus,
        reference: String,
        details: Vec<String>,
        permitted: bool,
    },
    #[error("circular dependency:{list}", list = item_list(.0))]
    Cycle(Vec<PathBuf>),
    #[error("no toplevel design units matched {0:?}")]
    NoTop(Vec<String>),
    #[error("{locus}: {message}")]
    Style {
        locus: Locus,
        message: String,
        demoted: bool,
    },
    #[error("inconsistent unit index: {0}")]
    InconsistentIndex(String),
    #[error("no source files were discovered")]
    EmptyDiscovery,
    #[error("{locus}: file is already assigned to library '{assigned}', ignoring '{requested}'")]
    LibraryConflict {
        locus: Locus,
        assigned: String,
        requested: String,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::IoFailure(..) => Severity::Fatal,
            Self::ParseAnomaly(..) => Severity::Warning,
            Self::DuplicateProvider { .. } => Severity::Fatal,
            Self::UnresolvedReference { permitted, .. } => match permitted {
                true => Severity::Warning,
                false => Severity::Fatal,
            },
            Self::Cycle(..) => Severity::Fatal,
            Self::NoTop(..) => Severity::Fatal,
            Self::Style { demoted, .. } => match demoted {
                true => Severity::Warning,
                false => Severity::Fatal,
            },
            Self::InconsistentIndex(..) => Severity::Fatal,
            Self::EmptyDiscovery => Severity::Warning,
            Self::LibraryConflict { .. } => Severity::Warning,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// The accumulated outcome of a resolution stage.
///
/// Stages push every diagnostic they find before surfacing the list, so a
/// single run reports each problem of a stage at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticList {
    inner: Vec<Diagnostic>,
}

impl DiagnosticList {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.inner.push(diag);
    }

    pub fn append(&mut self, mut other: DiagnosticList) {
        self.inner.append(&mut other.inner);
    }

    pub fn is_fatal(&self) -> bool {
        self.inner.iter().any(|d| d.is_fatal())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.inner.iter()
    }

    /// Splits the list into its warnings, dropping nothing else.
    ///
    /// Only sensible once `is_fatal` returned false.
    pub fn into_warnings(self) -> Vec<Diagnostic> {
        self.inner
            .into_iter()
            .filter(|d| d.severity() == Severity::Warning)
            .collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.inner
    }
}

impl From<Diagnostic> for DiagnosticList {
    fn from(diag: Diagnostic) -> Self {
        Self { inner: vec![diag] }
    }
}

impl Display for DiagnosticList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for diag in &self.inner {
            write!(f, "{}: {}\n", diag.severity(), diag)?;
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticList {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn severities() {
        let d = Diagnostic::IoFailure(PathBuf::from("/x"), String::from("denied"));
        assert_eq!(d.severity(), Severity::Fatal);

        let d = Diagnostic::UnresolvedReference {
            locus: Locus::new(PathBuf::from("/x.vhd")),
            reference: String::from("component clk_gate"),
            details: Vec::new(),
            permitted: true,
        };
        assert_eq!(d.severity(), Severity::Warning);

        let d = Diagnostic::Style {
            locus: Locus::new(PathBuf::from("/x.vhd")),
            message: String::from("contains multiple or zero design units"),
            demoted: true,
        };
        assert_eq!(d.severity(), Severity::Warning);
    }

    #[test]
    fn list_fatality() {
        let mut list = DiagnosticList::new();
        assert_eq!(list.is_fatal(), false);
        list.push(Diagnostic::EmptyDiscovery);
        assert_eq!(list.is_fatal(), false);
        list.push(Diagnostic::NoTop(vec![String::from("*_tc")]));
        assert_eq!(list.is_fatal(), true);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn cycle_message() {
        let d = Diagnostic::Cycle(vec![PathBuf::from("/a.vhd"), PathBuf::from("/b.vhd")]);
        assert_eq!(
            d.to_string(),
            "circular dependency:\n - /a.vhd\n - /b.vhd"
        );
    }
}
