use crate::core::lang::identifier::Identifier;
use crate::core::version::VhdlVersion;
use std::path::PathBuf;

/// The environment variable holding extra include roots, separated the same
/// way as `PATH`. Roots found here are appended after the configured
/// directives.
pub const INCLUDE_ENV_VAR: &str = "VHDLORDER_INCLUDE";

/// How the files of a directive take part in the analysis.
///
/// When the same file is reached by several directives the strongest mode
/// wins: black-box over strict over normal. `Top` adds the file's entities
/// to the toplevel set and otherwise behaves like normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionMode {
    Normal,
    Strict,
    BlackBox,
    Top,
}

impl InclusionMode {
    pub(crate) fn strength(&self) -> u8 {
        match self {
            Self::Normal | Self::Top => 0,
            Self::Strict => 1,
            Self::BlackBox => 2,
        }
    }
}

impl Default for InclusionMode {
    fn default() -> Self {
        Self::Normal
    }
}

/// One inclusion directive: a root to search and how to treat its files.
#[derive(Debug, Clone)]
pub struct Include {
    path: PathBuf,
    recursive: bool,
    pattern: Option<glob::Pattern>,
    mode: InclusionMode,
    library: Identifier,
    version: Option<VhdlVersion>,
}

impl Include {
    /// Creates a recursive, normal-mode directive targeting the `work`
    /// library with the default `*.vhd`/`*.vhdl` patterns.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            recursive: true,
            pattern: None,
            mode: InclusionMode::default(),
            library: Identifier::new_working(),
            version: None,
        }
    }

    /// Limits the directive to the immediate files of its root.
    pub fn non_recursive(mut self) -> Self {
        self.recursive = false;
        self
    }

    /// Replaces the default filename patterns.
    pub fn pattern(mut self, p: &str) -> Result<Self, glob::PatternError> {
        self.pattern = Some(glob::Pattern::new(p)?);
        Ok(self)
    }

    pub fn mode(mut self, mode: InclusionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Compiles the directive's files into `library` instead of `work`.
    pub fn library(mut self, library: Identifier) -> Self {
        self.library = library;
        self
    }

    /// Pins every file of this directive to one VHDL version, overriding
    /// filename tags.
    pub fn version(mut self, version: VhdlVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn get_path(&self) -> &PathBuf {
        &self.path
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn get_pattern(&self) -> Option<&glob::Pattern> {
        self.pattern.as_ref()
    }

    pub fn get_mode(&self) -> InclusionMode {
        self.mode
    }

    pub fn get_library(&self) -> &Identifier {
        &self.library
    }

    pub fn get_version(&self) -> Option<VhdlVersion> {
        self.version
    }
}

/// Builds the directives supplied through the environment.
pub fn environment_includes() -> Vec<Include> {
    match std::env::var_os(INCLUDE_ENV_VAR) {
        Some(paths) => std::env::split_paths(&paths)
            .filter(|p| p.as_os_str().is_empty() == false)
            .map(|p| Include::new(p))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let inc = Include::new("/proj/rtl");
        assert_eq!(inc.is_recursive(), true);
        assert_eq!(inc.get_mode(), InclusionMode::Normal);
        assert_eq!(inc.get_library().is_work(), true);
        assert_eq!(inc.get_version(), None);
        assert_eq!(inc.get_pattern(), None);
    }

    #[test]
    fn mode_strength() {
        assert!(InclusionMode::BlackBox.strength() > InclusionMode::Strict.strength());
        assert!(InclusionMode::Strict.strength() > InclusionMode::Normal.strength());
        assert_eq!(
            InclusionMode::Top.strength(),
            InclusionMode::Normal.strength()
        );
    }
}
