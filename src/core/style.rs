use crate::core::fileset;
use crate::core::include::InclusionMode;
use crate::core::lang::unit::UnitKind;
use crate::core::source::SourceFile;
use crate::error::{Diagnostic, DiagnosticList, Locus};
use crate::util::strcmp;

/// Checks the strict-mode style rules over the discovered files.
///
/// Stateless; never mutates the files and never resolves anything. The three
/// rules, checked in order with the first violation reported per file:
/// a file defines exactly one entity or exactly one package, package names
/// end in `_pkg`, and the filename (minus tags) matches the unit name.
pub(crate) fn check(files: &[SourceFile], demote: bool) -> DiagnosticList {
    let mut diagnostics = DiagnosticList::new();
    for file in files {
        if file.get_mode() != InclusionMode::Strict {
            continue;
        }
        let mut report = |message: String| {
            diagnostics.push(Diagnostic::Style {
                locus: Locus::new(file.get_path().clone()),
                message: message,
                demoted: demote,
            });
        };

        let entities = file
            .get_provided()
            .iter()
            .filter(|p| p.get_unit().get_kind() == &UnitKind::Entity)
            .count();
        let packages = file
            .get_provided()
            .iter()
            .filter(|p| p.get_unit().get_kind() == &UnitKind::Package)
            .count();
        if (entities == 1 && packages == 0) == false && (entities == 0 && packages == 1) == false {
            report(String::from("contains multiple or zero design units"));
            continue;
        }
        let primary = file
            .get_provided()
            .iter()
            .find(|p| {
                p.get_unit().get_kind() == &UnitKind::Entity
                    || p.get_unit().get_kind() == &UnitKind::Package
            })
            .unwrap()
            .get_unit();
        if packages == 1
            && strcmp::ends_with_ignore_case(&primary.get_name().to_string(), "_pkg") == false
        {
            report(String::from("contains package without _pkg suffix"));
            continue;
        }
        let file_name = file
            .get_path()
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = fileset::stem(&file_name);
        if strcmp::fold(stem) != primary.get_name().folded() {
            report(String::from("filename does not match design unit"));
        }
    }
    diagnostics
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::discover::discover;
    use crate::core::include::Include;
    use std::path::Path;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn check_dir(dir: &Path, demote: bool) -> DiagnosticList {
        let d = discover(&[Include::new(dir).mode(InclusionMode::Strict)]).unwrap();
        check(&d.files, demote)
    }

    #[test]
    fn clean_files_pass() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "adder.vhd", "entity adder is end;\narchitecture rtl of adder is begin end;");
        write(dir.path(), "util_pkg.vhd", "package util_pkg is end;");
        // tags do not count against the filename match
        write(dir.path(), "mem_pkg.08.vhd", "package mem_pkg is end;");
        assert_eq!(check_dir(dir.path(), false).is_empty(), true);
    }

    #[test]
    fn multiple_units_violate() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "two.vhd", "entity a is end;\nentity b is end;");
        let diags = check_dir(dir.path(), false);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.is_fatal(), true);
    }

    #[test]
    fn package_suffix_enforced() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "util.vhd", "package util is end;");
        let diags = check_dir(dir.path(), false);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags.iter().next().unwrap().to_string().contains("_pkg"),
            true
        );
    }

    #[test]
    fn filename_must_match_unit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "misnamed.vhd", "entity adder is end;");
        let diags = check_dir(dir.path(), false);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn demotion_keeps_severity_warning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "misnamed.vhd", "entity adder is end;");
        let diags = check_dir(dir.path(), true);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.is_fatal(), false);
    }

    #[test]
    fn normal_mode_is_not_checked() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "two.vhd", "entity a is end;\nentity b is end;");
        let d = discover(&[Include::new(dir.path())]).unwrap();
        assert_eq!(check(&d.files, false).is_empty(), true);
    }
}
