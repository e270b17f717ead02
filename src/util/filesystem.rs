use std::path::PathBuf;

/// Replaces '\' characters with single '/' character and converts the [PathBuf] into a [String].
pub fn into_std_str(path: PathBuf) -> String {
    let mut s = path.display().to_string().replace(r"\", "/");
    if s.ends_with("/") == true {
        s.pop().unwrap();
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn std_str() {
        assert_eq!(
            into_std_str(PathBuf::from("/tmp/work/a.vhd")),
            "/tmp/work/a.vhd"
        );
        assert_eq!(into_std_str(PathBuf::from("/tmp/work/")), "/tmp/work");
    }
}
