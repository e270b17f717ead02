/// Compares two string references `s0` and `s1` with case conversion.
///
/// Returns `true` if they are deemed equivalent without regarding case sensitivity.
pub fn cmp_ignore_case(s0: &str, s1: &str) -> bool {
    if s0.len() != s1.len() {
        return false;
    }
    let mut s0 = s0.chars();
    let mut s1 = s1.chars();
    while let Some(c) = s0.next() {
        if c.to_lowercase().cmp(s1.next().unwrap().to_lowercase()) != std::cmp::Ordering::Equal {
            return false;
        }
    }
    true
}

/// Compares two string references `s0` and `s1` with only ascii case conversion.
///
/// Returns `true` if they are deemed equivalent without regarding ascii case sensitivity.
pub fn cmp_ascii_ignore_case(s0: &str, s1: &str) -> bool {
    if s0.len() != s1.len() {
        return false;
    }
    let mut s0 = s0.chars();
    let mut s1 = s1.chars();
    while let Some(c) = s0.next() {
        if c.to_ascii_lowercase() != s1.next().unwrap().to_ascii_lowercase() {
            return false;
        }
    }
    true
}

/// Checks if `s` ends with `suffix` without regarding case sensitivity.
pub fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    if s.len() < suffix.len() || s.is_char_boundary(s.len() - suffix.len()) == false {
        return false;
    }
    cmp_ignore_case(&s[s.len() - suffix.len()..], suffix)
}

/// Produces the case-folded form used when ordering identifiers.
pub fn fold(s: &str) -> String {
    s.to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_works() {
        let s0 = "ABC";
        let s1 = "abc";
        assert_eq!(cmp_ignore_case(s0, s1), true);
        assert_eq!(cmp_ascii_ignore_case(s0, s1), true);

        // negative case: different lengths
        let s0 = "ABCD";
        let s1 = "abc";
        assert_eq!(cmp_ignore_case(s0, s1), false);
        assert_eq!(cmp_ascii_ignore_case(s0, s1), false);

        // negative case: different letter order
        let s0 = "cba";
        let s1 = "abc";
        assert_eq!(cmp_ignore_case(s0, s1), false);
        assert_eq!(cmp_ascii_ignore_case(s0, s1), false);
    }

    #[test]
    fn suffixes() {
        assert_eq!(ends_with_ignore_case("util_PKG", "_pkg"), true);
        assert_eq!(ends_with_ignore_case("util_pkg", "_PKG"), true);
        assert_eq!(ends_with_ignore_case("util", "_pkg"), false);
        assert_eq!(ends_with_ignore_case("pkg", "_pkg"), false);
    }
}
