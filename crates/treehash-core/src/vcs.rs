//! Version-control metadata detection.

/// Check whether any full segment of `path` is one of `vcs_dirs`.
///
/// Both `/` and `\` separate segments, so archive names and native paths are
/// handled alike. Partial matches (`.github`, `my.git`) do not count.
pub fn is_vcs_path<S: AsRef<str>>(path: &str, vcs_dirs: &[S]) -> bool {
    path.split(['/', '\\'])
        .any(|segment| vcs_dirs.iter().any(|dir| dir.as_ref() == segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIT: &[&str] = &[".git"];

    #[test]
    fn test_matches_any_segment() {
        assert!(is_vcs_path(".git/config", GIT));
        assert!(is_vcs_path("project/.git/objects/ab/cdef", GIT));
        assert!(is_vcs_path("project/.git", GIT));
        assert!(is_vcs_path(".git", GIT));
        assert!(is_vcs_path(r"C:\src\.git\HEAD", GIT));
    }

    #[test]
    fn test_ignores_partial_segments() {
        assert!(!is_vcs_path(".github/workflows/ci.yml", GIT));
        assert!(!is_vcs_path("my.git/readme.md", GIT));
        assert!(!is_vcs_path("docs/.gitignore", GIT));
        assert!(!is_vcs_path("readme.md", GIT));
    }

    #[test]
    fn test_custom_dirs() {
        let dirs = vec![".hg".to_string(), ".svn".to_string()];
        assert!(is_vcs_path("a/.svn/entries", &dirs));
        assert!(!is_vcs_path("a/.git/config", &dirs));
    }
}
