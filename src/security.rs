use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Validation error types
#[derive(Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("Error: command must not be empty")]
    EmptyCommand,
    #[error("Error: Working directory must be under $HOME: {0}")]
    OutsideHome(String),
}

/// Trait for request types that need validation before execution
pub trait Validatable {
    /// Validate the request, returning an error if invalid
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Lexically normalize a path: drop `.`, let `..` remove the previous
/// component and collapse repeated or trailing separators. Symlinks are not
/// followed and the filesystem is never touched.
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let mut components = path.as_ref().components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().copied() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => {}
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

/// Anchor `path` at `cwd` when relative, then normalize
fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(cwd.join(path))
    }
}

/// Decide whether `candidate` lies at or below `root`.
///
/// Both sides are made absolute against `cwd` and normalized, then the path
/// from root to candidate is computed. The candidate is contained only if that
/// relative path exists, has no `..` segment and is not itself rooted. Any
/// input that cannot be anchored (relative `cwd`, empty root) is denied.
pub fn is_contained(root: &Path, candidate: &Path, cwd: &Path) -> bool {
    if !cwd.is_absolute() || root.as_os_str().is_empty() {
        return false;
    }
    let root = absolutize(root, cwd);
    let candidate = absolutize(candidate, cwd);

    match candidate.strip_prefix(&root) {
        Ok(relative) => {
            !relative.is_absolute()
                && !relative
                    .components()
                    .any(|c| matches!(c, Component::ParentDir | Component::Prefix(..) | Component::RootDir))
        }
        Err(_) => false,
    }
}

/// Confinement of command working directories to a single root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentPolicy {
    root: Option<PathBuf>,
}

impl ContainmentPolicy {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Confine to the invoking user's home directory. Without a home
    /// directory every path is denied.
    pub fn for_home() -> Self {
        Self {
            root: dirs::home_dir(),
        }
    }

    /// Check a candidate, resolving relative paths against the current
    /// directory at call time
    pub fn allows(&self, candidate: &Path) -> bool {
        let Some(root) = self.root.as_deref() else {
            return false;
        };
        match std::env::current_dir() {
            Ok(cwd) => is_contained(root, candidate, &cwd),
            Err(_) => false,
        }
    }

    pub fn check(&self, candidate: &Path) -> Result<(), ValidationError> {
        if self.allows(candidate) {
            Ok(())
        } else {
            Err(ValidationError::OutsideHome(candidate.display().to_string()))
        }
    }
}

/// Whether `candidate` is the home directory or nested inside it
pub fn is_under_home(candidate: impl AsRef<Path>) -> bool {
    ContainmentPolicy::for_home().allows(candidate.as_ref())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const HOME: &str = "/home/user";
    const CWD: &str = "/home/user/projects";

    fn under_home(candidate: &str) -> bool {
        is_contained(Path::new(HOME), Path::new(candidate), Path::new(CWD))
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/home/user/./a/../b"), PathBuf::from("/home/user/b"));
        assert_eq!(normalize_path("/home/user/"), PathBuf::from("/home/user"));
        assert_eq!(normalize_path("/home//user///"), PathBuf::from("/home/user"));
        assert_eq!(normalize_path("/../.."), PathBuf::from("/"));
    }

    #[test]
    fn test_allows_paths_under_home() {
        assert!(under_home("/home/user/projects"));
        assert!(under_home("/home/user"));
        assert!(under_home("/home/user/documents/files"));
    }

    #[test]
    fn test_denies_paths_outside_home() {
        assert!(!under_home("/var/www"));
        assert!(!under_home("/tmp"));
        assert!(!under_home("/home/otheruser"));
        assert!(!under_home("/home"));
        assert!(!under_home("/"));
    }

    #[test]
    fn test_denies_sibling_sharing_string_prefix() {
        assert!(!under_home("/home/user2"));
        assert!(!under_home("/home/username/projects"));
    }

    #[test]
    fn test_relative_paths_resolve_against_cwd() {
        assert!(under_home("."));
        assert!(under_home("./subdir"));
        assert!(under_home("../documents"));
        assert!(under_home(".."));
        assert!(!under_home("../../.."));
        assert!(!under_home("../../user2"));
    }

    #[test]
    fn test_traversal_out_and_back_in() {
        assert!(under_home("/home/user/../user/projects"));
        assert!(!under_home("/home/user/projects/../../other"));
    }

    #[test]
    fn test_trailing_separators() {
        assert!(under_home("/home/user/"));
        assert!(under_home("/home/user//projects/"));
        assert!(is_contained(Path::new("/home/user/"), Path::new("/home/user"), Path::new(CWD)));
    }

    #[test]
    fn test_idempotent_under_normalization() {
        for p in ["/home/user/a/../b", "./x/./y", "../../..", "/home/user2/..", "/tmp/../home/user"] {
            let normalized = normalize_path(Path::new(CWD).join(p));
            assert_eq!(
                under_home(p),
                is_contained(Path::new(HOME), &normalized, Path::new(CWD)),
                "{p}"
            );
        }
    }

    #[test]
    fn test_relative_cwd_is_denied() {
        assert!(!is_contained(Path::new(HOME), Path::new("."), Path::new("relative/dir")));
    }

    #[test]
    fn test_empty_root_is_denied() {
        assert!(!is_contained(Path::new(""), Path::new("/home/user"), Path::new(CWD)));
    }

    #[test]
    fn test_policy_with_temp_root() {
        let root = tempfile::TempDir::new().unwrap();
        let policy = ContainmentPolicy::new(root.path());
        assert!(policy.allows(root.path()));
        assert!(policy.allows(&root.path().join("not/created/yet")));
        assert!(!policy.allows(Path::new("/")));
        assert!(!policy.allows(&root.path().join("..")));
    }

    #[test]
    fn test_policy_check_names_path() {
        let root = tempfile::TempDir::new().unwrap();
        let policy = ContainmentPolicy::new(root.path());
        let err = policy.check(Path::new("/")).unwrap_err();
        assert_eq!(err, ValidationError::OutsideHome("/".to_string()));
        assert_eq!(err.to_string(), "Error: Working directory must be under $HOME: /");
    }

    #[test]
    fn test_policy_without_root_denies_everything() {
        let policy = ContainmentPolicy { root: None };
        assert!(!policy.allows(Path::new(".")));
        assert!(!policy.allows(Path::new("/")));
    }

    #[test]
    fn test_is_under_home_accepts_home_itself() {
        if let Some(home) = dirs::home_dir() {
            assert!(is_under_home(&home));
            assert!(is_under_home(home.join("nested")));
        }
    }
}
