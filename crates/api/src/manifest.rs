//! Manifest discovery for `scan create`
//!
//! [`ManifestMatcher`] decides by file name whether a file is a manifest the
//! API accepts. [`discover_manifests`] walks the scan targets and returns
//! every match, skipping vendored and VCS directories.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::models::SupportedFiles;

/// Files larger than this are not uploaded.
pub const DEFAULT_MAX_MANIFEST_SIZE: u64 = 50 * 1024 * 1024;

/// Directory names never descended into.
const SKIPPED_DIRS: [&str; 4] = ["node_modules", ".git", ".hg", ".svn"];

/// Patterns used when the supported-files list is unavailable.
const DEFAULT_PATTERNS: [&str; 16] = [
    "package.json",
    "package-lock.json",
    "npm-shrinkwrap.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "pnpm-lock.yml",
    "bun.lockb",
    "*requirements.txt",
    "requirements*.txt",
    "pyproject.toml",
    "Pipfile",
    "Pipfile.lock",
    "poetry.lock",
    "setup.py",
    "go.mod",
    "go.sum",
];

/// File name matcher over glob-like patterns (`*` wildcard only).
#[derive(Debug, Clone)]
pub struct ManifestMatcher {
    patterns: Vec<String>,
}

impl ManifestMatcher {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Matcher for the API's supported-files list. Falls back to the
    /// built-in patterns when the list is empty.
    pub fn from_supported(supported: &SupportedFiles) -> Self {
        let patterns = supported.patterns();
        if patterns.is_empty() {
            Self::default()
        } else {
            Self::new(patterns)
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_manifest(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|p| glob_match(p, name))
    }
}

impl Default for ManifestMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS)
    }
}

/// Case-insensitive match of `name` against a pattern where `*` matches any run
/// of characters.
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let name = name.to_lowercase();
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == name;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !name.starts_with(first) || !name[first.len()..].ends_with(last) {
        return false;
    }
    if name.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &name[first.len()..name.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}

/// Collects manifest files under each target. A target that is itself a file
/// is included when it matches. Results are sorted and deduplicated.
pub fn discover_manifests(
    targets: &[PathBuf],
    matcher: &ManifestMatcher,
    max_file_size: u64,
) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for target in targets {
        if !target.exists() {
            tracing::warn!(target = %target.display(), "scan target does not exist");
            continue;
        }

        let walker = WalkDir::new(target)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !SKIPPED_DIRS.iter().any(|d| e.file_name() == *d)
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || !matcher.is_manifest(entry.path()) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "failed to read file metadata"
                    );
                    continue;
                }
            };
            if size > max_file_size {
                tracing::warn!(
                    path = %entry.path().display(),
                    size,
                    max = max_file_size,
                    "manifest too large, skipping"
                );
                continue;
            }

            found.push(entry.into_path());
        }
    }

    found.sort();
    found.dedup();
    tracing::debug!(count = found.len(), "manifest discovery finished");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn glob_matches_literal_and_wildcards() {
        assert!(glob_match("package.json", "package.json"));
        assert!(glob_match("package.json", "Package.JSON"));
        assert!(!glob_match("package.json", "package.json5"));
        assert!(glob_match("*requirements.txt", "dev-requirements.txt"));
        assert!(glob_match("*requirements.txt", "requirements.txt"));
        assert!(glob_match("requirements*.txt", "requirements-dev.txt"));
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(!glob_match("a*b*c", "axxc"));
        assert!(!glob_match("ab*ba", "aba"));
    }

    #[test]
    fn default_matcher_knows_common_manifests() {
        let matcher = ManifestMatcher::default();
        assert!(matcher.is_manifest(Path::new("app/package-lock.json")));
        assert!(matcher.is_manifest(Path::new("go.mod")));
        assert!(!matcher.is_manifest(Path::new("src/main.rs")));
    }

    #[test]
    fn discovery_skips_node_modules_and_git() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("web/yarn.lock"), "").unwrap();
        fs::create_dir_all(root.join("node_modules/dep")).unwrap();
        fs::write(root.join("node_modules/dep/package.json"), "{}").unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/package.json"), "{}").unwrap();
        fs::write(root.join("README.md"), "hi").unwrap();

        let found = discover_manifests(
            &[root.to_path_buf()],
            &ManifestMatcher::default(),
            DEFAULT_MAX_MANIFEST_SIZE,
        );
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["package.json", "web/yarn.lock"]);
    }

    #[test]
    fn discovery_skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package-lock.json"), "x".repeat(64)).unwrap();

        let found =
            discover_manifests(&[dir.path().to_path_buf()], &ManifestMatcher::default(), 10);
        assert!(found.is_empty());
    }

    #[test]
    fn discovery_accepts_file_targets_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("go.mod");
        fs::write(&file, "module x").unwrap();

        let found = discover_manifests(
            &[file.clone(), dir.path().to_path_buf()],
            &ManifestMatcher::default(),
            DEFAULT_MAX_MANIFEST_SIZE,
        );
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn missing_target_is_skipped() {
        let found = discover_manifests(
            &[PathBuf::from("/definitely/not/here")],
            &ManifestMatcher::default(),
            DEFAULT_MAX_MANIFEST_SIZE,
        );
        assert!(found.is_empty());
    }
}
