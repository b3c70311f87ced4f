//! Version control hygiene for credentials
//!
//! `key.properties` holds signing passwords and must never be committed.
//! Inside a git work tree the answer comes from `git check-ignore`. Outside
//! one, the Android project's `.gitignore` and the one in the Flutter project
//! root above it are evaluated with git's precedence rules.

use dersplan_core::error::Result;
use dersplan_core::process::run_command_in_dir;
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Whether a file is excluded from version control, and by what
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IgnoreStatus {
    /// `git check-ignore` reports the file as ignored
    IgnoredByGit,
    /// Matched by a rule in this `.gitignore` (no git work tree)
    Ignored {
        /// The `.gitignore` whose rule decided
        gitignore: PathBuf,
    },
    /// Nothing excludes it
    NotIgnored,
}

impl IgnoreStatus {
    /// Whether the file is excluded
    pub fn is_ignored(&self) -> bool {
        !matches!(self, Self::NotIgnored)
    }

    /// What excluded the file, for display
    pub fn source(&self) -> Option<String> {
        match self {
            Self::IgnoredByGit => Some("git check-ignore".to_string()),
            Self::Ignored { gitignore } => Some(gitignore.display().to_string()),
            Self::NotIgnored => None,
        }
    }
}

struct Rule {
    pattern: Pattern,
    negated: bool,
    anchored: bool,
    dir_only: bool,
}

impl Rule {
    /// Whether the rule matches exactly this path (not its parents)
    fn matches(&self, components: &[&str], is_dir: bool) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        if self.dir_only && !is_dir {
            return false;
        }
        match components.last() {
            None => false,
            Some(name) if !self.anchored => self.pattern.matches_with(name, options),
            Some(_) => self.pattern.matches_with(&components.join("/"), options),
        }
    }
}

fn parse_rules(content: &str) -> Vec<Rule> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let (negated, line) = match line.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, line),
            };
            let (dir_only, line) = match line.strip_suffix('/') {
                Some(rest) => (true, rest),
                None => (false, line),
            };
            let anchored = line.contains('/');
            let line = line.trim_start_matches('/');

            match Pattern::new(line) {
                Ok(pattern) => Some(Rule { pattern, negated, anchored, dir_only }),
                Err(e) => {
                    tracing::debug!(rule = line, error = %e, "skipping unparseable .gitignore rule");
                    None
                }
            }
        })
        .collect()
}

/// Rules of one `.gitignore`, applying below `base`
struct IgnoreFile {
    base: Vec<String>,
    rules: Vec<Rule>,
}

impl IgnoreFile {
    /// Last matching rule's verdict for a path below `base`
    fn verdict(&self, path: &[&str], is_dir: bool) -> Option<bool> {
        let under_base = path.len() > self.base.len()
            && self.base.iter().zip(path).all(|(base, part)| base == part);
        if !under_base {
            return None;
        }

        let relative = &path[self.base.len()..];
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(relative, is_dir))
            .map(|rule| !rule.negated)
    }
}

/// Evaluate `path` against files ordered from the root down.
///
/// A deeper file overrides a shallower one, and nothing below an excluded
/// directory can be re-included. Returns the index of the deciding file.
fn excluded_by(files: &[IgnoreFile], path: &[&str]) -> Option<usize> {
    let decide = |prefix: &[&str], is_dir: bool| {
        files
            .iter()
            .enumerate()
            .filter_map(|(index, file)| file.verdict(prefix, is_dir).map(|ignored| (index, ignored)))
            .last()
    };

    for len in 1..=path.len() {
        let is_dir = len < path.len();
        if let Some((index, true)) = decide(&path[..len], is_dir) {
            return Some(index);
        }
    }
    None
}

/// Whether `.gitignore` content excludes `relative_path`.
///
/// Supports comments, negation, anchored and directory-only rules. The last
/// matching rule decides, and a file inside an excluded directory stays
/// excluded.
pub fn is_ignored_by(gitignore: &str, relative_path: &str) -> bool {
    let components: Vec<&str> = relative_path
        .split('/')
        .filter(|c| !c.is_empty())
        .collect();
    let file = IgnoreFile {
        base: Vec::new(),
        rules: parse_rules(gitignore),
    };
    excluded_by(&[file], &components).is_some()
}

/// Ask git; `None` when git is unavailable or `project_dir` is not in a work tree
fn git_check_ignore(project_dir: &Path, file_name: &str) -> Option<bool> {
    match run_command_in_dir("git", &["check-ignore", "-q", "--", file_name], project_dir) {
        Ok(result) => match result.exit_code {
            0 => Some(true),
            1 => Some(false),
            code => {
                tracing::debug!(code, stderr = %result.stderr.trim(), "git check-ignore unavailable");
                None
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "git not runnable, reading .gitignore files");
            None
        }
    }
}

/// Check whether `file_name` inside `project_dir` is excluded from git.
///
/// Uses `git check-ignore` when `project_dir` is inside a work tree, so
/// tracked files and every `.gitignore` level count. Otherwise evaluates the
/// parent directory's `.gitignore` and then `project_dir/.gitignore`.
pub fn check_ignored(project_dir: &Path, file_name: &str) -> Result<IgnoreStatus> {
    match git_check_ignore(project_dir, file_name) {
        Some(true) => return Ok(IgnoreStatus::IgnoredByGit),
        Some(false) => return Ok(IgnoreStatus::NotIgnored),
        None => {}
    }

    let dir_name = project_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let mut sources = Vec::new();
    let mut files = Vec::new();
    let mut path = Vec::new();
    if let (Some(parent), Some(dir_name)) = (project_dir.parent(), dir_name) {
        let root = parent.join(".gitignore");
        files.push(IgnoreFile { base: Vec::new(), rules: read_rules(&root)? });
        sources.push(root);
        files.push(IgnoreFile { base: vec![dir_name.clone()], rules: Vec::new() });
        path.push(dir_name);
    } else {
        files.push(IgnoreFile { base: Vec::new(), rules: Vec::new() });
    }

    let local = project_dir.join(".gitignore");
    if let Some(last) = files.last_mut() {
        last.rules = read_rules(&local)?;
    }
    sources.push(local);
    path.extend(file_name.split('/').filter(|c| !c.is_empty()).map(str::to_string));

    let components: Vec<&str> = path.iter().map(String::as_str).collect();
    Ok(match excluded_by(&files, &components) {
        Some(index) => IgnoreStatus::Ignored { gitignore: sources[index].clone() },
        None => IgnoreStatus::NotIgnored,
    })
}

fn read_rules(gitignore: &Path) -> Result<Vec<Rule>> {
    match std::fs::read_to_string(gitignore) {
        Ok(content) => Ok(parse_rules(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dersplan_core::process::which_command;

    #[test]
    fn test_plain_name_matches_anywhere() {
        assert!(is_ignored_by("key.properties\n", "key.properties"));
        assert!(is_ignored_by("key.properties\n", "android/key.properties"));
        assert!(!is_ignored_by("local.properties\n", "key.properties"));
    }

    #[test]
    fn test_flutter_template_rules() {
        let gitignore = "# Remember to never publicly share your keystore.\n\
                         key.properties\n\
                         **/*.keystore\n\
                         **/*.jks\n";
        assert!(is_ignored_by(gitignore, "key.properties"));
        assert!(is_ignored_by(gitignore, "app/upload.jks"));
    }

    #[test]
    fn test_anchored_and_globstar_rules() {
        assert!(is_ignored_by("/android/key.properties", "android/key.properties"));
        assert!(!is_ignored_by("/key.properties", "android/key.properties"));
        assert!(is_ignored_by("**/android/key.properties", "android/key.properties"));
        assert!(is_ignored_by("*.properties", "android/key.properties"));
    }

    #[test]
    fn test_directory_rules() {
        assert!(is_ignored_by("android/\n", "android/key.properties"));
        assert!(!is_ignored_by("key.properties/\n", "key.properties"));
    }

    #[test]
    fn test_negation_last_rule_wins() {
        assert!(!is_ignored_by("*.properties\n!key.properties\n", "key.properties"));
        assert!(is_ignored_by("!key.properties\n*.properties\n", "key.properties"));
    }

    #[test]
    fn test_negation_cannot_reinclude_inside_excluded_directory() {
        assert!(is_ignored_by("android/\n!android/key.properties\n", "android/key.properties"));
        assert!(is_ignored_by("android\n!key.properties\n", "android/key.properties"));
    }

    /// A Flutter root containing `android/` and no git repository
    fn layout(root_rules: Option<&str>, local_rules: Option<&str>) -> (tempfile::TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let android = root.path().join("android");
        std::fs::create_dir(&android).unwrap();
        if let Some(rules) = root_rules {
            std::fs::write(root.path().join(".gitignore"), rules).unwrap();
        }
        if let Some(rules) = local_rules {
            std::fs::write(android.join(".gitignore"), rules).unwrap();
        }
        (root, android)
    }

    #[test]
    fn test_check_ignored_without_rules() {
        let (_root, android) = layout(None, None);
        assert_eq!(check_ignored(&android, "key.properties").unwrap(), IgnoreStatus::NotIgnored);
    }

    #[test]
    fn test_check_ignored_reports_deciding_file() {
        let (root, android) = layout(Some("android/key.properties\n"), None);
        assert_eq!(
            check_ignored(&android, "key.properties").unwrap(),
            IgnoreStatus::Ignored { gitignore: root.path().join(".gitignore") }
        );

        let (_root, android) = layout(None, Some("key.properties\n"));
        assert_eq!(
            check_ignored(&android, "key.properties").unwrap(),
            IgnoreStatus::Ignored { gitignore: android.join(".gitignore") }
        );
    }

    #[test]
    fn test_check_ignored_deeper_file_overrides_root() {
        let (_root, android) = layout(Some("android/key.properties\n"), Some("!key.properties\n"));
        assert_eq!(check_ignored(&android, "key.properties").unwrap(), IgnoreStatus::NotIgnored);
    }

    #[test]
    fn test_check_ignored_excluded_directory_wins_over_local_negation() {
        let (root, android) = layout(Some("android/\n"), Some("!key.properties\n"));
        assert_eq!(
            check_ignored(&android, "key.properties").unwrap(),
            IgnoreStatus::Ignored { gitignore: root.path().join(".gitignore") }
        );
    }

    #[test]
    fn test_check_ignored_asks_git_inside_work_tree() {
        if which_command("git").is_none() {
            return;
        }
        let (root, android) = layout(Some("android/key.properties\n"), Some("!key.properties\n"));
        let init = run_command_in_dir("git", &["init", "-q"], root.path()).unwrap();
        assert!(init.success);

        assert_eq!(check_ignored(&android, "key.properties").unwrap(), IgnoreStatus::NotIgnored);

        std::fs::write(android.join(".gitignore"), "key.properties\n").unwrap();
        let status = check_ignored(&android, "key.properties").unwrap();
        assert_eq!(status, IgnoreStatus::IgnoredByGit);
        assert_eq!(status.source().as_deref(), Some("git check-ignore"));
    }
}
