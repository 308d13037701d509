//! Installed language runtime detection.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use regex::Regex;

use crate::system::command::run_tool;
use crate::system::package_manager::resolve_tool_path;

/// A runtime we know how to ask for its version.
struct RuntimeCheck {
    name: &'static str,
    binaries: &'static [&'static str],
    args: &'static [&'static str],
}

const RUNTIME_CHECKS: &[RuntimeCheck] = &[
    RuntimeCheck {
        name: "node",
        binaries: &["node"],
        args: &["--version"],
    },
    RuntimeCheck {
        name: "python",
        binaries: &["python3", "python"],
        args: &["--version"],
    },
    RuntimeCheck {
        name: "ruby",
        binaries: &["ruby"],
        args: &["--version"],
    },
    RuntimeCheck {
        name: "go",
        binaries: &["go"],
        args: &["version"],
    },
    RuntimeCheck {
        name: "rust",
        binaries: &["rustc"],
        args: &["--version"],
    },
    // java prints its version to stderr
    RuntimeCheck {
        name: "java",
        binaries: &["java"],
        args: &["-version"],
    },
    RuntimeCheck {
        name: "dart",
        binaries: &["dart"],
        args: &["--version"],
    },
];

/// Names of every runtime [`detect_runtimes`] looks for.
pub fn known_runtimes() -> impl Iterator<Item = &'static str> {
    RUNTIME_CHECKS.iter().map(|check| check.name)
}

/// Detect installed runtimes and their versions.
///
/// Version commands run concurrently, each killed after `timeout`.
/// Runtimes whose binary is missing, too slow, or whose output carries no
/// version are left out of the map.
pub fn detect_runtimes(path_entries: &[PathBuf], timeout: Duration) -> BTreeMap<String, String> {
    let found: Vec<Option<(String, String)>> = thread::scope(|scope| {
        let handles: Vec<_> = RUNTIME_CHECKS
            .iter()
            .map(|check| scope.spawn(move || detect_one(check, path_entries, timeout)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().ok().flatten())
            .collect()
    });

    found.into_iter().flatten().collect()
}

fn detect_one(check: &RuntimeCheck, path_entries: &[PathBuf], timeout: Duration) -> Option<(String, String)> {
    let binary = check
        .binaries
        .iter()
        .find_map(|bin| resolve_tool_path(bin, path_entries))?;

    let output = run_tool(&binary, check.args, timeout)?;
    let version = extract_version(&output.combined())?;
    tracing::debug!("Detected {} {}", check.name, version);
    Some((check.name.to_string(), version))
}

fn version_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(\d+\.\d+\.\d+)",
            r"version\s+(\d+\.\d+)",
            r"v(\d+\.\d+)",
            r"(\d+\.\d+)",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Extract a version number from tool output.
pub fn extract_version(output: &str) -> Option<String> {
    version_patterns().iter().find_map(|re| {
        re.captures(output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_version_semver() {
        assert_eq!(extract_version("v20.11.1"), Some("20.11.1".to_string()));
        assert_eq!(
            extract_version("Python 3.11.7"),
            Some("3.11.7".to_string())
        );
    }

    #[test]
    fn extract_version_go_and_java_styles() {
        assert_eq!(
            extract_version("go version go1.22.1 linux/amd64"),
            Some("1.22.1".to_string())
        );
        assert_eq!(
            extract_version("openjdk version \"21.0.2\" 2024-01-16"),
            Some("21.0.2".to_string())
        );
    }

    #[test]
    fn extract_version_two_part() {
        assert_eq!(extract_version("tool version 4.2"), Some("4.2".to_string()));
        assert_eq!(extract_version("v3.1"), Some("3.1".to_string()));
    }

    #[test]
    fn extract_version_none_without_digits() {
        assert_eq!(extract_version("command not found"), None);
    }

    #[test]
    fn detect_runtimes_with_empty_path_finds_nothing() {
        assert!(detect_runtimes(&[], Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn known_runtimes_are_unique() {
        let names: Vec<_> = known_runtimes().collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[cfg(unix)]
    #[test]
    fn detect_runtimes_reads_fake_binary() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let node = temp.path().join("node");
        std::fs::write(&node, "#!/bin/sh\necho v18.19.0\n").unwrap();
        std::fs::set_permissions(&node, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runtimes = detect_runtimes(&[temp.path().to_path_buf()], Duration::from_secs(2));
        assert_eq!(runtimes.get("node").map(String::as_str), Some("18.19.0"));
        assert_eq!(runtimes.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn slow_runtime_does_not_hide_the_others() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Instant;

        let temp = tempfile::TempDir::new().unwrap();
        for (name, body) in [("node", "echo v18.19.0"), ("java", "exec sleep 30")] {
            let path = temp.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let started = Instant::now();
        let runtimes = detect_runtimes(&[temp.path().to_path_buf()], Duration::from_millis(500));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(runtimes.get("node").map(String::as_str), Some("18.19.0"));
        assert!(!runtimes.contains_key("java"));
    }
}
