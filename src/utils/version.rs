//! Build version derivation

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use std::process::Command;

lazy_static! {
    static ref NUMERIC_TAIL: Regex = Regex::new(r"(^|\.)\d+$").unwrap();
}

/// Version string for a build.
///
/// Release builds use the metadata version unchanged. Development builds
/// append the build number, padding numeric versions to three components
/// first, so `1.2` with build `7` becomes `1.2.0.7`.
pub fn get_build_version(version: &str, release_build: bool, build_num: &str) -> String {
    if release_build || build_num.is_empty() {
        return version.to_string();
    }
    let mut version = version.to_string();
    if NUMERIC_TAIL.is_match(&version) {
        while version.matches('.').count() < 2 {
            version.push_str(".0");
        }
    }
    format!("{}.{}", version, build_num)
}

/// Build number from the repository `base_dir` lives in, `0` when unknown.
pub fn build_number(base_dir: &Path) -> String {
    let from_vcs = if base_dir.join(".hg").is_dir() {
        run(Command::new("hg").arg("id").arg("-R").arg(base_dir).arg("-n"))
            .map(|out| out.chars().filter(char::is_ascii_digit).collect::<String>())
    } else if base_dir.join(".git").exists() {
        run(Command::new("git").args(["rev-list", "--count", "HEAD"]).current_dir(base_dir))
            .map(|out| out.trim().to_string())
    } else {
        None
    };

    match from_vcs {
        Some(num) if !num.is_empty() => num,
        _ => "0".to_string(),
    }
}

fn run(command: &mut Command) -> Option<String> {
    let output = command.output().ok()?;
    if !output.status.success() {
        tracing::debug!("{:?} exited with {}", command, output.status);
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
