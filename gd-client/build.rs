use std::{env, path::Path, process::Command};

/// Build stamps exposed to the binary: variable name, git query, fallback.
const GIT_STAMPS: [(&str, &[&str], &str); 2] = [
    ("GD_BUILD_GIT_TAG", &["describe", "--tags", "--abbrev=0"], "untagged"),
    ("GD_BUILD_GIT_COMMIT", &["rev-parse", "--short=10", "HEAD"], "unknown"),
];

fn main() {
    for (name, query, fallback) in GIT_STAMPS {
        let value = stamp(name, || git(query).unwrap_or_else(|| fallback.to_string()));
        println!("cargo:rustc-env={name}={value}");
    }

    let dirty = stamp("GD_BUILD_GIT_DIRTY", || {
        git(&["status", "--porcelain", "--untracked-files=no"])
            .map(|status| (!status.is_empty()).to_string())
            .unwrap_or_else(|| "false".to_string())
    });
    println!("cargo:rustc-env=GD_BUILD_GIT_DIRTY={dirty}");

    let target = stamp("GD_BUILD_TARGET", || {
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    });
    println!("cargo:rustc-env=GD_BUILD_TARGET={target}");

    // Re-stamp after a checkout or commit.
    if let Some(head) = git(&["rev-parse", "--git-path", "HEAD"]) {
        if Path::new(&head).exists() {
            println!("cargo:rerun-if-changed={head}");
        }
    }
}

/// An explicit environment override wins over what git reports.
fn stamp(name: &str, detect: impl FnOnce() -> String) -> String {
    println!("cargo:rerun-if-env-changed={name}");
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => detect(),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}
