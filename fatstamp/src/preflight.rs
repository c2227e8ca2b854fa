//! Preflight checks: privileges and required tools.

use crate::flash::FlashOptions;
use anyhow::Result;
use fatstamp_error::StampError;
use std::env;
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

const BASE_TOOLS: [&str; 4] = ["parted", "partprobe", "mkfs.fat", "sync"];
const TEMPLATE_TOOLS: [&str; 3] = ["mount", "umount", "rsync"];

pub fn required_tools(options: &FlashOptions) -> Vec<&'static str> {
    let mut tools = BASE_TOOLS.to_vec();
    if options.template.is_some() {
        tools.extend(TEMPLATE_TOOLS);
    }
    tools
}

/// First executable named `tool` in a `PATH`-style list.
pub fn find_in_path(tool: &str, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .map(|dir| dir.join(tool))
        .find(|candidate| {
            candidate
                .metadata()
                .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
        })
}

pub fn check_tools(tools: &[&str], path_var: &OsStr) -> Result<()> {
    for tool in tools {
        match find_in_path(tool, path_var) {
            Some(found) => log::debug!("✅ {} -> {}", tool, found.display()),
            None => return Err(StampError::MissingTool(tool.to_string()).into()),
        }
    }
    Ok(())
}

pub fn check_root() -> Result<()> {
    if !nix::unistd::geteuid().is_root() {
        return Err(StampError::NotRoot.into());
    }
    Ok(())
}

pub fn run(options: &FlashOptions) -> Result<()> {
    log::debug!("Running preflight checks");
    check_root()?;
    let path_var = env::var_os("PATH").unwrap_or_default();
    check_tools(&required_tools(options), &path_var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fake_tool(dir: &std::path::Path, name: &str, mode: u32) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn template_needs_mount_tools() {
        let plain = required_tools(&FlashOptions::new("L"));
        assert!(!plain.contains(&"rsync"));

        let with_template = required_tools(&FlashOptions::new("L").with_template("/srv"));
        for tool in ["mount", "umount", "rsync", "parted"] {
            assert!(with_template.contains(&tool));
        }
    }

    #[test]
    fn finds_executables_only() {
        let dir = tempdir().unwrap();
        fake_tool(dir.path(), "parted", 0o755);
        fake_tool(dir.path(), "partprobe", 0o644);

        let path_var = env::join_paths([dir.path()]).unwrap();
        assert!(find_in_path("parted", &path_var).is_some());
        assert!(find_in_path("partprobe", &path_var).is_none());
        assert!(find_in_path("mkfs.fat", &path_var).is_none());
    }

    #[test]
    fn missing_tool_is_named() {
        let dir = tempdir().unwrap();
        fake_tool(dir.path(), "parted", 0o755);
        let path_var = env::join_paths([dir.path()]).unwrap();

        let err = check_tools(&["parted", "mkfs.fat"], &path_var).unwrap_err();
        match err.downcast_ref::<StampError>() {
            Some(StampError::MissingTool(tool)) => assert_eq!(tool, "mkfs.fat"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
