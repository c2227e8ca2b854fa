//! Template copy via rsync.

use super::CommandSpec;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct RsyncOptions {
    pub recursive: bool,
    /// Copy symlinks as symlinks.
    pub links: bool,
    pub perms: bool,
    /// Extra rsync args (verbatim).
    pub extra_args: Vec<String>,
}

impl RsyncOptions {
    /// Recursive copy preserving symlinks and permission bits.
    pub fn template() -> Self {
        Self {
            recursive: true,
            links: true,
            perms: true,
            extra_args: Vec::new(),
        }
    }
}

/// Copy the *contents* of `src` into `dst`. Both get a trailing slash.
pub fn rsync_command(src: &Path, dst: &Path, opts: &RsyncOptions) -> CommandSpec {
    let mut cmd = CommandSpec::new("rsync");
    if opts.recursive {
        cmd = cmd.arg("--recursive");
    }
    if opts.links {
        cmd = cmd.arg("--links");
    }
    if opts.perms {
        cmd = cmd.arg("--perms");
    }
    cmd.args(opts.extra_args.iter().cloned())
        .arg(with_trailing_slash(src))
        .arg(with_trailing_slash(dst))
}

fn with_trailing_slash(path: &Path) -> String {
    let s = path.display().to_string();
    if s.ends_with('/') {
        s
    } else {
        format!("{}/", s)
    }
}
