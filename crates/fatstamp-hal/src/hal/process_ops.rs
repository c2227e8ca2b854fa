//! Process execution.
//!
//! External commands are "world-touching" and must go through the HAL so the
//! flashing workflow can be tested without spawning real processes.

use crate::FlashResult;
use std::fmt;

/// One external program invocation: program name plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-quoted command line, for logs and error messages.
    pub fn quoted(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.quoted())
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

/// POSIX-shell quoting of a single word.
pub fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_shell_safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r#"'"'"'"#))
}

/// External command runner.
///
/// A command runs to completion with stdin closed and stdout/stderr inherited
/// from the operator's terminal. Exit code 0 is success; anything else is
/// [`crate::FlashError::CommandFailed`].
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, cmd: &CommandSpec) -> FlashResult<()>;

    /// Blocking variant for cleanup paths that cannot await (drop handlers).
    fn run_blocking(&self, cmd: &CommandSpec) -> FlashResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_are_left_alone() {
        let cmd = CommandSpec::new("parted").args(["--script", "/dev/sdb", "mklabel", "msdos"]);
        assert_eq!(cmd.quoted(), "parted --script /dev/sdb mklabel msdos");
    }

    #[test]
    fn unsafe_words_are_single_quoted() {
        assert_eq!(quote_arg("MY STICK"), "'MY STICK'");
        assert_eq!(quote_arg(""), "''");
        assert_eq!(quote_arg("0%"), "0%");
        assert_eq!(quote_arg("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn display_matches_quoted() {
        let cmd = CommandSpec::new("mkfs.fat").arg("-n").arg("A B").arg("/dev/sdb1");
        assert_eq!(cmd.to_string(), "mkfs.fat -n 'A B' /dev/sdb1");
    }
}
