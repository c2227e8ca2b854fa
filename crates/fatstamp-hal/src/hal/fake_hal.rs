//! Fake HAL implementation for testing.
//!
//! Records every command without executing it, so flashing workflows can be
//! exercised in CI without root privileges or real hardware. It also plays the
//! kernel's part: `partprobe <disk>` makes `<disk>1` appear as a block device.

use super::{CommandRunner, CommandSpec, ProbeOps};
use crate::path::partition_path;
use crate::{FlashError, FlashResult};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Command {
        program: String,
        args: Vec<String>,
        blocking: bool,
    },
    ProbeBlockDevice {
        path: PathBuf,
    },
}

/// Matches a command by program name and, optionally, one of its arguments.
#[derive(Debug, Clone)]
struct CommandRule {
    program: String,
    arg: Option<String>,
}

impl CommandRule {
    fn matches(&self, cmd: &CommandSpec) -> bool {
        cmd.program == self.program
            && self
                .arg
                .as_ref()
                .map_or(true, |arg| cmd.args.iter().any(|a| a == arg))
    }
}

#[derive(Debug, Default)]
struct FakeHalState {
    operations: Vec<Operation>,
    block_devices: HashSet<PathBuf>,
    /// Disks whose partition never shows up after partprobe.
    withheld_partitions: HashSet<PathBuf>,
    /// partition -> mount point
    mounts: HashMap<PathBuf, PathBuf>,
    failures: Vec<(CommandRule, i32)>,
    panics: Vec<CommandRule>,
}

enum Outcome {
    Ok,
    Exit(i32),
    Panic,
}

/// Fake HAL implementation that records operations without executing them.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeHalState> {
        self.state.lock().unwrap()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().operations.clone()
    }

    pub fn operation_count(&self) -> usize {
        self.lock().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.lock().operations.iter().any(check)
    }

    /// Every command that was run, in order.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Command { program, args, .. } => Some(CommandSpec {
                    program: program.clone(),
                    args: args.clone(),
                }),
                Operation::ProbeBlockDevice { .. } => None,
            })
            .collect()
    }

    /// Commands of one program, in order.
    pub fn commands_of(&self, program: &str) -> Vec<CommandSpec> {
        self.commands()
            .into_iter()
            .filter(|cmd| cmd.program == program)
            .collect()
    }

    /// Commands mentioning `arg` (a device or partition path, typically).
    pub fn commands_mentioning(&self, arg: &str) -> Vec<CommandSpec> {
        self.commands()
            .into_iter()
            .filter(|cmd| cmd.args.iter().any(|a| a == arg))
            .collect()
    }

    /// Mount points passed to every `mount` invocation, successful or not.
    pub fn mount_points(&self) -> Vec<PathBuf> {
        self.commands_of("mount")
            .into_iter()
            .filter_map(|cmd| cmd.args.get(1).map(PathBuf::from))
            .collect()
    }

    pub fn is_mounted(&self, partition: &Path) -> bool {
        self.lock().mounts.contains_key(partition)
    }

    /// Make every invocation of `program` exit with `code`.
    pub fn fail_command(&self, program: &str, code: i32) {
        self.lock().failures.push((
            CommandRule {
                program: program.to_string(),
                arg: None,
            },
            code,
        ));
    }

    /// Make invocations of `program` that mention `arg` exit with `code`.
    pub fn fail_command_with_arg(&self, program: &str, arg: &str, code: i32) {
        self.lock().failures.push((
            CommandRule {
                program: program.to_string(),
                arg: Some(arg.to_string()),
            },
            code,
        ));
    }

    /// Panic inside `run` for invocations of `program` that mention `arg`.
    pub fn panic_on_command(&self, program: &str, arg: &str) {
        self.lock().panics.push(CommandRule {
            program: program.to_string(),
            arg: Some(arg.to_string()),
        });
    }

    /// Keep `<disk>1` from appearing when `disk` is re-probed.
    pub fn withhold_partition(&self, disk: &Path) {
        self.lock().withheld_partitions.insert(disk.to_path_buf());
    }

    pub fn add_block_device(&self, path: &Path) {
        self.lock().block_devices.insert(path.to_path_buf());
    }

    /// Clear all recorded operations and simulated state. Injected failures stay.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.operations.clear();
        state.block_devices.clear();
        state.mounts.clear();
    }

    fn execute(&self, cmd: &CommandSpec, blocking: bool) -> FlashResult<()> {
        let outcome = {
            let mut state = self.lock();
            state.operations.push(Operation::Command {
                program: cmd.program.clone(),
                args: cmd.args.clone(),
                blocking,
            });

            let exit_code = state
                .failures
                .iter()
                .find(|(rule, _)| rule.matches(cmd))
                .map(|(_, code)| *code);

            if state.panics.iter().any(|rule| rule.matches(cmd)) {
                Outcome::Panic
            } else if let Some(code) = exit_code {
                Outcome::Exit(code)
            } else {
                apply_side_effects(&mut state, cmd);
                Outcome::Ok
            }
        };

        // The lock is released before panicking so sibling tasks keep working.
        match outcome {
            Outcome::Ok => Ok(()),
            Outcome::Exit(code) => Err(FlashError::CommandFailed {
                command: cmd.quoted(),
                code: Some(code),
            }),
            Outcome::Panic => panic!("FakeHal: injected panic for `{}`", cmd),
        }
    }
}

fn apply_side_effects(state: &mut FakeHalState, cmd: &CommandSpec) {
    match (cmd.program.as_str(), cmd.args.as_slice()) {
        ("partprobe", [disk]) => {
            let disk = PathBuf::from(disk);
            if !state.withheld_partitions.contains(&disk) {
                state.block_devices.insert(partition_path(&disk));
            }
        }
        ("mount", [partition, mount_point]) => {
            state
                .mounts
                .insert(PathBuf::from(partition), PathBuf::from(mount_point));
        }
        ("umount", [partition]) => {
            state.mounts.remove(Path::new(partition));
        }
        _ => {}
    }
}

impl CommandRunner for FakeHal {
    async fn run(&self, cmd: &CommandSpec) -> FlashResult<()> {
        log::info!("FAKE HAL: {}", cmd);
        // Every real command is a suspension point; mirror that.
        tokio::task::yield_now().await;
        self.execute(cmd, false)
    }

    fn run_blocking(&self, cmd: &CommandSpec) -> FlashResult<()> {
        log::info!("FAKE HAL (blocking): {}", cmd);
        self.execute(cmd, true)
    }
}

impl ProbeOps for FakeHal {
    async fn is_block_device(&self, path: &Path) -> FlashResult<bool> {
        tokio::task::yield_now().await;
        let mut state = self.lock();
        state.operations.push(Operation::ProbeBlockDevice {
            path: path.to_path_buf(),
        });
        Ok(state.block_devices.contains(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_hal_records_commands() {
        let hal = FakeHal::new();
        hal.run(&CommandSpec::new("sync")).await.unwrap();

        assert_eq!(hal.operation_count(), 1);
        assert_eq!(hal.commands(), vec![CommandSpec::new("sync")]);
    }

    #[tokio::test]
    async fn partprobe_materialises_first_partition() {
        let hal = FakeHal::new();
        let part = Path::new("/dev/sdb1");
        assert!(!hal.is_block_device(part).await.unwrap());

        hal.run(&CommandSpec::new("partprobe").arg("/dev/sdb"))
            .await
            .unwrap();
        assert!(hal.is_block_device(part).await.unwrap());
    }

    #[tokio::test]
    async fn withheld_partition_never_appears() {
        let hal = FakeHal::new();
        hal.withhold_partition(Path::new("/dev/sdb"));
        hal.run(&CommandSpec::new("partprobe").arg("/dev/sdb"))
            .await
            .unwrap();
        assert!(!hal.is_block_device(Path::new("/dev/sdb1")).await.unwrap());
    }

    #[tokio::test]
    async fn injected_failure_matches_on_argument() {
        let hal = FakeHal::new();
        hal.fail_command_with_arg("mkfs.fat", "/dev/sdc1", 1);

        let ok = CommandSpec::new("mkfs.fat").args(["-n", "L", "/dev/sdb1"]);
        let bad = CommandSpec::new("mkfs.fat").args(["-n", "L", "/dev/sdc1"]);
        hal.run(&ok).await.unwrap();
        let err = hal.run(&bad).await.unwrap_err();
        match err {
            FlashError::CommandFailed { command, code } => {
                assert_eq!(command, "mkfs.fat -n L /dev/sdc1");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Failed commands are still recorded.
        assert_eq!(hal.commands_of("mkfs.fat").len(), 2);
    }

    #[tokio::test]
    async fn mount_and_umount_are_tracked() {
        let hal = FakeHal::new();
        let part = Path::new("/dev/sdb1");
        hal.run(&CommandSpec::new("mount").args(["/dev/sdb1", "/mnt/x"]))
            .await
            .unwrap();
        assert!(hal.is_mounted(part));
        assert_eq!(hal.mount_points(), vec![PathBuf::from("/mnt/x")]);

        hal.run_blocking(&CommandSpec::new("umount").arg("/dev/sdb1"))
            .unwrap();
        assert!(!hal.is_mounted(part));
    }

    #[tokio::test]
    async fn fake_hal_can_clear() {
        let hal = FakeHal::new();
        hal.add_block_device(Path::new("/dev/sdb"));
        hal.run(&CommandSpec::new("sync")).await.unwrap();
        hal.clear();

        assert_eq!(hal.operation_count(), 0);
        assert!(!hal.is_block_device(Path::new("/dev/sdb")).await.unwrap());
    }
}
