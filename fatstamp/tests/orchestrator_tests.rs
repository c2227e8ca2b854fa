use fatstamp::device::Device;
use fatstamp::flash::{flash_devices, orchestrator, FlashOptions};
use fatstamp_hal::{FakeHal, Operation};
use std::path::Path;
use std::rc::Rc;
use tempfile::tempdir;

fn devices(paths: &[&str]) -> Vec<Device> {
    paths.iter().map(|p| Device::new(*p, 0)).collect()
}

fn sync_count(hal: &FakeHal) -> usize {
    hal.commands_of("sync").len()
}

#[tokio::test]
async fn one_failing_format_fails_only_that_device() {
    let hal = FakeHal::new();
    hal.fail_command_with_arg("mkfs.fat", "/dev/sdb1", 1);

    let report = orchestrator::run(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb", "/dev/sdc"]),
        FlashOptions::new("STICK"),
    )
    .await;

    let results: Vec<(String, bool)> = report
        .outcomes
        .iter()
        .map(|o| (o.device.path().display().to_string(), o.success))
        .collect();
    assert_eq!(
        results,
        [
            ("/dev/sda".to_string(), true),
            ("/dev/sdb".to_string(), false),
            ("/dev/sdc".to_string(), true),
        ]
    );
    assert!(report.synced);
    assert!(!report.success());
    assert_eq!(sync_count(&hal), 1);

    // The barrier comes after every device command.
    let commands = hal.commands();
    assert_eq!(commands.last().unwrap().program, "sync");
}

#[tokio::test]
async fn all_devices_succeeding_is_success() {
    let hal = FakeHal::new();
    let ok = flash_devices(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb"]),
        FlashOptions::new("STICK"),
    )
    .await;

    assert!(ok);
    assert_eq!(sync_count(&hal), 1);
    assert_eq!(hal.commands_of("mkfs.fat").len(), 2);
}

#[tokio::test]
async fn barrier_runs_once_even_when_every_device_fails() {
    let hal = FakeHal::new();
    hal.fail_command("parted", 1);

    let report = orchestrator::run(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb", "/dev/sdc", "/dev/sdd"]),
        FlashOptions::new("STICK"),
    )
    .await;

    assert_eq!(report.outcomes.len(), 4);
    assert!(report.outcomes.iter().all(|o| !o.success));
    assert_eq!(sync_count(&hal), 1);
}

#[tokio::test]
async fn no_devices_still_syncs_once() {
    let hal = FakeHal::new();
    let report =
        orchestrator::run(Rc::new(hal.clone()), Vec::new(), FlashOptions::new("STICK")).await;

    assert!(report.outcomes.is_empty());
    assert!(report.success());
    assert_eq!(hal.commands(), vec![fatstamp_hal::sync_command()]);
}

#[tokio::test]
async fn failed_sync_fails_the_run() {
    let hal = FakeHal::new();
    hal.fail_command("sync", 1);

    let report = orchestrator::run(
        Rc::new(hal.clone()),
        devices(&["/dev/sda"]),
        FlashOptions::new("STICK"),
    )
    .await;

    assert!(report.outcomes[0].success);
    assert!(!report.synced);
    assert!(!report.success());
}

#[tokio::test]
async fn failed_partition_creation_never_formats() {
    let hal = FakeHal::new();
    hal.fail_command_with_arg("parted", "mkpart", 1);

    let ok = flash_devices(
        Rc::new(hal.clone()),
        devices(&["/dev/sda"]),
        FlashOptions::new("STICK"),
    )
    .await;

    assert!(!ok);
    assert!(hal.commands_of("partprobe").is_empty());
    assert!(hal.commands_of("mkfs.fat").is_empty());
}

#[tokio::test]
async fn missing_partition_node_never_formats() {
    let hal = FakeHal::new();
    hal.withhold_partition(Path::new("/dev/sdb"));

    let report = orchestrator::run(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb"]),
        FlashOptions::new("STICK"),
    )
    .await;

    assert!(report.outcomes[0].success);
    assert!(!report.outcomes[1].success);
    assert!(hal.commands_mentioning("/dev/sdb1").is_empty());
    assert!(hal.has_operation(|op| matches!(
        op,
        Operation::ProbeBlockDevice { path } if path == Path::new("/dev/sdb1")
    )));
    assert_eq!(sync_count(&hal), 1);
}

#[tokio::test]
async fn without_template_nothing_is_mounted() {
    let hal = FakeHal::new();
    let ok = flash_devices(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb"]),
        FlashOptions::new("STICK"),
    )
    .await;

    assert!(ok);
    for program in ["mount", "rsync", "umount"] {
        assert!(hal.commands_of(program).is_empty(), "{program} ran");
    }
}

#[tokio::test]
async fn template_is_copied_to_every_device_on_its_own_mount_point() {
    let template = tempdir().unwrap();
    let hal = FakeHal::new();

    let ok = flash_devices(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb", "/dev/sdc"]),
        FlashOptions::new("STICK").with_template(template.path()),
    )
    .await;

    assert!(ok);
    let mount_points = hal.mount_points();
    assert_eq!(mount_points.len(), 3);
    let mut unique = mount_points.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3, "mount points must not be shared");
    assert!(mount_points.iter().all(|mp| !mp.exists()));
    assert_eq!(hal.commands_of("rsync").len(), 3);
    assert_eq!(hal.commands_of("umount").len(), 3);
}

#[tokio::test]
async fn failed_mount_skips_copy_and_leaves_no_mount_point() {
    let template = tempdir().unwrap();
    let hal = FakeHal::new();
    hal.fail_command("mount", 32);

    let ok = flash_devices(
        Rc::new(hal.clone()),
        devices(&["/dev/sda"]),
        FlashOptions::new("STICK").with_template(template.path()),
    )
    .await;

    assert!(!ok);
    assert!(hal.commands_of("rsync").is_empty());
    let mount_points = hal.mount_points();
    assert_eq!(mount_points.len(), 1);
    assert!(!mount_points[0].exists());
}

#[tokio::test]
async fn failed_copy_removes_mount_point() {
    let template = tempdir().unwrap();
    let hal = FakeHal::new();
    hal.fail_command_with_arg("rsync", &format!("{}/", template.path().display()), 23);

    let ok = flash_devices(
        Rc::new(hal.clone()),
        devices(&["/dev/sda"]),
        FlashOptions::new("STICK").with_template(template.path()),
    )
    .await;

    assert!(!ok);
    assert_eq!(hal.commands_of("umount").len(), 1);
    assert!(!hal.mount_points()[0].exists());
    assert_eq!(sync_count(&hal), 1);
}

#[tokio::test]
async fn panicking_pipeline_is_isolated() {
    let hal = FakeHal::new();
    hal.panic_on_command("partprobe", "/dev/sdb");

    let report = orchestrator::run(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb", "/dev/sdc"]),
        FlashOptions::new("STICK"),
    )
    .await;

    let successes: Vec<bool> = report.outcomes.iter().map(|o| o.success).collect();
    assert_eq!(successes, [true, false, true]);
    assert_eq!(sync_count(&hal), 1);
}

#[tokio::test]
async fn pipelines_interleave_but_keep_their_own_order() {
    let hal = FakeHal::new();
    let _ = orchestrator::run(
        Rc::new(hal.clone()),
        devices(&["/dev/sda", "/dev/sdb"]),
        FlashOptions::new("STICK"),
    )
    .await;

    let commands = hal.commands();
    let position = |program: &str, arg: &str| {
        commands
            .iter()
            .position(|c| c.program == program && c.args.iter().any(|a| a == arg))
            .unwrap()
    };

    // Each device's own steps are strictly ordered.
    for (disk, part) in [("/dev/sda", "/dev/sda1"), ("/dev/sdb", "/dev/sdb1")] {
        assert!(position("parted", disk) < position("partprobe", disk));
        assert!(position("partprobe", disk) < position("mkfs.fat", part));
    }
    // The second device started before the first one finished.
    assert!(position("parted", "/dev/sdb") < position("mkfs.fat", "/dev/sda1"));
}
