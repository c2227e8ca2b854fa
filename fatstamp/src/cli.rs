//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fatstamp", version)]
#[command(about = "Partition, FAT-format and populate many removable drives at once")]
#[command(long_about = "Partition, FAT-format and populate many removable drives at once.\n\n\
    Every DEVICE gets a fresh msdos partition table with one FAT32 partition spanning the\n\
    whole disk. With --template, the directory's contents are copied onto each drive.\n\
    All drives are processed concurrently. THIS DESTROYS ALL DATA ON THE GIVEN DEVICES.")]
pub struct Cli {
    /// Whole-disk block devices to flash (e.g. /dev/sdb /dev/sdc)
    #[arg(required = true, value_name = "DEVICE")]
    pub devices: Vec<PathBuf>,

    /// FAT volume label (at most 11 ASCII characters)
    #[arg(short = 'n', long)]
    pub label: String,

    /// Directory whose contents are copied onto every device
    #[arg(short, long, value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// Enable debug logging (every command line is logged)
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not ask for confirmation before destroying data
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Skip the root and required-tool checks
    #[arg(long)]
    pub skip_preflight: bool,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}
