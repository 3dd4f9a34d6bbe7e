// xcheck/src/main.rs

mod utils;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use colored::Colorize;
use xvfs::xv6::*;

use crate::utils::{LogLevel, set_log_level};

const USAGE: &str = "usage: xcheck <filesystem_image>";

#[derive(Parser)]
#[command(
    name = "xcheck",
    version,
    about = "Offline consistency checker for xv6 filesystem images",
    long_about = None
)]
struct Cli {
    /// Filesystem image to check
    image: PathBuf,

    /// Log check phases and a summary to stderr
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Suppress all logging
    #[arg(short, long)]
    quiet: bool,

    /// Deepest directory level accepted (the root is level 0)
    #[arg(long, value_name = "N", default_value_t = XV6_DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    set_log_level(match (cli.quiet, cli.verbose) {
        (true, _) => LogLevel::Quiet,
        (false, 0) => LogLevel::Normal,
        (false, _) => LogLevel::Verbose,
    });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut file = File::open(&cli.image)
        .with_context(|| format!("invalid image file {}", cli.image.display()))?;
    let mut io = StdXvIO::new(&mut file);
    let mut counter = IOCounter::with_align(&mut io, XV6_BLOCK_SIZE as u64);

    let opt = Xv6CheckOptions {
        max_depth: cli.max_depth,
        ..Default::default()
    };

    crate::log_verbose!("Checking {}", cli.image.display());
    let t0 = Instant::now();

    let (report, stats) = {
        let mut checker = Xv6Checker::open(&mut counter)?;
        let l = checker.layout();
        crate::log_verbose!(
            "Layout: {} blocks, {} inodes, data region {}..{}",
            l.size,
            l.ninodes,
            l.data_start,
            l.size
        );
        let report = checker.check_with(&opt)?;
        (report, checker.stats())
    };

    for f in &report.findings {
        match f.sev {
            Severity::Warn => crate::log_info!("{} {}: {}", "warning".yellow(), f.code, f.msg),
            Severity::Info => crate::log_verbose!("{}: {}", f.code, f.msg),
        }
    }

    let io = counter.snapshot();
    crate::log_verbose!(
        "{} in {:.2}s: {} dirs, {} files, {} inodes scanned, {} blocks referenced",
        "Consistent".green(),
        t0.elapsed().as_secs_f32(),
        stats.dirs_visited,
        stats.files_found,
        stats.inodes_checked,
        stats.blocks_referenced
    );
    crate::log_verbose!(
        "I/O: {} reads, {} bytes, {} unaligned",
        io.reads,
        io.read_bytes,
        io.unaligned_reads
    );
    Ok(())
}
