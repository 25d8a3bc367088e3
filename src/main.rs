//! Demonstration CLI for the wipe engine core. Device enumeration and
//! capability probing are external collaborators outside the core's
//! scope; this binary resolves just enough about each path given on the
//! command line (size via `lseek(SEEK_END)`, sector size via a flag) to
//! build the `DeviceInput`s the engine actually consumes.
use std::fs::OpenOptions;
use std::io::{self, Seek, SeekFrom, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wipe_engine::pattern::PatternSpec;
use wipe_engine::{DeviceInput, Method, PrngKind, Supervisor, VerifyPolicy, WipeConfig};

#[derive(Parser)]
#[command(name = "wipe-engine")]
#[command(about = "Secure block device wipe engine: methods, passes, PRNGs, and worker supervision")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Wipe one or more block devices (or regular files, for dry runs)
    Wipe {
        /// Device paths to wipe
        #[arg(required = true)]
        devices: Vec<String>,

        /// Wiping method
        #[arg(short, long, value_enum, default_value = "zero")]
        method: Method,

        /// PRNG variant backing random passes
        #[arg(short, long, value_enum, default_value = "isaac")]
        prng: PrngKind,

        /// Times the base pass sequence repeats
        #[arg(short, long, default_value_t = 1)]
        rounds: u32,

        /// Verification policy
        #[arg(long, value_enum, default_value = "last")]
        verify: VerifyPolicy,

        /// Datasync every N writes; 0 = only at end of pass
        #[arg(long, default_value_t = 0)]
        sync: u32,

        /// Append a zero pass after the method completes (where allowed)
        #[arg(long)]
        final_blank: bool,

        /// Skip interactive confirmation
        #[arg(long)]
        autonuke: bool,

        /// Seconds to wait for a worker to join before reporting it stuck
        #[arg(long, default_value_t = 60)]
        join_timeout: u64,

        /// Logical sector size to assume for every device, in bytes
        #[arg(long, default_value_t = 512)]
        sector_size: u32,
    },

    /// Print the pass sequence a method expands to, without touching any device
    Explain {
        /// Wiping method
        #[arg(value_enum)]
        method: Method,

        /// Times the base pass sequence repeats
        #[arg(short, long, default_value_t = 1)]
        rounds: u32,

        /// Verification policy
        #[arg(long, value_enum, default_value = "last")]
        verify: VerifyPolicy,

        /// Append a zero pass after the method completes (where allowed)
        #[arg(long)]
        final_blank: bool,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();
}

/// Resolve a command-line path into the `DeviceInput` the engine needs:
/// size via `lseek(SEEK_END)` (trusted outright, there being no second
/// query to disagree with here), sector size from the `--sector-size`
/// flag.
fn resolve_device(path: &str, sector_size: u32) -> Result<DeviceInput> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to open {path}"))?;
    let size_bytes = file
        .seek(SeekFrom::End(0))
        .with_context(|| format!("failed to determine size of {path}"))?;
    if size_bytes == 0 {
        bail!("{path} has zero size");
    }
    Ok(DeviceInput::new(path, size_bytes, sector_size))
}

fn confirm_destructive(devices: &[DeviceInput]) -> Result<bool> {
    eprintln!("The following devices will be IRRECOVERABLY ERASED:");
    for device in devices {
        eprintln!("  {} ({} bytes)", device.device_path, device.size_bytes);
    }
    eprint!("Type \"yes\" to continue: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

#[allow(clippy::too_many_arguments)]
fn run_wipe(
    devices: Vec<String>,
    method: Method,
    prng: PrngKind,
    rounds: u32,
    verify: VerifyPolicy,
    sync: u32,
    final_blank: bool,
    autonuke: bool,
    join_timeout: u64,
    sector_size: u32,
) -> Result<i32> {
    let resolved: Vec<DeviceInput> = devices
        .iter()
        .map(|path| resolve_device(path, sector_size))
        .collect::<Result<_>>()?;

    if !autonuke && !confirm_destructive(&resolved)? {
        eprintln!("Aborted.");
        return Ok(2);
    }

    let config = WipeConfig::with_join_timeout(method, prng, rounds, verify, sync, final_blank, autonuke, join_timeout)?;
    let supervisor = Supervisor::new(config);
    let outcome = supervisor.run(&resolved)?;

    println!("device | method | prng | rounds | verify | pass_err | verify_err | fsync_err | bytes | duration | status");
    for report in &outcome.reports {
        let duration = report.ended_at.saturating_sub(report.started_at);
        println!(
            "{} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {:?}",
            report.device_path,
            method.name(),
            prng.name(),
            rounds,
            verify.name(),
            report.pass_errors,
            report.verify_errors,
            report.fsync_errors,
            report.bytes_written,
            duration,
            report.result
        );
    }
    for stuck in &outcome.unjoined {
        eprintln!("warning: {stuck} did not join within the {join_timeout}s timeout");
    }

    Ok(outcome.exit_code.code())
}

fn run_explain(method: Method, rounds: u32, verify: VerifyPolicy, final_blank: bool) {
    let passes = method.expand(rounds, verify, final_blank);
    println!("{} expands to {} pass(es):", method.name(), passes.len());
    for (i, pass) in passes.iter().enumerate() {
        let pattern = match pass.pattern {
            PatternSpec::Random => "random".to_string(),
            PatternSpec::Fixed(bytes) => {
                format!("0x{}", bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(""))
            }
        };
        println!("  [{}] {} ({:?}, {:?})", i + 1, pattern, pass.direction, pass.label);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Wipe {
            devices,
            method,
            prng,
            rounds,
            verify,
            sync,
            final_blank,
            autonuke,
            join_timeout,
            sector_size,
        } => {
            let code = run_wipe(
                devices,
                method,
                prng,
                rounds,
                verify,
                sync,
                final_blank,
                autonuke,
                join_timeout,
                sector_size,
            )?;
            std::process::exit(code);
        }
        Commands::Explain { method, rounds, verify, final_blank } => {
            run_explain(method, rounds, verify, final_blank);
        }
    }

    Ok(())
}
