use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use emu::Box256;
use emu::assembler::assemble_source;
use emu::cpu::memory::{DEFAULT_MEMORY_SIZE, Memory};
use emu::cpu::ports::NullPorts;

/// Writes 1 and 2 to 0x0C and 0x0D, then adds them into 0x0E.
const DEMO_PROGRAM: &str = "\
MOV 001 @0C 000
MOV 002 @0D 000
ADD *0F @0D @0E
000 000 000 00C
";

/// Assemble a Box256 program and run it step by step.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Source file, the built-in demo program when omitted
    source: Option<PathBuf>,

    /// Memory size in bytes, a positive multiple of 4
    #[clap(short, long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Number of instructions to execute
    #[clap(short, long, default_value_t = 3)]
    steps: usize,

    /// Print the last N executed instructions at the end
    #[clap(long, default_value_t = 0)]
    history: usize,

    /// Log to a file in the temp dir instead of stderr
    #[clap(long)]
    log_file: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_file);

    let source = match &args.source {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => DEMO_PROGRAM.to_owned(),
    };

    let program = assemble_source(&source).context("failed to assemble")?;
    let memory = Memory::with_program(args.memory_size, &program)?;
    tracing::info!("assembled {} bytes", program.len());

    println!("Assembled:");
    print!("{memory}");

    let mut cpu = Box256::with_ports(memory, NullPorts).with_history(args.history);
    for tick in 1..=args.steps {
        cpu.step();
        println!();
        println!("Executed (Tick {tick})");
        print!("{}", cpu.memory());
    }

    if !cpu.history().is_empty() {
        println!();
        println!("History:");
        for entry in cpu.history().iter() {
            println!("{entry}");
        }
    }

    Ok(())
}

/// Logs go to stderr unless `to_file` is set. The returned guard flushes the
/// file writer when dropped.
fn init_logging(to_file: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let filename = format!("box256-{}.log", Utc::now().timestamp());
    let path = std::env::temp_dir().join(&filename);
    eprintln!("Logging to file: {}", path.display());

    let appender = tracing_appender::rolling::never(std::env::temp_dir(), filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
