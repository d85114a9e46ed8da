//! `kantan-test`: run the Kantan compiler test suite.

use std::path::PathBuf;

use kantan_test::report::format_summary;
use kantan_test::{discover, run, ConsoleReporter, DiffOptions, Executor, LeakCheck, SchedulerConfig};

/// Exit code for problems that stop the run before any unit starts.
const STARTUP_ERROR: i32 = 2;

#[derive(Debug, PartialEq)]
struct Args {
    compiler: PathBuf,
    tests: PathBuf,
    leak_check: Option<LeakCheck>,
    workers: Option<usize>,
    note_depth: Option<usize>,
    show_skipped: bool,
    print_fail_output: bool,
}

fn main() {
    kantan_test::init_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage();
            std::process::exit(STARTUP_ERROR);
        }
    };

    let registry = match discover(&args.tests) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(STARTUP_ERROR);
        }
    };

    let mut executor = Executor::new(&args.compiler);
    if let Some(leak_check) = args.leak_check {
        executor = executor.with_leak_check(leak_check);
    }

    let mut config = SchedulerConfig::default();
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(note_depth) = args.note_depth {
        config.diff = DiffOptions { note_depth };
    }

    let reporter = ConsoleReporter {
        show_skipped: args.show_skipped,
        print_fail_output: args.print_fail_output,
    };

    let summary = run(&registry, &executor, &config, &reporter);
    println!();
    println!("{}", format_summary(&summary, args.show_skipped));
    std::process::exit(summary.exit_code());
}

fn print_usage() {
    eprintln!("Usage: kantan-test <compiler> <tests-dir> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --valgrind             Run every invocation under valgrind");
    eprintln!("  --suppress=<file>      Valgrind suppression file (implies --valgrind)");
    eprintln!("  --threads=<n>          Worker count (default: 2 per CPU)");
    eprintln!("  --note-depth=<n>       Levels of nested notes to compare (default: 1)");
    eprintln!("  --show-skipped         Also report skipped tests");
    eprintln!("  --print-fail-output    Print the raw compiler output of failed tests");
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut valgrind = false;
    let mut suppressions = None;
    let mut workers = None;
    let mut note_depth = None;
    let mut show_skipped = false;
    let mut print_fail_output = false;

    for arg in args {
        if arg == "--valgrind" {
            valgrind = true;
        } else if let Some(file) = arg.strip_prefix("--suppress=") {
            suppressions = Some(PathBuf::from(file));
        } else if let Some(n) = arg.strip_prefix("--threads=") {
            workers = Some(parse_count("--threads", n)?);
        } else if let Some(n) = arg.strip_prefix("--note-depth=") {
            note_depth = Some(
                n.parse()
                    .map_err(|_| format!("--note-depth expects a number, got '{n}'"))?,
            );
        } else if arg == "--show-skipped" {
            show_skipped = true;
        } else if arg == "--print-fail-output" {
            print_fail_output = true;
        } else if arg.starts_with("--") {
            return Err(format!("unknown option '{arg}'"));
        } else {
            positional.push(PathBuf::from(arg));
        }
    }

    let [compiler, tests]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| "expected a compiler binary and a test directory".to_string())?;

    let leak_check = (valgrind || suppressions.is_some()).then(|| LeakCheck {
        suppressions,
        ..LeakCheck::default()
    });

    Ok(Args {
        compiler,
        tests,
        leak_check,
        workers,
        note_depth,
        show_skipped,
        print_fail_output,
    })
}

fn parse_count(flag: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{flag} expects a positive number, got '{value}'")),
    }
}
