use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use json_decode_summary::{CliError, Summarizer};
use json_decoder::{DecoderOptions, EscapeMode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Decodes streams of concatenated JSON values and prints one summary line per value.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Input files. Reads stdin when none are given, or for `-`.
    paths: Vec<PathBuf>,

    /// Keep escape sequences in strings as written instead of resolving them.
    #[arg(long)]
    preserve_escapes: bool,

    /// List the keys of top-level objects.
    #[arg(long)]
    keys: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!("{err}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every input was opened and decoded cleanly. Inputs that
/// fail are logged and the remaining ones are still processed.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let options = DecoderOptions::default().with_escapes(if cli.preserve_escapes {
        EscapeMode::Preserve
    } else {
        EscapeMode::Resolve
    });
    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());
    let mut summarizer = Summarizer::new(writer, options, cli.keys);

    let stdin_only = [PathBuf::from("-")];
    let paths = if cli.paths.is_empty() {
        &stdin_only[..]
    } else {
        &cli.paths[..]
    };

    let mut unreadable = 0;
    for path in paths {
        match summarize_path(&mut summarizer, path) {
            Ok(()) => {}
            Err(err @ CliError::Decode { .. }) => error!("{err}"),
            Err(err @ CliError::Open { .. }) => {
                error!("{err}");
                unreadable += 1;
            }
            Err(err) => return Err(err),
        }
    }

    let totals = summarizer.finish()?;
    info!(values = totals.values, errors = totals.errors, unreadable, "done");
    Ok(totals.errors == 0 && unreadable == 0)
}

fn summarize_path<W: io::Write>(
    summarizer: &mut Summarizer<W>,
    path: &Path,
) -> Result<(), CliError> {
    if path == Path::new("-") {
        return summarizer.summarize("-", io::stdin().lock());
    }
    let file = File::open(path).map_err(|source| CliError::Open {
        path: path.to_owned(),
        source,
    })?;
    summarizer.summarize(&path.display().to_string(), file)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
