use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    process::ExitCode,
    sync::LazyLock,
};

use clap::Parser;
use ctab::{Mode, ReaderConfig, SdfReader};
use log::error;
use periodic::AtomicDatabase;
use sdfinder::RecordSummary;

static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

/// Prints a one-line summary of every record in an SD file
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Reject records with any format or reference problem, instead of reading around them
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// The SD file to read. When omitted, stdin is used.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut config = ReaderConfig::default().with_skip_on_error(true);
    if args.strict {
        config = config.with_mode(Mode::Strict);
    }

    let input: Box<dyn BufRead> = match args.file {
        Some(path) => match File::open(&path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                error!("failed to open {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let mut records = SdfReader::new(input, &*DB, config);
    let (mut read, mut issues, mut failed) = (0, 0, false);
    for record in records.by_ref() {
        match record {
            Ok(record) => {
                read += 1;
                issues += record.issues.len();
                println!("{}", RecordSummary::new(&*DB, &record));
            }
            Err(e) => {
                error!("{e}");
                failed = true;
            }
        }
    }
    eprintln!("{read} records, {} skipped, {issues} issues", records.skipped());

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::{CommandFactory, Parser, error::ErrorKind};

    use super::Args;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn arguments() {
        let args = Args::try_parse_from(["sdfdump"]).unwrap();
        assert!(!args.strict);
        assert_eq!(args.file, None);

        let args = Args::try_parse_from(["sdfdump", "--strict", "compounds.sdf"]).unwrap();
        assert!(args.strict);
        assert_eq!(args.file.as_deref(), Some(Path::new("compounds.sdf")));
    }

    #[test]
    fn flags_are_never_taken_as_files() {
        let error = Args::try_parse_from(["sdfdump", "--help"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisplayHelp);

        let error = Args::try_parse_from(["sdfdump", "-s"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownArgument);
    }
}
