use std::{
    fs::{self, File},
    io::BufReader,
    path::PathBuf,
    sync::LazyLock,
};

use clap::Parser;
use ctab::{ReaderConfig, SdfReader};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, IntoDiagnostic, Result};
use periodic::AtomicDatabase;
use rustyline::DefaultEditor;
use sdfinder::RecordSummary;

static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

/// Reads SD files interactively, summarising each record and rendering every problem found along the way
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// A KDL file overriding the reader defaults
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match args.config {
        Some(path) => {
            let kdl = fs::read_to_string(&path).into_diagnostic()?;
            ReaderConfig::from_kdl(&path.display().to_string(), kdl)?
        }
        None => ReaderConfig::default(),
    };

    let mut rl = DefaultEditor::new().into_diagnostic()?;
    while let Ok(path) = rl.readline("SD file: ") {
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        rl.add_history_entry(path).into_diagnostic()?;
        if let Err(report) = summarise_file(path, config) {
            println!("{report:?}");
        }
    }
    Ok(())
}

fn summarise_file(path: &str, config: ReaderConfig) -> Result<()> {
    let input = BufReader::new(File::open(path).into_diagnostic()?);
    let mut records = SdfReader::new(input, &*DB, config);
    let mut count = 0;
    for record in records.by_ref() {
        match record {
            Ok(record) => {
                count += 1;
                println!("{count:>6}  {}", RecordSummary::new(&*DB, &record));
                for issue in &record.issues {
                    render_error(issue.clone());
                }
            }
            Err(error) => render_error(*error),
        }
    }
    println!("Read {count} records, skipped {}", records.skipped());
    println!();
    Ok(())
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    // NOTE: Rendering into a `String` can't fail
    let _ = GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.into().as_ref());
    println!("{buf}");
}

// Module Tests ========================================================================================================
