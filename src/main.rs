use clap::Parser;
use colored::Colorize;
use jackc::parser::ParseError;
use jackc::{compile_file, source_files, UsageError};
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// A .jack file, or a directory whose .jack files are all compiled
    path: PathBuf,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write a <Name>T.xml token dump next to each source
    #[cfg(feature = "analyzer")]
    #[arg(long)]
    tokens: bool,

    /// Also write a <Name>.xml parse tree next to each source
    #[cfg(feature = "analyzer")]
    #[arg(long)]
    xml: bool,
}

fn report(file: &Path, err: &anyhow::Error) {
    let err_msg = err.to_string();
    let location = match err.downcast_ref::<ParseError>() {
        Some(pe) => match &pe.token {
            Some(token) => {
                let text = fs::read_to_string(file).unwrap_or_default();
                let line_start = text
                    .get(..token.span.0)
                    .and_then(|before| before.rfind('\n'))
                    .map_or(0, |i| i + 1);
                format!(
                    "{}:{}:{} (at {:?})",
                    file.display(),
                    token.line,
                    token.span.0 - line_start + 1,
                    text.get(token.span.0..token.span.1).unwrap_or_default()
                )
            }
            None => format!("{}:{}", file.display(), pe.line),
        },
        None => file.display().to_string(),
    };

    eprintln!("{}", format!("Error {location}:: {err_msg}").red());
}

fn compile_one(file: &Path, cli: &Cli) -> anyhow::Result<()> {
    #[cfg(feature = "analyzer")]
    if cli.tokens {
        jackc::write_token_xml(file)?;
    }
    #[cfg(feature = "analyzer")]
    if cli.xml {
        jackc::write_tree_xml(file)?;
    }
    #[cfg(not(feature = "analyzer"))]
    let _ = cli;

    compile_file(file)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialise logger: {e}");
    }

    let files = match source_files(&cli.path) {
        Ok(files) => files,
        Err(err) => {
            if err.downcast_ref::<UsageError>().is_some() {
                eprintln!("Usage: jackc <file.jack | directory>");
            }
            eprintln!("{}", format!("Error: {err:#}").red());
            return ExitCode::from(1);
        }
    };

    let mut failed = 0;
    for file in &files {
        if let Err(err) = compile_one(file, &cli) {
            report(file, &err);
            failed += 1;
        }
    }

    if failed > 0 {
        error!("{failed} of {} files failed to compile", files.len());
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
