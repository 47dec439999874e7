//! Interactive dashboard session.
//!
//! Reads one command per line and applies it to the [`Session`]. Filter
//! commands only touch the selection; the summary is never recomputed
//! unless the dataset is reloaded.

use crate::analysis::actor_frequency;
use crate::dataset::DatasetCache;
use crate::models::FilterResult;
use crate::report::{self, generator, ExportKind};
use crate::session::{SelectionObserver, Session};
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  type <TYPE>                       filter on content type
  year <YEAR>                       filter on addition year
  summary                           show the key figures
  filtered                          show the current filter result
  top <N>                           show the N most frequent cast members
  export <actors|filtered|full> [FILE]  write a table as CSV
  reload                            reload the dataset from disk
  help                              show this help
  quit                              leave the session
";

/// One parsed interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetType(String),
    SetYear(i32),
    Summary,
    Filtered,
    Top(usize),
    Export {
        kind: ExportKind,
        path: Option<PathBuf>,
    },
    Reload,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        match word.to_lowercase().as_str() {
            "type" if !rest.is_empty() => Ok(Command::SetType(rest.to_string())),
            "type" => Err("usage: type <TYPE>".to_string()),
            "year" => rest
                .parse()
                .map(Command::SetYear)
                .map_err(|_| format!("invalid year: '{}'", rest)),
            "summary" => Ok(Command::Summary),
            "filtered" | "show" => Ok(Command::Filtered),
            "top" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Top(n)),
                _ => Err(format!("invalid count: '{}'", rest)),
            },
            "export" => {
                let (kind, path) = rest
                    .split_once(char::is_whitespace)
                    .map(|(k, p)| (k, Some(PathBuf::from(p.trim()))))
                    .unwrap_or((rest, None));
                let kind = <ExportKind as ValueEnum>::from_str(kind, true)
                    .map_err(|_| format!("unknown table: '{}'", kind))?;
                Ok(Command::Export { kind, path })
            }
            "reload" => Ok(Command::Reload),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command: '{}' (try 'help')", other)),
        }
    }
}

/// Prints each new filter result to stdout.
pub struct ConsoleObserver;

impl SelectionObserver for ConsoleObserver {
    fn on_selection_changed(&mut self, result: &FilterResult) {
        println!("{}", report::render_filter_result(result));
    }
}

/// Run the read-eval-print loop until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    cache: &mut DatasetCache,
    input: R,
    output: &mut W,
) -> Result<()> {
    writeln!(output, "Type 'help' for commands.")?;

    let mut lines = input.lines();
    loop {
        write!(output, "streamstats> ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };
        debug!("Command: {:?}", command);

        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(command, session, cache, output) {
            warn!("Command failed: {:#}", e);
            writeln!(output, "❌ {:#}", e)?;
        }
    }

    Ok(())
}

/// Apply one command to the session.
pub fn execute<W: Write>(
    command: Command,
    session: &mut Session,
    cache: &mut DatasetCache,
    output: &mut W,
) -> Result<()> {
    match command {
        Command::SetType(kind) => {
            if !session.set_type(&kind) {
                writeln!(output, "Selection unchanged.")?;
            }
        }
        Command::SetYear(year) => {
            if !session.set_year(year) {
                writeln!(output, "Selection unchanged.")?;
            }
        }
        Command::Summary => {
            for (label, value) in generator::kpi_rows(session.summary()) {
                writeln!(output, "{}: {}", label, value)?;
            }
        }
        Command::Filtered => match session.filtered() {
            Some(result) => writeln!(output, "{}", report::render_filter_result(result))?,
            None => writeln!(output, "No filter selected.")?,
        },
        Command::Top(n) => {
            let ranking = actor_frequency(session.dataset().titles()).top_n(n);
            if ranking.is_empty() {
                writeln!(output, "No cast information available.")?;
            }
            for (i, entry) in ranking.iter().enumerate() {
                writeln!(output, "{:>3}. {} ({})", i + 1, entry.value, entry.count)?;
            }
        }
        Command::Export { kind, path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(kind.default_file_name()));
            let rows = report::export_to_path(kind, session, &path)?;
            writeln!(output, "✅ Exported {} rows to {}", rows, path.display())?;
        }
        Command::Reload => {
            let source = session.dataset().source().to_path_buf();
            let dataset = cache
                .reload(&source)
                .with_context(|| format!("Failed to reload {}", source.display()))?;
            session.replace_dataset(dataset);
            writeln!(output, "Reloaded {} titles.", session.dataset().len())?;
        }
        Command::Help => write!(output, "{}", HELP)?,
        Command::Quit => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LoadOptions;
    use crate::session::SessionSettings;
    use std::io::Cursor;
    use tempfile::TempDir;

    const CSV: &str = "\
title,type,date_added,cast
A,Movie,2020-01-02,\"X, Y\"
BB,Movie,2020-03-01,\"Y, Z\"
CCC,TV Show,2019-05-05,
";

    fn setup(dir: &TempDir) -> (Session, DatasetCache) {
        let path = dir.path().join("titles.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::new(LoadOptions::default());
        let dataset = cache.get_or_load(&path).unwrap();
        (Session::new(dataset, SessionSettings::default()), cache)
    }

    fn run_script(script: &str, session: &mut Session, cache: &mut DatasetCache) -> String {
        let mut output = Vec::new();
        run(session, cache, Cursor::new(script), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "type TV Show".parse::<Command>(),
            Ok(Command::SetType("TV Show".to_string()))
        );
        assert_eq!("YEAR 2019".parse::<Command>(), Ok(Command::SetYear(2019)));
        assert_eq!("top 5".parse::<Command>(), Ok(Command::Top(5)));
        assert_eq!(
            "export actors out.csv".parse::<Command>(),
            Ok(Command::Export {
                kind: ExportKind::Actors,
                path: Some(PathBuf::from("out.csv")),
            })
        );
        assert_eq!(
            "export full".parse::<Command>(),
            Ok(Command::Export {
                kind: ExportKind::Full,
                path: None,
            })
        );
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!("year soon".parse::<Command>().is_err());
        assert!("type".parse::<Command>().is_err());
        assert!("top 0".parse::<Command>().is_err());
        assert!("export everything".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn test_filter_commands_update_selection() {
        let temp_dir = TempDir::new().unwrap();
        let (mut session, mut cache) = setup(&temp_dir);

        let output = run_script("type TV Show\nyear 2019\nquit\n", &mut session, &mut cache);

        let selection = session.selection().unwrap();
        assert_eq!(selection.kind, "TV Show");
        assert_eq!(selection.year, 2019);
        assert_eq!(session.filtered().unwrap().rows.len(), 1);
        assert!(!output.contains("Selection unchanged"));
        assert_eq!(cache.loads(), 1);
    }

    #[test]
    fn test_summary_and_top() {
        let temp_dir = TempDir::new().unwrap();
        let (mut session, mut cache) = setup(&temp_dir);

        let output = run_script("summary\ntop 1\n", &mut session, &mut cache);

        assert!(output.contains("Year with most content added: 2020"));
        assert!(output.contains("Longest title: CCC"));
        assert!(output.contains("  1. Y (2)"));
        assert!(!output.contains("2. X"));
    }

    #[test]
    fn test_unknown_command_keeps_running() {
        let temp_dir = TempDir::new().unwrap();
        let (mut session, mut cache) = setup(&temp_dir);

        let output = run_script("dance\nyear 2020\n", &mut session, &mut cache);

        assert!(output.contains("unknown command: 'dance'"));
        assert!(output.contains("Selection unchanged."));
    }

    #[test]
    fn test_export_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let (mut session, mut cache) = setup(&temp_dir);
        let export_path = temp_dir.path().join("actors.csv");

        let script = format!("export actors {}\nreload\n", export_path.display());
        let output = run_script(&script, &mut session, &mut cache);

        assert!(output.contains("Exported 3 rows"));
        assert!(output.contains("Reloaded 3 titles."));
        assert!(std::fs::read_to_string(&export_path)
            .unwrap()
            .starts_with("name,count\nY,2\n"));
        assert_eq!(cache.loads(), 2);
    }
}
