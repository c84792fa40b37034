//! # Coursekit
//!
//! Command-line host for the course authoring core.
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate an exercise in its text form
//! cargo run -- check exercise.json
//!
//! # Rewrite an exercise in canonical form
//! cargo run -- fmt exercise.json
//!
//! # Replay a JSON list of authoring actions and print the outline
//! cargo run -- replay actions.json
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursekit_core::{Action, Authoring, Config, CourseDraft, Serializer, ValidationError};
use coursekit_exercise::{ExerciseCollection, ExerciseKind};

/// Coursekit - course authoring from the command line
#[derive(Parser, Debug)]
#[command(name = "coursekit")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: CliCommand,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum CliCommand {
    /// Validate an exercise text and list every issue
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print an exercise text in canonical form
    Fmt {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rewrite the file instead of printing
        #[arg(short, long)]
        write: bool,
    },

    /// Apply a JSON array of actions to an empty draft
    Replay {
        #[arg(value_name = "FILE")]
        script: PathBuf,

        /// Also write the resulting draft as JSON
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Coursekit v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    match args.command {
        CliCommand::Check { file } => {
            let text = read(&file)?;
            match check(&config, &text) {
                Ok(()) => println!("{}: ok", file.display()),
                Err(err) => {
                    for issue in err.issues() {
                        println!("{}: {}", file.display(), issue);
                    }
                    anyhow::bail!("{} issue(s) found", err.issues().len());
                }
            }
        }
        CliCommand::Fmt { file, write } => {
            let formatted = format_text(&config, &read(&file)?)?;
            if write {
                std::fs::write(&file, &formatted)
                    .with_context(|| format!("failed to write {}", file.display()))?;
            } else {
                println!("{formatted}");
            }
        }
        CliCommand::Replay { script, output } => {
            let draft = replay(config, &read(&script)?)?;
            print!("{}", outline(&draft));
            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&draft)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
    }

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn check(config: &Config, text: &str) -> Result<(), ValidationError> {
    Serializer::new(config.serializer.indent)
        .from_text(text)
        .map(|_| ())
}

/// Compiles `text` into a fresh node and renders it back.
fn format_text(config: &Config, text: &str) -> anyhow::Result<String> {
    let serializer = Serializer::new(config.serializer.indent);
    let patch = serializer.from_text(text)?;

    let mut collection = ExerciseCollection::new();
    let uuid = collection.add_node(ExerciseKind::SimpleSelection);
    let node = collection.update_node(uuid, patch)?;

    Ok(serializer.to_text(node)?)
}

/// Runs every action in order, stopping at the first rejected one.
fn replay(config: Config, script: &str) -> anyhow::Result<CourseDraft> {
    let actions: Vec<Action> = serde_json::from_str(script).context("malformed action script")?;
    let mut authoring = Authoring::with_config(config);

    for (i, action) in actions.into_iter().enumerate() {
        let name = action.display_name().to_string();
        authoring
            .dispatch(action)
            .with_context(|| format!("action {i} ({name}) rejected"))?;
    }

    Ok(authoring.draft().clone())
}

fn outline(draft: &CourseDraft) -> String {
    let mut out = format!("{} [{}]\n", draft.title(), draft.step());
    for (i, module) in draft.modules().iter().enumerate() {
        let marker = if draft.viewed_module_index() == Some(i) { '*' } else { ' ' };
        out.push_str(&format!("{marker} {}. {}\n", i + 1, module.title));
        for lesson in &module.lessons {
            let exercises = lesson.content.as_ref().map_or(0, ExerciseCollection::len);
            out.push_str(&format!("    - {} ({exercises} exercises)\n", lesson.title));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["coursekit", "check", "a.json"]);
        assert_eq!(
            args.command,
            CliCommand::Check {
                file: PathBuf::from("a.json")
            }
        );
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_with_globals() {
        let args = Args::parse_from(["coursekit", "-vv", "fmt", "--write", "a.json", "--config", "c.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(args.command, CliCommand::Fmt { write: true, .. }));
    }

    #[test]
    fn test_check_reports_issues() {
        let config = Config::default();
        let err = check(&config, r#"{"question":"Q","correct":3,"answers":[]}"#).unwrap_err();
        assert!(err.mentions("correct"));
        assert!(check(&config, r#"{"question":"Q","correct":0,"answers":[{"id":"a","value":"A"}]}"#).is_ok());
    }

    #[test]
    fn test_format_text_is_canonical() {
        let config = Config::default();
        let formatted = format_text(
            &config,
            r#"{"answers":[{"value":"Rome","uuid":"b"}],"correct":0,"question":"Capital of Italy?"}"#,
        )
        .unwrap();
        assert_eq!(
            formatted,
            "{\n  \"question\": \"Capital of Italy?\",\n  \"correct\": 0,\n  \"answers\": [\n    {\n      \"id\": \"b\",\n      \"value\": \"Rome\"\n    }\n  ]\n}"
        );
    }

    #[test]
    fn test_replay_builds_outline() {
        let script = r#"[
            {"type":"set_title","title":"Spanish"},
            {"type":"add_module","title":"Grammar"},
            {"type":"add_lesson","module_index":0,"title":"Verbs"},
            {"type":"select_module","index":0}
        ]"#;
        let draft = replay(Config::default(), script).unwrap();
        assert_eq!(
            outline(&draft),
            "Spanish [category]\n* 1. Grammar\n    - Verbs (0 exercises)\n"
        );
    }

    #[test]
    fn test_replay_stops_at_rejected_action() {
        let script = r#"[{"type":"add_lesson","module_index":0,"title":"Verbs"}]"#;
        let err = replay(Config::default(), script).unwrap_err();
        assert!(err.to_string().contains("action 0 (Add Lesson) rejected"));
    }

    #[test]
    fn test_config_file_sets_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[serializer]\nindent = 4\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        let formatted = format_text(
            &config,
            r#"{"question":"Q","correct":0,"answers":[{"id":"a","value":"A"}]}"#,
        )
        .unwrap();
        assert!(formatted.starts_with("{\n    \"question\""));
    }
}
