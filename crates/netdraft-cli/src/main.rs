//! NetDraft headless driver.
//!
//! Replays a JSON gesture script against an editor session and prints one
//! JSON report per step, followed by the diagram summary.
//!
//! ## Script format
//!
//! ```json
//! [
//!   { "type": "begin_drag", "kind": "activity", "shift": false },
//!   { "type": "drop", "x": 51.0, "y": 49.0 },
//!   { "type": "end_frame" },
//!   { "type": "connect", "source": "activity-…", "target": "event-…" },
//!   { "type": "save" },
//!   { "type": "load" }
//! ]
//! ```

use clap::Parser;
use netdraft_core::{Editor, EditorConfig, FileStorage, Gesture, LoadReport};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "netdraft",
    about = "Replay a gesture script against an activity network diagram",
    version
)]
struct Args {
    /// JSON array of gestures and save/load commands.
    script: PathBuf,

    /// Editor configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for saved diagrams. Defaults to the local data directory.
    #[arg(long)]
    store: Option<PathBuf>,
}

/// Persistence commands handled by the driver rather than the editor.
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum CommandReport {
    Save { key: String },
    Load { key: String, found: bool, report: Option<LoadReport> },
}

fn open_storage(store: Option<&PathBuf>) -> Result<FileStorage, Box<dyn Error>> {
    let storage = match store {
        Some(dir) => FileStorage::new(dir.clone())?,
        None => FileStorage::default_location()?,
    };
    log::info!("Using storage at {}", storage.base_path().display());
    Ok(storage)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let mut editor = Editor::new(config)?;

    let script = std::fs::read_to_string(&args.script)
        .map_err(|e| format!("Failed to read {}: {}", args.script.display(), e))?;
    let steps: Vec<Value> = serde_json::from_str(&script)?;
    log::info!("Replaying {} step(s) from {}", steps.len(), args.script.display());

    let mut storage: Option<FileStorage> = None;

    for (index, step) in steps.into_iter().enumerate() {
        let line = match step.get("type").and_then(Value::as_str) {
            Some("save") => {
                if storage.is_none() {
                    storage = Some(open_storage(args.store.as_ref())?);
                }
                if let Some(storage) = &storage {
                    pollster::block_on(editor.save(storage))?;
                }
                serde_json::to_string(&CommandReport::Save {
                    key: editor.config().storage_key.clone(),
                })?
            }
            Some("load") => {
                if storage.is_none() {
                    storage = Some(open_storage(args.store.as_ref())?);
                }
                let report = match &storage {
                    Some(storage) => pollster::block_on(editor.load(storage))?,
                    None => None,
                };
                serde_json::to_string(&CommandReport::Load {
                    key: editor.config().storage_key.clone(),
                    found: report.is_some(),
                    report,
                })?
            }
            _ => {
                let gesture: Gesture = serde_json::from_value(step)
                    .map_err(|e| format!("Step {index} is not a valid gesture: {e}"))?;
                serde_json::to_string(&editor.apply(gesture)?)?
            }
        };
        println!("{line}");
    }

    editor.end_frame()?;
    println!("{}", serde_json::to_string(&editor.summary())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
