#![forbid(unsafe_code)]

//! Lay out a JSON scene and print the placements as JSONL.
//!
//! Usage: `lattice-harness [SCENE]`. See the library docs for the scene
//! format and the `LATTICE_HARNESS_*` variables.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use lattice_core::logging::init_json_subscriber;
use lattice_core::{error, info};
use lattice_harness::{HarnessConfig, HarnessError, load_scene, run_scene, to_jsonl};

fn run() -> Result<(), HarnessError> {
    let mut config = HarnessConfig::from_env();
    if let Some(path) = std::env::args_os().nth(1) {
        config.scene_path = Some(PathBuf::from(path));
    }
    let path = config.scene_path.clone().ok_or(HarnessError::MissingScene)?;
    info!(scene = %path.display(), "harness: loading scene");

    let scene = load_scene(&path)?;
    let run = run_scene(&scene, &config)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(to_jsonl(&run)?.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = init_json_subscriber() {
        eprintln!("lattice-harness: logging disabled: {err}");
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "harness: failed");
            eprintln!("lattice-harness: {err}");
            ExitCode::FAILURE
        }
    }
}
