//! # Voxel Streaming Engine Entry Point
//!
//! Runs the headless streaming demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [settings.json]
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_streaming_engine::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
