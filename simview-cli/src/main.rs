//! ## simview-cli
//! **Viewer entrypoint for cache simulation event logs**
//!
//! Replays a CSV (or gzip-compressed CSV) event log frame by frame. The
//! frontend here is headless: each stdin line is one frame's worth of input
//! and each frame prints its tick counter and the event at that tick.

use clap::Parser;

mod commands;
mod frontend;

use commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli)
}
