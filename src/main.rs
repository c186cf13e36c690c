//! # Voxel World Engine Entry Point
//!
//! Native entry point. Parses the command line and hands off to the library's `run()`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --seed 1234 --world-type default
//! cargo run --release -- --windowed --config engine.json
//! ```

use clap::Parser;

fn main() {
    #[cfg(not(target_family = "wasm"))]
    {
        voxel_world_engine::init_logging();

        let options = voxel_world_engine::LaunchOptions::parse();

        if let Err(e) = voxel_world_engine::run(options) {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
