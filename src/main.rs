//! # Voxel LOD Application Entry Point
//!
//! Opens the renderer window by calling into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_lod::run() {
        log::error!("{}", err);
        eprintln!("voxel-lod: {}", err);
        std::process::exit(1);
    }
}
