//! Ligand screening for breast cancer drug discovery.
//!
//! A SMILES string is parsed into a molecular graph, reduced to eight
//! physicochemical descriptors, and scored by a pre-trained binary
//! classifier whose probability is banded into a verdict.

use tracing::warn;
use tracing_subscriber::filter::LevelFilter;

mod element;
pub use element::*;

mod molecule;
pub use molecule::*;

mod rings;
pub use rings::*;

mod parse;
pub use parse::*;

mod descriptors;
pub use descriptors::*;

mod model;
pub use model::*;

mod verdict;
pub use verdict::*;

mod screen;
pub use screen::*;

mod batch;
pub use batch::*;

mod config;
pub use config::*;

mod render;
pub use render::*;

mod server;
pub use server::*;

/// Install a stdout subscriber at `level` ("error" through "trace", or
/// "off"). Unknown levels fall back to info. Calling this twice is harmless.
pub fn init_logging(level: &str) {
    let (filter, unknown) = match level.parse::<LevelFilter>() {
        Ok(filter) => (filter, false),
        Err(_) => (LevelFilter::INFO, true),
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .try_init();
    if unknown {
        warn!("Unknown log level {level:?}, using info");
    }
}
