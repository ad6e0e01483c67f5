//! Configuration types shared by the library and the CLI.

pub mod engine;

pub use engine::{DatabaseEngine, EngineFamily};
