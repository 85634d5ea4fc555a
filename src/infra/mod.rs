//! Infrastructure adapters: process spawning, scratch directories, telemetry.

pub mod error;
pub mod process;
pub mod telemetry;
pub mod workspace;
