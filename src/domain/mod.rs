//! Domain vocabulary: layout programs, output formats and their MIME types.

pub mod types;
