//! Application services: the Graphviz and TikZ rendering pipelines.

pub mod error;
pub mod render;
