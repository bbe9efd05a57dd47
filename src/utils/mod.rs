//! Utility modules shared across the pipeline.

pub mod exec;
pub mod hash;
pub mod html;
pub mod path;
