//! inkpost - Markdown content pipeline for a technical blog.
//!
//! Posts are `<slug>/index.md` files with YAML-like front matter. Rendering
//! adds admonitions, tabbed code groups, palette-driven code highlighting and
//! a bidirectional link graph between posts.

pub mod logger;

pub mod build;
pub mod cli;
pub mod config;
pub mod highlight;
pub mod markdown;
pub mod post;
pub mod slug;
pub mod utils;
