//! srhelper: a thin command-line layer around Space Ranger for 10x Visium samples.
//!
//! Discovers sample inputs on disk, derives `spaceranger count` invocations,
//! installs Space Ranger and reference transcriptomes, and writes pipeline
//! configuration templates.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
