//! Command-line front end for the analysis engine.

pub mod args;
pub mod config;
pub mod languages;
pub mod output;
pub mod scan;
