//! Scaffolds a boilerplate Express + MongoDB backend project.
//!
//! The whole run is one pipeline: resolve the target from the project name, refuse if it
//! exists, render the [`manifest::WriteManifest`] from embedded tera templates, then create
//! directories and files under the new root.

pub mod api;
pub mod config;
pub mod errors;
pub mod manifest;
pub mod preview;
pub mod scaffold;
pub mod template;
mod transactions;
pub mod utils;

pub use api::{create_project, preview_project, AppError};
pub use config::ScaffoldOptions;
