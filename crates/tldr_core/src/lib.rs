//! Page-cache pipeline for the `tldr` viewer: fetch the pages archive, extract
//! one language into the local store, index it, and resolve/render pages.

pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod render;
pub mod resolve;
pub mod runtime;
pub mod update;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{PagesError, Result};
