//! Backdrop - dominant-color backgrounds for standalone image documents.
//!
//! Samples a downscaled copy of each image, clusters the samples on a
//! dedicated worker thread and applies the most common color as the
//! document background. This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
