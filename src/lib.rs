//! Convert each page of a PDF into its own image file.

pub mod app;
pub mod cli;
pub mod config;
pub mod convert;
pub mod encode;
pub mod format;
pub mod metafile;
pub mod render;

pub use cli::{ConversionRequest, Resolution};
pub use format::OutputFormat;
