//! The top-level error type.
//!
//! Each pipeline stage has its own error enum; [`VellumError`] wraps them so
//! callers driving the whole pipeline can use a single `Result` type.

use std::io;

use thiserror::Error;

use crate::{layout::LayoutError, model::ModelError};

/// The main error type for diagram operations.
#[derive(Debug, Error)]
pub enum VellumError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}
