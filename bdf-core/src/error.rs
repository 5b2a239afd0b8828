//! Error types re-exported from bdf-error

pub use bdf_error::{BdfError, Result};
