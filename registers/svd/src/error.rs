// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading an SVD document.
///
/// `context` names the element being read, e.g. `peripheral "TMR0" register "CTRL"`.
#[derive(Debug, Error)]
pub enum SvdError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid XML: {0}")]
    Xml(#[from] xmltree::ParseError),
    #[error("{context}: missing <{element}>")]
    MissingElement {
        element: &'static str,
        context: String,
    },
    #[error("{context}: <{element}> value {text:?} is not an integer")]
    InvalidInteger {
        element: &'static str,
        text: String,
        context: String,
    },
    #[error("{context}: invalid bitRange {text:?}, expected [msb:lsb]")]
    InvalidBitRange { text: String, context: String },
}

pub type Result<T> = std::result::Result<T, SvdError>;
