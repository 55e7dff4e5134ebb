// Licensed under the Apache-2.0 license

use registers_svd::SvdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The document could not be read into peripheral descriptors.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] SvdError),
    #[error("address {base:#x} + {offset:#x} does not fit in 64 bits")]
    AddressOverflow { base: u64, offset: u64 },
    /// `derivedFrom` names a peripheral that has not been resolved yet.
    #[error("derived from unknown peripheral {parent:?} (the parent must be declared earlier)")]
    UnknownParent { parent: String },
    #[error("declared more than once")]
    DuplicatePeripheral,
    #[error("unsupported size of {0} bits (expected 8, 16, 32 or 64)")]
    UnsupportedRegisterSize(u32),
    #[error("field {field:?} at bit {offset} with width {width} does not fit in {size} bits")]
    FieldOutOfRange {
        field: String,
        offset: u32,
        width: u32,
        size: u32,
    },
    #[error("field {field:?} at bit {offset} overlaps field {previous:?} ending at bit {previous_end}")]
    OverlappingField {
        field: String,
        offset: u32,
        previous: String,
        previous_end: u32,
    },
    #[error("aliased registers {names:?} do not share the name prefix {base:?}")]
    AliasNameMismatch { base: String, names: Vec<String> },
    #[error("peripheral {peripheral:?} {err}")]
    Peripheral { peripheral: String, err: Box<Error> },
    #[error("register {register:?} {err}")]
    Register { register: String, err: Box<Error> },
}

impl Error {
    /// Strips the peripheral/register context wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Peripheral { err, .. } => err.root_cause(),
            Self::Register { err, .. } => err.root_cause(),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
