// Licensed under the Apache-2.0 license

//! SVD to memory-mapped register C artifact generator.
//!
//! Turns the peripherals loaded by [`registers_svd`] into a C header with
//! bit-field types, a C source placing one volatile object per register
//! address, and a linker script pinning each object's section to its address.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use registers_generator::{generate_mmr, GeneratorConfig, MmrFileNames};
//!
//! let svd = registers_svd::load_file(Path::new("device.svd")).unwrap();
//! let names = MmrFileNames::new("device");
//! let files = generate_mmr(&svd, &names, &GeneratorConfig::with_defaults()).unwrap();
//! std::fs::write(&names.header, files.header).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`model`]: validated [`Field`], [`Register`] and [`Device`] types
//! - [`resolve`]: `derivedFrom` inheritance and absolute addresses ([`Resolver`])
//! - [`layout`]: address grouping, naming and bit-field struct synthesis
//! - [`output`]: rendering of the header, source and linker script
//! - [`config`]: [`GeneratorConfig`]
//! - [`util`]: naming helpers

pub mod config;
pub mod layout;
pub mod model;
pub mod output;
pub mod resolve;
pub mod util;

mod error;

pub use config::{AliasNaming, GeneratorConfig};
pub use error::{Error, Result};
pub use layout::{
    plan_device, plan_devices, BitMember, BitStruct, DeviceLayout, RegisterLayout, TypeDecl,
    UnionMember,
};
pub use model::{Device, Field, Register};
pub use output::{MmrFileNames, MmrFiles};
pub use resolve::{resolve_peripherals, Resolver};

use log::info;
use registers_svd::SvdDevice;

/// Resolves, plans and renders all peripherals of `svd`.
///
/// Nothing is written to disk; the caller persists the returned files under
/// `names`.
pub fn generate_mmr(
    svd: &SvdDevice,
    names: &MmrFileNames,
    config: &GeneratorConfig,
) -> Result<MmrFiles> {
    let devices = resolve_peripherals(&svd.peripherals)?;
    let layouts = plan_devices(&devices, config.alias_naming)?;
    info!(
        "Planned {} address groups across {} peripherals",
        layouts.iter().map(|d| d.groups.len()).sum::<usize>(),
        layouts.len()
    );
    Ok(MmrFiles::render(
        &layouts,
        &names.header,
        config.section_align,
    ))
}
