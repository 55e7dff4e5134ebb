// Licensed under the Apache-2.0 license

//! Layout planning: groups a device's registers by address and decides the
//! C type, symbol and linker section of every group.
//!
//! Registers that share an address are hardware aliases of the same storage
//! (for example a write-only `TX` and a read-only `RX` data register). They
//! are emitted as one union with a bit-field struct per register:
//!
//! ```text
//! SPI_DATA_TX @ 0x4008 ─┐
//! SPI_DATA_RX @ 0x4008 ─┴─> union spi_data_t { data_tx_bits; data_rx_bits; }
//! ```

use crate::config::AliasNaming;
use crate::error::{Error, Result};
use crate::model::{Device, Register};
use crate::util::{strip_last_token, uint_type};
use log::warn;

/// One member of a bit-field struct. `name` is `None` for padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMember {
    pub name: Option<String>,
    pub width: u32,
}

impl BitMember {
    fn named(name: &str, width: u32) -> Self {
        Self {
            name: Some(name.to_string()),
            width,
        }
    }

    fn padding(width: u32) -> Self {
        Self { name: None, width }
    }
}

/// A struct of bit-fields whose widths sum to `storage_bits`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitStruct {
    pub storage_bits: u32,
    pub members: Vec<BitMember>,
}

impl BitStruct {
    /// Lays out a register's fields, inserting anonymous padding for every gap
    /// and after the last field.
    ///
    /// [`Register`] guarantees its fields are sorted and non-overlapping.
    pub fn from_register(register: &Register) -> Self {
        let mut members = vec![];
        let mut cursor = 0;
        for field in register.fields() {
            if field.bit_offset > cursor {
                members.push(BitMember::padding(field.bit_offset - cursor));
            }
            members.push(BitMember::named(&field.name, field.bit_width));
            cursor = field.end();
        }
        if cursor < register.size() {
            members.push(BitMember::padding(register.size() - cursor));
        }
        Self {
            storage_bits: register.size(),
            members,
        }
    }

    pub fn storage_type(&self) -> String {
        uint_type(self.storage_bits)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnionMember {
    /// `{register_lower}_bits`
    pub name: String,
    pub bits: BitStruct,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDecl {
    Struct(BitStruct),
    Union(Vec<UnionMember>),
}

/// Everything the renderer needs for one address group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterLayout {
    /// `uintN_t` for scalar registers, otherwise `{symbol_lower}_t`.
    pub type_name: String,
    /// `None` for scalar registers, which use a standard integer type.
    pub declaration: Option<TypeDecl>,
    pub symbol_name: String,
    pub section_name: String,
    pub address: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceLayout {
    pub name: String,
    /// One entry per address group, in address order.
    pub groups: Vec<RegisterLayout>,
}

/// Splits address-sorted registers into maximal runs sharing one address.
pub fn address_groups(registers: &[Register]) -> impl Iterator<Item = &[Register]> {
    registers.chunk_by(|a, b| a.address() == b.address())
}

/// Returns the base name shared by a group of aliased registers.
///
/// The base is the last register's name with its final `_`-delimited token
/// removed (`CTRL_A`, `CTRL_B` -> `CTRL`). A group whose names do not all
/// start with `{base}_` is an [`Error::AliasNameMismatch`] under
/// [`AliasNaming::Strict`]; under [`AliasNaming::Lenient`] the base is used
/// anyway, or the whole last name when it has no underscore.
pub fn alias_base_name(group: &[Register], naming: AliasNaming) -> Result<&str> {
    let Some(last) = group.last() else {
        return Ok("");
    };
    let base = strip_last_token(last.name()).filter(|base| !base.is_empty());
    let conforming = base.filter(|base| {
        group.iter().all(|reg| {
            reg.name()
                .strip_prefix(*base)
                .is_some_and(|rest| rest.starts_with('_'))
        })
    });
    if let Some(base) = conforming {
        return Ok(base);
    }

    let names: Vec<String> = group.iter().map(|r| r.name().to_string()).collect();
    let fallback = base.unwrap_or(last.name());
    match naming {
        AliasNaming::Strict => Err(Error::AliasNameMismatch {
            base: fallback.to_string(),
            names,
        }),
        AliasNaming::Lenient => {
            warn!(
                "Aliased registers {names:?} do not share the prefix {fallback:?}; using it anyway"
            );
            Ok(fallback)
        }
    }
}

/// Plans one address group of `device`. An empty group plans to nothing.
pub fn plan_group(
    device: &str,
    group: &[Register],
    naming: AliasNaming,
) -> Result<Option<RegisterLayout>> {
    let Some(first) = group.first() else {
        return Ok(None);
    };

    let base = if group.len() == 1 {
        first.name()
    } else {
        alias_base_name(group, naming)?
    };
    let symbol_name = format!("{device}_{base}");
    let section_name = format!(".{}", symbol_name.to_lowercase());
    let struct_type = format!("{}_t", symbol_name.to_lowercase());

    let (type_name, declaration) = match group {
        [reg] if reg.is_scalar() => (uint_type(reg.size()), None),
        [reg] => (
            struct_type,
            Some(TypeDecl::Struct(BitStruct::from_register(reg))),
        ),
        regs => {
            let members = regs
                .iter()
                .map(|reg| UnionMember {
                    name: format!("{}_bits", reg.name().to_lowercase()),
                    bits: BitStruct::from_register(reg),
                })
                .collect();
            (struct_type, Some(TypeDecl::Union(members)))
        }
    };

    Ok(Some(RegisterLayout {
        type_name,
        declaration,
        symbol_name,
        section_name,
        address: first.address(),
    }))
}

pub fn plan_device(device: &Device, naming: AliasNaming) -> Result<DeviceLayout> {
    let mut groups = vec![];
    for group in address_groups(&device.registers) {
        let layout = plan_group(&device.name, group, naming).map_err(|err| Error::Peripheral {
            peripheral: device.name.clone(),
            err: Box::new(err),
        })?;
        groups.extend(layout);
    }
    Ok(DeviceLayout {
        name: device.name.clone(),
        groups,
    })
}

/// Plans every device, preserving device order.
pub fn plan_devices(devices: &[Device], naming: AliasNaming) -> Result<Vec<DeviceLayout>> {
    devices.iter().map(|d| plan_device(d, naming)).collect()
}
