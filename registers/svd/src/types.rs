// Licensed under the Apache-2.0 license

//! Raw descriptors read from the SVD document.
//!
//! These mirror the XML closely and carry no layout decisions: fields are in
//! document order, full-width fields are still present and inheritance is not
//! resolved.

/// A `<field>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvdField {
    pub name: String,
    pub bit_offset: u32,
    pub bit_width: u32,
}

/// A `<register>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvdRegister {
    pub name: String,
    /// Byte offset from the peripheral base address.
    pub address_offset: u64,
    /// Width in bits.
    pub size: u32,
    pub fields: Vec<SvdField>,
}

/// A `<peripheral>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvdPeripheral {
    pub name: String,
    pub base_address: u64,
    /// Value of the `derivedFrom` attribute, if any.
    pub derived_from: Option<String>,
    /// `None` when the peripheral has no `<registers>` block. Always `None`
    /// for derived peripherals, whose registers come from the parent.
    pub registers: Option<Vec<SvdRegister>>,
}

/// The root of the document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SvdDevice {
    pub name: Option<String>,
    /// Peripherals in document order.
    pub peripherals: Vec<SvdPeripheral>,
}
