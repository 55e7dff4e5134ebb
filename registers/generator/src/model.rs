// Licensed under the Apache-2.0 license

//! Normalized device model.
//!
//! ```text
//! Device            one per <peripheral>, registers sorted by address
//! └── Register      relative offset, absolute address, width in bits
//!     └── Field     named bit range, sorted by offset, never overlapping
//! ```
//!
//! A field covering the whole register is dropped when the register is built:
//! such a register is a plain scalar, not a bit-field type.

use crate::error::{Error, Result};
use registers_svd::{SvdField, SvdRegister};

/// Register widths that map onto a `uintN_t` C type.
pub const SUPPORTED_SIZES: [u32; 4] = [8, 16, 32, 64];

/// A named bit range within a register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub bit_offset: u32,
    pub bit_width: u32,
}

impl Field {
    pub fn new(name: impl Into<String>, bit_offset: u32, bit_width: u32) -> Self {
        Self {
            name: name.into(),
            bit_offset,
            bit_width,
        }
    }

    /// First bit past the end of the field.
    pub fn end(&self) -> u32 {
        self.bit_offset + self.bit_width
    }
}

impl From<&SvdField> for Field {
    fn from(field: &SvdField) -> Self {
        Field::new(field.name.clone(), field.bit_offset, field.bit_width)
    }
}

/// A validated register. Only [`Register::new`] builds one, so the field
/// list is always sorted, in range and free of overlaps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    name: String,
    offset: u64,
    address: u64,
    size: u32,
    fields: Vec<Field>,
}

impl Register {
    /// Builds a register from its raw fields.
    ///
    /// The full-width field (offset 0, width == size) is discarded and the
    /// remaining fields are sorted by offset and checked for overlap.
    pub fn new(
        name: impl Into<String>,
        offset: u64,
        size: u32,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self> {
        let name = name.into();
        let fields = normalize_fields(size, fields).map_err(|err| Error::Register {
            register: name.clone(),
            err: Box::new(err),
        })?;
        Ok(Self {
            name,
            offset,
            address: offset,
            size,
            fields,
        })
    }

    pub fn from_svd(register: &SvdRegister) -> Result<Self> {
        Self::new(
            register.name.clone(),
            register.address_offset,
            register.size,
            register.fields.iter().map(Field::from),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset from the owning peripheral's base address.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Absolute byte address. Equal to `offset` until the owning device
    /// relocates it.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Width in bits.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sorted by `bit_offset`, non-overlapping, never a single full-width field.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// True when the register has no sub-fields and is accessed as a plain integer.
    pub fn is_scalar(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn byte_size(&self) -> u64 {
        u64::from(self.size / 8)
    }

    /// Sets the absolute address to `base + offset`.
    pub fn relocate(&mut self, base: u64) -> Result<()> {
        self.address = base
            .checked_add(self.offset)
            .ok_or(Error::AddressOverflow {
                base,
                offset: self.offset,
            })?;
        Ok(())
    }
}

fn normalize_fields(size: u32, fields: impl IntoIterator<Item = Field>) -> Result<Vec<Field>> {
    if !SUPPORTED_SIZES.contains(&size) {
        return Err(Error::UnsupportedRegisterSize(size));
    }

    let mut fields: Vec<Field> = fields
        .into_iter()
        .filter(|f| !(f.bit_offset == 0 && f.bit_width == size))
        .collect();
    fields.sort_by_key(|f| f.bit_offset);

    let mut previous: Option<&Field> = None;
    for field in fields.iter() {
        let end = field.bit_offset.checked_add(field.bit_width);
        if field.bit_width == 0 || end.map_or(true, |end| end > size) {
            return Err(Error::FieldOutOfRange {
                field: field.name.clone(),
                offset: field.bit_offset,
                width: field.bit_width,
                size,
            });
        }
        if let Some(prev) = previous {
            if prev.end() > field.bit_offset {
                return Err(Error::OverlappingField {
                    field: field.name.clone(),
                    offset: field.bit_offset,
                    previous: prev.name.clone(),
                    previous_end: prev.end(),
                });
            }
        }
        previous = Some(field);
    }
    Ok(fields)
}

/// One peripheral with its resolved registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub base_address: u64,
    /// Sorted by address; registers sharing an address keep document order.
    pub registers: Vec<Register>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_field_dropped() {
        let reg = Register::new("DATA", 0x8, 32, [Field::new("VAL", 0, 32)]).unwrap();
        assert!(reg.is_scalar());
        assert_eq!(reg.address(), 0x8);
        assert_eq!(reg.byte_size(), 4);
    }

    #[test]
    fn test_full_width_field_dropped_among_others() {
        let reg = Register::new(
            "DATA",
            0,
            8,
            [Field::new("LOW", 0, 4), Field::new("ALL", 0, 8)],
        )
        .unwrap();
        assert_eq!(reg.fields(), [Field::new("LOW", 0, 4)]);
    }

    #[test]
    fn test_fields_sorted_by_offset() {
        let reg = Register::new(
            "CTRL",
            0,
            16,
            [
                Field::new("C", 8, 8),
                Field::new("A", 0, 1),
                Field::new("B", 3, 2),
            ],
        )
        .unwrap();
        let names: Vec<_> = reg.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_overlapping_fields_rejected() {
        let err = Register::new(
            "CTRL",
            0,
            32,
            [Field::new("A", 0, 4), Field::new("B", 3, 2)],
        )
        .unwrap_err();
        match err.root_cause() {
            Error::OverlappingField {
                field,
                offset,
                previous,
                previous_end,
            } => {
                assert_eq!(field, "B");
                assert_eq!(*offset, 3);
                assert_eq!(previous, "A");
                assert_eq!(*previous_end, 4);
            }
            err => panic!("unexpected error {err:?}"),
        }
        assert!(err.to_string().starts_with(r#"register "CTRL" field "B""#));
    }

    #[test]
    fn test_duplicate_offset_rejected() {
        let err = Register::new(
            "CTRL",
            0,
            8,
            [Field::new("A", 2, 1), Field::new("B", 2, 1)],
        )
        .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::OverlappingField { .. }
        ));
    }

    #[test]
    fn test_field_out_of_range() {
        let err = Register::new("CTRL", 0, 8, [Field::new("A", 6, 4)]).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::FieldOutOfRange { size: 8, .. }
        ));

        let err = Register::new("CTRL", 0, 8, [Field::new("A", 2, 0)]).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::FieldOutOfRange { width: 0, .. }
        ));

        let err = Register::new("CTRL", 0, 32, [Field::new("A", u32::MAX, 2)]).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::FieldOutOfRange { .. }
        ));
    }

    #[test]
    fn test_unsupported_size() {
        let err = Register::new("CTRL", 0, 24, []).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::UnsupportedRegisterSize(24)
        ));
    }

    #[test]
    fn test_relocate() {
        let mut reg = Register::new("STAT", 0x4, 32, []).unwrap();
        reg.relocate(0x4000).unwrap();
        assert_eq!(reg.address(), 0x4004);
        assert_eq!(reg.offset(), 0x4);

        let mut reg = Register::new("STAT", 0x10, 32, []).unwrap();
        assert!(matches!(
            reg.relocate(u64::MAX - 1),
            Err(Error::AddressOverflow { .. })
        ));
    }
}
