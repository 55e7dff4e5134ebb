// Licensed under the Apache-2.0 license

use crate::error::{Result, SvdError};
use crate::number::parse_integer;
use crate::types::{SvdDevice, SvdField, SvdPeripheral, SvdRegister};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use xmltree::Element;

/// Reads and parses an SVD file.
pub fn load_file(path: &Path) -> Result<SvdDevice> {
    let file = File::open(path).map_err(|source| SvdError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loading {}", path.display());
    parse_reader(BufReader::new(file))
}

pub fn parse_str(text: &str) -> Result<SvdDevice> {
    parse_reader(text.as_bytes())
}

pub fn parse_reader<R: Read>(reader: R) -> Result<SvdDevice> {
    let root = Element::parse(reader)?;
    read_device(&root)
}

fn child_elements<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    parent
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .filter(move |e| e.name == name)
}

fn text_of(parent: &Element, element: &str) -> Option<String> {
    parent
        .get_child(element)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn required_text(parent: &Element, element: &'static str, context: &str) -> Result<String> {
    text_of(parent, element).ok_or_else(|| SvdError::MissingElement {
        element,
        context: context.to_string(),
    })
}

fn required_integer(parent: &Element, element: &'static str, context: &str) -> Result<u64> {
    let text = required_text(parent, element, context)?;
    parse_integer(&text).ok_or_else(|| SvdError::InvalidInteger {
        element,
        text,
        context: context.to_string(),
    })
}

fn required_u32(parent: &Element, element: &'static str, context: &str) -> Result<u32> {
    let value = required_integer(parent, element, context)?;
    u32::try_from(value).map_err(|_| SvdError::InvalidInteger {
        element,
        text: value.to_string(),
        context: context.to_string(),
    })
}

fn read_device(root: &Element) -> Result<SvdDevice> {
    // Accept both a full <device> document and a bare <peripherals> fragment.
    let peripherals = if root.name == "peripherals" {
        root
    } else {
        root.get_child("peripherals")
            .ok_or_else(|| SvdError::MissingElement {
                element: "peripherals",
                context: format!("<{}>", root.name),
            })?
    };

    let peripherals = child_elements(peripherals, "peripheral")
        .enumerate()
        .map(|(index, p)| read_peripheral(index, p))
        .collect::<Result<Vec<_>>>()?;

    Ok(SvdDevice {
        name: text_of(root, "name"),
        peripherals,
    })
}

fn read_peripheral(index: usize, element: &Element) -> Result<SvdPeripheral> {
    let name = required_text(element, "name", &format!("peripheral #{index}"))?;
    let context = format!("peripheral {name:?}");
    let base_address = required_integer(element, "baseAddress", &context)?;
    let derived_from = element
        .attributes
        .get("derivedFrom")
        .map(|parent| parent.trim().to_string());

    let registers = match (&derived_from, element.get_child("registers")) {
        (_, None) => None,
        (Some(parent), Some(_)) => {
            warn!("{context} is derived from {parent:?}; its own <registers> are ignored");
            None
        }
        (None, Some(registers)) => Some(
            child_elements(registers, "register")
                .map(|r| read_register(r, &context))
                .collect::<Result<Vec<_>>>()?,
        ),
    };

    Ok(SvdPeripheral {
        name,
        base_address,
        derived_from,
        registers,
    })
}

fn read_register(element: &Element, peripheral: &str) -> Result<SvdRegister> {
    let name = required_text(element, "name", &format!("{peripheral} register"))?;
    let context = format!("{peripheral} register {name:?}");
    let address_offset = required_integer(element, "addressOffset", &context)?;
    let size = required_u32(element, "size", &context)?;

    let fields = match element.get_child("fields") {
        Some(fields) => child_elements(fields, "field")
            .map(|f| read_field(f, &context))
            .collect::<Result<Vec<_>>>()?,
        None => vec![],
    };

    Ok(SvdRegister {
        name,
        address_offset,
        size,
        fields,
    })
}

fn read_field(element: &Element, register: &str) -> Result<SvdField> {
    let name = required_text(element, "name", &format!("{register} field"))?;
    let context = format!("{register} field {name:?}");
    let (bit_offset, bit_width) = field_position(element, &context)?;
    Ok(SvdField {
        name,
        bit_offset,
        bit_width,
    })
}

/// Returns `(bit_offset, bit_width)` from whichever of the three SVD
/// bit-range notations the field uses.
fn field_position(element: &Element, context: &str) -> Result<(u32, u32)> {
    if element.get_child("bitOffset").is_some() || element.get_child("bitWidth").is_some() {
        let offset = required_u32(element, "bitOffset", context)?;
        let width = required_u32(element, "bitWidth", context)?;
        return Ok((offset, width));
    }

    let (msb, lsb, text) =
        if element.get_child("lsb").is_some() || element.get_child("msb").is_some() {
            let lsb = required_u32(element, "lsb", context)?;
            let msb = required_u32(element, "msb", context)?;
            (msb, lsb, format!("[{msb}:{lsb}]"))
        } else if let Some(range) = text_of(element, "bitRange") {
            let (msb, lsb) = parse_bit_range(&range).ok_or_else(|| SvdError::InvalidBitRange {
                text: range.clone(),
                context: context.to_string(),
            })?;
            (msb, lsb, range)
        } else {
            return Err(SvdError::MissingElement {
                element: "bitOffset",
                context: context.to_string(),
            });
        };

    // Rejects msb < lsb and a width that does not fit in u32.
    match msb.checked_sub(lsb).and_then(|span| span.checked_add(1)) {
        Some(width) => Ok((lsb, width)),
        None => Err(SvdError::InvalidBitRange {
            text,
            context: context.to_string(),
        }),
    }
}

/// Parses `[msb:lsb]` into `(msb, lsb)`.
fn parse_bit_range(text: &str) -> Option<(u32, u32)> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (msb, lsb) = inner.split_once(':')?;
    let msb = u32::try_from(parse_integer(msb)?).ok()?;
    let lsb = u32::try_from(parse_integer(lsb)?).ok()?;
    Some((msb, lsb))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMER_SVD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<device schemaVersion="1.1">
  <name>DEMO</name>
  <peripherals>
    <peripheral>
      <name>TMR0</name>
      <description>Timer 0</description>
      <baseAddress>0x4000</baseAddress>
      <registers>
        <register>
          <name>STAT</name>
          <addressOffset>0x4</addressOffset>
          <size>32</size>
          <fields>
            <field>
              <name>RDY</name>
              <bitOffset>0</bitOffset>
              <bitWidth>1</bitWidth>
            </field>
            <field>
              <name>ERR</name>
              <bitRange>[7:4]</bitRange>
            </field>
            <field>
              <name>CNT</name>
              <lsb>16</lsb>
              <msb>31</msb>
            </field>
          </fields>
        </register>
        <register>
          <name>CTRL</name>
          <addressOffset>0</addressOffset>
          <size>0x20</size>
          <resetValue>0x0</resetValue>
        </register>
      </registers>
    </peripheral>
    <peripheral derivedFrom="TMR0">
      <name>TMR1</name>
      <baseAddress>0x5000</baseAddress>
    </peripheral>
  </peripherals>
</device>
"#;

    #[test]
    fn test_parse_device() {
        let svd = parse_str(TIMER_SVD).unwrap();
        assert_eq!(svd.name.as_deref(), Some("DEMO"));
        assert_eq!(svd.peripherals.len(), 2);

        let tmr0 = &svd.peripherals[0];
        assert_eq!(tmr0.name, "TMR0");
        assert_eq!(tmr0.base_address, 0x4000);
        assert_eq!(tmr0.derived_from, None);

        // Document order is preserved; sorting happens during resolution.
        let registers = tmr0.registers.as_ref().unwrap();
        assert_eq!(registers[0].name, "STAT");
        assert_eq!(registers[0].address_offset, 4);
        assert_eq!(registers[1].name, "CTRL");
        assert_eq!(registers[1].size, 32);
        assert!(registers[1].fields.is_empty());

        let fields = &registers[0].fields;
        assert_eq!(
            fields,
            &vec![
                SvdField {
                    name: "RDY".into(),
                    bit_offset: 0,
                    bit_width: 1
                },
                SvdField {
                    name: "ERR".into(),
                    bit_offset: 4,
                    bit_width: 4
                },
                SvdField {
                    name: "CNT".into(),
                    bit_offset: 16,
                    bit_width: 16
                },
            ]
        );
    }

    #[test]
    fn test_derived_peripheral() {
        let svd = parse_str(TIMER_SVD).unwrap();
        let tmr1 = &svd.peripherals[1];
        assert_eq!(tmr1.name, "TMR1");
        assert_eq!(tmr1.base_address, 0x5000);
        assert_eq!(tmr1.derived_from.as_deref(), Some("TMR0"));
        assert_eq!(tmr1.registers, None);
    }

    #[test]
    fn test_derived_peripheral_registers_are_not_parsed() {
        // The override block is incomplete (no size) but is never read.
        let svd = parse_str(
            r#"<device><peripherals>
                <peripheral><name>A</name><baseAddress>0</baseAddress></peripheral>
                <peripheral derivedFrom="A">
                  <name>B</name><baseAddress>0x100</baseAddress>
                  <registers><register><name>X</name></register></registers>
                </peripheral>
            </peripherals></device>"#,
        )
        .unwrap();
        assert_eq!(svd.peripherals[0].registers, None);
        assert_eq!(svd.peripherals[1].registers, None);
    }

    #[test]
    fn test_peripherals_root() {
        let svd = parse_str(
            "<peripherals><peripheral><name>P</name><baseAddress>16</baseAddress>\
             <registers/></peripheral></peripherals>",
        )
        .unwrap();
        assert_eq!(svd.name, None);
        assert_eq!(svd.peripherals[0].base_address, 16);
        assert_eq!(svd.peripherals[0].registers, Some(vec![]));
    }

    #[test]
    fn test_missing_peripherals() {
        let err = parse_str("<device><name>X</name></device>").unwrap_err();
        assert!(
            matches!(
                err,
                SvdError::MissingElement {
                    element: "peripherals",
                    ..
                }
            ),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn test_missing_register_size() {
        let err = parse_str(
            r#"<device><peripherals><peripheral>
                <name>UART0</name><baseAddress>0x1000</baseAddress>
                <registers><register><name>DATA</name><addressOffset>0</addressOffset></register></registers>
            </peripheral></peripherals></device>"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"peripheral "UART0" register "DATA": missing <size>"#
        );
    }

    #[test]
    fn test_missing_peripheral_name() {
        let err = parse_str(
            r#"<device><peripherals>
                <peripheral><name>A</name><baseAddress>0</baseAddress></peripheral>
                <peripheral><baseAddress>0</baseAddress></peripheral>
            </peripherals></device>"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "peripheral #1: missing <name>");
    }

    #[test]
    fn test_invalid_integer() {
        let err = parse_str(
            r#"<device><peripherals><peripheral>
                <name>UART0</name><baseAddress>0x10zz</baseAddress>
            </peripheral></peripherals></device>"#,
        )
        .unwrap_err();
        match err {
            SvdError::InvalidInteger {
                element,
                text,
                context,
            } => {
                assert_eq!(element, "baseAddress");
                assert_eq!(text, "0x10zz");
                assert_eq!(context, r#"peripheral "UART0""#);
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn test_register_size_too_large() {
        let err = parse_str(
            r#"<device><peripherals><peripheral>
                <name>P</name><baseAddress>0</baseAddress>
                <registers><register><name>R</name><addressOffset>0</addressOffset>
                <size>0x100000000</size></register></registers>
            </peripheral></peripherals></device>"#,
        )
        .unwrap_err();
        assert!(matches!(err, SvdError::InvalidInteger { element: "size", .. }));
    }

    #[test]
    fn test_field_without_position() {
        let err = parse_str(
            r#"<device><peripherals><peripheral>
                <name>P</name><baseAddress>0</baseAddress>
                <registers><register><name>R</name><addressOffset>0</addressOffset><size>8</size>
                <fields><field><name>F</name><bitOffset>2</bitOffset></field></fields>
                </register></registers>
            </peripheral></peripherals></device>"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"peripheral "P" register "R" field "F": missing <bitWidth>"#
        );
    }

    #[test]
    fn test_bit_range() {
        assert_eq!(parse_bit_range("[7:4]"), Some((7, 4)));
        assert_eq!(parse_bit_range(" [ 31 : 0 ] "), Some((31, 0)));
        assert_eq!(parse_bit_range("7:4"), None);
        assert_eq!(parse_bit_range("[7]"), None);
        assert_eq!(parse_bit_range("[a:b]"), None);
    }

    #[test]
    fn test_inverted_bit_range() {
        let err = parse_str(
            r#"<device><peripherals><peripheral>
                <name>P</name><baseAddress>0</baseAddress>
                <registers><register><name>R</name><addressOffset>0</addressOffset><size>8</size>
                <fields><field><name>F</name><bitRange>[1:3]</bitRange></field></fields>
                </register></registers>
            </peripheral></peripherals></device>"#,
        )
        .unwrap_err();
        assert!(matches!(err, SvdError::InvalidBitRange { .. }), "{err:?}");
    }

    #[test]
    fn test_bit_range_width_overflow() {
        let field_svd = |field: &str| {
            format!(
                r#"<device><peripherals><peripheral>
                <name>P</name><baseAddress>0</baseAddress>
                <registers><register><name>R</name><addressOffset>0</addressOffset><size>32</size>
                <fields><field><name>F</name>{field}</field></fields>
                </register></registers>
            </peripheral></peripherals></device>"#
            )
        };

        let err = parse_str(&field_svd("<bitRange>[4294967295:0]</bitRange>")).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"peripheral "P" register "R" field "F": invalid bitRange "[4294967295:0]", expected [msb:lsb]"#
        );

        let err = parse_str(&field_svd("<lsb>0</lsb><msb>0xFFFFFFFF</msb>")).unwrap_err();
        assert!(matches!(err, SvdError::InvalidBitRange { .. }), "{err:?}");

        // The widest range that still fits is accepted and left to layout validation.
        let svd = parse_str(&field_svd("<bitRange>[4294967294:0]</bitRange>")).unwrap();
        let field = &svd.peripherals[0].registers.as_ref().unwrap()[0].fields[0];
        assert_eq!((field.bit_offset, field.bit_width), (0, u32::MAX));
    }

    #[test]
    fn test_invalid_xml() {
        let err = parse_str("<device><peripherals></device>").unwrap_err();
        assert!(matches!(err, SvdError::Xml(_)), "{err:?}");
    }
}
