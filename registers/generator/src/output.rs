// Licensed under the Apache-2.0 license

//! Rendering of planned layouts into the three C artifacts.
//!
//! ```text
//! DeviceLayout[] ─┬─> {stem}_mmr.h   typedefs for every struct/union type
//!                 ├─> {stem}_mmr.c   one volatile object per address group
//!                 └─> {stem}_mmr.ld  one NOLOAD section per address group
//! ```
//!
//! For a `TMR0` peripheral at `0x4000` with a plain `CTRL` register and a
//! `STAT` register holding a one-bit `RDY` field, the output is:
//!
//! ```text
//! // tmr0_mmr.h
//! #include <stdint.h>
//!
//! typedef struct {
//!     uint32_t RDY :1;
//!     uint32_t :31;
//! } tmr0_stat_t;
//!
//! // tmr0_mmr.c
//! #include "tmr0_mmr.h"
//!
//! volatile uint32_t TMR0_CTRL __attribute__((section(".tmr0_ctrl")));
//! volatile tmr0_stat_t TMR0_STAT __attribute__((section(".tmr0_stat")));
//!
//! // tmr0_mmr.ld
//! SECTIONS {
//!     .tmr0_ctrl 0x4000 (NOLOAD): ALIGN(4) { KEEP(*(.tmr0_ctrl)) }
//!     .tmr0_stat 0x4004 (NOLOAD): ALIGN(4) { KEEP(*(.tmr0_stat)) }
//! }
//! ```
//!
//! Indentation in the generated files is a tab.

use crate::layout::{BitStruct, DeviceLayout, RegisterLayout, TypeDecl};
use std::fmt::Write;

/// Output file names derived from the input stem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MmrFileNames {
    pub header: String,
    pub source: String,
    pub linker: String,
}

impl MmrFileNames {
    pub fn new(stem: &str) -> Self {
        Self {
            header: format!("{stem}_mmr.h"),
            source: format!("{stem}_mmr.c"),
            linker: format!("{stem}_mmr.ld"),
        }
    }
}

/// Rendered file contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MmrFiles {
    pub header: String,
    pub source: String,
    pub linker: String,
}

impl MmrFiles {
    /// Renders all three files. `header_name` is the file name the source
    /// includes; `section_align` is the `ALIGN` of every linker section.
    pub fn render(devices: &[DeviceLayout], header_name: &str, section_align: u64) -> Self {
        let groups = || devices.iter().flat_map(|d| d.groups.iter());
        Self {
            header: render_header(groups()),
            source: render_source(groups(), header_name),
            linker: render_linker(groups(), section_align),
        }
    }
}

pub fn render_header<'a>(groups: impl IntoIterator<Item = &'a RegisterLayout>) -> String {
    let mut output = String::new();
    writeln!(output, "#include <stdint.h>").unwrap();
    writeln!(output).unwrap();
    for group in groups {
        let Some(declaration) = &group.declaration else {
            continue;
        };
        write!(output, "typedef ").unwrap();
        write_declaration(&mut output, declaration);
        writeln!(output, " {};", group.type_name).unwrap();
        writeln!(output).unwrap();
    }
    output
}

fn write_declaration(output: &mut String, declaration: &TypeDecl) {
    match declaration {
        TypeDecl::Struct(bits) => write_struct(output, bits, ""),
        TypeDecl::Union(members) => {
            writeln!(output, "union {{").unwrap();
            for member in members {
                write!(output, "\t").unwrap();
                write_struct(output, &member.bits, "\t");
                writeln!(output, " {};", member.name).unwrap();
            }
            write!(output, "}}").unwrap();
        }
    }
}

/// Writes `struct { ... }` without a trailing newline. Every line after the
/// first is prefixed with `indent`.
fn write_struct(output: &mut String, bits: &BitStruct, indent: &str) {
    let storage = bits.storage_type();
    writeln!(output, "struct {{").unwrap();
    for member in bits.members.iter() {
        match &member.name {
            Some(name) => writeln!(output, "{indent}\t{storage} {name} :{};", member.width),
            None => writeln!(output, "{indent}\t{storage} :{};", member.width),
        }
        .unwrap();
    }
    write!(output, "{indent}}}").unwrap();
}

pub fn render_source<'a>(
    groups: impl IntoIterator<Item = &'a RegisterLayout>,
    header_name: &str,
) -> String {
    let mut output = String::new();
    writeln!(output, "#include \"{header_name}\"").unwrap();
    writeln!(output).unwrap();
    for group in groups {
        writeln!(
            output,
            "volatile {} {} __attribute__((section(\"{}\")));",
            group.type_name, group.symbol_name, group.section_name
        )
        .unwrap();
    }
    output
}

pub fn render_linker<'a>(
    groups: impl IntoIterator<Item = &'a RegisterLayout>,
    section_align: u64,
) -> String {
    let mut output = String::new();
    writeln!(output, "SECTIONS {{").unwrap();
    for group in groups {
        let section = &group.section_name;
        writeln!(
            output,
            "\t{section} 0x{:x} (NOLOAD): ALIGN({section_align}) {{ KEEP(*({section})) }}",
            group.address
        )
        .unwrap();
    }
    writeln!(output, "}}").unwrap();
    output
}
