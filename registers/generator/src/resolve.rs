// Licensed under the Apache-2.0 license

//! Resolution of raw peripherals into [`Device`]s.
//!
//! Peripherals are processed in document order. A peripheral that is
//! `derivedFrom` another starts from a deep copy of the parent's resolved
//! registers, so the parent must appear earlier in the document.

use crate::error::{Error, Result};
use crate::model::{Device, Register};
use log::{debug, warn};
use registers_svd::SvdPeripheral;
use std::collections::HashMap;

/// Resolves peripherals one at a time, keeping the name registry needed for
/// `derivedFrom` lookups.
///
/// A resolver that returned an error should be discarded.
#[derive(Debug, Default)]
pub struct Resolver {
    /// Peripheral name to index in `devices`.
    registry: HashMap<String, usize>,
    devices: Vec<Device>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one peripheral and appends it to the device list.
    pub fn resolve(&mut self, peripheral: &SvdPeripheral) -> Result<&Device> {
        let wrap_err = |err: Error| Error::Peripheral {
            peripheral: peripheral.name.clone(),
            err: Box::new(err),
        };

        let index = self.devices.len();
        if self.registry.contains_key(&peripheral.name) {
            return Err(wrap_err(Error::DuplicatePeripheral));
        }
        // Registered before the parent lookup; a self reference then points at
        // an unfinished device and is rejected below.
        self.registry.insert(peripheral.name.clone(), index);

        let mut registers = match &peripheral.derived_from {
            Some(parent) => self.inherited_registers(parent).map_err(wrap_err)?,
            None => {
                if peripheral.registers.is_none() {
                    debug!("Peripheral {} has no registers", peripheral.name);
                }
                peripheral
                    .registers
                    .iter()
                    .flatten()
                    .map(Register::from_svd)
                    .collect::<Result<Vec<_>>>()
                    .map_err(wrap_err)?
            }
        };

        // Stable, so aliased registers keep their document order.
        registers.sort_by_key(|r| r.offset());
        for reg in registers.iter_mut() {
            reg.relocate(peripheral.base_address).map_err(wrap_err)?;
        }
        warn_overlapping(&peripheral.name, &registers);

        debug!(
            "Resolved {} at {:#x} with {} registers{}",
            peripheral.name,
            peripheral.base_address,
            registers.len(),
            peripheral
                .derived_from
                .as_ref()
                .map(|p| format!(" (derived from {p})"))
                .unwrap_or_default()
        );

        self.devices.push(Device {
            name: peripheral.name.clone(),
            base_address: peripheral.base_address,
            registers,
        });
        Ok(&self.devices[index])
    }

    fn inherited_registers(&self, parent: &str) -> Result<Vec<Register>> {
        match self.registry.get(parent) {
            Some(&index) if index < self.devices.len() => Ok(self.devices[index].registers.clone()),
            _ => Err(Error::UnknownParent {
                parent: parent.to_string(),
            }),
        }
    }

    pub fn into_devices(self) -> Vec<Device> {
        self.devices
    }
}

/// Resolves every peripheral in order.
pub fn resolve_peripherals<'a>(
    peripherals: impl IntoIterator<Item = &'a SvdPeripheral>,
) -> Result<Vec<Device>> {
    let mut resolver = Resolver::new();
    for peripheral in peripherals {
        resolver.resolve(peripheral)?;
    }
    Ok(resolver.into_devices())
}

/// Returns `(previous, register)` pairs of address-sorted registers at
/// different addresses whose byte ranges overlap. Their linker sections would
/// overlap too.
pub fn overlapping_registers(registers: &[Register]) -> Vec<(&Register, &Register)> {
    registers
        .windows(2)
        .filter_map(|pair| {
            let (prev, reg) = (&pair[0], &pair[1]);
            let overlaps = prev.address() != reg.address()
                && prev.address().saturating_add(prev.byte_size()) > reg.address();
            overlaps.then_some((prev, reg))
        })
        .collect()
}

fn warn_overlapping(device: &str, registers: &[Register]) {
    for (prev, reg) in overlapping_registers(registers) {
        warn!(
            "{device}: register {} at {:#x} overlaps {} at {:#x}",
            reg.name(),
            reg.address(),
            prev.name(),
            prev.address()
        );
    }
}
