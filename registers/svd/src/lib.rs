// Licensed under the Apache-2.0 license

//! Loader for the subset of CMSIS-SVD needed to lay out memory-mapped registers.
//!
//! Only peripherals, registers and fields are read. Everything else in the
//! document (clusters, enumerated values, access and reset properties, ...)
//! is skipped.
//!
//! ```
//! let svd = registers_svd::parse_str(r#"
//! <device>
//!   <peripherals>
//!     <peripheral>
//!       <name>TMR0</name>
//!       <baseAddress>0x4000</baseAddress>
//!       <registers>
//!         <register>
//!           <name>CTRL</name>
//!           <addressOffset>0x0</addressOffset>
//!           <size>32</size>
//!         </register>
//!       </registers>
//!     </peripheral>
//!   </peripherals>
//! </device>"#).unwrap();
//! assert_eq!(svd.peripherals[0].name, "TMR0");
//! assert_eq!(svd.peripherals[0].base_address, 0x4000);
//! ```

mod error;
mod loader;
mod number;
mod types;

pub use error::{Result, SvdError};
pub use loader::{load_file, parse_reader, parse_str};
pub use number::parse_integer;
pub use types::{SvdDevice, SvdField, SvdPeripheral, SvdRegister};
