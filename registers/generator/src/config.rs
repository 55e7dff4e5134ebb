// Licensed under the Apache-2.0 license

//! Configuration for layout planning and rendering.
//!
//! [`GeneratorConfig`] controls how aliased register groups are named and
//! how linker sections are aligned.
//!
//! ```
//! use registers_generator::config::{AliasNaming, GeneratorConfig};
//!
//! let config = GeneratorConfig::with_defaults();
//! assert_eq!(config.alias_naming, AliasNaming::Lenient);
//! assert_eq!(config.section_align, 4);
//!
//! let config = GeneratorConfig::with_defaults()
//!     .alias_naming(AliasNaming::Strict)
//!     .section_align(8);
//! assert_eq!(config.section_align, 8);
//! ```

/// How to treat aliased registers that do not follow the `{BASE}_{SUFFIX}`
/// naming convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AliasNaming {
    /// Log a warning and derive the base name from the last register anyway.
    #[default]
    Lenient,
    /// Fail with [`crate::Error::AliasNameMismatch`].
    Strict,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub alias_naming: AliasNaming,
    /// `ALIGN(...)` value of every linker section. Must be a power of two.
    pub section_align: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GeneratorConfig {
    pub const DEFAULT_SECTION_ALIGN: u64 = 4;

    pub fn with_defaults() -> Self {
        Self {
            alias_naming: AliasNaming::default(),
            section_align: Self::DEFAULT_SECTION_ALIGN,
        }
    }

    pub fn alias_naming(mut self, alias_naming: AliasNaming) -> Self {
        self.alias_naming = alias_naming;
        self
    }

    pub fn section_align(mut self, section_align: u64) -> Self {
        self.section_align = section_align;
        self
    }
}
