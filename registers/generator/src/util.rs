// Licensed under the Apache-2.0 license

//! Naming helpers for the generated C artifacts.

use std::path::Path;

/// Returns the C storage type for a register of `bits` width.
///
/// # Examples
/// ```
/// use registers_generator::util::uint_type;
/// assert_eq!(uint_type(8), "uint8_t");
/// assert_eq!(uint_type(32), "uint32_t");
/// ```
pub fn uint_type(bits: u32) -> String {
    format!("uint{bits}_t")
}

/// Derives the output file stem from an input path: the file name up to its
/// first `.`, lowercased.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use registers_generator::util::mmr_stem;
/// assert_eq!(mmr_stem(Path::new("chips/STM32F4.patched.svd")).as_deref(), Some("stm32f4"));
/// assert_eq!(mmr_stem(Path::new("/")), None);
/// ```
pub fn mmr_stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or(name);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_lowercase())
    }
}

/// Returns `name` up to its last `_`, or `None` when there is no underscore.
pub(crate) fn strip_last_token(name: &str) -> Option<&str> {
    name.rfind('_').map(|index| &name[..index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmr_stem() {
        assert_eq!(mmr_stem(Path::new("device.svd")).as_deref(), Some("device"));
        assert_eq!(mmr_stem(Path::new("Timer")).as_deref(), Some("timer"));
        assert_eq!(mmr_stem(Path::new(".hidden.svd")), None);
    }

    #[test]
    fn test_strip_last_token() {
        assert_eq!(strip_last_token("CTRL_A"), Some("CTRL"));
        assert_eq!(strip_last_token("DMA_CH_CFG_LO"), Some("DMA_CH_CFG"));
        assert_eq!(strip_last_token("_A"), Some(""));
        assert_eq!(strip_last_token("CTRL"), None);
    }
}
