// Licensed under the Apache-2.0 license

/// Parses an SVD scaled-integer literal.
///
/// Accepted forms are decimal, `0x`/`0X` hexadecimal, `0b`/`0B` binary and the
/// SVD `#` binary notation. Surrounding whitespace is ignored.
///
/// ```
/// use registers_svd::parse_integer;
/// assert_eq!(parse_integer("0x4000"), Some(0x4000));
/// assert_eq!(parse_integer(" 32 "), Some(32));
/// assert_eq!(parse_integer("#101"), Some(5));
/// assert_eq!(parse_integer("0x"), None);
/// ```
pub fn parse_integer(text: &str) -> Option<u64> {
    let text = text.trim();
    let (digits, radix) = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = text
        .strip_prefix("0b")
        .or_else(|| text.strip_prefix("0B"))
        .or_else(|| text.strip_prefix('#'))
    {
        (bin, 2)
    } else {
        (text, 10)
    };
    // from_str_radix tolerates a leading sign, SVD does not
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}
