use std::str::FromStr;

use palette::Srgb;

/// 8-bit sRGB colour used throughout themes and render plans.
pub type Rgb = Srgb<u8>;

/// Neutral grey substituted for a colour literal that fails to parse.
pub fn fallback() -> Rgb {
    Srgb::new(128, 128, 128)
}

// ---------------------------------------------------------------------------
// Hex conversion
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` / `#rgb` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<Rgb> {
    Rgb::from_str(s.trim()).ok()
}

/// Parse a colour literal, falling back to grey so a typo never blocks
/// rendering.
pub fn hex_or_fallback(s: &str) -> Rgb {
    parse_hex(s).unwrap_or_else(|| {
        log::warn!("Invalid colour literal {s:?}, using grey");
        fallback()
    })
}

/// Lower-case `#rrggbb`.
pub fn to_hex(c: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c = parse_hex("#1f77b4").unwrap();
        assert_eq!((c.red, c.green, c.blue), (0x1f, 0x77, 0xb4));
        assert_eq!(to_hex(c), "#1f77b4");
    }

    #[test]
    fn test_short_and_bare_hex() {
        assert_eq!(to_hex(parse_hex("fff").unwrap()), "#ffffff");
        assert_eq!(to_hex(parse_hex("#282C34").unwrap()), "#282c34");
    }

    #[test]
    fn test_invalid_falls_back() {
        assert!(parse_hex("neon").is_none());
        assert_eq!(hex_or_fallback("neon"), fallback());
    }
}
