//! Masking for values that must not appear verbatim in logs
//!
//! Purchase references, provider tokens and the signing secret are shown
//! with a short visible prefix only.

use std::fmt;

/// Number of leading characters left visible
const VISIBLE_CHARS: usize = 4;

/// Masked display of a sensitive value
///
/// ```
/// use estimate_gate::logging::Masked;
///
/// assert_eq!(Masked::new("sale-1234567").to_string(), "sale***");
/// assert_eq!(Masked::new("abc").to_string(), "***");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Masked<'a> {
    inner: &'a str,
}

impl<'a> Masked<'a> {
    pub fn new(value: &'a str) -> Self {
        Self { inner: value }
    }
}

impl fmt::Display for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Too short to reveal anything
        if self.inner.chars().count() <= VISIBLE_CHARS * 2 {
            return f.write_str("***");
        }

        let prefix: String = self.inner.chars().take(VISIBLE_CHARS).collect();
        write!(f, "{}***", prefix)
    }
}

/// Masked rendering of an optional secret for display
pub fn mask_option(value: Option<&str>) -> String {
    match value {
        Some(v) => Masked::new(v).to_string(),
        None => "(not set)".to_string(),
    }
}
