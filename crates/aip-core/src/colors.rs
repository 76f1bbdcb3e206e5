//! Codec for the `products.colors` text column.
//!
//! The store keeps a product's color list in a single scalar string. Each
//! entry renders as
//!
//! ```text
//! {color_data{color_code:#fff,color_name:White}}
//! ```
//!
//! and entries are joined with a bare `,`. There is no escaping, so values
//! containing `,`, `:`, `{` or `}` cannot be stored safely; the write path
//! rejects them through [`ColorEntry::storage_violation`].
//!
//! Nothing outside this module should read or build the raw string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENTRY_PREFIX: &str = "{color_data{";
const ENTRY_SUFFIX: &str = "}}";
const ENTRY_SEPARATOR: &str = "},{color_data{";
const FORBIDDEN_CHARS: [char; 4] = [',', ':', '{', '}'];

/// One swatch in a product's color list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Hex color, e.g. `"#1a1a1a"`.
    pub color_code: String,
    /// Display name, e.g. `"Charcoal"`.
    pub color_name: String,
}

impl ColorEntry {
    #[must_use]
    pub fn new(color_code: impl Into<String>, color_name: impl Into<String>) -> Self {
        Self {
            color_code: color_code.into(),
            color_name: color_name.into(),
        }
    }

    /// Returns a reason when this entry cannot be encoded without corrupting
    /// the stored string, or `None` when it is safe to persist.
    #[must_use]
    pub fn storage_violation(&self) -> Option<String> {
        if self.color_name.trim().is_empty() {
            return Some("color_name must not be blank".to_string());
        }
        if !is_hex_color(&self.color_code) {
            return Some(format!(
                "color_code must be '#' followed by 3 or 6 hex digits, got '{}'",
                self.color_code
            ));
        }
        if let Some(c) = self.color_name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Some(format!(
                "color_name '{}' contains reserved character '{c}'",
                self.color_name
            ));
        }
        None
    }
}

/// A stored color string that does not follow the entry template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed color entry #{index} ({fragment:?}): {reason}")]
pub struct ColorDecodeError {
    /// Zero-based position of the fragment after splitting on the separator.
    pub index: usize,
    pub fragment: String,
    pub reason: &'static str,
}

impl ColorDecodeError {
    fn new(index: usize, fragment: &str, reason: &'static str) -> Self {
        Self {
            index,
            fragment: fragment.to_string(),
            reason,
        }
    }
}

/// Renders a color list in the stored string format.
///
/// An empty list encodes to the empty string.
#[must_use]
pub fn encode_colors(colors: &[ColorEntry]) -> String {
    colors
        .iter()
        .map(|c| {
            format!(
                "{ENTRY_PREFIX}color_code:{},color_name:{}{ENTRY_SUFFIX}",
                c.color_code, c.color_name
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a stored color string back into entries.
///
/// Empty input yields an empty list. The string is split on
/// `},{color_data{`; the first fragment must carry the `{color_data{`
/// prefix, the last fragment the `}}` suffix, and every earlier fragment the
/// single `}` left behind by the split. Each remaining body must be
/// `<key>:<code>,<key>:<name>`; the value is everything after the first `:`.
///
/// # Errors
///
/// Returns [`ColorDecodeError`] naming the first fragment that does not fit
/// the template.
pub fn decode_colors(raw: &str) -> Result<Vec<ColorEntry>, ColorDecodeError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let fragments: Vec<&str> = raw.split(ENTRY_SEPARATOR).collect();
    let last = fragments.len() - 1;

    fragments
        .iter()
        .enumerate()
        .map(|(index, &fragment)| {
            let mut body = fragment;
            if index == 0 {
                body = body.strip_prefix(ENTRY_PREFIX).ok_or_else(|| {
                    ColorDecodeError::new(index, fragment, "missing `{color_data{` prefix")
                })?;
            }
            body = if index == last {
                body.strip_suffix(ENTRY_SUFFIX).ok_or_else(|| {
                    ColorDecodeError::new(index, fragment, "missing `}}` terminator")
                })?
            } else {
                body.strip_suffix('}').ok_or_else(|| {
                    ColorDecodeError::new(index, fragment, "missing `}` before separator")
                })?
            };
            parse_body(index, fragment, body)
        })
        .collect()
}

fn parse_body(index: usize, fragment: &str, body: &str) -> Result<ColorEntry, ColorDecodeError> {
    let parts: Vec<&str> = body.split(',').collect();
    let [code_part, name_part] = parts.as_slice() else {
        return Err(ColorDecodeError::new(
            index,
            fragment,
            "expected exactly two comma-separated fields",
        ));
    };

    let value = |part: &str| -> Result<String, ColorDecodeError> {
        part.split_once(':')
            .map(|(_, v)| v.to_string())
            .ok_or_else(|| ColorDecodeError::new(index, fragment, "field has no `:`"))
    };

    Ok(ColorEntry {
        color_code: value(*code_part)?,
        color_name: value(*name_part)?,
    })
}

fn is_hex_color(code: &str) -> bool {
    code.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_black() -> Vec<ColorEntry> {
        vec![
            ColorEntry::new("#fff", "White"),
            ColorEntry::new("#000", "Black"),
        ]
    }

    const WHITE_BLACK: &str = "{color_data{color_code:#fff,color_name:White}},\
                               {color_data{color_code:#000,color_name:Black}}";

    #[test]
    fn empty_list_encodes_to_empty_string() {
        assert_eq!(encode_colors(&[]), "");
    }

    #[test]
    fn empty_string_decodes_to_empty_list() {
        assert_eq!(decode_colors("").unwrap(), Vec::<ColorEntry>::new());
    }

    #[test]
    fn encodes_two_entries_in_stored_format() {
        assert_eq!(encode_colors(&white_black()), WHITE_BLACK);
    }

    #[test]
    fn decodes_two_entries_from_stored_format() {
        assert_eq!(decode_colors(WHITE_BLACK).unwrap(), white_black());
    }

    #[test]
    fn single_entry_strips_prefix_and_terminator() {
        let decoded =
            decode_colors("{color_data{color_code:#1a1a1a,color_name:Charcoal}}").unwrap();
        assert_eq!(decoded, vec![ColorEntry::new("#1a1a1a", "Charcoal")]);
    }

    #[test]
    fn round_trips_lists_of_various_lengths() {
        let palette = [
            ("#ff0000", "Red"),
            ("#00ff00", "Lime Green"),
            ("#0000ff", "Navy Blue"),
            ("#abc", "Dusty Sky"),
            ("#123456", "Deep Ocean"),
        ];
        for len in 0..=palette.len() {
            let list: Vec<ColorEntry> = palette[..len]
                .iter()
                .map(|(code, name)| ColorEntry::new(*code, *name))
                .collect();
            assert_eq!(
                decode_colors(&encode_colors(&list)).unwrap(),
                list,
                "round trip failed for {len} entries"
            );
        }
    }

    #[test]
    fn value_keeps_text_after_first_colon() {
        let decoded = decode_colors("{color_data{color_code:#fff,color_name:a:b}}").unwrap();
        assert_eq!(decoded[0].color_name, "a:b");
    }

    #[test]
    fn comma_in_name_is_reported_not_misparsed() {
        let raw = encode_colors(&[ColorEntry::new("#fff", "Black, White")]);
        let err = decode_colors(&raw).unwrap_err();
        assert_eq!(err.index, 0);
        assert!(err.to_string().contains("two comma-separated fields"));
    }

    #[test]
    fn missing_prefix_names_first_fragment() {
        let err = decode_colors("color_code:#fff,color_name:White}}").unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.fragment, "color_code:#fff,color_name:White}}");
    }

    #[test]
    fn missing_terminator_names_last_fragment() {
        let raw = "{color_data{color_code:#fff,color_name:White}},\
                   {color_data{color_code:#000,color_name:Black";
        let err = decode_colors(raw).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.reason, "missing `}}` terminator");
    }

    #[test]
    fn field_without_colon_is_rejected() {
        let err = decode_colors("{color_data{#fff,color_name:White}}").unwrap_err();
        assert_eq!(err.reason, "field has no `:`");
    }

    #[test]
    fn plain_text_is_rejected() {
        assert!(decode_colors("black, white").is_err());
    }

    #[test]
    fn storage_violation_accepts_clean_entries() {
        assert_eq!(ColorEntry::new("#000000", "Black").storage_violation(), None);
        assert_eq!(ColorEntry::new("#FfF", "Off White").storage_violation(), None);
    }

    #[test]
    fn storage_violation_rejects_reserved_characters() {
        for name in ["Black, White", "Red:Blue", "Curly{", "Brace}"] {
            assert!(
                ColorEntry::new("#000", name).storage_violation().is_some(),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn storage_violation_rejects_bad_codes_and_blank_names() {
        assert!(ColorEntry::new("000000", "Black").storage_violation().is_some());
        assert!(ColorEntry::new("#00000", "Black").storage_violation().is_some());
        assert!(ColorEntry::new("#gggggg", "Black").storage_violation().is_some());
        assert!(ColorEntry::new("#000", "   ").storage_violation().is_some());
    }
}
