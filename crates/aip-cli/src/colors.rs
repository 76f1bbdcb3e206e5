//! `colors encode` / `colors decode`: a window onto the stored color string,
//! useful when repairing rows that fail to decode.

use aip_core::{decode_colors, encode_colors, ColorEntry};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum ColorsCommands {
    /// Encode `<code>:<name>` pairs, e.g. `"#000000:Black"`
    Encode {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Decode a stored color string
    Decode { raw: String },
}

/// Splits `<code>:<name>` on the first `:`.
pub(crate) fn parse_entry(raw: &str) -> anyhow::Result<ColorEntry> {
    let (code, name) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("expected <code>:<name>, got '{raw}'"))?;
    let entry = ColorEntry::new(code.trim(), name.trim());
    if let Some(reason) = entry.storage_violation() {
        anyhow::bail!("cannot store '{raw}': {reason}");
    }
    Ok(entry)
}

/// # Errors
///
/// Returns an error for an entry that cannot be stored or a string that
/// does not decode.
pub(crate) fn run_colors(command: &ColorsCommands) -> anyhow::Result<()> {
    match command {
        ColorsCommands::Encode { entries } => {
            let colors = entries
                .iter()
                .map(|raw| parse_entry(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            println!("{}", encode_colors(&colors));
        }
        ColorsCommands::Decode { raw } => {
            let colors = decode_colors(raw)?;
            if colors.is_empty() {
                println!("(no colors)");
            }
            for color in colors {
                println!("{:<12}{}", color.color_code, color.color_name);
            }
        }
    }
    Ok(())
}
