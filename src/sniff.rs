//! Separator detection for TextExporter header lines.

use log::debug;

/// TextExporter writes space-separated files unless told otherwise.
pub const DEFAULT_SEPARATOR: &str = " ";

const CANDIDATES: [&str; 3] = ["\t", ";", ","];

/// Picks the separator a header line was written with.
///
/// The default wins when the line starts `#<TAG><default>rt`. Otherwise the
/// candidates are tried in fixed order against `#<TAG><sep>rt` and the
/// peptide-style `#rt<sep>` prefix. When nothing matches the default stays
/// in effect; downstream width checks surface the mismatch.
pub fn sniff_separator(header_line: &str, tag: &str, default: &'static str) -> &'static str {
    if header_line.starts_with(&format!("#{tag}{default}rt")) {
        return default;
    }
    for candidate in CANDIDATES {
        if header_line.starts_with(&format!("#{tag}{candidate}rt"))
            || header_line.starts_with(&format!("#rt{candidate}"))
        {
            debug!("New separator chosen: {candidate:?}");
            return candidate;
        }
    }
    debug!("No separator matched the header line; keeping {default:?}");
    default
}
