//! Gross-amount annotations embedded in free-text notes.
//!
//! Another system appends tags such as `[pagado_bruto=S/ 150.00]` to payment
//! notes. The tag is optional metadata: an absent or malformed tag is simply
//! no value.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Keys that all mean "gross amount paid"
const GROSS_KEYS: &str = "pagado_bruto|pago_bruto|importe|gross|amount_paid";

/// Unsigned decimal, optional `S/` currency marker. No thousands separators,
/// no exponent.
const AMOUNT: &str = r"(?:S/)?\s*([0-9]+(?:\.[0-9]+)?)";

fn gross_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b(?:{GROSS_KEYS})\s*=\s*{AMOUNT}"))
            .expect("gross value pattern is valid")
    })
}

fn gross_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"(?i)([ \t]*)\[(?:{GROSS_KEYS})\s*=\s*{AMOUNT}\s*\]([ \t]*)");
        Regex::new(&pattern).expect("gross tag pattern is valid")
    })
}

/// The amount from the first gross tag in `notes`, if any
pub fn parse_gross_from_notes(notes: Option<&str>) -> Option<f64> {
    let captures = gross_value_regex().captures(notes?)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

/// Spacing left in place of a removed tag and the blanks around it.
///
/// At a line edge the blanks go with the tag; between two words one side's
/// blanks are kept so the words stay apart.
fn tag_replacement(text: &str, caps: &Captures) -> String {
    let (Some(whole), Some(before), Some(after)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return String::new();
    };
    let at_line_start = text[..whole.start()]
        .chars()
        .last()
        .map_or(true, |c| c == '\n');
    let at_line_end = text[whole.end()..]
        .chars()
        .next()
        .map_or(true, |c| c == '\n' || c == '\r');

    if at_line_start || at_line_end {
        String::new()
    } else if !before.as_str().is_empty() {
        before.as_str().to_string()
    } else {
        after.as_str().to_string()
    }
}

/// `notes` with every gross tag removed and the ends trimmed
pub fn clean_notes(notes: Option<&str>) -> String {
    match notes {
        Some(text) => gross_tag_regex()
            .replace_all(text, |caps: &Captures| tag_replacement(text, caps))
            .trim()
            .to_string(),
        None => String::new(),
    }
}
