//! Text sanitization for document-safe output
//!
//! The generative model is instructed to answer in plain ASCII but routinely
//! ignores that, and the PDF writer only carries the core Latin-1 faces. Every
//! string is therefore forced through this module before it is accepted into an
//! itinerary and again right before document emission.

/// Normalize a string to 7-bit ASCII.
///
/// Replaces the rupee glyph with the literal token `Rs.`, maps bullets to `-`,
/// drops the airplane dingbat the model likes to decorate headings with, and
/// removes every remaining character with a code point of 128 or above.
///
/// Total and idempotent: the output is always pure ASCII, so a second pass is a
/// no-op.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{20B9}' => out.push_str("Rs."), // ₹
            '\u{2022}' => out.push('-'),       // •
            '\u{2708}' => {}                   // ✈
            c if (c as u32) < 128 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Sanitize an optional string; absent input yields an empty string.
#[must_use]
pub fn sanitize_opt(text: Option<&str>) -> String {
    text.map(sanitize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain ascii stays", "plain ascii stays")]
    #[case("₹500 per night", "Rs.500 per night")]
    #[case("₹500 for activities •", "Rs.500 for activities -")]
    #[case("fly ✈ to Goa", "fly  to Goa")]
    #[case("café crème", "caf crme")]
    #[case("", "")]
    fn test_sanitize_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_output_is_always_ascii() {
        let inputs = [
            "₹₹₹",
            "日本 3-day trip",
            "emoji 🌍🧳 soup",
            "mixed ₹1,200 • café ✈️",
        ];
        for input in inputs {
            let cleaned = sanitize(input);
            assert!(cleaned.chars().all(|c| (c as u32) < 128), "non-ascii in {cleaned:?}");
            assert!(!cleaned.contains('\u{20B9}'));
        }
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["₹500 • café ✈️", "already clean", "नमस्ते Delhi"];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_none_yields_empty() {
        assert_eq!(sanitize_opt(None), "");
        assert_eq!(sanitize_opt(Some("₹99")), "Rs.99");
    }
}
