//! Minimal inline markup for styled text runs.
//!
//! `**bold**`, `__italic__` and `--underline--` toggle their style; markers
//! nest and combine. The output fragments feed the same line breaker as
//! plain text, so width accounting runs continuously across style changes.

use crate::text::{FontFamily, Fragment};

const BOLD_MARKER: (char, char) = ('*', '*');
const ITALIC_MARKER: (char, char) = ('_', '_');
const UNDERLINE_MARKER: (char, char) = ('-', '-');

/// Splits marked-up text into styled fragments of the given family and size.
pub fn parse_markdown(text: &str, family: FontFamily, size: f64) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut bold = false;
    let mut italic = false;
    let mut underline = false;

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let pair = (chars[i], chars.get(i + 1).copied().unwrap_or('\0'));

        let toggled = if pair == BOLD_MARKER {
            bold = !bold;
            true
        } else if pair == ITALIC_MARKER {
            italic = !italic;
            true
        } else if pair == UNDERLINE_MARKER {
            underline = !underline;
            true
        } else {
            false
        };

        if toggled {
            i += 2;
            continue;
        }

        let font = family.styled(bold, italic);
        match fragments.last_mut() {
            Some(last) if last.font == font && last.underline == underline => {
                last.text.push(chars[i]);
            }
            _ => {
                fragments.push(Fragment::new(font, size, chars[i].to_string()).with_underline(underline));
            }
        }
        i += 1;
    }

    fragments
}
