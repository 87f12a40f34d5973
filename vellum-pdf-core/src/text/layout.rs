//! Greedy line breaking over styled text fragments.
//!
//! Characters accumulate until the next one would exceed the maximum width,
//! then the line breaks at the last space or soft hyphen seen. A soft hyphen
//! (U+00AD) is invisible unless it becomes a break point, where it
//! materializes as a real hyphen. A single token wider than the line is
//! force-broken at the width boundary.
//!
//! Width accounting is continuous across fragment boundaries, so style
//! changes inside a word never reset it.

use crate::error::{PdfError, Result};
use crate::text::{measure_char, Font};

pub const SOFT_HYPHEN: char = '\u{00AD}';
const HYPHEN: char = '-';
const SPACE: char = ' ';
const NEWLINE: char = '\n';

/// A run of characters sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub font: Font,
    pub size: f64,
    pub underline: bool,
    pub text: String,
}

impl Fragment {
    pub fn new(font: Font, size: f64, text: impl Into<String>) -> Self {
        Self {
            font,
            size,
            underline: false,
            text: text.into(),
        }
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    fn same_style(&self, font: Font, size: f64, underline: bool) -> bool {
        self.font == font && self.size == size && self.underline == underline
    }
}

/// One laid-out line produced by [`MultiLineBreak`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub fragments: Vec<Fragment>,
    pub width: f64,
    pub spaces: usize,
    pub trailing_newline: bool,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Rollback point recorded at the last space.
#[derive(Debug, Clone, Copy)]
struct SpaceHint {
    fragment_index: usize,
    char_index: usize,
    line_fragments: usize,
    line_chars: usize,
    width: f64,
    spaces: usize,
}

/// Rollback point recorded at the last soft hyphen, plus the style the
/// materialized hyphen must take.
#[derive(Debug, Clone)]
struct HyphenHint {
    fragment_index: usize,
    char_index: usize,
    line_fragments: usize,
    line_chars: usize,
    width: f64,
    spaces: usize,
    font: Font,
    size: f64,
    underline: bool,
    hyphen_width: f64,
}

#[derive(Debug, Default)]
struct CurrentLine {
    fragments: Vec<Fragment>,
    width: f64,
    spaces: usize,
    space_hint: Option<SpaceHint>,
    hyphen_hint: Option<HyphenHint>,
}

impl CurrentLine {
    fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    fn add_character(
        &mut self,
        character: char,
        character_width: f64,
        font: Font,
        size: f64,
        underline: bool,
        fragment_index: usize,
        char_index: usize,
    ) {
        debug_assert_ne!(character, NEWLINE);

        let needs_new_fragment = match self.fragments.last() {
            Some(last) => !last.same_style(font, size, underline),
            None => true,
        };
        if needs_new_fragment {
            self.fragments
                .push(Fragment::new(font, size, "").with_underline(underline));
        }

        if character == SPACE {
            self.space_hint = Some(SpaceHint {
                fragment_index,
                char_index,
                line_fragments: self.fragments.len(),
                line_chars: self.fragments.last().map_or(0, |f| f.text.chars().count()),
                width: self.width,
                spaces: self.spaces,
            });
            self.spaces += 1;
        } else if character == SOFT_HYPHEN {
            self.hyphen_hint = Some(HyphenHint {
                fragment_index,
                char_index,
                line_fragments: self.fragments.len(),
                line_chars: self.fragments.last().map_or(0, |f| f.text.chars().count()),
                width: self.width,
                spaces: self.spaces,
                font,
                size,
                underline,
                hyphen_width: character_width,
            });
            // invisible unless it becomes the break point
            return;
        }

        self.width += character_width;
        self.fragments
            .last_mut()
            .expect("fragment exists")
            .text
            .push(character);
    }

    fn rollback(&mut self, line_fragments: usize, line_chars: usize, width: f64, spaces: usize) {
        self.fragments.truncate(line_fragments);
        if let Some(last) = self.fragments.last_mut() {
            let keep: String = last.text.chars().take(line_chars).collect();
            last.text = keep;
        }
        self.width = width;
        self.spaces = spaces;
    }

    fn manual_break(self, trailing_newline: bool) -> TextLine {
        TextLine {
            fragments: self
                .fragments
                .into_iter()
                .filter(|f| !f.text.is_empty())
                .collect(),
            width: self.width,
            spaces: self.spaces,
            trailing_newline,
        }
    }

    fn automatic_break_possible(&self) -> bool {
        self.space_hint.is_some() || self.hyphen_hint.is_some()
    }

    /// Breaks at the later of the two hints and returns the input position
    /// of the consumed break character plus the finished line.
    fn automatic_break(mut self) -> (usize, usize, TextLine) {
        debug_assert!(self.automatic_break_possible());

        let prefer_hyphen = match (&self.hyphen_hint, &self.space_hint) {
            (Some(hyphen), Some(space)) => hyphen.width > space.width,
            (Some(_), None) => true,
            _ => false,
        };

        if prefer_hyphen {
            let hint = self.hyphen_hint.clone().expect("hyphen hint exists");
            self.rollback(hint.line_fragments, hint.line_chars, hint.width, hint.spaces);
            self.add_character(
                HYPHEN,
                hint.hyphen_width,
                hint.font,
                hint.size,
                hint.underline,
                hint.fragment_index,
                hint.char_index,
            );
            (hint.fragment_index, hint.char_index, self.manual_break(false))
        } else {
            let hint = self.space_hint.expect("space hint exists");
            self.rollback(hint.line_fragments, hint.line_chars, hint.width, hint.spaces);
            (hint.fragment_index, hint.char_index, self.manual_break(false))
        }
    }
}

/// Splits styled fragments into lines of a given maximum width.
///
/// The breaker is an iterator-like cursor over the input; call
/// [`next_line`](MultiLineBreak::next_line) until it returns `None`.
pub struct MultiLineBreak<'a> {
    fragments: &'a [Fragment],
    chars: Vec<Vec<char>>,
    fragment_index: usize,
    char_index: usize,
    last_forced_break: Option<(usize, usize)>,
}

impl<'a> MultiLineBreak<'a> {
    pub fn new(fragments: &'a [Fragment]) -> Self {
        Self {
            fragments,
            chars: fragments.iter().map(|f| f.text.chars().collect()).collect(),
            fragment_index: 0,
            char_index: 0,
            last_forced_break: None,
        }
    }

    fn character_width(&self, character: char, fragment: &Fragment) -> f64 {
        // a soft hyphen is measured as the hyphen it may become
        let ch = if character == SOFT_HYPHEN {
            HYPHEN
        } else {
            character
        };
        measure_char(ch, fragment.font, fragment.size)
    }

    /// Produces the next line not exceeding `maximum_width`, or `None` when
    /// the input is exhausted.
    pub fn next_line(&mut self, maximum_width: f64) -> Result<Option<TextLine>> {
        let last_forced_break = self.last_forced_break.take();

        if self.fragment_index == self.fragments.len() {
            return Ok(None);
        }

        let mut current_line = CurrentLine::new();
        while self.fragment_index < self.fragments.len() {
            if self.char_index >= self.chars[self.fragment_index].len() {
                self.char_index = 0;
                self.fragment_index += 1;
                continue;
            }

            let fragment = &self.fragments[self.fragment_index];
            let character = self.chars[self.fragment_index][self.char_index];
            let character_width = self.character_width(character, fragment);

            if character == NEWLINE {
                self.char_index += 1;
                return Ok(Some(current_line.manual_break(true)));
            }

            if current_line.width + character_width > maximum_width {
                if character == SPACE {
                    self.char_index += 1;
                    return Ok(Some(current_line.manual_break(false)));
                }
                if current_line.automatic_break_possible() {
                    let (fragment_index, char_index, line) = current_line.automatic_break();
                    self.fragment_index = fragment_index;
                    self.char_index = char_index + 1;
                    return Ok(Some(line));
                }
                if last_forced_break == Some((self.fragment_index, self.char_index)) {
                    return Err(PdfError::TextLayout(
                        "not enough horizontal space to render a single character".to_string(),
                    ));
                }
                // oversized token: force-break at the width boundary
                self.last_forced_break = Some((self.fragment_index, self.char_index));
                return Ok(Some(current_line.manual_break(false)));
            }

            current_line.add_character(
                character,
                character_width,
                fragment.font,
                fragment.size,
                fragment.underline,
                self.fragment_index,
                self.char_index,
            );
            self.char_index += 1;
        }

        if current_line.width > 0.0 || !current_line.fragments.is_empty() {
            return Ok(Some(current_line.manual_break(false)));
        }
        Ok(None)
    }

    /// Collects every line at a fixed width.
    pub fn lines(mut self, maximum_width: f64) -> Result<Vec<TextLine>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line(maximum_width)? {
            lines.push(line);
        }
        Ok(lines)
    }
}
