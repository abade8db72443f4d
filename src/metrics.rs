//! Metrics and encoding of the standard PDF fonts used by the document.
//!
//! The fonts are the built-in Helvetica faces, which every PDF reader provides, so nothing has to be
//! embedded. Text is written in the `WinAnsiEncoding`, which covers the Latin-1 range and therefore
//! both English and French. Widths are expressed in thousandths of an em, as in the AFM files.

use unicode_normalization::UnicodeNormalization as _;

/// The widths of Helvetica (and Helvetica-Oblique) for the characters from 0x20 to 0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// The widths of Helvetica-Bold for the characters from 0x20 to 0x7E.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// The width used for the characters which have no better estimate.
const FALLBACK_WIDTH: u16 = 556;

/// The character written in place of the ones the encoding cannot represent.
const REPLACEMENT_CHARACTER: u8 = b'?';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 3] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
    ];

    /// The PostScript name of the font, as expected by the `BaseFont` key.
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// The name under which the font is registered in the page resources.
    pub fn resource_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::HelveticaBold => "F2",
            StandardFont::HelveticaOblique => "F3",
        }
    }

    fn ascii_widths(&self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// The advance width of a character in thousandths of an em.
    pub fn glyph_width(&self, character: char) -> u16 {
        if (' '..='~').contains(&character) {
            return self.ascii_widths()[character as usize - 32];
        }

        let bold = *self == StandardFont::HelveticaBold;
        match character {
            '\u{a0}' => self.glyph_width(' '),
            '•' => 350,
            '–' | '€' | '«' | '»' => 556,
            '—' | '…' => 1000,
            '‘' | '’' | '‚' => {
                if bold {
                    278
                } else {
                    222
                }
            }
            '“' | '”' | '„' => {
                if bold {
                    500
                } else {
                    333
                }
            }
            '°' => 400,
            '·' => 278,
            'Œ' => 1000,
            'œ' => 944,
            _ => {
                // Accented letters are as wide as their base letter
                match std::iter::once(character).nfd().next() {
                    Some(base) if base != character && (' '..='~').contains(&base) => {
                        self.glyph_width(base)
                    }
                    _ => FALLBACK_WIDTH,
                }
            }
        }
    }
}

/// Maps a character to its code in the `WinAnsiEncoding`, if it has one.
pub fn win_ansi_code(character: char) -> Option<u8> {
    let code = character as u32;
    match code {
        0x20..=0x7e | 0xa0..=0xff => Some(code as u8),
        _ => match character {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8a),
            '‹' => Some(0x8b),
            'Œ' => Some(0x8c),
            'Ž' => Some(0x8e),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9a),
            '›' => Some(0x9b),
            'œ' => Some(0x9c),
            'ž' => Some(0x9e),
            'Ÿ' => Some(0x9f),
            _ => None,
        },
    }
}

/// Encodes the text in the `WinAnsiEncoding` after normalizing it in the NFC form.
/// A character outside of the encoding is replaced by its base letter when it is an accented one,
/// and by a question mark otherwise.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.nfc()
        .map(|character| {
            win_ansi_code(character)
                .or_else(|| {
                    std::iter::once(character)
                        .nfd()
                        .next()
                        .and_then(win_ansi_code)
                })
                .unwrap_or_else(|| {
                    log::warn!(
                        "Unable to encode the character {:?}, replacing it",
                        character
                    );
                    REPLACEMENT_CHARACTER
                })
        })
        .collect()
}

/// The width of the text in points when written with the given font and size.
pub fn text_width(text: &str, font: StandardFont, font_size: f32) -> f32 {
    let thousandths: u32 = text
        .nfc()
        .map(|character| font.glyph_width(character) as u32)
        .sum();
    thousandths as f32 * font_size / 1000.0
}

/// Breaks the text into lines no wider than `maximum_width`, splitting at whitespace.
/// Words which are wider than a whole line are split between characters.
pub fn wrap_text(
    text: &str,
    font: StandardFont,
    font_size: f32,
    maximum_width: f32,
) -> Vec<String> {
    let fits = |candidate: &str| text_width(candidate, font, font_size) <= maximum_width;
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let candidate = if current_line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current_line, word)
        };
        if fits(&candidate) {
            current_line = candidate;
            continue;
        }

        if !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
        }
        if fits(word) {
            current_line = word.to_string();
            continue;
        }

        for character in word.chars() {
            let mut candidate = current_line.clone();
            candidate.push(character);
            if !current_line.is_empty() && !fits(&candidate) {
                lines.push(std::mem::take(&mut current_line));
                current_line.push(character);
            } else {
                current_line = candidate;
            }
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng as _;

    #[test]
    fn widths_follow_the_font_metrics() {
        // H + e + l + l + o = 722 + 556 + 222 + 222 + 556
        let width = text_width("Hello", StandardFont::Helvetica, 10.0);
        assert!((width - 22.78).abs() < 1e-3, "{}", width);

        let bold_width = text_width("Hello", StandardFont::HelveticaBold, 10.0);
        assert!(bold_width > width);
    }

    #[test]
    fn accented_letters_are_as_wide_as_their_base() {
        for font in StandardFont::ALL {
            assert_eq!(font.glyph_width('é'), font.glyph_width('e'));
            assert_eq!(font.glyph_width('Ç'), font.glyph_width('C'));
        }
    }

    #[test]
    fn french_text_is_encoded_in_win_ansi() {
        assert_eq!(encode_text("Été"), vec![0xc9, b't', 0xe9]);
        assert_eq!(encode_text("a • b’"), vec![b'a', b' ', 0x95, b' ', b'b', 0x92]);
        // A decomposed accent is composed before encoding
        assert_eq!(encode_text("e\u{301}"), vec![0xe9]);
        assert_eq!(encode_text("中"), vec![b'?']);
    }

    #[test]
    fn wrapped_lines_fit_the_width() {
        let text = "Passionate Software Engineering student with hands-on experience in Full Stack Development and IT Support.";
        let lines = wrap_text(text, StandardFont::Helvetica, 7.5, 120.0);

        assert!(lines.len() > 1);
        for line in lines.iter() {
            assert!(text_width(line, StandardFont::Helvetica, 7.5) <= 120.0, "{}", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn overlong_words_are_split() {
        let lines = wrap_text(
            "linkedin.com/in/junior-donfack-assobjio-905bb72b5/",
            StandardFont::Helvetica,
            6.5,
            40.0,
        );

        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "linkedin.com/in/junior-donfack-assobjio-905bb72b5/");
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("   ", StandardFont::HelveticaBold, 9.0, 100.0).is_empty());
    }

    #[test]
    fn random_text_is_wrapped_and_encoded_without_loss_of_characters() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let length = rng.gen_range(1..=120);
            let text = rand_utf8::rand_utf8(&mut rng, length).to_string();
            let maximum_width = rng.gen_range(10.0..300.0);

            let encoded = encode_text(&text);
            assert_eq!(encoded.len(), text.nfc().count());

            for line in wrap_text(&text, StandardFont::Helvetica, 8.0, maximum_width) {
                let width = text_width(&line, StandardFont::Helvetica, 8.0);
                assert!(
                    width <= maximum_width || line.chars().count() == 1,
                    "{:?} is {} wide",
                    line,
                    width
                );
            }
        }
    }
}
