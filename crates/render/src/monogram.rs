//! Placeholder block shown when a game icon fails to load.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::theme::{Rgb, contrast_text};

/// Background colours for monogram blocks.
const PALETTE: [Rgb; 8] = [
    Rgb::new(0xe7, 0x4c, 0x3c),
    Rgb::new(0x8e, 0x44, 0xad),
    Rgb::new(0x34, 0x98, 0xdb),
    Rgb::new(0x16, 0xa0, 0x85),
    Rgb::new(0xf3, 0x9c, 0x12),
    Rgb::new(0xd3, 0x54, 0x00),
    Rgb::new(0x2c, 0x3e, 0x50),
    Rgb::new(0x27, 0xae, 0x60),
];

/// Initials on a coloured block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Monogram {
    pub initials: String,
    /// `#rrggbb`
    pub background: String,
    /// `#rrggbb`, black or white.
    pub foreground: String,
}

/// Builds the monogram for a game name.
///
/// Initials are the first letter or digit of up to two words. The colour is
/// stable for a given name.
pub fn monogram(name: &str) -> Monogram {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    let digest = Sha256::digest(name.trim().as_bytes());
    let background = PALETTE[usize::from(digest[0]) % PALETTE.len()];

    Monogram {
        initials: if initials.is_empty() {
            "?".into()
        } else {
            initials
        },
        background: background.to_string(),
        foreground: contrast_text(background).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_from_two_words() {
        assert_eq!(monogram("space invaders deluxe").initials, "SI");
        assert_eq!(monogram("Tetris").initials, "T");
        assert_eq!(monogram("  (mega) 2048 ").initials, "M2");
    }

    #[test]
    fn empty_name_gets_question_mark() {
        assert_eq!(monogram("").initials, "?");
        assert_eq!(monogram("!!! ???").initials, "?");
    }

    #[test]
    fn colour_is_stable_and_from_palette() {
        let a = monogram("Bubble Pop");
        let b = monogram("Bubble Pop");
        assert_eq!(a, b);
        assert!(PALETTE.iter().any(|c| c.to_string() == a.background));
        assert!(a.foreground == "#000000" || a.foreground == "#ffffff");
    }
}
