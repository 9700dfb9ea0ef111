//! Colour tokens, font roles, and the default palette.
//!
//! The style engine only ever speaks in tokens and roles; the surface that
//! renders a [`crate::StyleSheet`] resolves them through a [`Palette`] and a
//! [`FontScale`].

use serde::{Deserialize, Serialize};

/// Named colour slot of the editor palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorToken {
    Foreground,
    Keyword,
    String,
    Function,
    Type,
    Number,
    Comment,
    CodeBlockBackground,
    InlineCodeBackground,
    /// Literal colour produced by the syntax colorizer (`[r, g, b, a]`).
    Rgb([u8; 4]),
}

/// Concrete RGBA values behind each [`ColorToken`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 4],
    pub foreground: [u8; 4],
    pub keyword: [u8; 4],
    pub string: [u8; 4],
    pub function: [u8; 4],
    pub type_name: [u8; 4],
    pub number: [u8; 4],
    pub comment: [u8; 4],
    pub code_block_background: [u8; 4],
    pub inline_code_background: [u8; 4],
}

const fn rgb(hex: u32) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xff]
}

impl Palette {
    /// Monokai-derived default palette.
    pub const fn monokai() -> Self {
        Self {
            background: rgb(0x272822),
            foreground: rgb(0xF8F8F2),
            keyword: rgb(0xF92672),
            string: rgb(0xE6DB74),
            function: rgb(0xA6E22E),
            type_name: rgb(0x66D9EF),
            number: rgb(0xAE81FF),
            comment: rgb(0x75715E),
            code_block_background: rgb(0x1E1F1C),
            inline_code_background: rgb(0x3E3D32),
        }
    }

    /// Resolve a token to RGBA.
    pub fn resolve(&self, token: ColorToken) -> [u8; 4] {
        match token {
            ColorToken::Foreground => self.foreground,
            ColorToken::Keyword => self.keyword,
            ColorToken::String => self.string,
            ColorToken::Function => self.function,
            ColorToken::Type => self.type_name,
            ColorToken::Number => self.number,
            ColorToken::Comment => self.comment,
            ColorToken::CodeBlockBackground => self.code_block_background,
            ColorToken::InlineCodeBackground => self.inline_code_background,
            ColorToken::Rgb(rgba) => rgba,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::monokai()
    }
}

/// Named font variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontRole {
    Base,
    /// Heading level 1..=6.
    Heading(u8),
    Bold,
    Italic,
    BoldItalic,
    Code,
}

/// Concrete font request for a [`FontRole`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
}

/// Maps font roles onto sizes relative to the configured base size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontScale {
    pub base_size: f32,
}

impl FontScale {
    pub fn new(base_size: f32) -> Self {
        Self { base_size }
    }

    /// Point-size offset applied to the base size for a heading level.
    pub fn heading_delta(level: u8) -> f32 {
        match level {
            1 => 10.0,
            2 => 6.0,
            3 => 3.0,
            4 => 1.0,
            5 => 0.0,
            _ => -1.0,
        }
    }

    /// Resolve a role to a concrete font request.
    pub fn spec(&self, role: FontRole) -> FontSpec {
        let base = FontSpec {
            size: self.base_size,
            bold: false,
            italic: false,
            monospace: false,
        };
        match role {
            FontRole::Base => base,
            FontRole::Heading(level) => FontSpec {
                size: self.base_size + Self::heading_delta(level),
                bold: true,
                ..base
            },
            FontRole::Bold => FontSpec { bold: true, ..base },
            FontRole::Italic => FontSpec {
                italic: true,
                ..base
            },
            FontRole::BoldItalic => FontSpec {
                bold: true,
                italic: true,
                ..base
            },
            FontRole::Code => FontSpec {
                size: (self.base_size - 1.0).max(1.0),
                monospace: true,
                ..base
            },
        }
    }
}

impl Default for FontScale {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FONT_SIZE)
    }
}
