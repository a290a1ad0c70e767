//! CSS length values as they appear in email markup.

use cssparser::{Parser, ParserInput, Token};

/// Default browser font size, the base for `em`/`rem` and keywords.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// A parsed CSS length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Em(f32),
    Rem(f32),
    Percent(f32),
    Auto,
}

impl Length {
    /// Parse a length from a CSS value or an HTML dimension attribute.
    ///
    /// Bare numbers are pixels, as in `width="600"`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut input = ParserInput::new(value.trim());
        let mut parser = Parser::new(&mut input);
        let length = parse_length(&mut parser)?;
        parser.is_exhausted().then_some(length)
    }

    /// Parse a `font-size` value, keywords included.
    pub fn parse_font_size(value: &str) -> Option<Self> {
        let keyword = match value.trim().to_ascii_lowercase().as_str() {
            "xx-small" => Some(Length::Px(9.0)),
            "x-small" => Some(Length::Px(10.0)),
            "small" => Some(Length::Px(13.0)),
            "medium" => Some(Length::Px(16.0)),
            "large" => Some(Length::Px(18.0)),
            "x-large" => Some(Length::Px(24.0)),
            "xx-large" => Some(Length::Px(32.0)),
            "smaller" => Some(Length::Em(0.833)),
            "larger" => Some(Length::Em(1.2)),
            _ => None,
        };
        keyword.or_else(|| Self::parse(value))
    }

    /// Resolve to pixels. Percentages resolve against `percent_base`.
    pub fn to_px(self, font_base: f32, percent_base: Option<f32>) -> Option<f32> {
        match self {
            Length::Px(v) => Some(v),
            Length::Em(v) => Some(v * font_base),
            Length::Rem(v) => Some(v * DEFAULT_FONT_SIZE_PX),
            Length::Percent(p) => percent_base.map(|base| base * p / 100.0),
            Length::Auto => None,
        }
    }

    /// Absolute pixel value, if the length has one without context.
    pub fn as_px(self) -> Option<f32> {
        match self {
            Length::Px(v) => Some(v),
            Length::Rem(v) => Some(v * DEFAULT_FONT_SIZE_PX),
            _ => None,
        }
    }
}

fn parse_length(input: &mut Parser<'_, '_>) -> Option<Length> {
    match input.next().ok()? {
        Token::Dimension { value, unit, .. } => {
            let length = match unit.to_ascii_lowercase().as_str() {
                "px" => Length::Px(*value),
                "em" => Length::Em(*value),
                "rem" => Length::Rem(*value),
                // pt = 96/72 px
                "pt" => Length::Px(*value * 96.0 / 72.0),
                _ => return None,
            };
            Some(length)
        }
        Token::Percentage { unit_value, .. } => Some(Length::Percent(*unit_value * 100.0)),
        Token::Number { value, .. } => Some(Length::Px(*value)),
        Token::Ident(ident) if ident.eq_ignore_ascii_case("auto") => Some(Length::Auto),
        _ => None,
    }
}

/// Format a pixel count the way it is written back into styles.
pub fn format_px(px: f32) -> String {
    if px.fract() == 0.0 {
        format!("{}px", px as i64)
    } else {
        format!("{}px", (px * 100.0).round() / 100.0)
    }
}
