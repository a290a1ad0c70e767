//! Inline `style` attribute declarations.
//!
//! [`InlineStyle`] plays the part of a DOM `CSSStyleDeclaration`: parse the
//! attribute, `set_property` with an optional `!important` priority, and
//! write it back. Unknown properties and values are kept verbatim so the
//! author's own styles survive a normalization pass.

use std::fmt::Write;

use cssparser::{
    AtRuleParser, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};

/// One `name: value [!important]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDeclaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// Ordered declaration block of a `style` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<StyleDeclaration>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value. Malformed declarations are dropped,
    /// as a browser would.
    pub fn parse(css: &str) -> Self {
        let mut declarations = Vec::new();
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut decl_parser = InlineDeclarationParser {
            declarations: &mut declarations,
        };

        let iter = RuleBodyParser::new(&mut parser, &mut decl_parser);
        for result in iter {
            // Invalid declarations are skipped
            let _ = result;
        }

        let mut style = Self::new();
        for decl in declarations {
            style.set_property(&decl.name, &decl.value, decl.important);
        }
        style
    }

    pub fn declarations(&self) -> &[StyleDeclaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Value of a property, without the priority.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).map(|d| d.value.as_str())
    }

    pub fn is_important(&self, name: &str) -> bool {
        self.find(name).is_some_and(|d| d.important)
    }

    /// Set a property, keeping its position when it already exists.
    pub fn set_property(&mut self, name: &str, value: &str, important: bool) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        match self.declarations.iter_mut().find(|d| d.name == name) {
            Some(existing) => {
                existing.value = value;
                existing.important = important;
            }
            None => self.declarations.push(StyleDeclaration {
                name,
                value,
                important,
            }),
        }
    }

    /// Force a property with `!important`.
    pub fn set_important(&mut self, name: &str, value: &str) {
        self.set_property(name, value, true);
    }

    pub fn remove_property(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let index = self.declarations.iter().position(|d| d.name == name)?;
        Some(self.declarations.remove(index).value)
    }

    /// Serialize as `name: value !important; ...`.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for decl in &self.declarations {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}: {}", decl.name, decl.value);
            if decl.important {
                out.push_str(" !important");
            }
            out.push(';');
        }
        out
    }

    fn find(&self, name: &str) -> Option<&StyleDeclaration> {
        self.declarations
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

struct InlineDeclarationParser<'a> {
    declarations: &'a mut Vec<StyleDeclaration>,
}

impl<'i> DeclarationParser<'i> for InlineDeclarationParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        loop {
            let before = input.state();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::Delim('!') => {
                    input.reset(&before);
                    break;
                }
                Token::Function(_)
                | Token::ParenthesisBlock
                | Token::SquareBracketBlock
                | Token::CurlyBracketBlock => {
                    // Consume the block now so the slice below ends after it.
                    let _ = input.parse_nested_block(|block| {
                        while block.next_including_whitespace_and_comments().is_ok() {}
                        Ok::<_, ParseError<'i, ()>>(())
                    });
                }
                _ => {}
            }
        }

        let value = input.slice_from(start).trim().to_string();
        let important = input.try_parse(cssparser::parse_important).is_ok();

        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        self.declarations.push(StyleDeclaration {
            name: name.to_ascii_lowercase(),
            value,
            important,
        });
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for InlineDeclarationParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for InlineDeclarationParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for InlineDeclarationParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}
