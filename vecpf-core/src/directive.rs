// Directive text lexer
//
// Host-side helper: turns `%-+12.5vlu` into a `Directive`, which maps onto a
// `FormatRequest` once the modifier handles are known. The engine itself only
// ever sees structured requests.

use crate::modifier::{ModifierKind, ModifierRegistry};
use crate::request::{Flags, FormatRequest};
use crate::rules::ConversionRule;
use logos::Logos;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum DirectiveToken {
    #[token("%")]
    Percent,

    // Flags
    #[token("#")]
    Alt,
    #[token(" ")]
    Space,
    #[token("-")]
    Left,
    #[token("+")]
    ShowSign,
    #[token("'")]
    Group,
    #[token("0")]
    Zero,

    #[regex("[1-9][0-9]*", |lex| lex.slice().parse::<usize>().ok())]
    Number(usize),
    #[token(".")]
    Dot,

    // Vector size modifiers; longest match picks `vl` over `v`
    #[token("vl", |_| ModifierKind::Vl)]
    #[token("lv", |_| ModifierKind::Lv)]
    #[token("vh", |_| ModifierKind::Vh)]
    #[token("hv", |_| ModifierKind::Hv)]
    #[token("v", |_| ModifierKind::V)]
    #[token("vv", |_| ModifierKind::Vv)]
    #[token("vz", |_| ModifierKind::Vz)]
    #[token("zv", |_| ModifierKind::Zv)]
    Modifier(ModifierKind),

    #[regex("[diouxXcfFeEgGaA]", |lex| lex.slice().chars().next())]
    Conversion(char),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("directive must start with '%'")]
    MissingPercent,

    #[error("unrecognized input at {span:?}")]
    Unrecognized { span: Range<usize> },

    #[error("unexpected {found} at {span:?}, expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
        span: Range<usize>,
    },

    #[error("directive ended early, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("trailing input after conversion at {offset}")]
    Trailing { offset: usize },
}

/// A parsed vector directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub flags: Flags,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub modifier: ModifierKind,
    pub conversion: char,
}

struct Cursor<'s> {
    lexer: logos::Lexer<'s, DirectiveToken>,
    peeked: Option<(DirectiveToken, Range<usize>)>,
}

impl<'s> Cursor<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            lexer: DirectiveToken::lexer(source),
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<DirectiveToken>, DirectiveError> {
        if self.peeked.is_none() {
            match self.lexer.next() {
                Some(Ok(token)) => self.peeked = Some((token, self.lexer.span())),
                Some(Err(())) => {
                    return Err(DirectiveError::Unrecognized {
                        span: self.lexer.span(),
                    })
                }
                None => return Ok(None),
            }
        }
        Ok(self.peeked.as_ref().map(|(token, _)| *token))
    }

    fn bump(&mut self) -> Option<(DirectiveToken, Range<usize>)> {
        self.peeked.take()
    }

    fn expect(&mut self, expected: &'static str) -> Result<(DirectiveToken, Range<usize>), DirectiveError> {
        self.peek()?;
        self.bump()
            .ok_or(DirectiveError::UnexpectedEnd { expected })
    }
}

impl Directive {
    /// Parse one complete directive, e.g. `%#012vhx`
    pub fn parse(source: &str) -> Result<Self, DirectiveError> {
        let (directive, consumed) = Self::parse_prefix(source)?;
        if consumed != source.len() {
            return Err(DirectiveError::Trailing { offset: consumed });
        }
        Ok(directive)
    }

    /// Parse a directive at the start of `source` and return it with the
    /// number of bytes it spans. Text after the conversion is not examined.
    pub fn parse_prefix(source: &str) -> Result<(Self, usize), DirectiveError> {
        let mut cursor = Cursor::new(source);

        match cursor.peek() {
            Ok(Some(DirectiveToken::Percent)) => {
                cursor.bump();
            }
            _ => return Err(DirectiveError::MissingPercent),
        }

        let mut flags = Flags::none();
        while let Some(token) = cursor.peek()? {
            match token {
                DirectiveToken::Alt => flags.alt = true,
                DirectiveToken::Space => flags.space = true,
                DirectiveToken::Left => flags.left = true,
                DirectiveToken::ShowSign => flags.showsign = true,
                DirectiveToken::Group => flags.group = true,
                DirectiveToken::Zero => flags.zero_pad = true,
                _ => break,
            }
            cursor.bump();
        }

        let mut width = None;
        if let Some(DirectiveToken::Number(n)) = cursor.peek()? {
            width = Some(n);
            cursor.bump();
        }

        let mut precision = None;
        if let Some(DirectiveToken::Dot) = cursor.peek()? {
            cursor.bump();
            // `.`, `.0` and `.05` are all valid; leading zeros lex separately
            let mut value = 0;
            while let Some(DirectiveToken::Zero) = cursor.peek()? {
                cursor.bump();
            }
            if let Some(DirectiveToken::Number(n)) = cursor.peek()? {
                value = n;
                cursor.bump();
            }
            precision = Some(value);
        }

        let modifier = match cursor.expect("a vector size modifier")? {
            (DirectiveToken::Modifier(kind), _) => kind,
            (token, span) => {
                return Err(DirectiveError::Unexpected {
                    found: format!("{:?}", token),
                    expected: "a vector size modifier",
                    span,
                })
            }
        };

        let (conversion, end) = match cursor.expect("a conversion character")? {
            (DirectiveToken::Conversion(c), span) => (c, span.end),
            (token, span) => {
                return Err(DirectiveError::Unexpected {
                    found: format!("{:?}", token),
                    expected: "a conversion character",
                    span,
                })
            }
        };

        Ok((
            Self {
                flags,
                width,
                precision,
                modifier,
                conversion,
            },
            end,
        ))
    }

    /// Host request for this directive, or `None` if its modifier is not
    /// registered.
    pub fn to_request(&self, registry: &ModifierRegistry) -> Option<FormatRequest> {
        let bits = registry.bits(self.modifier)?;
        Some(FormatRequest {
            conversion: self.conversion,
            modifier_bits: bits,
            flags: self.flags,
            width: self.width,
            precision: self.precision,
        })
    }

    /// The plain scalar directive that formats one element of `rule` the same
    /// way, with width and precision written out (e.g. `%-12.5hhd`).
    pub fn scalar_text(&self, rule: &ConversionRule) -> String {
        let mut text = format!("%{}", self.flags);
        if let Some(width) = self.width {
            text.push_str(&width.to_string());
        }
        if let Some(precision) = self.precision {
            text.push('.');
            text.push_str(&precision.to_string());
        }
        text.push_str(rule.suffix);
        text
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.flags)?;
        if let Some(width) = self.width {
            write!(f, "{}", width)?;
        }
        if let Some(precision) = self.precision {
            write!(f, ".{}", precision)?;
        }
        write!(f, "{}{}", self.modifier, self.conversion)
    }
}
