//! CSS selector parsing.
//!
//! A single cursor walks the input left to right. Each compound (simple
//! selectors with no combinator between them) becomes a list of leaf
//! evaluators; a combinator wraps everything parsed so far as the left-hand
//! side of a relation evaluator. Error positions are byte offsets into the
//! original string.

use core::fmt;
use std::error::Error;

use regex::Regex;

use crate::{AnPlusB, AttributeOperator, Evaluator};

/// What went wrong while parsing a selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorErrorKind {
    /// Empty or whitespace-only selector.
    Empty,
    /// Leading, trailing or doubled comma.
    EmptyGroup,
    /// Combinator with nothing on its right.
    DanglingCombinator,
    UnexpectedCharacter,
    UnterminatedAttribute,
    UnterminatedString,
    UnterminatedArgument,
    UnknownPseudoClass,
    InvalidNthExpression,
    InvalidIndex,
    /// A pseudo-class or attribute operator that needs a value got none.
    EmptyArgument,
    InvalidRegex,
    /// `:not()` only accepts compound selectors.
    CombinatorInNegation,
}

impl fmt::Display for SelectorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty selector",
            Self::EmptyGroup => "empty selector group",
            Self::DanglingCombinator => "combinator is not followed by a selector",
            Self::UnexpectedCharacter => "unexpected character",
            Self::UnterminatedAttribute => "unterminated attribute selector",
            Self::UnterminatedString => "unterminated string",
            Self::UnterminatedArgument => "unterminated pseudo-class argument",
            Self::UnknownPseudoClass => "unknown pseudo-class",
            Self::InvalidNthExpression => "invalid an+b expression",
            Self::InvalidIndex => "invalid index",
            Self::EmptyArgument => "missing argument",
            Self::InvalidRegex => "invalid regular expression",
            Self::CombinatorInNegation => "combinators are not allowed inside :not()",
        })
    }
}

/// Malformed selector string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    pub kind: SelectorErrorKind,
    /// Byte offset of the problem in the selector string.
    pub position: usize,
    /// The offending part of the selector.
    pub fragment: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {}: `{}`",
            self.kind, self.position, self.fragment
        )
    }
}

impl Error for SelectorError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

impl Combinator {
    const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Self::Child),
            b'+' => Some(Self::AdjacentSibling),
            b'~' => Some(Self::GeneralSibling),
            _ => None,
        }
    }

    /// `right` is the new compound, `left` everything before the combinator.
    fn join(self, mut right: Vec<Evaluator>, left: Evaluator) -> Evaluator {
        let left = Box::new(left);
        right.push(match self {
            Self::Descendant => Evaluator::Parent(left),
            Self::Child => Evaluator::ImmediateParent(left),
            Self::AdjacentSibling => Evaluator::ImmediatePreviousSibling(left),
            Self::GeneralSibling => Evaluator::PreviousSibling(left),
        });
        Evaluator::And(right)
    }
}

/// Pseudo-classes written without an argument.
const PLAIN_PSEUDO_CLASSES: &[&str] = &[
    "first-child",
    "last-child",
    "only-child",
    "first-of-type",
    "last-of-type",
    "only-of-type",
    "empty",
    "root",
    "scope",
];

/// Pseudo-classes that take an argument.
const FUNCTIONAL_PSEUDO_CLASSES: &[&str] = &[
    "nth-child",
    "nth-last-child",
    "nth-of-type",
    "nth-last-of-type",
    "lt",
    "gt",
    "eq",
    "contains",
    "containsown",
    "matches",
    "matchesown",
    "not",
];

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') || !ch.is_ascii()
}

fn single(mut parts: Vec<Evaluator>) -> Evaluator {
    if parts.len() == 1
        && let Some(only) = parts.pop()
    {
        return only;
    }
    Evaluator::And(parts)
}

fn compile_regex(pattern: &str, position: usize) -> Result<Regex, SelectorError> {
    Regex::new(pattern).map_err(|_| SelectorError {
        kind: SelectorErrorKind::InvalidRegex,
        position,
        fragment: pattern.to_owned(),
    })
}

/// `raw` trimmed, without one pair of matching surrounding quotes.
fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    ['"', '\'']
        .iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(trimmed)
}

/// Regex sources keep their backslashes; everything else is unescaped.
fn decode(raw: &str, keep_escapes: bool) -> String {
    if keep_escapes {
        raw.to_owned()
    } else {
        unescape(raw)
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Cursor over `input[..end]`. Sub-parsers for `:not()` share the input so
/// error positions stay absolute.
struct SelectorParser<'src> {
    input: &'src str,
    index: usize,
    end: usize,
    in_negation: bool,
}

impl<'src> SelectorParser<'src> {
    const fn new(input: &'src str) -> Self {
        Self {
            input,
            index: 0,
            end: input.len(),
            in_negation: false,
        }
    }

    fn error(&self, kind: SelectorErrorKind, position: usize, fragment: &str) -> SelectorError {
        SelectorError {
            kind,
            position,
            fragment: fragment.to_owned(),
        }
    }

    fn unexpected(&self) -> SelectorError {
        let fragment: String = self.rest().chars().take(1).collect();
        self.error(SelectorErrorKind::UnexpectedCharacter, self.index, &fragment)
    }

    fn rest(&self) -> &'src str {
        self.input.get(self.index..self.end).unwrap_or("")
    }

    fn slice(&self, start: usize, end: usize) -> &'src str {
        self.input.get(start..end).unwrap_or("")
    }

    fn peek(&self) -> Option<u8> {
        if self.index < self.end {
            self.input.as_bytes().get(self.index).copied()
        } else {
            None
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        let index = self.index.saturating_add(offset);
        if index < self.end {
            self.input.as_bytes().get(index).copied()
        } else {
            None
        }
    }

    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Skip ASCII whitespace; returns whether any was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
        self.index != start
    }

    fn parse_list(&mut self) -> Result<Vec<Evaluator>, SelectorError> {
        let mut groups = Vec::new();
        loop {
            groups.push(self.parse_group()?);
            match self.peek() {
                None => return Ok(groups),
                Some(b',') => self.bump(),
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    /// One comma-separated group; stops before `,` or at the end.
    fn parse_group(&mut self) -> Result<Evaluator, SelectorError> {
        self.skip_whitespace();
        let mut left: Option<Evaluator> = None;
        let mut pending: Option<(Combinator, usize)> = None;

        if let Some(combinator) = self.peek().and_then(Combinator::from_byte) {
            self.check_combinator_allowed()?;
            pending = Some((combinator, self.index));
            left = Some(Evaluator::ScopeRoot);
            self.bump();
            self.skip_whitespace();
        }

        loop {
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return Err(match (pending, self.peek()) {
                    (Some((_, at)), None | Some(b',')) => {
                        let fragment = self.slice(at, self.index).trim();
                        self.error(SelectorErrorKind::DanglingCombinator, at, fragment)
                    }
                    (None, None | Some(b',')) => {
                        self.error(SelectorErrorKind::EmptyGroup, self.index, ",")
                    }
                    _ => self.unexpected(),
                });
            }
            let current = match (left.take(), pending.take()) {
                (Some(left), Some((combinator, _))) => combinator.join(compound, left),
                _ => single(compound),
            };
            left = Some(current);

            let combinator_at = self.index;
            let had_whitespace = self.skip_whitespace();
            let next = match self.peek() {
                None | Some(b',') => break,
                Some(byte) => match Combinator::from_byte(byte) {
                    Some(combinator) => {
                        self.bump();
                        self.skip_whitespace();
                        combinator
                    }
                    None if had_whitespace => Combinator::Descendant,
                    None => return Err(self.unexpected()),
                },
            };
            if self.in_negation {
                return Err(self.error(
                    SelectorErrorKind::CombinatorInNegation,
                    combinator_at,
                    self.slice(combinator_at, self.index),
                ));
            }
            pending = Some((next, combinator_at));
        }

        left.ok_or_else(|| self.error(SelectorErrorKind::EmptyGroup, self.index, ""))
    }

    fn check_combinator_allowed(&self) -> Result<(), SelectorError> {
        if self.in_negation {
            return Err(self.error(
                SelectorErrorKind::CombinatorInNegation,
                self.index,
                self.slice(self.index, self.index.saturating_add(1)),
            ));
        }
        Ok(())
    }

    /// Simple selectors up to whitespace, a combinator, `,` or the end.
    fn parse_compound(&mut self) -> Result<Vec<Evaluator>, SelectorError> {
        let mut parts = Vec::new();
        while let Some(byte) = self.peek() {
            match byte {
                b'*' => {
                    self.bump();
                    parts.push(Evaluator::AllElements);
                }
                b'#' => parts.push(self.consume_id()?),
                b'.' => parts.push(self.consume_class()?),
                b'[' => parts.push(self.consume_attr()?),
                b':' => parts.push(self.consume_pseudo()?),
                b'\\' if self.peek_at(1).is_some() => parts.push(self.consume_tag()),
                _ if byte >= 0x80 || is_ident_char(char::from(byte)) => {
                    parts.push(self.consume_tag());
                }
                _ => break,
            }
        }
        Ok(parts)
    }

    /// Identifier characters with backslash escapes resolved.
    fn consume_ident(&mut self) -> String {
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        let mut consumed = 0;
        while let Some((offset, ch)) = chars.next() {
            if ch == '\\' {
                let Some((escaped_at, escaped)) = chars.next() else {
                    break;
                };
                out.push(escaped);
                consumed = escaped_at + escaped.len_utf8();
            } else if is_ident_char(ch) {
                out.push(ch);
                consumed = offset + ch.len_utf8();
            } else {
                break;
            }
        }
        self.index += consumed;
        out
    }

    fn consume_tag(&mut self) -> Evaluator {
        let mut name = self.consume_ident();
        if self.peek() == Some(b'|') && self.peek_at(1).is_some_and(|byte| byte != b'=') {
            self.bump();
            let local = self.consume_ident();
            name = format!("{name}:{local}");
        }
        Evaluator::Tag(name.to_ascii_lowercase())
    }

    fn consume_named(&mut self) -> Result<String, SelectorError> {
        let start = self.index;
        self.bump();
        let name = self.consume_ident();
        if name.is_empty() {
            self.index = start;
            return Err(self.unexpected());
        }
        Ok(name)
    }

    fn consume_id(&mut self) -> Result<Evaluator, SelectorError> {
        Ok(Evaluator::Id(self.consume_named()?))
    }

    fn consume_class(&mut self) -> Result<Evaluator, SelectorError> {
        Ok(Evaluator::Class(self.consume_named()?))
    }

    fn consume_attr_key(&mut self) -> String {
        let mut key = self.consume_ident();
        while self.peek() == Some(b':') {
            self.bump();
            key.push(':');
            key.push_str(&self.consume_ident());
        }
        key.to_ascii_lowercase()
    }

    fn consume_operator(&mut self) -> Option<Option<AttributeOperator>> {
        let (operator, width) = match (self.peek()?, self.peek_at(1)) {
            (b'=', _) => (Some(AttributeOperator::Equals), 1),
            (b'!', Some(b'=')) => (Some(AttributeOperator::NotEquals), 2),
            (b'^', Some(b'=')) => (Some(AttributeOperator::Prefix), 2),
            (b'$', Some(b'=')) => (Some(AttributeOperator::Suffix), 2),
            (b'*', Some(b'=')) => (Some(AttributeOperator::Contains), 2),
            (b'~', Some(b'=')) => (None, 2),
            _ => return None,
        };
        self.index += width;
        Some(operator)
    }

    /// `[key]`, `[^prefix]` or `[key op value]`.
    fn consume_attr(&mut self) -> Result<Evaluator, SelectorError> {
        let open = self.index;
        self.bump();
        self.skip_whitespace();
        let by_prefix = self.peek() == Some(b'^');
        if by_prefix {
            self.bump();
        }
        let key = self.consume_attr_key();
        self.skip_whitespace();
        if key.is_empty() {
            return Err(match self.peek() {
                None => self.unterminated_attr(open),
                Some(_) => self.unexpected(),
            });
        }
        match self.peek() {
            None => return Err(self.unterminated_attr(open)),
            Some(b']') => {
                self.bump();
                return Ok(if by_prefix {
                    Evaluator::AttributeStarting(key)
                } else {
                    Evaluator::Attribute(key)
                });
            }
            Some(_) => {}
        }
        if by_prefix {
            return Err(self.unexpected());
        }
        let operator_at = self.index;
        let Some(operator) = self.consume_operator() else {
            return Err(self.unexpected());
        };
        self.skip_whitespace();
        let value_at = self.index;
        let value = self.consume_attr_value(open, operator.is_none())?;

        let needs_value = !matches!(
            operator,
            Some(AttributeOperator::Equals | AttributeOperator::NotEquals)
        );
        if needs_value && value.is_empty() {
            return Err(self.error(
                SelectorErrorKind::EmptyArgument,
                operator_at,
                self.slice(open, self.index),
            ));
        }
        Ok(match operator {
            Some(op) => Evaluator::AttributeValue {
                key,
                op,
                value: value.trim().to_lowercase(),
            },
            None => Evaluator::AttributeMatching {
                key,
                pattern: compile_regex(&value, value_at)?,
            },
        })
    }

    fn unterminated_attr(&self, open: usize) -> SelectorError {
        self.error(
            SelectorErrorKind::UnterminatedAttribute,
            open,
            self.slice(open, self.end),
        )
    }

    /// Quoted or unquoted value, consuming the closing `]`.
    fn consume_attr_value(
        &mut self,
        open: usize,
        keep_escapes: bool,
    ) -> Result<String, SelectorError> {
        if let Some(quote @ (b'"' | b'\'')) = self.peek() {
            let value = self.consume_quoted(quote, keep_escapes)?;
            self.skip_whitespace();
            return match self.peek() {
                Some(b']') => {
                    self.bump();
                    Ok(value)
                }
                None => Err(self.unterminated_attr(open)),
                Some(_) => Err(self.unexpected()),
            };
        }
        let start = self.index;
        let close = self.unquoted_value_end(open)?;
        let value = decode(self.slice(start, close).trim_end(), keep_escapes);
        self.index = close + 1;
        Ok(value)
    }

    /// Index of the `]` closing an unquoted value. Nested `[...]` (regex
    /// character classes) and escaped characters are skipped.
    fn unquoted_value_end(&mut self, open: usize) -> Result<usize, SelectorError> {
        let mut depth = 0_usize;
        while let Some(byte) = self.peek() {
            match byte {
                b'\\' => self.bump(),
                b'[' => depth += 1,
                b']' if depth == 0 => return Ok(self.index),
                b']' => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        Err(self.unterminated_attr(open))
    }

    fn consume_quoted(&mut self, quote: u8, keep_escapes: bool) -> Result<String, SelectorError> {
        let open = self.index;
        self.bump();
        let start = self.index;
        while let Some(byte) = self.peek() {
            match byte {
                b'\\' => {
                    self.bump();
                    self.bump();
                }
                _ if byte == quote => {
                    let value = decode(self.slice(start, self.index), keep_escapes);
                    self.bump();
                    return Ok(value);
                }
                _ => self.bump(),
            }
        }
        Err(self.error(
            SelectorErrorKind::UnterminatedString,
            open,
            self.slice(open, self.end),
        ))
    }

    /// Range of the parenthesized argument, leaving the cursor after `)`.
    fn consume_argument(&mut self) -> Result<(usize, usize), SelectorError> {
        let open = self.index;
        self.bump();
        let start = self.index;
        let mut depth = 1_usize;
        let mut quote: Option<u8> = None;
        while let Some(byte) = self.peek() {
            match (quote, byte) {
                (_, b'\\') => self.bump(),
                (Some(active), _) if byte == active => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(byte),
                (None, b'(') => depth += 1,
                (None, b')') => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.index;
                        self.bump();
                        return Ok((start, end));
                    }
                }
                (None, _) => {}
            }
            self.bump();
        }
        Err(self.error(
            SelectorErrorKind::UnterminatedArgument,
            open,
            self.slice(open, self.end),
        ))
    }

    fn consume_pseudo(&mut self) -> Result<Evaluator, SelectorError> {
        let colon = self.index;
        let written = self.consume_named()?;
        let name = written.to_ascii_lowercase();
        let argument = if self.peek() == Some(b'(') {
            Some(self.consume_argument()?)
        } else {
            None
        };
        let fragment = self.slice(colon, self.index);
        let Some((arg_start, arg_end)) = argument else {
            return match name.as_str() {
                "first-child" => Ok(Evaluator::FirstChild),
                "last-child" => Ok(Evaluator::LastChild),
                "only-child" => Ok(Evaluator::OnlyChild),
                "first-of-type" => Ok(nth(AnPlusB::FIRST, false, true)),
                "last-of-type" => Ok(nth(AnPlusB::FIRST, true, true)),
                "only-of-type" => Ok(Evaluator::OnlyOfType),
                "empty" => Ok(Evaluator::Empty),
                "root" => Ok(Evaluator::Root),
                "scope" => Ok(Evaluator::ScopeRoot),
                _ if FUNCTIONAL_PSEUDO_CLASSES.contains(&name.as_str()) => {
                    Err(self.error(SelectorErrorKind::EmptyArgument, colon, fragment))
                }
                _ => Err(self.error(SelectorErrorKind::UnknownPseudoClass, colon, fragment)),
            };
        };
        if PLAIN_PSEUDO_CLASSES.contains(&name.as_str()) {
            return Err(self.error(SelectorErrorKind::UnexpectedCharacter, arg_start - 1, "("));
        }
        if !FUNCTIONAL_PSEUDO_CLASSES.contains(&name.as_str()) {
            return Err(self.error(SelectorErrorKind::UnknownPseudoClass, colon, fragment));
        }

        let raw = self.slice(arg_start, arg_end);
        if raw.trim().is_empty() {
            return Err(self.error(SelectorErrorKind::EmptyArgument, colon, fragment));
        }
        let evaluator = match name.as_str() {
            "nth-child" => nth(self.formula(raw, arg_start)?, false, false),
            "nth-last-child" => nth(self.formula(raw, arg_start)?, true, false),
            "nth-of-type" => nth(self.formula(raw, arg_start)?, false, true),
            "nth-last-of-type" => nth(self.formula(raw, arg_start)?, true, true),
            "lt" => Evaluator::IndexLessThan(self.index_arg(raw, arg_start)?),
            "gt" => Evaluator::IndexGreaterThan(self.index_arg(raw, arg_start)?),
            "eq" => Evaluator::IndexEquals(self.index_arg(raw, arg_start)?),
            "contains" | "containsown" => {
                let search = unescape(strip_quotes(raw)).to_lowercase();
                if search.trim().is_empty() {
                    return Err(self.error(SelectorErrorKind::EmptyArgument, colon, fragment));
                }
                if name == "contains" {
                    Evaluator::ContainsText(search)
                } else {
                    Evaluator::ContainsOwnText(search)
                }
            }
            "matches" => Evaluator::MatchesText(compile_regex(strip_quotes(raw), arg_start)?),
            "matchesown" => Evaluator::MatchesOwnText(compile_regex(strip_quotes(raw), arg_start)?),
            _ => self.negation(arg_start, arg_end)?,
        };
        Ok(evaluator)
    }

    fn formula(&self, raw: &str, position: usize) -> Result<AnPlusB, SelectorError> {
        AnPlusB::parse(raw)
            .ok_or_else(|| self.error(SelectorErrorKind::InvalidNthExpression, position, raw))
    }

    fn index_arg(&self, raw: &str, position: usize) -> Result<usize, SelectorError> {
        raw.trim()
            .parse()
            .map_err(|_| self.error(SelectorErrorKind::InvalidIndex, position, raw))
    }

    fn negation(&self, start: usize, end: usize) -> Result<Evaluator, SelectorError> {
        let mut inner = SelectorParser {
            input: self.input,
            index: start,
            end,
            in_negation: true,
        };
        let groups = inner.parse_list()?;
        let negated = if groups.len() == 1 {
            single(groups)
        } else {
            Evaluator::Or(groups)
        };
        Ok(Evaluator::Not(Box::new(negated)))
    }
}

const fn nth(formula: AnPlusB, from_end: bool, of_type: bool) -> Evaluator {
    Evaluator::Nth {
        formula,
        from_end,
        of_type,
    }
}

/// Parse a selector string into one evaluator per comma group.
///
/// # Errors
/// Returns a [`SelectorError`] describing the first syntax problem.
pub fn parse_selector_list(input: &str) -> Result<Vec<Evaluator>, SelectorError> {
    let result = if input.trim().is_empty() {
        Err(SelectorError {
            kind: SelectorErrorKind::Empty,
            position: 0,
            fragment: input.to_owned(),
        })
    } else {
        SelectorParser::new(input).parse_list()
    };
    match &result {
        Ok(groups) => log::trace!(
            "compiled selector `{input}`: {}",
            Evaluator::Or(groups.clone())
        ),
        Err(err) => log::debug!("rejected selector `{input}`: {err}"),
    }
    result
}
