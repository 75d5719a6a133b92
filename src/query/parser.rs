//! Clause-level scanner for select-style queries
//!
//! The scanner does not understand field lists or expressions. It only finds
//! where each top-level clause starts, skipping string literals and anything
//! inside parentheses (function calls, `IN (...)` lists, sub-queries).

use crate::error::{Error, Result};

/// Top-level clause keywords that may follow `FROM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// `WHERE`
    Where,
    /// `WITH` (`WITH SECURITY_ENFORCED`, data categories)
    With,
    /// `GROUP BY`
    GroupBy,
    /// `HAVING`
    Having,
    /// `ORDER BY`
    OrderBy,
    /// `LIMIT`
    Limit,
    /// `OFFSET`
    Offset,
    /// `FOR VIEW` / `FOR REFERENCE` / `FOR UPDATE`
    For,
}

impl ClauseKind {
    /// Clauses a count query may not carry
    pub fn is_disallowed_in_count(self) -> bool {
        matches!(
            self,
            Self::OrderBy | Self::Limit | Self::Offset | Self::GroupBy | Self::Having
        )
    }
}

/// A clause and the byte offset of its keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    pub kind: ClauseKind,
    pub start: usize,
}

/// Structural view of a select-style query.
///
/// Offsets index into the original text, so rewrites keep the caller's
/// spelling, casing and whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    text: String,
    from_start: usize,
    clauses: Vec<Clause>,
}

impl SoqlQuery {
    /// Parse a query, failing with `MalformedQuery` when it is not a
    /// `SELECT ... FROM ...` statement
    pub fn parse(text: &str) -> Result<Self> {
        let words = top_level_words(text);

        match words.first() {
            Some(first) if first.text.eq_ignore_ascii_case("select") => {}
            _ => {
                return Err(Error::malformed(format!(
                    "query does not start with SELECT: {}",
                    preview(text)
                )))
            }
        }

        let from_index = words
            .iter()
            .position(|w| w.text.eq_ignore_ascii_case("from"))
            .ok_or_else(|| {
                Error::malformed(format!("query has no FROM clause: {}", preview(text)))
            })?;
        let from_start = words[from_index].start;

        let mut clauses = Vec::new();
        let mut rest = words[from_index + 1..].iter().peekable();
        while let Some(word) = rest.next() {
            let kind = match word.text.to_ascii_lowercase().as_str() {
                "where" => ClauseKind::Where,
                "with" => ClauseKind::With,
                "having" => ClauseKind::Having,
                "limit" => ClauseKind::Limit,
                "offset" => ClauseKind::Offset,
                "for" => ClauseKind::For,
                "group" | "order" => {
                    if !rest
                        .peek()
                        .is_some_and(|next| next.text.eq_ignore_ascii_case("by"))
                    {
                        continue;
                    }
                    rest.next();
                    if word.text.eq_ignore_ascii_case("group") {
                        ClauseKind::GroupBy
                    } else {
                        ClauseKind::OrderBy
                    }
                }
                _ => continue,
            };
            clauses.push(Clause {
                kind,
                start: word.start,
            });
        }

        Ok(Self {
            text: text.to_string(),
            from_start,
            clauses,
        })
    }

    /// The original query text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte offset of the `FROM` keyword
    pub fn from_start(&self) -> usize {
        self.from_start
    }

    /// Top-level clauses after `FROM`, in order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// First clause of the given kind
    pub fn clause(&self, kind: ClauseKind) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.kind == kind)
    }

    /// Whether the query has a top-level `ORDER BY`
    pub fn has_order_by(&self) -> bool {
        self.clause(ClauseKind::OrderBy).is_some()
    }
}

#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    start: usize,
}

/// Words at parenthesis depth 0 and outside string literals
fn top_level_words(text: &str) -> Vec<Word<'_>> {
    let bytes = text.as_bytes();
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'\'' => break,
                        _ => i += 1,
                    }
                }
                i += 1;
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b if is_word_byte(b) => {
                let start = i;
                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }
                if depth == 0 {
                    words.push(Word {
                        text: &text[start..i],
                        start,
                    });
                }
            }
            _ => i += 1,
        }
    }

    words
}

/// Identifier characters, including `.` for relationship paths and `:` for
/// bind variables, so `Order.Name` or `:limit` never read as keywords
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':')
}

/// First 100 characters of a query, for logs and error messages
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(100).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
