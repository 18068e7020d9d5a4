//! Reader for Doxygen `searchData` files.
//!
//! Doxygen writes one `search/<category>_<n>.js` file per category and leading
//! character, each holding a JavaScript array literal:
//!
//! ```text
//! var searchData=
//! [
//!   ['packbuffer_1222',['packBuffer',['../classCajita_1_1Halo.html#af6d7',1,'Cajita::Halo']]],
//! ];
//! ```
//!
//! The first element is Doxygen's own id (escaped label plus a serial), then the
//! label, then one `[url, flag, text]` triple per documented occurrence. Strings are
//! HTML-escaped.

use crate::search::{IndexTable, SymbolRecord, normalize};
use ahash::AHashMap;
use regex::{Captures, Regex};
use std::{borrow::Cow, sync::LazyLock};
use thiserror::Error;

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("valid entity pattern")
});

/// Errors raised while reading a `searchData` file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoxygenError {
    /// The file is not a valid array literal.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },
    /// The literal parsed but an entry does not have the `searchData` layout.
    #[error("entry {entry}: {message}")]
    Shape { entry: usize, message: String },
}

/// One `searchData` entry with its occurrences decoded into records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoxygenEntry {
    pub id: String,
    pub label: String,
    pub records: Vec<SymbolRecord>,
}

/// Parses a complete `searchData` file.
pub fn parse_search_data(src: &str) -> Result<Vec<DoxygenEntry>, DoxygenError> {
    let Value::Array(items) = Parser::new(src).parse_document()? else {
        return Err(DoxygenError::Shape {
            entry: 0,
            message: "top level value is not an array".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(entry, item)| parse_entry(entry, item))
        .collect()
}

/// Groups entries by normalized label into an index table.
///
/// Doxygen ids are unique per serial, but several labels can normalize to one token
/// (`operator+` and `operator-` both become `operator`). Their records are appended
/// to the first entry in emission order instead of producing duplicate keys.
pub fn into_table(entries: impl IntoIterator<Item = DoxygenEntry>) -> IndexTable {
    let mut table = IndexTable::default();
    let mut positions: AHashMap<String, usize> = AHashMap::new();

    for entry in entries {
        let token = normalize(&entry.label);
        if token.is_empty() {
            tracing::warn!(
                "Skipping Doxygen entry '{}': label '{}' has nothing searchable",
                entry.id,
                entry.label
            );
            continue;
        }

        if let Some(&position) = positions.get(&token) {
            tracing::debug!("Merging Doxygen entry '{}' into token '{}'", entry.id, token);
            table.entries[position].records.extend(entry.records);
        } else {
            positions.insert(token.clone(), table.len());
            table.push(token, entry.records);
        }
    }

    table
}

/// Splits the display text of one of several occurrences into scope and signature.
///
/// - `Cajita::Halo::packArray(int a)` → (`Cajita::Halo`, `(int a)`)
/// - `Cabana::LinkedCellList::permutation()` → (`Cabana::LinkedCellList`, `()`)
/// - `permute(int a)` → (``, `(int a)`)
/// - `Cajita` (single occurrences only carry the scope) → (`Cajita`, none)
pub fn split_qualified(label: &str, text: &str) -> (String, Option<String>) {
    let signature = |rest: &str| (!rest.is_empty()).then(|| rest.to_string());

    for (pos, _) in text.match_indices("::") {
        if let Some(rest) = text[pos + 2..].strip_prefix(label)
            && (rest.is_empty() || rest.starts_with('('))
        {
            return (text[..pos].to_string(), signature(rest));
        }
    }

    if let Some(rest) = text.strip_prefix(label)
        && (rest.is_empty() || rest.starts_with('('))
    {
        return (String::new(), signature(rest));
    }

    (text.to_string(), None)
}

/// Decodes the HTML entities Doxygen writes into search data.
///
/// Unknown named entities are left as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    ENTITY.replace_all(text, |caps: &Captures<'_>| {
        let decoded = match &caps[1] {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            numeric => decode_numeric_entity(numeric),
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

fn parse_entry(entry: usize, value: Value) -> Result<DoxygenEntry, DoxygenError> {
    let shape = |message: &str| DoxygenError::Shape {
        entry,
        message: message.to_string(),
    };

    let Value::Array(parts) = value else {
        return Err(shape("entry is not an array"));
    };
    let [Value::Str(id), Value::Array(body)] = <[Value; 2]>::try_from(parts)
        .map_err(|_| shape("expected [id, [label, occurrences...]]"))?
    else {
        return Err(shape("expected [id, [label, occurrences...]]"));
    };

    let mut body = body.into_iter();
    let Some(Value::Str(label)) = body.next() else {
        return Err(shape("missing label"));
    };
    let label = decode_entities(&label).into_owned();

    let occurrences: Vec<Value> = body.collect();
    let single = occurrences
        .iter()
        .filter(|occurrence| matches!(occurrence, Value::Array(_)))
        .count()
        == 1;

    let mut records = Vec::new();
    for (index, occurrence) in occurrences.into_iter().enumerate() {
        match occurrence {
            Value::Array(fields) => {
                let record = parse_occurrence(&label, fields, single).ok_or_else(|| DoxygenError::Shape {
                    entry,
                    message: format!("occurrence {index} is not [url, flag, text]"),
                })?;
                records.push(record);
            }
            Value::Null => {}
            _ => {
                return Err(DoxygenError::Shape {
                    entry,
                    message: format!("occurrence {index} is not an array"),
                });
            }
        }
    }

    Ok(DoxygenEntry { id, label, records })
}

/// Decodes one `[url, flag, text]` triple.
///
/// When the symbol has a single occurrence, Doxygen writes only the enclosing scope
/// as `text`; otherwise `text` is the qualified name with its parameter list.
fn parse_occurrence(label: &str, fields: Vec<Value>, single: bool) -> Option<SymbolRecord> {
    let mut fields = fields.into_iter();
    let Some(Value::Str(url)) = fields.next() else {
        return None;
    };
    // Frame target flag; search results always open in place.
    let _target = fields.next();
    let text = match fields.next() {
        Some(Value::Str(text)) => decode_entities(&text).into_owned(),
        None | Some(Value::Null) => String::new(),
        Some(_) => return None,
    };

    let (scope, signature) = if single {
        (text, None)
    } else {
        split_qualified(label, &text)
    };
    Some(SymbolRecord {
        label: label.to_string(),
        scope,
        anchor: decode_entities(&url).into_owned(),
        signature,
    })
}

/// The subset of JavaScript literals Doxygen emits.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Array(Vec<Value>),
    Str(String),
    Number,
    Bool,
    Null,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.strip_prefix('\u{feff}').unwrap_or(src),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> DoxygenError {
        DoxygenError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and `//` line comments.
    fn skip_whitespace(&mut self) {
        loop {
            let trimmed = self.rest().trim_start();
            self.pos = self.src.len() - trimmed.len();
            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                return;
            }
        }
    }

    /// `[var <name> =] <array> [;]`
    fn parse_document(mut self) -> Result<Value, DoxygenError> {
        self.skip_whitespace();
        if let Some(after) = self.rest().strip_prefix("var")
            && after.starts_with(char::is_whitespace)
        {
            self.pos += 3;
            self.skip_whitespace();
            let name_len = self
                .rest()
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(self.rest().len());
            if name_len == 0 {
                return Err(self.error("expected a variable name"));
            }
            self.pos += name_len;
            self.skip_whitespace();
            if !self.eat('=') {
                return Err(self.error("expected '='"));
            }
        }

        let value = self.parse_value()?;
        self.skip_whitespace();
        self.eat(';');
        self.skip_whitespace();
        if self.pos < self.src.len() {
            return Err(self.error("unexpected trailing content"));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Value, DoxygenError> {
        self.skip_whitespace();
        match self.peek() {
            Some('[') => self.parse_array(),
            Some(quote @ ('\'' | '"')) => self.parse_string(quote).map(Value::Str),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_int(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_keyword(),
            Some(c) => Err(self.error(format!("unexpected character {c:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, DoxygenError> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            return Err(self.error("expected ',' or ']'"));
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, DoxygenError> {
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            match c {
                c if c == quote => return Ok(out),
                '\\' => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('u') => self.parse_unicode_escape()?,
                        Some(other) => other,
                        None => return Err(self.error("unterminated escape")),
                    };
                    out.push(escaped);
                }
                '\n' => return Err(self.error("newline in string literal")),
                c => out.push(c),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, DoxygenError> {
        let code = self
            .rest()
            .get(..4)
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .ok_or_else(|| self.error("expected four hex digits after \\u"))?;
        self.pos += 4;
        char::from_u32(code).ok_or_else(|| self.error("escape is not a scalar value"))
    }

    fn parse_int(&mut self) -> Result<Value, DoxygenError> {
        let rest = self.rest();
        let sign = usize::from(rest.starts_with('-'));
        let len = sign
            + rest[sign..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len() - sign);
        rest[..len]
            .parse::<i64>()
            .map_err(|_| self.error(format!("invalid integer {:?}", &rest[..len])))?;
        self.pos += len;
        Ok(Value::Number)
    }

    fn parse_keyword(&mut self) -> Result<Value, DoxygenError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let value = match &rest[..len] {
            "null" | "undefined" => Value::Null,
            "true" | "false" => Value::Bool,
            other => return Err(self.error(format!("unexpected identifier {other:?}"))),
        };
        self.pos += len;
        Ok(value)
    }
}
