#![deny(missing_docs)]

//! # Go Source Scanning
//!
//! A small lexer for Go source files. It validates the token structure of the
//! whole file (comments, string/rune literals, bracket balance) and parses the
//! package clause plus the import declarations that follow it.
//!
//! Everything after the imports is only tokenized, never parsed.

use crate::error::{AppError, AppResult};

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Number,
    Str,
    Rune,
    Punct(char),
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// One import spec, e.g. `utils "github.com/x/utils"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportSpec {
    /// Alias, `_` or `.` when present.
    pub name: Option<String>,
    /// The path literal, quotes included.
    pub path: String,
    pub start: usize,
    pub end: usize,
}

/// An `import` declaration, grouped or single.
#[derive(Debug, Clone)]
pub(crate) struct ImportDecl {
    /// Byte offsets of `(` and `)` for grouped declarations.
    pub parens: Option<(usize, usize)>,
    pub specs: Vec<ImportSpec>,
}

/// The parsed head of a Go file.
#[derive(Debug)]
pub(crate) struct GoFile {
    pub package: String,
    pub imports: Vec<ImportDecl>,
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

fn parse_err(source: &str, offset: usize, msg: &str) -> AppError {
    AppError::Parse(format!("line {}: {}", line_of(source, offset), msg))
}

/// Scans an interpreted string or rune literal starting at `start`.
/// Returns the offset just past the closing quote.
fn scan_quoted(source: &str, start: usize, quote: u8) -> AppResult<usize> {
    let bytes = source.as_bytes();
    let mut j = start + 1;
    loop {
        match bytes.get(j) {
            None | Some(b'\n') => {
                let what = if quote == b'"' { "string" } else { "rune" };
                return Err(parse_err(
                    source,
                    start,
                    &format!("{} literal not terminated", what),
                ));
            }
            Some(b'\\') => j += 2,
            Some(&b) if b == quote => return Ok(j + 1),
            Some(_) => j += 1,
        }
    }
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Tokenizes the whole file, skipping whitespace and comments.
pub(crate) fn tokenize(source: &str) -> AppResult<Vec<Token<'_>>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut open_brackets: Vec<(char, usize)> = Vec::new();
    // gofmt keeps a leading byte order mark; it is not part of the token stream.
    let mut i = if source.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    while i < bytes.len() {
        let start = i;
        let kind = match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = source[i..].find('\n').map_or(bytes.len(), |p| i + p);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = source[i + 2..]
                    .find("*/")
                    .ok_or_else(|| parse_err(source, start, "comment not terminated"))?;
                i += 2 + close + 2;
                continue;
            }
            b'"' => {
                i = scan_quoted(source, i, b'"')?;
                TokenKind::Str
            }
            b'\'' => {
                i = scan_quoted(source, i, b'\'')?;
                TokenKind::Rune
            }
            b'`' => {
                let close = source[i + 1..].find('`').ok_or_else(|| {
                    parse_err(source, start, "raw string literal not terminated")
                })?;
                i += 1 + close + 1;
                TokenKind::Str
            }
            b'0'..=b'9' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                TokenKind::Number
            }
            _ => {
                let c = source[i..].chars().next().unwrap_or_default();
                if c.is_alphabetic() || c == '_' {
                    while let Some(c) = source[i..].chars().next() {
                        if !(c.is_alphanumeric() || c == '_') {
                            break;
                        }
                        i += c.len_utf8();
                    }
                    TokenKind::Ident
                } else {
                    i += c.len_utf8();
                    match c {
                        '(' | '[' | '{' => open_brackets.push((c, start)),
                        ')' | ']' | '}' => match open_brackets.pop() {
                            Some((open, _)) if closing_for(open) == c => {}
                            Some((open, _)) => {
                                return Err(parse_err(
                                    source,
                                    start,
                                    &format!("expected '{}', found '{}'", closing_for(open), c),
                                ))
                            }
                            None => {
                                return Err(parse_err(
                                    source,
                                    start,
                                    &format!("unexpected '{}'", c),
                                ))
                            }
                        },
                        _ => {}
                    }
                    TokenKind::Punct(c)
                }
            }
        };
        tokens.push(Token {
            kind,
            text: &source[start..i],
            start,
            end: i,
        });
    }

    if let Some((open, offset)) = open_brackets.pop() {
        return Err(parse_err(source, offset, &format!("unclosed '{}'", open)));
    }

    Ok(tokens)
}

struct Cursor<'s, 't> {
    source: &'s str,
    tokens: &'t [Token<'s>],
    pos: usize,
}

impl<'s> Cursor<'s, '_> {
    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'s>> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn error(&self, msg: &str) -> AppError {
        let offset = self.peek().map_or(self.source.len(), |t| t.start);
        parse_err(self.source, offset, msg)
    }

    fn is_punct(&self, c: char) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Punct(c))
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Ident && t.text == keyword)
    }

    fn skip_semicolons(&mut self) {
        while self.is_punct(';') {
            self.pos += 1;
        }
    }

    fn package_clause(&mut self) -> AppResult<String> {
        if !self.is_keyword("package") {
            return Err(self.error("expected 'package'"));
        }
        self.pos += 1;
        match self.bump() {
            Some(t) if t.kind == TokenKind::Ident => Ok(t.text.to_string()),
            _ => Err(self.error("expected package name")),
        }
    }

    fn import_spec(&mut self) -> AppResult<ImportSpec> {
        let start = self.peek().map(|t| t.start);
        let name = match self.peek() {
            Some(t) if t.kind == TokenKind::Ident || t.kind == TokenKind::Punct('.') => {
                self.pos += 1;
                Some(t.text.to_string())
            }
            _ => None,
        };
        match self.peek() {
            Some(t) if t.kind == TokenKind::Str => {
                self.pos += 1;
                Ok(ImportSpec {
                    name,
                    path: t.text.to_string(),
                    start: start.unwrap_or(t.start),
                    end: t.end,
                })
            }
            _ => Err(self.error("expected import path")),
        }
    }

    fn import_decl(&mut self) -> AppResult<ImportDecl> {
        // `import` keyword
        self.pos += 1;

        if !self.is_punct('(') {
            let spec = self.import_spec()?;
            return Ok(ImportDecl {
                parens: None,
                specs: vec![spec],
            });
        }

        let lparen = self.bump().map(|t| t.start).unwrap_or_default();
        let mut specs = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_punct(')') {
                let rparen = self.bump().map(|t| t.start).unwrap_or_default();
                return Ok(ImportDecl {
                    parens: Some((lparen, rparen)),
                    specs,
                });
            }
            if self.peek().is_none() {
                return Err(self.error("expected ')'"));
            }
            specs.push(self.import_spec()?);
        }
    }
}

/// Parses the package clause and every import declaration of a Go file.
///
/// The rest of the file is validated lexically only.
pub(crate) fn parse_file(source: &str) -> AppResult<GoFile> {
    let tokens = tokenize(source)?;
    let mut cursor = Cursor {
        source,
        tokens: &tokens,
        pos: 0,
    };

    let package = cursor.package_clause()?;

    let mut imports = Vec::new();
    loop {
        cursor.skip_semicolons();
        if !cursor.is_keyword("import") {
            break;
        }
        imports.push(cursor.import_decl()?);
    }

    Ok(GoFile { package, imports })
}
