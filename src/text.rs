//! Loader for the struct declaration language:
//!
//! ```text
//! Pet { string name; Skill[] skill; };
//! Skill { int32 id; uint16 level; };
//! Player { string name; int32[] friends; float[3] position; Pet pet; };
//! ```
//!
//! `Type[]` and `Type[0]` are dynamic lists, `Type[N]` a fixed list of `N`
//! elements. The `;` after a closing brace is optional and `//` starts a comment.

use crate::{
    errors::SchemaError,
    field::{Field, FieldKind, StructDef},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Number(usize),
    Open,
    Close,
    LBracket,
    RBracket,
    Semi,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("`{name}`"),
            Token::Number(n) => format!("`{n}`"),
            Token::Open => "`{`".to_string(),
            Token::Close => "`}`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Semi => "`;`".to_string(),
        }
    }
}

fn syntax(line: usize, message: impl Into<String>) -> SchemaError {
    SchemaError::Syntax {
        line,
        message: message.into(),
    }
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token<'_>)>, SchemaError> {
    let mut tokens = Vec::new();

    for (line_idx, raw_line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = raw_line.split("//").next().unwrap_or_default();
        let bytes = line.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let c = bytes[pos];
            let single = match c {
                b'{' => Some(Token::Open),
                b'}' => Some(Token::Close),
                b'[' => Some(Token::LBracket),
                b']' => Some(Token::RBracket),
                b';' => Some(Token::Semi),
                _ => None,
            };

            if let Some(token) = single {
                tokens.push((line_no, token));
                pos += 1;
            } else if c.is_ascii_whitespace() {
                pos += 1;
            } else if c.is_ascii_digit() {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                let n = line[start..pos]
                    .parse()
                    .map_err(|_| syntax(line_no, format!("list size `{}` is too large", &line[start..pos])))?;
                tokens.push((line_no, Token::Number(n)));
            } else if c.is_ascii_alphabetic() || c == b'_' {
                let start = pos;
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
                tokens.push((line_no, Token::Ident(&line[start..pos])));
            } else {
                let found = line[pos..].chars().next().unwrap_or_default();
                return Err(syntax(line_no, format!("unexpected character `{found}`")));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<(usize, Token<'a>)>,
    pos: usize,
    last_line: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self, expected: &str) -> Result<Token<'a>, SchemaError> {
        match self.tokens.get(self.pos) {
            Some((line, token)) => {
                self.pos += 1;
                self.last_line = *line;
                Ok(token.clone())
            }
            None => Err(syntax(
                self.last_line,
                format!("expected {expected}, found end of input"),
            )),
        }
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(_, token)| token)
    }

    fn ident(&mut self, expected: &str) -> Result<&'a str, SchemaError> {
        match self.next(expected)? {
            Token::Ident(name) => Ok(name),
            other => Err(self.unexpected(expected, &other)),
        }
    }

    fn expect(&mut self, want: Token<'static>, expected: &str) -> Result<(), SchemaError> {
        let token = self.next(expected)?;
        if token == want {
            Ok(())
        } else {
            Err(self.unexpected(expected, &token))
        }
    }

    fn unexpected(&self, expected: &str, found: &Token<'_>) -> SchemaError {
        syntax(
            self.last_line,
            format!("expected {expected}, found {}", found.describe()),
        )
    }

    fn parse_struct(&mut self) -> Result<StructDef, SchemaError> {
        let name = self.ident("struct name")?;
        self.expect(Token::Open, "`{`")?;

        let mut fields = Vec::new();
        while self.peek() != Some(&Token::Close) {
            fields.push(self.parse_field()?);
        }
        self.expect(Token::Close, "`}`")?;

        if self.peek() == Some(&Token::Semi) {
            self.pos += 1;
        }

        Ok(StructDef::new(name, fields))
    }

    fn parse_field(&mut self) -> Result<Field, SchemaError> {
        let ty = self.ident("field type")?;

        let mut kind = FieldKind::Single;
        if self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            kind = match self.next("list size or `]`")? {
                Token::RBracket => FieldKind::List,
                Token::Number(n) => {
                    self.expect(Token::RBracket, "`]`")?;
                    FieldKind::repeated(n)
                }
                other => return Err(self.unexpected("list size or `]`", &other)),
            };
        }

        let name = self.ident("field name")?;
        self.expect(Token::Semi, "`;`")?;

        Ok(Field {
            name: name.to_string(),
            ty: ty.to_string(),
            kind,
        })
    }
}

/// Parses declarations into struct definitions, in source order.
pub fn parse_structs(text: &str) -> Result<Vec<StructDef>, SchemaError> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        pos: 0,
        last_line: 1,
    };

    let mut defs = Vec::new();
    while parser.peek().is_some() {
        defs.push(parser.parse_struct()?);
    }

    Ok(defs)
}
