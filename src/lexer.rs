use crate::error::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl Token {
    /// Human-readable form used in `UnexpectedToken` diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::Num(v) => format!("number {}", v),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Star => "'*'".into(),
            Token::Slash => "'/'".into(),
            Token::Caret => "'^'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Comma => "','".into(),
            Token::Eof => "end of input".into(),
        }
    }
}

/// A token together with the byte offset where it starts.
#[derive(Clone, Debug)]
pub(crate) struct Spanned {
    pub(crate) tok: Token,
    pub(crate) pos: usize,
}

pub(crate) struct Lexer<'a> {
    text: &'a str,
    src: &'a [u8],
    i: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(s: &'a str) -> Self {
        Self {
            text: s,
            src: s.as_bytes(),
            i: 0,
        }
    }
    fn peek(&self) -> Option<u8> {
        self.src.get(self.i).copied()
    }
    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.i += 1;
            } else {
                break;
            }
        }
    }
    fn single(&mut self, tok: Token) -> Result<Spanned, ParseError> {
        let pos = self.i;
        self.i += 1;
        Ok(Spanned { tok, pos })
    }
    pub(crate) fn next_token(&mut self) -> Result<Spanned, ParseError> {
        self.skip_ws();
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return Ok(Spanned {
                    tok: Token::Eof,
                    pos: self.i,
                });
            }
        };
        match c {
            b'(' => self.single(Token::LParen),
            b')' => self.single(Token::RParen),
            b'+' => self.single(Token::Plus),
            b'-' => self.single(Token::Minus),
            b'*' => self.single(Token::Star),
            b'/' => self.single(Token::Slash),
            b'^' => self.single(Token::Caret),
            b',' => self.single(Token::Comma),
            c if c.is_ascii_digit() || c == b'.' => self.lex_number(),
            c if c.is_ascii_alphabetic() || c == b'_' => self.lex_ident(),
            _ => {
                let ch = self.text[self.i..].chars().next().unwrap_or('?');
                Err(ParseError::UnexpectedToken {
                    found: format!("character '{}'", ch),
                    pos: self.i,
                })
            }
        }
    }
    fn lex_number(&mut self) -> Result<Spanned, ParseError> {
        let start = self.i;
        let mut seen_dot = false;
        let mut seen_exp = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else if c == b'.' && !seen_dot && !seen_exp {
                seen_dot = true;
                self.i += 1;
            } else if (c == b'e' || c == b'E') && !seen_exp {
                seen_exp = true;
                self.i += 1;
                if let Some(sign) = self.peek() {
                    if sign == b'+' || sign == b'-' {
                        self.i += 1;
                    }
                }
                // A missing exponent is rejected by the f64 parse below.
                while let Some(d) = self.peek() {
                    if d.is_ascii_digit() {
                        self.i += 1;
                    } else {
                        break;
                    }
                }
            } else {
                break;
            }
        }
        let s = &self.text[start..self.i];
        let v: f64 = s.parse().map_err(|_| ParseError::UnexpectedToken {
            found: format!("malformed number '{}'", s),
            pos: start,
        })?;
        Ok(Spanned {
            tok: Token::Num(v),
            pos: start,
        })
    }
    fn lex_ident(&mut self) -> Result<Spanned, ParseError> {
        let start = self.i;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.i += 1;
            } else {
                break;
            }
        }
        Ok(Spanned {
            tok: Token::Ident(self.text[start..self.i].to_string()),
            pos: start,
        })
    }
}
