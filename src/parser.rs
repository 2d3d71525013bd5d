use crate::ast::{Ast, BinOp, UnOp};
use crate::engine::EngineConfig;
use crate::error::ParseError;
use crate::lexer::{Lexer, Spanned, Token};

/// Recursive-descent parser over one (already trimmed) expression.
///
/// Precedence, loosest first: `+ -`, `* /`, `^` (right-associative), unary
/// `- +`, then primaries. Unary operators bind tighter than `^`, so `-2^2`
/// is `(-2)^2`.
///
/// Parser recursion and tree height are both capped at [`MAX_DEPTH`]. Deeper
/// input fails with "expression nested too deeply" at the operator or
/// parenthesis that crosses the limit.
pub(crate) struct Parser<'a> {
    lex: Lexer<'a>,
    look: Spanned,
    config: &'a EngineConfig,
    /// Byte offsets of the currently open parentheses.
    open: Vec<usize>,
    depth: usize,
}

// Evaluators, the closure compiler and codegen all recurse over the tree.
const MAX_DEPTH: usize = 256;

/// A subtree with its height (a leaf is 1).
type Node = (Ast, usize);

impl<'a> Parser<'a> {
    pub(crate) fn new(s: &'a str, config: &'a EngineConfig) -> Result<Self, ParseError> {
        let mut lex = Lexer::new(s);
        let look = lex.next_token()?;
        Ok(Self {
            lex,
            look,
            config,
            open: Vec::new(),
            depth: 0,
        })
    }

    fn bump(&mut self) -> Result<Spanned, ParseError> {
        let next = self.lex.next_token()?;
        Ok(std::mem::replace(&mut self.look, next))
    }

    fn unexpected(&self) -> ParseError {
        if matches!(self.look.tok, Token::Eof) {
            if let Some(&pos) = self.open.last() {
                return ParseError::UnbalancedParens { pos };
            }
        }
        ParseError::UnexpectedToken {
            found: self.look.tok.describe(),
            pos: self.look.pos,
        }
    }

    fn close_paren(&mut self) -> Result<(), ParseError> {
        if matches!(self.look.tok, Token::RParen) {
            self.bump()?;
            self.open.pop();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn enter(&mut self, pos: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(too_deep(pos));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn parse(mut self) -> Result<Ast, ParseError> {
        if matches!(self.look.tok, Token::Eof) {
            return Ok(Ast::zero());
        }
        let (expr, _) = self.additive()?;
        match self.look.tok {
            Token::Eof => Ok(expr),
            Token::RParen => Err(ParseError::UnbalancedParens { pos: self.look.pos }),
            _ => Err(self.unexpected()),
        }
    }

    fn additive(&mut self) -> Result<Node, ParseError> {
        let mut node = self.multiplicative()?;
        loop {
            let op = match self.look.tok {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            let at = self.bump()?.pos;
            let rhs = self.multiplicative()?;
            node = join(op, node, rhs, at)?;
        }
        Ok(node)
    }

    fn multiplicative(&mut self) -> Result<Node, ParseError> {
        let mut node = self.power()?;
        loop {
            let op = match self.look.tok {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            let at = self.bump()?.pos;
            let rhs = self.power()?;
            node = join(op, node, rhs, at)?;
        }
        Ok(node)
    }

    fn power(&mut self) -> Result<Node, ParseError> {
        let base = self.unary()?;
        if matches!(self.look.tok, Token::Caret) {
            let at = self.bump()?.pos;
            self.enter(at)?;
            let exp = self.power()?;
            self.leave();
            return join(BinOp::Pow, base, exp, at);
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        let op = match self.look.tok {
            Token::Minus => UnOp::Neg,
            Token::Plus => UnOp::Plus,
            _ => return self.primary(),
        };
        let at = self.bump()?.pos;
        self.enter(at)?;
        let (operand, height) = self.unary()?;
        self.leave();
        checked(Ast::unary(op, operand), height + 1, at)
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        match self.look.tok.clone() {
            Token::Num(v) => {
                self.bump()?;
                Ok((Ast::Literal(v), 1))
            }
            Token::Ident(name) => {
                let at = self.bump()?.pos;
                if matches!(self.look.tok, Token::LParen) {
                    self.call(name, at)
                } else if let Some(var) = self.config.variable(&name) {
                    Ok((Ast::Variable(var), 1))
                } else if let Some(v) = self.config.constant(&name) {
                    Ok((Ast::Literal(v), 1))
                } else {
                    Err(ParseError::UnexpectedToken {
                        found: format!("identifier '{}'", name),
                        pos: at,
                    })
                }
            }
            Token::LParen => {
                let open = self.bump()?.pos;
                self.enter(open)?;
                self.open.push(open);
                let e = self.additive()?;
                self.close_paren()?;
                self.leave();
                Ok(e)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn call(&mut self, name: String, at: usize) -> Result<Node, ParseError> {
        let func = self
            .config
            .functions
            .get(&name)
            .ok_or_else(|| ParseError::UnknownFunction {
                name: name.clone(),
                pos: at,
            })?;
        let open = self.bump()?.pos;
        self.enter(open)?;
        self.open.push(open);
        let mut args = Vec::with_capacity(func.arity());
        let mut height = 0;
        if !matches!(self.look.tok, Token::RParen) {
            loop {
                let (arg, h) = self.additive()?;
                height = height.max(h);
                args.push(arg);
                if matches!(self.look.tok, Token::Comma) {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.close_paren()?;
        self.leave();
        if args.len() != func.arity() {
            return Err(ParseError::ArityMismatch {
                name,
                expected: func.arity(),
                found: args.len(),
                pos: at,
            });
        }
        checked(Ast::Call { name, func, args }, height + 1, at)
    }
}

fn too_deep(pos: usize) -> ParseError {
    ParseError::UnexpectedToken {
        found: "expression nested too deeply".into(),
        pos,
    }
}

fn checked(ast: Ast, height: usize, pos: usize) -> Result<Node, ParseError> {
    if height > MAX_DEPTH {
        return Err(too_deep(pos));
    }
    Ok((ast, height))
}

fn join(op: BinOp, (lhs, lh): Node, (rhs, rh): Node, pos: usize) -> Result<Node, ParseError> {
    checked(Ast::binary(op, lhs, rhs), lh.max(rh) + 1, pos)
}
