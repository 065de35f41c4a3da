//! Pratt (precedence-climbing) parser turning a token stream into an
//! [`Ast`]. Binding powers follow SPEC_FULL.md section 4.2, low to high:
//! Pipe, Or, And, Not (prefix), Comparator, Flatten, Slice, Subexpression
//! dot, Projection, brackets/grouping/multi-select, function call,
//! expression-ref.

use std::sync::Arc;

use crate::ast::{Ast, Comparator, HashPair, SlicePart};
use crate::error::{ErrorReason, JmespathError};
use crate::lexer::{Lexer, Spanned, Token};

/// Binding power of each token when it appears in "led" (infix/postfix)
/// position. Tokens that never appear in led position bind at 0, which
/// means "never continue the loop for this token".
fn led_bp(token: &Token) -> u8 {
    match token {
        Token::Pipe => 1,
        Token::Or => 2,
        Token::And => 3,
        Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge => 5,
        Token::Flatten => 9,
        Token::Dot => 10,
        Token::LBracket => 10,
        Token::FilterOpen => 10,
        _ => 0,
    }
}

pub struct Parser<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    expression: Arc<str>,
    _source: &'a str,
}

/// Parses a complete JMESPath expression into an AST.
pub fn parse(expression: &str) -> Result<Ast, JmespathError> {
    let expr_rc: Arc<str> = Arc::from(expression);
    let tokens = Lexer::new(expression, expr_rc.clone()).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        expression: expr_rc,
        _source: expression,
    };
    let ast = parser.parse_expr(0)?;
    parser.expect_eof()?;
    Ok(ast)
}

impl<'a> Parser<'a> {
    fn err(&self, msg: impl Into<String>) -> JmespathError {
        let column = self.tokens.get(self.pos).map(|s| s.column).unwrap_or(0);
        JmespathError::new(self.expression.clone(), column, ErrorReason::Syntax(msg.into()))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&self) -> Result<(), JmespathError> {
        if *self.peek() == Token::Eof {
            Ok(())
        } else {
            Err(self.err(format!(
                "trailing tokens after a complete expression, found {}",
                self.peek().describe()
            )))
        }
    }

    /// Main Pratt loop: parse a "nud" (null denotation, i.e. a prefix/atom)
    /// then keep absorbing "led" (left denotation, i.e. infix/postfix)
    /// tokens whose binding power exceeds `rbp`.
    fn parse_expr(&mut self, rbp: u8) -> Result<Ast, JmespathError> {
        let mut left = self.parse_nud()?;
        while rbp < led_bp(self.peek()) {
            left = self.parse_led(left)?;
        }
        Ok(left)
    }

    fn parse_nud(&mut self) -> Result<Ast, JmespathError> {
        match self.peek().clone() {
            Token::At => {
                self.advance();
                Ok(Ast::Identity)
            }
            Token::Dollar => {
                self.advance();
                Ok(Ast::Root)
            }
            Token::Identifier(name) => {
                self.advance();
                if *self.peek() == Token::LParen {
                    self.parse_function_call(name)
                } else {
                    Ok(Ast::Field(name))
                }
            }
            Token::QuotedIdentifier(name) => {
                self.advance();
                Ok(Ast::Field(name))
            }
            Token::RawString(s) => {
                self.advance();
                Ok(Ast::Literal(crate::value::Value::string(s)))
            }
            Token::Literal(v) => {
                self.advance();
                Ok(Ast::Literal(v))
            }
            Token::Not => {
                self.advance();
                let operand = self.parse_expr(6)?;
                Ok(Ast::Not(Box::new(operand)))
            }
            Token::Star => {
                self.advance();
                let rhs = self.parse_projection_rhs(8)?;
                Ok(Ast::ObjectProjection(Box::new(Ast::Identity), Box::new(rhs)))
            }
            Token::LBracket => self.parse_bracket_nud(),
            Token::Flatten => {
                self.advance();
                self.parse_flatten_tail(Ast::Identity)
            }
            Token::LBrace => self.parse_multi_select_hash(),
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                if *self.peek() != Token::RParen {
                    return Err(self.err("expected ')'"));
                }
                self.advance();
                Ok(inner)
            }
            Token::Ampersand => {
                self.advance();
                let source_start = self.pos;
                let inner = self.parse_expr(9)?;
                let text = self.slice_source_from(source_start);
                Ok(Ast::ExpressionRefNode(Arc::new(inner), text))
            }
            Token::Eof => Err(self.err("unexpected end of expression")),
            other => Err(self.err(format!("unexpected token {}", other.describe()))),
        }
    }

    fn parse_led(&mut self, left: Ast) -> Result<Ast, JmespathError> {
        match self.peek().clone() {
            Token::Dot => {
                self.advance();
                let rhs = self.parse_dot_rhs()?;
                Ok(Ast::Subexpression(Box::new(left), Box::new(rhs)))
            }
            Token::Pipe => {
                self.advance();
                let rhs = self.parse_expr(led_bp(&Token::Pipe))?;
                Ok(Ast::Pipe(Box::new(left), Box::new(rhs)))
            }
            Token::Or => {
                self.advance();
                let rhs = self.parse_expr(led_bp(&Token::Or))?;
                Ok(Ast::Or(Box::new(left), Box::new(rhs)))
            }
            Token::And => {
                self.advance();
                let rhs = self.parse_expr(led_bp(&Token::And))?;
                Ok(Ast::And(Box::new(left), Box::new(rhs)))
            }
            Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge => {
                let cmp = match self.advance() {
                    Token::Eq => Comparator::Eq,
                    Token::Ne => Comparator::Ne,
                    Token::Lt => Comparator::Lt,
                    Token::Le => Comparator::Le,
                    Token::Gt => Comparator::Gt,
                    Token::Ge => Comparator::Ge,
                    _ => unreachable!(),
                };
                let rhs = self.parse_expr(led_bp(&Token::Eq))?;
                Ok(Ast::Comparison(cmp, Box::new(left), Box::new(rhs)))
            }
            Token::Flatten => {
                self.advance();
                self.parse_flatten_tail(left)
            }
            Token::LBracket => {
                self.advance();
                self.parse_bracket_led(left)
            }
            Token::FilterOpen => self.parse_filter(left),
            other => Err(self.err(format!("unexpected token {}", other.describe()))),
        }
    }

    /// The right-hand side of a `.`: identifiers, `*`, `{`, `[`, `&expr`.
    /// `a.[b, c]` is a multi-select-list directly after the dot, not a
    /// bracket applied to whatever `a.` would otherwise parse to.
    fn parse_dot_rhs(&mut self) -> Result<Ast, JmespathError> {
        match self.peek().clone() {
            Token::LBracket => {
                self.advance();
                self.parse_multi_select_list_or_index_body()
            }
            Token::Star => {
                self.advance();
                let rhs = self.parse_projection_rhs(8)?;
                Ok(Ast::ObjectProjection(Box::new(Ast::Identity), Box::new(rhs)))
            }
            _ => self.parse_expr(10),
        }
    }

    /// After `[*]`, `[?pred]`, `a[]`, or a bare slice, absorb the remainder
    /// of the expression as the projection body, stopping at anything
    /// binding looser than a dot/bracket (notably a pipe).
    fn parse_projection_rhs(&mut self, min_bp: u8) -> Result<Ast, JmespathError> {
        match self.peek().clone() {
            Token::Dot => {
                self.advance();
                self.parse_dot_rhs()
            }
            Token::LBracket => {
                self.advance();
                self.parse_bracket_led(Ast::Identity)
            }
            Token::FilterOpen => self.parse_filter(Ast::Identity),
            Token::Flatten => {
                self.advance();
                self.parse_flatten_tail(Ast::Identity)
            }
            other if led_bp(&other) < min_bp => Ok(Ast::Identity),
            other => Err(self.err(format!(
                "unexpected token in projection: {}",
                other.describe()
            ))),
        }
    }

    fn parse_flatten_tail(&mut self, left: Ast) -> Result<Ast, JmespathError> {
        let rhs = self.parse_projection_rhs(9)?;
        Ok(Ast::ArrayProjection(
            Box::new(Ast::Flatten(Box::new(left))),
            Box::new(rhs),
        ))
    }

    /// `[?predicate]right`.
    fn parse_filter(&mut self, left: Ast) -> Result<Ast, JmespathError> {
        self.advance(); // consume `[?`
        let predicate = self.parse_expr(0)?;
        if *self.peek() != Token::RBracket {
            return Err(self.err("expected ']' to close filter expression"));
        }
        self.advance();
        let rhs = self.parse_projection_rhs(8)?;
        Ok(Ast::FilterProjection(
            Box::new(left),
            Box::new(predicate),
            Box::new(rhs),
        ))
    }

    /// `[` in nud position: `[0]`, `[*]`, `[a, b]`, `[0:1]`, `[?pred]`.
    fn parse_bracket_nud(&mut self) -> Result<Ast, JmespathError> {
        self.advance(); // consume `[`
        match self.peek().clone() {
            Token::Star => {
                self.advance();
                if *self.peek() != Token::RBracket {
                    return Err(self.err("expected ']' after '[*'"));
                }
                self.advance();
                let rhs = self.parse_projection_rhs(8)?;
                Ok(Ast::ArrayProjection(Box::new(Ast::Identity), Box::new(rhs)))
            }
            Token::Number(_) | Token::Colon => self.parse_index_or_slice(Ast::Identity),
            Token::FilterOpen => self.parse_filter_already_open(Ast::Identity),
            _ => self.parse_multi_select_list_or_index_body(),
        }
    }

    /// `left[...]` in led position.
    fn parse_bracket_led(&mut self, left: Ast) -> Result<Ast, JmespathError> {
        match self.peek().clone() {
            Token::Star => {
                self.advance();
                if *self.peek() != Token::RBracket {
                    return Err(self.err("expected ']' after '[*'"));
                }
                self.advance();
                let rhs = self.parse_projection_rhs(8)?;
                Ok(Ast::ArrayProjection(Box::new(left), Box::new(rhs)))
            }
            Token::Number(_) | Token::Colon => self.parse_index_or_slice(left),
            _ => Err(self.err("expected a number, ':' or '*' after '['")),
        }
    }

    /// Parses `N`, `:`, `N:M`, `N:M:S`, etc. after having already seen `[`
    /// (and optionally a preceding `left`). If no `:` is found this is a
    /// plain index; otherwise it is a slice, which always produces a
    /// projection over its right-hand side.
    fn parse_index_or_slice(&mut self, left: Ast) -> Result<Ast, JmespathError> {
        let mut parts: [SlicePart; 3] = [None, None, None];
        let mut colons = 0usize;
        loop {
            match self.peek().clone() {
                Token::Number(n) => {
                    parts[colons] = Some(n);
                    self.advance();
                }
                Token::Colon => {
                    colons += 1;
                    if colons > 2 {
                        return Err(self.err("too many colons in slice expression"));
                    }
                    self.advance();
                }
                Token::RBracket => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.err(format!(
                        "expected a number, ':' or ']' in index expression, found {}",
                        other.describe()
                    )))
                }
            }
        }

        if colons == 0 {
            let idx = parts[0].ok_or_else(|| self.err("empty index expression"))?;
            // A bare `[N]` is a simple index only in nud position with an
            // implicit Identity left; with an explicit left it is
            // `left[N]`, evaluated the same way by Subexpression-like
            // chaining, so we fold it the same: Subexpression(left, Index).
            return Ok(match left {
                Ast::Identity => Ast::Index(idx),
                other => Ast::Subexpression(Box::new(other), Box::new(Ast::Index(idx))),
            });
        }

        let rhs = self.parse_projection_rhs(8)?;
        Ok(Ast::SliceProjection(
            Box::new(left),
            parts[0],
            parts[1],
            parts[2],
            Box::new(rhs),
        ))
    }

    /// `[?` already current token — used when nud sees a filter with an
    /// implicit Identity left (`[?foo]`).
    fn parse_filter_already_open(&mut self, left: Ast) -> Result<Ast, JmespathError> {
        self.parse_filter(left)
    }

    /// After `[` when the contents are not a number/colon/star: either a
    /// multi-select-list `[a, b]` or — degenerate single-element case is
    /// still a multi-select-list of one.
    fn parse_multi_select_list_or_index_body(&mut self) -> Result<Ast, JmespathError> {
        if *self.peek() == Token::RBracket {
            self.advance();
            return Ok(Ast::MultiSelectList(Vec::new()));
        }
        let mut items = Vec::new();
        loop {
            items.push(self.parse_expr(0)?);
            match self.peek().clone() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBracket => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.err(format!(
                        "expected ',' or ']' in multi-select list, found {}",
                        other.describe()
                    )))
                }
            }
        }
        Ok(Ast::MultiSelectList(items))
    }

    fn parse_multi_select_hash(&mut self) -> Result<Ast, JmespathError> {
        self.advance(); // consume `{`
        let mut pairs = Vec::new();
        if *self.peek() == Token::RBrace {
            self.advance();
            return Ok(Ast::MultiSelectHash(pairs));
        }
        loop {
            let key = match self.advance() {
                Token::Identifier(name) => name,
                Token::QuotedIdentifier(name) => name,
                other => {
                    return Err(self.err(format!(
                        "expected an identifier key in multi-select hash, found {}",
                        other.describe()
                    )))
                }
            };
            if *self.peek() != Token::Colon {
                return Err(self.err("expected ':' after multi-select hash key"));
            }
            self.advance();
            let value = self.parse_expr(0)?;
            pairs.push(HashPair { key, value });
            match self.peek().clone() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBrace => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.err(format!(
                        "expected ',' or '}}' in multi-select hash, found {}",
                        other.describe()
                    )))
                }
            }
        }
        Ok(Ast::MultiSelectHash(pairs))
    }

    fn parse_function_call(&mut self, name: String) -> Result<Ast, JmespathError> {
        self.advance(); // consume `(`
        let mut args = Vec::new();
        if *self.peek() == Token::RParen {
            self.advance();
            return Ok(Ast::Function(name, args));
        }
        loop {
            args.push(self.parse_expr(0)?);
            match self.peek().clone() {
                Token::Comma => {
                    self.advance();
                }
                Token::RParen => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.err(format!(
                        "expected ',' or ')' in function call, found {}",
                        other.describe()
                    )))
                }
            }
        }
        Ok(Ast::Function(name, args))
    }

    /// Reconstructs the source text an `&expr` covered, for embedding in
    /// the resulting `ExpressionRef` (used for error messages if the
    /// referenced expression later fails to evaluate).
    fn slice_source_from(&self, start_token: usize) -> Arc<str> {
        let start_col = self.tokens.get(start_token).map(|s| s.column).unwrap_or(0);
        let end_col = self
            .tokens
            .get(self.pos)
            .map(|s| s.column)
            .unwrap_or(self._source.len());
        let end_col = end_col.max(start_col);
        Arc::from(self._source[start_col..end_col].trim())
    }
}
