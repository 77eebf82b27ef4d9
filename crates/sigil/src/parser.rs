// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Hand-written recursive-descent parser building the [`crate::ast::TemplateAst`]
//! defined in [`crate::ast`] directly from the grammar, with no parser
//! generator or intermediate C-ABI construction layer in between.
//!
//! On any grammar failure, [`parse`] returns an [`Err`] and the caller
//! ([`crate::template::Template`]) degrades the template to the
//! distinguished syntax-error sentinel, keeping the evaluator total.

use crate::ast::{ElseIf, Node, ObjectMember, TemplateAst};
use crate::lexer::{LexError, Lexer, Token};
use crate::value::BinaryOp;

/// A parse failure. Carries no recovery information: the grammar in
/// `SPEC_FULL.md` §4.C treats any failure as total, collapsing the whole
/// template to the syntax-error sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// A human-readable description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError { message: e.message }
    }
}

type PResult<T> = Result<T, ParseError>;

/// Parses `source` into a [`TemplateAst`], or a [`ParseError`] on any
/// grammar failure.
pub fn parse(source: &str) -> PResult<TemplateAst> {
    let mut parser = Parser {
        lexer: Lexer::new(source),
    };
    let body = parser.parse_template(false)?;
    Ok(TemplateAst::new(body))
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    /// `template := (html | directive)*`
    ///
    /// `in_body` is `true` when parsing the contents of a block body, so an
    /// unescaped `}` terminates the run (handed back uninterpreted to the
    /// caller) instead of being read as literal text.
    fn parse_template(&mut self, in_body: bool) -> PResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            if let Some(text) = self.lexer.next_html_text(in_body) {
                if !text.is_empty() {
                    nodes.push(Node::HtmlText(text));
                }
            }
            if in_body && self.lexer.at_rbrace() {
                break;
            }
            if self.lexer.at_directive() {
                self.lexer.bump_at();
                nodes.push(self.parse_directive()?);
                continue;
            }
            break;
        }
        Ok(nodes)
    }

    /// `directive := "@" (block | exprAt)`
    fn parse_directive(&mut self) -> PResult<Node> {
        let save = self.lexer.offset();
        let token = self.lexer.next_directive_token()?;

        if let Token::Ident(ref name) = token {
            match name.as_str() {
                "if" => return self.parse_if_block(),
                "unless" => return self.parse_unless_block(),
                "for" => return self.parse_for_block(),
                _ => {}
            }
        }

        self.lexer.seek(save);
        self.parse_expr_at()
    }

    /// `exprAt := "{" expr "}" | call | varRef`
    fn parse_expr_at(&mut self) -> PResult<Node> {
        let save = self.lexer.offset();
        let token = self.lexer.next_directive_token()?;
        if token == Token::LBrace {
            let expr = self.parse_expr()?;
            self.expect(Token::RBrace)?;
            return Ok(expr);
        }
        self.lexer.seek(save);
        self.parse_call_or_var_ref()
    }

    /// `body := "{" template "}"`
    fn parse_body(&mut self) -> PResult<Vec<Node>> {
        self.expect(Token::LBrace)?;
        let body = self.parse_template(true)?;
        self.lexer.bump_rbrace();
        Ok(body)
    }

    /// `ifBlock := "if" "(" expr ")" body ( "else" "if" "(" expr ")" body )* ( "else" body )?`
    fn parse_if_block(&mut self) -> PResult<Node> {
        self.expect(Token::LParen)?;
        let cond = Box::new(self.parse_expr()?);
        self.expect(Token::RParen)?;
        let then = self.parse_body()?;

        let mut elseif_chain = Vec::new();
        let mut else_branch = None;
        loop {
            let save = self.lexer.offset();
            match self.lexer.next_directive_token()? {
                Token::Ident(ref kw) if kw == "else" => {
                    let save2 = self.lexer.offset();
                    match self.lexer.next_directive_token()? {
                        Token::Ident(ref kw2) if kw2 == "if" => {
                            self.expect(Token::LParen)?;
                            let cond = self.parse_expr()?;
                            self.expect(Token::RParen)?;
                            let body = self.parse_body()?;
                            elseif_chain.push(ElseIf { cond, body });
                        }
                        _ => {
                            self.lexer.seek(save2);
                            else_branch = Some(self.parse_body()?);
                            break;
                        }
                    }
                }
                _ => {
                    self.lexer.seek(save);
                    break;
                }
            }
        }

        Ok(Node::If {
            cond,
            then,
            elseif_chain,
            else_branch,
        })
    }

    /// `unlessBlk := "unless" "(" expr ")" body ( "else" body )?`
    fn parse_unless_block(&mut self) -> PResult<Node> {
        self.expect(Token::LParen)?;
        let cond = Box::new(self.parse_expr()?);
        self.expect(Token::RParen)?;
        let then = self.parse_body()?;

        let save = self.lexer.offset();
        let else_branch = match self.lexer.next_directive_token()? {
            Token::Ident(ref kw) if kw == "else" => Some(self.parse_body()?),
            _ => {
                self.lexer.seek(save);
                None
            }
        };

        Ok(Node::Unless {
            cond,
            then,
            else_branch,
        })
    }

    /// `forBlock := "for" "(" IDENT "in" expr ")" body`
    fn parse_for_block(&mut self) -> PResult<Node> {
        self.expect(Token::LParen)?;
        let var_name = self.expect_ident()?;
        self.expect_keyword("in")?;
        let list_expr = Box::new(self.parse_expr()?);
        self.expect(Token::RParen)?;
        let body = self.parse_body()?;

        Ok(Node::ForLoop {
            var_name,
            list_expr,
            body,
        })
    }

    /// `expr := ternary`
    fn parse_expr(&mut self) -> PResult<Node> {
        self.parse_ternary()
    }

    /// `ternary := orExpr ( "?" expr ":" expr )?`
    fn parse_ternary(&mut self) -> PResult<Node> {
        let cond = self.parse_comparison()?;
        let save = self.lexer.offset();
        if self.lexer.next_directive_token()? == Token::Question {
            let then = Box::new(self.parse_expr()?);
            self.expect(Token::Colon)?;
            let else_ = Box::new(self.parse_expr()?);
            return Ok(Node::Ternary {
                cond: Box::new(cond),
                then,
                else_,
            });
        }
        self.lexer.seek(save);
        Ok(cond)
    }

    /// `orExpr := cmpExpr ( ("=="|"!="|">="|">"|"<="|"<") cmpExpr )*`
    fn parse_comparison(&mut self) -> PResult<Node> {
        let mut lhs = self.parse_additive()?;
        loop {
            let save = self.lexer.offset();
            let op = match self.lexer.next_directive_token()? {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::Ne,
                Token::Ge => BinaryOp::Ge,
                Token::Gt => BinaryOp::Gt,
                Token::Le => BinaryOp::Le,
                Token::Lt => BinaryOp::Lt,
                _ => {
                    self.lexer.seek(save);
                    break;
                }
            };
            let rhs = self.parse_additive()?;
            lhs = Node::BinaryExpression {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// `cmpExpr := addExpr ( ("+"|"-") addExpr )*`
    fn parse_additive(&mut self) -> PResult<Node> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let save = self.lexer.offset();
            let op = match self.lexer.next_directive_token()? {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => {
                    self.lexer.seek(save);
                    break;
                }
            };
            let rhs = self.parse_multiplicative()?;
            lhs = Node::BinaryExpression {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// `addExpr := mulExpr ( ("*"|"/") mulExpr )*`
    fn parse_multiplicative(&mut self) -> PResult<Node> {
        let mut lhs = self.parse_primary()?;
        loop {
            let save = self.lexer.offset();
            let op = match self.lexer.next_directive_token()? {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => {
                    self.lexer.seek(save);
                    break;
                }
            };
            let rhs = self.parse_primary()?;
            lhs = Node::BinaryExpression {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// `primary := INT | STRING | objectLit | call | varRef | "(" expr ")"`
    fn parse_primary(&mut self) -> PResult<Node> {
        let save = self.lexer.offset();
        match self.lexer.next_directive_token()? {
            Token::Int(n) => Ok(Node::IntLiteral(n)),
            Token::Str(s) => Ok(Node::StringLiteral(s)),
            Token::LParen => {
                let expr = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::LBrace => {
                self.lexer.seek(save);
                self.parse_object_literal()
            }
            Token::Ident(_) => {
                self.lexer.seek(save);
                self.parse_call_or_var_ref()
            }
            other => Err(ParseError {
                message: format!("unexpected token {other} in expression"),
            }),
        }
    }

    /// `call := IDENT "(" (expr ("," expr)*)? ")" ("." memberTail)?`
    /// `varRef := IDENT ("." memberTail)?`
    fn parse_call_or_var_ref(&mut self) -> PResult<Node> {
        let name = self.expect_ident()?;

        let save = self.lexer.offset();
        if self.lexer.next_directive_token()? == Token::LParen {
            let mut args = Vec::new();
            let save_args = self.lexer.offset();
            if self.lexer.next_directive_token()? != Token::RParen {
                self.lexer.seek(save_args);
                loop {
                    args.push(self.parse_expr()?);
                    let save_comma = self.lexer.offset();
                    if self.lexer.next_directive_token()? != Token::Comma {
                        self.lexer.seek(save_comma);
                        break;
                    }
                }
                self.expect(Token::RParen)?;
            }
            let member = self.parse_optional_member_tail()?;
            return Ok(Node::Helper { name, args, member });
        }
        self.lexer.seek(save);

        let member = self.parse_optional_member_tail()?;
        Ok(Node::Variable { name, member })
    }

    /// `("." memberTail)?` — `memberTail := IDENT ("." IDENT)*`, built as a
    /// right-nested chain of single-step `Variable` nodes.
    fn parse_optional_member_tail(&mut self) -> PResult<Option<Box<Node>>> {
        let save = self.lexer.offset();
        if self.lexer.next_directive_token()? != Token::Dot {
            self.lexer.seek(save);
            return Ok(None);
        }
        let name = self.expect_ident()?;
        let member = self.parse_optional_member_tail()?;
        Ok(Some(Box::new(Node::Variable { name, member })))
    }

    /// `objectLit := "{" (objMember ("," objMember)*)? "}"`
    fn parse_object_literal(&mut self) -> PResult<Node> {
        self.expect(Token::LBrace)?;
        let mut members = Vec::new();

        let save = self.lexer.offset();
        if self.lexer.next_directive_token()? == Token::RBrace {
            return Ok(Node::Object { members });
        }
        self.lexer.seek(save);

        loop {
            let name = self.expect_ident()?;
            self.expect(Token::Colon)?;
            let value = self.parse_expr()?;
            members.push(ObjectMember { name, value });

            let save_comma = self.lexer.offset();
            if self.lexer.next_directive_token()? != Token::Comma {
                self.lexer.seek(save_comma);
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Node::Object { members })
    }

    fn expect(&mut self, expected: Token) -> PResult<()> {
        let got = self.lexer.next_directive_token()?;
        if got == expected {
            Ok(())
        } else {
            Err(ParseError {
                message: format!("expected {expected}, found {got}"),
            })
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.lexer.next_directive_token()? {
            Token::Ident(name) => Ok(name),
            other => Err(ParseError {
                message: format!("expected identifier, found {other}"),
            }),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        match self.lexer.next_directive_token()? {
            Token::Ident(ref name) if name == keyword => Ok(()),
            other => Err(ParseError {
                message: format!("expected `{keyword}`, found {other}"),
            }),
        }
    }
}
