// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Recursive-descent parser. There is no intermediate syntax tree: each
//! production calls straight into [`crate::codegen::FunctionCg`] as it
//! recognizes the construct, so parsing and bytecode emission happen in
//! the same pass. One token of lookahead backed by a fully materialized
//! token vector — backtracking (telling an `assign` target apart from a
//! plain `cond`) is just saving and restoring an index into it.

use crate::codegen::{CompiledObject, FunctionCg, ACC, OPD};
use crate::lexer::{self, Token, TokenKind};
use orbit_runtime::program::{Op, Program};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("line {line}: {message}")]
    Syntax { line: u32, message: String },
    #[error("line {line}: unknown variable '{name}'")]
    UndefinedVariable { line: u32, name: String },
    #[error("line {line}: 'break' used outside a loop")]
    BreakOutsideLoop { line: u32 },
    #[error("line {line}: 'continue' used outside a loop")]
    ContinueOutsideLoop { line: u32 },
    #[error(transparent)]
    Lex(#[from] lexer::LexError),
}

/// Compile one source file's worth of `object` declarations.
pub fn compile(source: &str) -> Result<Vec<CompiledObject>, CompileError> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut objects = Vec::new();
    while !parser.check(&TokenKind::Eof) {
        objects.push(parser.parse_object()?);
    }
    Ok(objects)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn syntax_error(&self, message: String) -> CompileError {
        CompileError::Syntax { line: self.peek_line(), message }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(format!("expected {kind:?}, found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.syntax_error(format!("expected identifier, found {other:?}"))),
        }
    }

    // -- object / member level -------------------------------------------

    fn parse_object(&mut self) -> Result<CompiledObject, CompileError> {
        self.expect(TokenKind::Object)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let heap_vars = self.prescan_heap_vars();
        let mut ctor = FunctionCg::new(0, &heap_vars);
        let mut state_programs = Vec::new();
        let mut fun_programs = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            match self.peek().clone() {
                TokenKind::Var => self.compile_heap_var_decl(&mut ctor)?,
                TokenKind::State => state_programs.push(self.parse_state(&heap_vars)?),
                TokenKind::Fun => fun_programs.push(self.parse_fun(&heap_vars)?),
                other => return Err(self.syntax_error(format!("expected a member declaration, found {other:?}"))),
            }
        }
        self.expect(TokenKind::RBrace)?;

        let mut programs = vec![("__ssconstructor".to_string(), ctor.finish())];
        programs.extend(state_programs);
        programs.extend(fun_programs);
        Ok(CompiledObject { name, programs })
    }

    /// Walk the object body without moving the real parser cursor,
    /// assigning each `var` declaration a heap address in the order it
    /// will be `Op::HeapAlloc`'d at runtime (the allocator hands out
    /// cells in call order, so declaration order IS address order).
    /// Function/state bodies are skipped as opaque balanced-brace
    /// regions; a `var`'s initializer is skipped up to its terminating
    /// `;`, which never occurs inside an expression in this grammar.
    fn prescan_heap_vars(&self) -> HashMap<String, usize> {
        let mut vars = HashMap::new();
        let mut i = self.pos;
        let mut depth = 0i32;
        while i < self.tokens.len() {
            match &self.tokens[i].kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Var if depth == 0 => {
                    if let Some(Token { kind: TokenKind::Ident(name), .. }) = self.tokens.get(i + 1) {
                        let addr = vars.len();
                        vars.entry(name.clone()).or_insert(addr);
                    }
                    while i < self.tokens.len() && self.tokens[i].kind != TokenKind::Semi {
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        vars
    }

    fn compile_heap_var_decl(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::Var)?;
        let name = self.expect_ident()?;
        cg.emit(Op::HeapAlloc, ACC, 0, 0);
        if self.eat(&TokenKind::Assign) {
            self.parse_expr(cg)?;
        } else {
            cg.load_null();
        }
        cg.store_var(&name);
        self.expect(TokenKind::Semi)?;
        Ok(())
    }

    fn parse_state(&mut self, heap_vars: &HashMap<String, usize>) -> Result<(String, Program), CompileError> {
        self.expect(TokenKind::State)?;
        let name = self.expect_ident()?;
        let mut cg = FunctionCg::new(0, heap_vars);
        self.parse_block_body(&mut cg)?;
        Ok((format!("state:{name}"), cg.finish()))
    }

    fn parse_fun(&mut self, heap_vars: &HashMap<String, usize>) -> Result<(String, Program), CompileError> {
        self.expect(TokenKind::Fun)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_ident()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let mut cg = FunctionCg::new(params.len(), heap_vars);
        let argc = params.len();
        for (i, p) in params.iter().enumerate() {
            cg.declare_param(p, i, argc);
        }
        self.parse_block_body(&mut cg)?;
        Ok((name, cg.finish()))
    }

    /// `'{' stmt* '}'`, without opening a redundant extra block scope —
    /// the function/state body already IS the outermost block.
    fn parse_block_body(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::LBrace)?;
        while !self.check(&TokenKind::RBrace) {
            self.parse_stmt(cg)?;
        }
        self.expect(TokenKind::RBrace)?;
        Ok(())
    }

    // -- statements --------------------------------------------------------

    fn parse_stmt(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        match self.peek().clone() {
            TokenKind::LBrace => {
                cg.push_block();
                self.parse_block_body(cg)?;
                cg.pop_block();
                Ok(())
            }
            TokenKind::Var => self.parse_local_var_decl(cg),
            TokenKind::If => self.parse_if(cg),
            TokenKind::While => self.parse_while(cg),
            TokenKind::For => self.parse_for(cg),
            TokenKind::Foreach => self.parse_foreach(cg),
            TokenKind::Break => {
                let line = self.peek_line();
                self.advance();
                self.expect(TokenKind::Semi)?;
                let label = cg.current_break().ok_or(CompileError::BreakOutsideLoop { line })?;
                cg.emit(Op::Jmp, label as i32, 0, 0);
                Ok(())
            }
            TokenKind::Continue => {
                let line = self.peek_line();
                self.advance();
                self.expect(TokenKind::Semi)?;
                let label = cg.current_continue().ok_or(CompileError::ContinueOutsideLoop { line })?;
                cg.emit(Op::Jmp, label as i32, 0, 0);
                Ok(())
            }
            TokenKind::Return => {
                self.advance();
                if self.check(&TokenKind::Semi) {
                    cg.load_null();
                } else {
                    self.parse_expr(cg)?;
                }
                self.expect(TokenKind::Semi)?;
                cg.emit(Op::Ret, 0, 0, 0);
                Ok(())
            }
            TokenKind::Semi => {
                self.advance();
                Ok(())
            }
            _ => {
                self.parse_expr(cg)?;
                self.expect(TokenKind::Semi)?;
                Ok(())
            }
        }
    }

    fn parse_local_var_decl(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::Var)?;
        let name = self.expect_ident()?;
        if self.eat(&TokenKind::Assign) {
            self.parse_expr(cg)?;
        } else {
            cg.load_null();
        }
        cg.declare_local(&name);
        cg.store_var(&name);
        self.expect(TokenKind::Semi)?;
        Ok(())
    }

    fn parse_if(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        self.parse_expr(cg)?;
        self.expect(TokenKind::RParen)?;

        cg.emit(Op::Test, ACC, 0, 0);
        let else_label = cg.create_label();
        cg.emit(Op::Je, else_label as i32, 0, 0);

        cg.push_block();
        self.parse_stmt(cg)?;
        cg.pop_block();

        if self.eat(&TokenKind::Else) {
            let end_label = cg.create_label();
            cg.emit(Op::Jmp, end_label as i32, 0, 0);
            cg.bind_label(else_label);
            cg.push_block();
            self.parse_stmt(cg)?;
            cg.pop_block();
            cg.bind_label(end_label);
        } else {
            cg.bind_label(else_label);
        }
        Ok(())
    }

    fn parse_while(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::While)?;
        let top = cg.create_label();
        let end = cg.create_label();
        cg.bind_label(top);

        self.expect(TokenKind::LParen)?;
        self.parse_expr(cg)?;
        self.expect(TokenKind::RParen)?;
        cg.emit(Op::Test, ACC, 0, 0);
        cg.emit(Op::Je, end as i32, 0, 0);

        cg.enter_loop(top, end);
        cg.push_block();
        self.parse_stmt(cg)?;
        cg.pop_block();
        cg.exit_loop();

        cg.emit(Op::Jmp, top as i32, 0, 0);
        cg.bind_label(end);
        Ok(())
    }

    fn parse_for(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        cg.push_block();
        if self.check(&TokenKind::Var) {
            self.parse_local_var_decl(cg)?;
        } else if !self.eat(&TokenKind::Semi) {
            self.parse_expr(cg)?;
            self.expect(TokenKind::Semi)?;
        }

        let top = cg.create_label();
        let end = cg.create_label();
        let continue_label = cg.create_label();
        cg.bind_label(top);
        if !self.check(&TokenKind::Semi) {
            self.parse_expr(cg)?;
            cg.emit(Op::Test, ACC, 0, 0);
            cg.emit(Op::Je, end as i32, 0, 0);
        }
        self.expect(TokenKind::Semi)?;

        // The increment clause reads left-to-right here but must run
        // *after* the body, so its tokens are parked and re-parsed at
        // the continue point instead of being compiled in place.
        let has_increment = !self.check(&TokenKind::RParen);
        let inc_start = self.pos;
        if has_increment {
            self.skip_balanced_until_rparen();
        }
        let inc_end = self.pos;
        self.expect(TokenKind::RParen)?;

        cg.enter_loop(continue_label, end);
        self.parse_stmt(cg)?;
        cg.exit_loop();
        let after_body = self.pos;

        cg.bind_label(continue_label);
        if has_increment {
            self.pos = inc_start;
            self.parse_expr(cg)?;
            debug_assert_eq!(self.pos, inc_end, "for-increment re-parse consumed a different token range");
        }
        self.pos = after_body;

        cg.emit(Op::Jmp, top as i32, 0, 0);
        cg.bind_label(end);
        cg.pop_block();
        Ok(())
    }

    /// Advance past one expression without emitting anything, stopping
    /// at the next unmatched `)`.
    fn skip_balanced_until_rparen(&mut self) {
        let mut depth = 0i32;
        loop {
            match self.peek() {
                TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen if depth == 0 => break,
                TokenKind::RParen | TokenKind::RBracket => {
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Eof => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_foreach(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::Foreach)?;
        self.expect(TokenKind::LParen)?;
        let var_name = self.expect_ident()?;
        self.expect(TokenKind::In)?;

        cg.push_block();
        self.parse_expr(cg)?;
        let array_slot = cg.declare_local("__foreach_array");
        cg.store_var("__foreach_array");
        cg.load_number(0.0);
        let index_slot = cg.declare_local("__foreach_index");
        cg.store_var("__foreach_index");
        cg.declare_local(&var_name);
        self.expect(TokenKind::RParen)?;

        let top = cg.create_label();
        let end = cg.create_label();
        let continue_label = cg.create_label();
        cg.bind_label(top);

        // index < array.getLength()
        cg.emit(Op::StackPeek, ACC, array_slot, 0);
        cg.emit(Op::Push, ACC, 0, 0);
        cg.push_temp();
        cg.emit_call("getLength", 0);
        cg.emit(Op::Push, ACC, 0, 0); // save length
        cg.emit(Op::StackPeek, ACC, index_slot, 0);
        cg.emit(Op::Pop, OPD, 0, 0); // OPD := length
        cg.emit(Op::Cmp, ACC, OPD, 0); // compare(index, length)
        cg.emit(Op::Jge, end as i32, 0, 0);

        // var_name := array.get(index)
        cg.emit(Op::StackPeek, ACC, array_slot, 0);
        cg.emit(Op::Push, ACC, 0, 0);
        cg.push_temp();
        cg.emit(Op::StackPeek, ACC, index_slot, 0);
        cg.emit(Op::Push, ACC, 0, 0);
        cg.emit_call("get", 1);
        cg.store_var(&var_name);

        cg.enter_loop(continue_label, end);
        self.parse_stmt(cg)?;
        cg.exit_loop();

        cg.bind_label(continue_label);
        cg.emit(Op::StackPeek, ACC, index_slot, 0);
        cg.emit(Op::Inc, ACC, 0, 0);
        cg.emit(Op::StackPoke, ACC, index_slot, 0);
        cg.emit(Op::Jmp, top as i32, 0, 0);
        cg.bind_label(end);
        cg.pop_block();
        Ok(())
    }

    // -- expressions ---------------------------------------------------

    fn parse_expr(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_assign(cg)
    }

    fn is_assign_op(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Assign
                | TokenKind::PlusAssign
                | TokenKind::MinusAssign
                | TokenKind::StarAssign
                | TokenKind::SlashAssign
                | TokenKind::PercentAssign
        )
    }

    fn parse_assign(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        if let TokenKind::Ident(name) = self.peek().clone() {
            let save = self.pos;
            self.advance();
            if Self::is_assign_op(self.peek()) {
                let op = self.advance().kind;
                if !cg.has_binding(&name) {
                    return Err(self.syntax_error(format!("unknown variable '{name}'")));
                }
                self.parse_assign(cg)?; // right-associative; leaves rhs in ACC
                if op != TokenKind::Assign {
                    cg.emit(Op::Push, ACC, 0, 0); // save rhs
                    cg.load_var(&name);
                    cg.emit(Op::Pop, OPD, 0, 0); // OPD := rhs, ACC := current value
                    let arith = match op {
                        TokenKind::PlusAssign => Op::Add,
                        TokenKind::MinusAssign => Op::Sub,
                        TokenKind::StarAssign => Op::Mul,
                        TokenKind::SlashAssign => Op::Div,
                        TokenKind::PercentAssign => Op::Mod,
                        _ => unreachable!(),
                    };
                    cg.emit(arith, ACC, OPD, 0);
                }
                cg.store_var(&name);
                return Ok(());
            }
            self.pos = save;
        }
        self.parse_cond(cg)
    }

    fn parse_cond(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_logor(cg)?;
        if self.eat(&TokenKind::Question) {
            cg.emit(Op::Test, ACC, 0, 0);
            let else_label = cg.create_label();
            let end_label = cg.create_label();
            cg.emit(Op::Je, else_label as i32, 0, 0);
            self.parse_expr(cg)?;
            cg.emit(Op::Jmp, end_label as i32, 0, 0);
            self.expect(TokenKind::Colon)?;
            cg.bind_label(else_label);
            self.parse_cond(cg)?;
            cg.bind_label(end_label);
        }
        Ok(())
    }

    /// Shared shape for every left-associative binary level: parse one
    /// higher-precedence operand, then while the next token is one of
    /// `ops`, push it, parse another operand, and combine.
    fn parse_binary_level(
        &mut self,
        cg: &mut FunctionCg,
        ops: &[TokenKind],
        mut higher: impl FnMut(&mut Self, &mut FunctionCg) -> Result<(), CompileError>,
    ) -> Result<(), CompileError> {
        higher(self, cg)?;
        loop {
            let op = self.peek().clone();
            if !ops.contains(&op) {
                break;
            }
            self.advance();
            cg.emit(Op::Push, ACC, 0, 0);
            higher(self, cg)?;
            cg.combine_binary(&op);
        }
        Ok(())
    }

    fn parse_logor(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_binary_level(cg, &[TokenKind::OrOr], Self::parse_logand)
    }

    fn parse_logand(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_binary_level(cg, &[TokenKind::AndAnd], Self::parse_equality)
    }

    fn parse_equality(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_relational(cg)?;
        loop {
            let op = self.peek().clone();
            if !matches!(op, TokenKind::Eq | TokenKind::Ne) {
                break;
            }
            self.advance();
            cg.emit(Op::Push, ACC, 0, 0);
            self.parse_relational(cg)?;
            cg.combine_compare(&op);
        }
        Ok(())
    }

    fn parse_relational(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_additive(cg)?;
        loop {
            let op = self.peek().clone();
            if !matches!(op, TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge) {
                break;
            }
            self.advance();
            cg.emit(Op::Push, ACC, 0, 0);
            self.parse_additive(cg)?;
            cg.combine_compare(&op);
        }
        Ok(())
    }

    fn parse_additive(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_binary_level(cg, &[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_binary_level(cg, &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent], Self::parse_unary)
    }

    fn parse_unary(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        match self.peek().clone() {
            TokenKind::Not => {
                self.advance();
                self.parse_unary(cg)?;
                cg.emit(Op::Not, ACC, 0, 0);
                Ok(())
            }
            TokenKind::Minus => {
                self.advance();
                self.parse_unary(cg)?;
                cg.emit(Op::Neg, ACC, 0, 0);
                Ok(())
            }
            TokenKind::TypeOf => {
                self.advance();
                self.parse_unary(cg)?;
                cg.emit(Op::TypeOf, ACC, 0, 0);
                Ok(())
            }
            TokenKind::Inc | TokenKind::Dec => {
                let op = self.advance().kind;
                let name = self.expect_ident()?;
                if !cg.has_binding(&name) {
                    return Err(self.syntax_error(format!("unknown variable '{name}'")));
                }
                cg.load_var(&name);
                cg.emit(if op == TokenKind::Inc { Op::Inc } else { Op::Dec }, ACC, 0, 0);
                cg.store_var(&name);
                Ok(())
            }
            _ => self.parse_postfix(cg),
        }
    }

    fn parse_postfix(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.parse_primary(cg)?;
        loop {
            match self.peek().clone() {
                TokenKind::Dot => {
                    self.advance();
                    let method = self.expect_ident()?;
                    cg.emit(Op::Push, ACC, 0, 0);
                    cg.push_temp();
                    let argc = if self.eat(&TokenKind::LParen) {
                        let n = self.parse_args(cg)?;
                        self.expect(TokenKind::RParen)?;
                        n
                    } else {
                        0 // `a.length` is sugar for `a.length()`
                    };
                    cg.emit_call(&method, argc);
                }
                TokenKind::Inc | TokenKind::Dec => {
                    // Only bare identifiers support `++`/`--`, handled in
                    // `parse_unary` as a prefix form; the result of a
                    // `.method()`/`[index]` chain isn't addressable.
                    return Err(self.syntax_error("'++'/'--' can only be applied to a variable name".to_string()));
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// `(expr (',' expr)*)?`, each argument pushed in order, returning
    /// the count.
    fn parse_args(&mut self, cg: &mut FunctionCg) -> Result<usize, CompileError> {
        let mut argc = 0;
        if !self.check(&TokenKind::RParen) {
            loop {
                self.parse_expr(cg)?;
                cg.emit(Op::Push, ACC, 0, 0);
                argc += 1;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(argc)
    }

    fn parse_primary(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        match self.peek().clone() {
            TokenKind::Number(n) => {
                self.advance();
                cg.load_number(n);
                Ok(())
            }
            TokenKind::Str(s) => {
                self.advance();
                cg.load_string(&s);
                Ok(())
            }
            TokenKind::True => {
                self.advance();
                cg.load_bool(true);
                Ok(())
            }
            TokenKind::False => {
                self.advance();
                cg.load_bool(false);
                Ok(())
            }
            TokenKind::Null => {
                self.advance();
                cg.load_null();
                Ok(())
            }
            TokenKind::This => {
                self.advance();
                cg.load_this();
                Ok(())
            }
            TokenKind::LParen => {
                self.advance();
                self.parse_expr(cg)?;
                self.expect(TokenKind::RParen)?;
                Ok(())
            }
            TokenKind::LBracket => self.parse_array_literal(cg),
            TokenKind::Ident(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    // a bare call is always dispatched on `this`
                    cg.load_this();
                    cg.emit(Op::Push, ACC, 0, 0);
                    cg.push_temp();
                    self.advance();
                    let argc = self.parse_args(cg)?;
                    self.expect(TokenKind::RParen)?;
                    cg.emit_call(&name, argc);
                } else if cg.has_binding(&name) {
                    cg.load_var(&name);
                } else if name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    // A capitalized identifier that isn't a declared
                    // variable names one of the fixed system objects
                    // (`Console`, `Application`, `System`, ...).
                    cg.load_global(&name);
                } else {
                    return Err(self.syntax_error(format!("unknown variable '{name}'")));
                }
                Ok(())
            }
            other => Err(self.syntax_error(format!("unexpected token {other:?}"))),
        }
    }

    fn parse_array_literal(&mut self, cg: &mut FunctionCg) -> Result<(), CompileError> {
        self.expect(TokenKind::LBracket)?;

        cg.load_this();
        cg.emit(Op::Push, ACC, 0, 0);
        cg.push_temp();
        cg.load_string("Array");
        cg.emit(Op::Push, ACC, 0, 0);
        cg.emit_call("spawn", 1);
        cg.push_temp(); // the new Array's handle, held across every element's push() call

        if !self.check(&TokenKind::RBracket) {
            loop {
                cg.load_temp();
                cg.emit(Op::Push, ACC, 0, 0);
                cg.push_temp();
                self.parse_expr(cg)?;
                cg.emit(Op::Push, ACC, 0, 0);
                cg.emit_call("push", 1);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket)?;
        cg.load_temp();
        cg.pop_temp();
        Ok(())
    }
}
