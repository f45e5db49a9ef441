//! Statement parsers, keyword-dispatched.

use crate::expr::unquote;
use crate::{ParseMode, Parser};
use brsc_ast::ast::{
    AccessModifier, AssignmentStatement, ClassField, ClassMethod, ClassStatement, DimStatement,
    Expression, ForEachStatement, ForStatement, FunctionKind, FunctionStatement, IfStatement,
    ImportStatement, Name, NamespaceStatement, Param, PrintStatement, ReturnStatement,
    SetStatement, Statement, TypeExpression, WhileStatement,
};
use brsc_ast::catalog;
use brsc_ast::Diagnostic;
use brsc_lexer::TokenKind;

/// Which block terminator a body parser is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Function,
    /// `if`/`else if` branch: also ends at `else` and `else if`.
    If,
    /// `else` branch: only ends at `end if`.
    IfElse,
    While,
    For,
    Namespace,
    Class,
}

impl Parser {
    pub(crate) fn parse_program(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            self.stream.skip_separators();
            if self.stream.at_end() {
                break;
            }
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    self.stream.synchronize();
                }
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> Result<Statement, Diagnostic> {
        match self.stream.peek_kind() {
            TokenKind::Sub | TokenKind::Function => {
                let func = self.parse_function_declaration(true)?;
                Ok(Statement::FunctionDeclaration(Box::new(func)))
            }
            TokenKind::Namespace if self.stream.peek_nth(1).kind.is_identifier_like() => {
                self.parse_namespace()
            }
            TokenKind::Class if self.stream.peek_nth(1).kind.is_identifier_like() => {
                self.parse_class()
            }
            TokenKind::Import if self.stream.peek_nth(1).kind == TokenKind::StringLiteral => {
                self.parse_import()
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Print | TokenKind::Question => self.parse_print(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Dim => self.parse_dim(),
            TokenKind::Exit => self.parse_exit(),
            TokenKind::Goto => {
                let keyword = self.stream.advance();
                let mut range = keyword.range;
                if self.stream.peek_kind().is_identifier_like() {
                    range = range.union(&self.stream.advance().range);
                }
                Ok(Statement::Goto { range })
            }
            TokenKind::Stop => {
                let keyword = self.stream.advance();
                Ok(Statement::Stop {
                    range: keyword.range,
                })
            }
            TokenKind::End if self.stream.peek_nth(1).kind == TokenKind::Newline
                || self.stream.peek_nth(1).kind == TokenKind::Colon
                || self.stream.peek_nth(1).kind == TokenKind::Eof =>
            {
                let keyword = self.stream.advance();
                Ok(Statement::End {
                    range: keyword.range,
                })
            }
            _ => self.parse_assignment_or_expression(),
        }
    }

    /// Parse a `sub`/`function` declaration. `named` distinguishes a
    /// declaration statement (name required) from an anonymous function
    /// expression (no name).
    pub(crate) fn parse_function_declaration(
        &mut self,
        named: bool,
    ) -> Result<FunctionStatement, Diagnostic> {
        let mark = self.stream.mark();
        let keyword = self.stream.advance();
        let kind = if keyword.kind == TokenKind::Sub {
            FunctionKind::Sub
        } else {
            FunctionKind::Function
        };

        let name = if named {
            let token = self.stream.peek().clone();
            if !token.kind.is_identifier_like() {
                return Err(catalog::syntax_error(format!(
                    "expected function name, found {}",
                    token.kind
                ))
                .at(token.range));
            }
            self.stream.advance();
            Some(Name::new(token.text, token.range))
        } else {
            None
        };

        let params = self.parse_params()?;
        let return_type = if self.stream.consume(TokenKind::As).is_some() {
            Some(self.parse_type_expression()?)
        } else {
            None
        };

        let terminator = match kind {
            FunctionKind::Sub => TokenKind::Sub,
            FunctionKind::Function => TokenKind::Function,
        };
        let body = self.parse_block(BlockKind::Function)?;
        self.consume_function_end(terminator)?;

        Ok(FunctionStatement {
            kind,
            name,
            params,
            return_type,
            body,
            range: self.stream.range_from(mark),
        })
    }

    /// Parenthesized parameter list: `name [= default] [as type]`.
    /// Optional parameters must follow required ones.
    fn parse_params(&mut self) -> Result<Vec<Param>, Diagnostic> {
        self.stream.expect(TokenKind::LeftParen)?;
        let mut params: Vec<Param> = Vec::new();

        self.stream.skip_newlines();
        while !self.stream.check(TokenKind::RightParen) {
            let token = self.stream.peek().clone();
            if !token.kind.is_identifier_like() {
                return Err(catalog::syntax_error(format!(
                    "expected parameter name, found {}",
                    token.kind
                ))
                .at(token.range));
            }
            self.stream.advance();
            let name = Name::new(token.text, token.range);

            let default = if self.stream.consume(TokenKind::Equal).is_some() {
                Some(self.parse_expression()?)
            } else {
                None
            };
            let type_expr = if self.stream.consume(TokenKind::As).is_some() {
                Some(self.parse_type_expression()?)
            } else {
                None
            };

            let mut range = name.range;
            if let Some(t) = &type_expr {
                range = range.union(&t.range);
            } else if let Some(d) = &default {
                range = range.union(&d.range());
            }

            if default.is_none() && params.iter().any(|p| p.is_optional()) {
                self.diagnostics.push(
                    catalog::syntax_error(format!(
                        "required parameter '{}' must come before optional parameters",
                        name.text
                    ))
                    .at(name.range),
                );
            }

            params.push(Param {
                name,
                type_expr,
                default,
                range,
            });

            self.stream.skip_newlines();
            if self.stream.consume(TokenKind::Comma).is_some() {
                self.stream.skip_newlines();
            } else {
                break;
            }
        }

        self.stream.expect(TokenKind::RightParen)?;
        Ok(params)
    }

    /// A type annotation after `as`. Built-in type names lex as identifiers
    /// except `function`, `sub`, and `invalid`; class types may be dotted.
    fn parse_type_expression(&mut self) -> Result<TypeExpression, Diagnostic> {
        let token = self.stream.peek().clone();
        match token.kind {
            TokenKind::Function | TokenKind::Sub | TokenKind::Invalid => {
                self.stream.advance();
                Ok(TypeExpression {
                    text: token.text,
                    range: token.range,
                })
            }
            kind if kind.is_identifier_like() => {
                let name = self.parse_dotted_name()?;
                Ok(TypeExpression {
                    text: name.text(),
                    range: name.range,
                })
            }
            _ => Err(catalog::syntax_error(format!(
                "expected type name, found {}",
                token.kind
            ))
            .at(token.range)),
        }
    }

    /// `end sub` / `end function`, or the single-word forms.
    fn consume_function_end(&mut self, second: TokenKind) -> Result<(), Diagnostic> {
        if self.stream.consume(TokenKind::EndSub).is_some()
            || self.stream.consume(TokenKind::EndFunction).is_some()
        {
            return Ok(());
        }
        self.stream.expect(TokenKind::End)?;
        self.stream.expect(second)?;
        Ok(())
    }

    /// True when the stream sits at the terminator of the given block kind.
    fn at_block_end(&self, kind: BlockKind) -> bool {
        let first = self.stream.peek_kind();
        let second = self.stream.peek_nth(1).kind;
        match kind {
            BlockKind::Function => {
                matches!(first, TokenKind::EndSub | TokenKind::EndFunction)
                    || (first == TokenKind::End
                        && matches!(second, TokenKind::Sub | TokenKind::Function))
            }
            BlockKind::If => {
                matches!(first, TokenKind::EndIf | TokenKind::ElseIf | TokenKind::Else)
                    || (first == TokenKind::End && second == TokenKind::If)
            }
            BlockKind::IfElse => {
                first == TokenKind::EndIf || (first == TokenKind::End && second == TokenKind::If)
            }
            BlockKind::While => {
                first == TokenKind::EndWhile
                    || (first == TokenKind::End && second == TokenKind::While)
            }
            BlockKind::For => {
                matches!(first, TokenKind::EndFor | TokenKind::Next)
                    || (first == TokenKind::End && second == TokenKind::For)
            }
            BlockKind::Namespace => {
                first == TokenKind::End && second == TokenKind::Namespace
            }
            BlockKind::Class => first == TokenKind::End && second == TokenKind::Class,
        }
    }

    /// Parse statements until the block terminator. The terminator is not
    /// consumed. Statement-level errors are recorded and recovery continues
    /// inside the block; only an unexpected end of file aborts the block.
    fn parse_block(&mut self, kind: BlockKind) -> Result<Vec<Statement>, Diagnostic> {
        let mut body = Vec::new();
        loop {
            self.stream.skip_separators();
            if self.at_block_end(kind) {
                return Ok(body);
            }
            if self.stream.at_end() {
                let range = self.stream.peek().range;
                return Err(
                    catalog::syntax_error("unexpected end of file, unterminated block").at(range),
                );
            }
            match self.parse_statement() {
                Ok(statement) => body.push(statement),
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    self.stream.synchronize();
                }
            }
        }
    }

    fn parse_namespace(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        let keyword = self.stream.advance();
        if self.mode == ParseMode::Baseline {
            self.diagnostics
                .push(catalog::not_allowed_in_baseline("namespace").at(keyword.range));
        }
        let name = self.parse_dotted_name()?;
        let body = self.parse_block(BlockKind::Namespace)?;
        self.stream.expect(TokenKind::End)?;
        self.stream.expect(TokenKind::Namespace)?;

        Ok(Statement::Namespace(Box::new(NamespaceStatement {
            name,
            body,
            range: self.stream.range_from(mark),
        })))
    }

    fn parse_import(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        let keyword = self.stream.advance();
        if self.mode == ParseMode::Baseline {
            self.diagnostics
                .push(catalog::not_allowed_in_baseline("import").at(keyword.range));
        }
        let token = self.stream.expect(TokenKind::StringLiteral)?;
        Ok(Statement::Import(ImportStatement {
            path: Name::new(unquote(&token.text), token.range),
            range: self.stream.range_from(mark),
        }))
    }

    fn parse_class(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        let keyword = self.stream.advance();
        if self.mode == ParseMode::Baseline {
            self.diagnostics
                .push(catalog::not_allowed_in_baseline("class").at(keyword.range));
        }

        let name_token = self.stream.peek().clone();
        if !name_token.kind.is_identifier_like() {
            return Err(catalog::syntax_error(format!(
                "expected class name, found {}",
                name_token.kind
            ))
            .at(name_token.range));
        }
        self.stream.advance();
        let name = Name::new(name_token.text, name_token.range);

        // `extends` is contextual
        let parent_name = if self.stream.peek_kind().is_identifier_like()
            && self.stream.peek().text.eq_ignore_ascii_case("extends")
        {
            self.stream.advance();
            Some(self.parse_dotted_name()?)
        } else {
            None
        };

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        loop {
            self.stream.skip_separators();
            if self.at_block_end(BlockKind::Class) {
                break;
            }
            if self.stream.at_end() {
                let range = self.stream.peek().range;
                return Err(
                    catalog::syntax_error("unexpected end of file, unterminated class").at(range),
                );
            }
            match self.parse_class_member() {
                Ok(ClassMemberParsed::Field(field)) => fields.push(field),
                Ok(ClassMemberParsed::Method(method)) => methods.push(method),
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    self.stream.synchronize();
                }
            }
        }
        self.stream.expect(TokenKind::End)?;
        self.stream.expect(TokenKind::Class)?;

        Ok(Statement::Class(Box::new(ClassStatement {
            name,
            parent_name,
            fields,
            methods,
            range: self.stream.range_from(mark),
        })))
    }

    /// One class member: `[access] [override|final] method`, or
    /// `[access] field [as type] [= initializer]`.
    fn parse_class_member(&mut self) -> Result<ClassMemberParsed, Diagnostic> {
        let mark = self.stream.mark();
        let mut access = AccessModifier::default();
        let mut saw_access = false;
        let mut is_override = false;
        let mut is_final = false;

        // Modifiers are contextual identifiers; they only count as
        // modifiers when another member token follows (so `override = 1`
        // stays a field named "override").
        loop {
            let token = self.stream.peek().clone();
            if !token.kind.is_identifier_like() || !self.modifier_continues() {
                break;
            }
            match token.text.to_lowercase().as_str() {
                "public" if !saw_access => {
                    access = AccessModifier::Public;
                    saw_access = true;
                }
                "protected" if !saw_access => {
                    access = AccessModifier::Protected;
                    saw_access = true;
                }
                "private" if !saw_access => {
                    access = AccessModifier::Private;
                    saw_access = true;
                }
                "override" if !is_override => is_override = true,
                "final" if !is_final => is_final = true,
                _ => break,
            }
            self.stream.advance();
        }

        if matches!(
            self.stream.peek_kind(),
            TokenKind::Sub | TokenKind::Function
        ) {
            let func = self.parse_function_declaration(true)?;
            let range = self.stream.range_from(mark);
            return Ok(ClassMemberParsed::Method(ClassMethod {
                access,
                is_override,
                is_final,
                func,
                range,
            }));
        }

        if is_override || is_final {
            let range = self.stream.peek().range;
            self.diagnostics.push(
                catalog::syntax_error("'override' and 'final' apply to methods only").at(range),
            );
        }

        let token = self.stream.peek().clone();
        if !token.kind.is_identifier_like() {
            return Err(catalog::syntax_error(format!(
                "expected class member, found {}",
                token.kind
            ))
            .at(token.range));
        }
        self.stream.advance();
        let name = Name::new(token.text, token.range);

        let type_expr = if self.stream.consume(TokenKind::As).is_some() {
            Some(self.parse_type_expression()?)
        } else {
            None
        };
        let initializer = if self.stream.consume(TokenKind::Equal).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(ClassMemberParsed::Field(ClassField {
            access,
            name,
            type_expr,
            initializer,
            range: self.stream.range_from(mark),
        }))
    }

    /// True when the token after the current one can continue a member
    /// declaration (another modifier, a method keyword, or a field name).
    fn modifier_continues(&self) -> bool {
        let next = self.stream.peek_nth(1).kind;
        next.is_identifier_like() || matches!(next, TokenKind::Sub | TokenKind::Function)
    }

    fn parse_if(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        self.stream.advance();
        let condition = self.parse_expression()?;
        let _ = self.stream.consume(TokenKind::Then);

        if !self.stream.at_separator() {
            // Single-line form: `if cond then stmt [else stmt]`
            let then_branch = vec![self.parse_statement()?];
            let else_branch = if self.stream.consume(TokenKind::Else).is_some() {
                Some(vec![self.parse_statement()?])
            } else {
                None
            };
            return Ok(Statement::If(Box::new(IfStatement {
                condition,
                then_branch,
                else_ifs: Vec::new(),
                else_branch,
                range: self.stream.range_from(mark),
            })));
        }

        let then_branch = self.parse_block(BlockKind::If)?;
        let mut else_ifs = Vec::new();
        let mut else_branch = None;

        loop {
            if self.stream.check(TokenKind::ElseIf)
                || (self.stream.check(TokenKind::Else)
                    && self.stream.peek_nth(1).kind == TokenKind::If)
            {
                if self.stream.consume(TokenKind::ElseIf).is_none() {
                    self.stream.advance(); // else
                    self.stream.advance(); // if
                }
                let elseif_condition = self.parse_expression()?;
                let _ = self.stream.consume(TokenKind::Then);
                let branch = self.parse_block(BlockKind::If)?;
                else_ifs.push((elseif_condition, branch));
            } else if self.stream.consume(TokenKind::Else).is_some() {
                else_branch = Some(self.parse_block(BlockKind::IfElse)?);
                break;
            } else {
                break;
            }
        }

        if self.stream.consume(TokenKind::EndIf).is_none() {
            self.stream.expect(TokenKind::End)?;
            self.stream.expect(TokenKind::If)?;
        }

        Ok(Statement::If(Box::new(IfStatement {
            condition,
            then_branch,
            else_ifs,
            else_branch,
            range: self.stream.range_from(mark),
        })))
    }

    fn parse_while(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        self.stream.advance();
        let condition = self.parse_expression()?;
        let body = self.parse_block(BlockKind::While)?;
        if self.stream.consume(TokenKind::EndWhile).is_none() {
            self.stream.expect(TokenKind::End)?;
            self.stream.expect(TokenKind::While)?;
        }
        Ok(Statement::While(Box::new(WhileStatement {
            condition,
            body,
            range: self.stream.range_from(mark),
        })))
    }

    fn parse_for(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        self.stream.advance();

        if self.stream.consume(TokenKind::Each).is_some() {
            let item_token = self.stream.peek().clone();
            if !item_token.kind.is_identifier_like() {
                return Err(catalog::syntax_error(format!(
                    "expected loop variable, found {}",
                    item_token.kind
                ))
                .at(item_token.range));
            }
            self.stream.advance();
            self.stream.expect(TokenKind::In)?;
            let collection = self.parse_expression()?;
            let body = self.parse_block(BlockKind::For)?;
            self.consume_for_end()?;
            return Ok(Statement::ForEach(Box::new(ForEachStatement {
                item: Name::new(item_token.text, item_token.range),
                collection,
                body,
                range: self.stream.range_from(mark),
            })));
        }

        let counter_token = self.stream.peek().clone();
        if !counter_token.kind.is_identifier_like() {
            return Err(catalog::syntax_error(format!(
                "expected loop counter, found {}",
                counter_token.kind
            ))
            .at(counter_token.range));
        }
        self.stream.advance();
        self.stream.expect(TokenKind::Equal)?;
        let start = self.parse_expression()?;
        self.stream.expect(TokenKind::To)?;
        let end = self.parse_expression()?;
        let step = if self.stream.consume(TokenKind::Step).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let body = self.parse_block(BlockKind::For)?;
        self.consume_for_end()?;

        Ok(Statement::For(Box::new(ForStatement {
            counter: Name::new(counter_token.text, counter_token.range),
            start,
            end,
            step,
            body,
            range: self.stream.range_from(mark),
        })))
    }

    /// `end for`, `endfor`, or `next [counter]`.
    fn consume_for_end(&mut self) -> Result<(), Diagnostic> {
        if self.stream.consume(TokenKind::EndFor).is_some() {
            return Ok(());
        }
        if self.stream.consume(TokenKind::Next).is_some() {
            if self.stream.peek_kind().is_identifier_like() {
                self.stream.advance();
            }
            return Ok(());
        }
        self.stream.expect(TokenKind::End)?;
        self.stream.expect(TokenKind::For)?;
        Ok(())
    }

    fn parse_print(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        self.stream.advance();
        let mut args = Vec::new();
        loop {
            while matches!(
                self.stream.peek_kind(),
                TokenKind::Semicolon | TokenKind::Comma
            ) {
                self.stream.advance();
            }
            // `else` ends the statement in single-line if form
            if self.stream.at_separator() || self.stream.check(TokenKind::Else) {
                break;
            }
            args.push(self.parse_expression()?);
        }
        Ok(Statement::Print(Box::new(PrintStatement {
            args,
            range: self.stream.range_from(mark),
        })))
    }

    fn parse_return(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        self.stream.advance();
        let value = if self.stream.at_separator() || self.stream.check(TokenKind::Else) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Statement::Return(Box::new(ReturnStatement {
            value,
            range: self.stream.range_from(mark),
        })))
    }

    fn parse_dim(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        self.stream.advance();
        let name_token = self.stream.peek().clone();
        if !name_token.kind.is_identifier_like() {
            return Err(catalog::syntax_error(format!(
                "expected variable name after 'dim', found {}",
                name_token.kind
            ))
            .at(name_token.range));
        }
        self.stream.advance();

        self.stream.expect(TokenKind::LeftBracket)?;
        let mut dimensions = Vec::new();
        while !self.stream.check(TokenKind::RightBracket) {
            dimensions.push(self.parse_expression()?);
            if self.stream.consume(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.stream.expect(TokenKind::RightBracket)?;

        Ok(Statement::Dim(Box::new(DimStatement {
            name: Name::new(name_token.text, name_token.range),
            dimensions,
            range: self.stream.range_from(mark),
        })))
    }

    fn parse_exit(&mut self) -> Result<Statement, Diagnostic> {
        let mark = self.stream.mark();
        self.stream.advance();
        match self.stream.peek_kind() {
            TokenKind::While => {
                self.stream.advance();
                Ok(Statement::ExitWhile {
                    range: self.stream.range_from(mark),
                })
            }
            TokenKind::For => {
                self.stream.advance();
                Ok(Statement::ExitFor {
                    range: self.stream.range_from(mark),
                })
            }
            other => {
                let range = self.stream.peek().range;
                Err(
                    catalog::syntax_error(format!(
                        "expected 'while' or 'for' after 'exit', found {}",
                        other
                    ))
                    .at(range),
                )
            }
        }
    }

    /// A statement starting with an expression: either an assignment
    /// (`name = value`, `obj.prop = value`, `arr[i] = value`, compound
    /// operators included) or an expression statement (a call).
    fn parse_assignment_or_expression(&mut self) -> Result<Statement, Diagnostic> {
        let left = self.parse_postfix()?;

        if matches!(
            self.stream.peek_kind(),
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::BackslashEqual
                | TokenKind::LeftShiftEqual
                | TokenKind::RightShiftEqual
        ) {
            self.stream.advance();
            let value = self.parse_expression()?;
            let range = left.range().union(&value.range());
            return match left {
                Expression::Identifier(name) => {
                    Ok(Statement::Assignment(Box::new(AssignmentStatement {
                        name,
                        value,
                        range,
                    })))
                }
                Expression::DottedGet { .. } | Expression::IndexedGet { .. } => {
                    Ok(Statement::Set(Box::new(SetStatement {
                        target: left,
                        value,
                        range,
                    })))
                }
                other => {
                    Err(catalog::syntax_error("invalid assignment target").at(other.range()))
                }
            };
        }

        let expr = self.continue_pratt(left, 0)?;
        if !self.stream.at_separator() && !self.stream.check(TokenKind::Else) {
            let found = self.stream.peek().clone();
            self.diagnostics.push(
                catalog::expected_statement_separator(found.kind.describe()).at(found.range),
            );
            self.stream.synchronize();
        }
        Ok(Statement::Expression(expr))
    }
}

/// Outcome of parsing one class member.
enum ClassMemberParsed {
    Field(ClassField),
    Method(ClassMethod),
}
