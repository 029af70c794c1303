//! Expression parsing by precedence climbing.
//!
//! Levels, lowest binding first: assignment (right-associative), `?:`
//! (right-associative), `||`, `&&`, bitwise `| ^ &`, equality, relational
//! (including `<=>`), shifts, additive, multiplicative, unary, postfix,
//! primary. Lambdas, named casts, `sizeof`/`alignof`, and `new`/`delete`
//! are handled at the unary/primary levels.

use cclint_ast::{BinaryOp, LambdaCapture, Node, NodeKind};
use cclint_token::TokenKind;

use crate::{MAX_EXPR_DEPTH, Parser, ParseError};

impl Parser {
    /// Entry point for a full expression (no top-level commas).
    pub(crate) fn parse_expression(&mut self) -> Option<Node> {
        self.parse_assignment()
    }

    fn enter_depth(&mut self) -> bool {
        if self.expr_depth >= MAX_EXPR_DEPTH {
            self.errors.push(ParseError::RecursionLimit { pos: self.here() });
            return false;
        }
        self.expr_depth += 1;
        true
    }

    fn parse_assignment(&mut self) -> Option<Node> {
        if !self.enter_depth() {
            return None;
        }
        let result = self.parse_assignment_inner();
        self.expr_depth -= 1;
        result
    }

    fn parse_assignment_inner(&mut self) -> Option<Node> {
        let lhs = self.parse_ternary()?;

        if let Some(op) = assignment_op(self.kind()) {
            let pos = lhs.pos.clone();
            self.pos += 1;
            let mut node = Node::new(NodeKind::BinaryExpr { op }, String::new(), pos);
            node.push(lhs);
            // Right-associative: `a = b = c` groups as `a = (b = c)`
            if let Some(rhs) = self.parse_assignment() {
                node.push(rhs);
            }
            return Some(node);
        }

        Some(lhs)
    }

    fn parse_ternary(&mut self) -> Option<Node> {
        let cond = self.parse_binary(1)?;

        if self.check(TokenKind::Question) {
            let pos = cond.pos.clone();
            self.pos += 1;
            let mut node = Node::new(NodeKind::ConditionalExpr, String::new(), pos);
            node.push(cond);
            if let Some(then_value) = self.parse_assignment() {
                node.push(then_value);
            }
            self.expect(TokenKind::Colon, "':' in conditional expression");
            if let Some(else_value) = self.parse_assignment() {
                node.push(else_value);
            }
            return Some(node);
        }

        Some(cond)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<Node> {
        let mut lhs = self.parse_unary()?;

        loop {
            let Some((prec, op)) = binary_op(self.kind()) else { break };
            if prec < min_prec {
                break;
            }
            let pos = lhs.pos.clone();
            self.pos += 1;

            let Some(rhs) = self.parse_binary(prec + 1) else {
                // Error already recorded; keep what parsed
                break;
            };

            let mut node = Node::new(NodeKind::BinaryExpr { op }, String::new(), pos);
            node.push(lhs);
            node.push(rhs);
            lhs = node;
        }

        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<Node> {
        if !self.enter_depth() {
            return None;
        }
        let result = self.parse_unary_inner();
        self.expr_depth -= 1;
        result
    }

    fn parse_unary_inner(&mut self) -> Option<Node> {
        match self.kind() {
            TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Amp => {
                let pos = self.here();
                let op = self.bump().text.to_string();
                let operand = self.parse_unary()?;
                let mut node =
                    Node::new(NodeKind::UnaryExpr { op, is_prefix: true }, String::new(), pos);
                node.push(operand);
                Some(node)
            }
            TokenKind::Sizeof | TokenKind::Alignof => {
                let pos = self.here();
                let op = self.bump().text.to_string();
                let mut node =
                    Node::new(NodeKind::UnaryExpr { op, is_prefix: true }, String::new(), pos);
                if self.check(TokenKind::LeftParen) {
                    // Operand may be a type; keep its text without typing it
                    let operand_pos = self.here();
                    let start = self.pos;
                    self.skip_balanced_parens();
                    let inner_end = self.pos.saturating_sub(1).max(start + 1);
                    let text =
                        crate::decl::join_type_tokens(&self.tokens[start + 1..inner_end]);
                    node.push(Node::new(NodeKind::Literal, text, operand_pos));
                } else if let Some(operand) = self.parse_unary() {
                    node.push(operand);
                }
                Some(node)
            }
            TokenKind::Throw => {
                let pos = self.here();
                self.pos += 1;
                let mut node = Node::new(
                    NodeKind::UnaryExpr { op: "throw".to_string(), is_prefix: true },
                    String::new(),
                    pos,
                );
                if !matches!(
                    self.kind(),
                    TokenKind::Semicolon | TokenKind::RightParen | TokenKind::Comma
                ) {
                    if let Some(value) = self.parse_assignment() {
                        node.push(value);
                    }
                }
                Some(node)
            }
            TokenKind::New => Some(self.parse_new()),
            TokenKind::Delete => Some(self.parse_delete()),
            kind if kind.is_named_cast() => self.parse_named_cast(),
            _ => self.parse_postfix(),
        }
    }

    fn parse_new(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // new
        let type_name = self.parse_type();
        let mut node = Node::new(NodeKind::NewExpr, type_name, pos);

        // `new T[n]`, `new T(args)`, `new T{args}`
        if self.check(TokenKind::LeftBracket) {
            self.pos += 1;
            if let Some(extent) = self.parse_expression() {
                node.push(extent);
            }
            self.eat_right_bracket();
        }
        if self.check(TokenKind::LeftParen) {
            self.skip_balanced_parens();
        } else if self.check(TokenKind::LeftBrace) {
            self.skip_balanced_braces();
        }
        node
    }

    fn parse_delete(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // delete
        if self.check(TokenKind::LeftBracket) {
            self.pos += 1;
            self.eat_right_bracket();
        }
        let mut node = Node::new(NodeKind::DeleteExpr, String::new(), pos);
        if let Some(operand) = self.parse_unary() {
            node.push(operand);
        }
        node
    }

    /// `static_cast<T>(expr)` and friends: the `<T>` list is skipped
    /// without deep typing; the parenthesized argument is the child.
    fn parse_named_cast(&mut self) -> Option<Node> {
        let pos = self.here();
        let cast_kind = self.bump().text.to_string();

        let target_type = if self.check(TokenKind::Less) {
            let tokens = self.consume_template_args();
            if tokens.len() >= 2 {
                crate::decl::join_type_tokens(&tokens[1..tokens.len() - 1])
            } else {
                String::new()
            }
        } else {
            self.error_unexpected("'<' after cast keyword");
            String::new()
        };

        let mut node =
            Node::new(NodeKind::CastExpr { cast_kind, target_type }, String::new(), pos);
        if self.expect(TokenKind::LeftParen, "'(' after cast type") {
            if let Some(argument) = self.parse_expression() {
                node.push(argument);
            }
            self.expect(TokenKind::RightParen, "')' after cast argument");
        }
        Some(node)
    }

    fn parse_postfix(&mut self) -> Option<Node> {
        let mut base = self.parse_primary()?;

        loop {
            match self.kind() {
                TokenKind::LeftParen => {
                    base = self.finish_call(base);
                }
                TokenKind::LeftBracket => {
                    let pos = base.pos.clone();
                    self.pos += 1;
                    let mut node = Node::new(NodeKind::SubscriptExpr, String::new(), pos);
                    node.push(base);
                    if !self.check(TokenKind::RightBracket) {
                        if let Some(index) = self.parse_expression() {
                            node.push(index);
                        }
                    }
                    if !self.eat_right_bracket() {
                        self.error_unexpected("']' after subscript");
                    }
                    base = node;
                }
                TokenKind::Dot
                | TokenKind::Arrow
                | TokenKind::DotStar
                | TokenKind::ArrowStar => {
                    let pos = base.pos.clone();
                    let op = self.bump().text.to_string();
                    let mut member = String::new();
                    if self.check(TokenKind::Tilde)
                        && self.peek_kind(1) == TokenKind::Identifier
                    {
                        self.pos += 1;
                        member = format!("~{}", self.bump().text);
                    } else if self.check(TokenKind::Identifier) {
                        member = self.qualified_name();
                    }
                    let mut node =
                        Node::new(NodeKind::MemberExpr { op }, member, pos);
                    node.push(base);
                    base = node;
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let pos = base.pos.clone();
                    let op = self.bump().text.to_string();
                    let mut node = Node::new(
                        NodeKind::UnaryExpr { op, is_prefix: false },
                        String::new(),
                        pos,
                    );
                    node.push(base);
                    base = node;
                }
                _ => break,
            }
        }

        Some(base)
    }

    /// Call with the open parenthesis current. Records the callee name, the
    /// enclosing function, and the raw text of each argument.
    fn finish_call(&mut self, callee: Node) -> Node {
        let pos = callee.pos.clone();
        self.pos += 1; // (

        let mut argument_texts = Vec::new();
        let mut argument_nodes = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                let start = self.mark();
                let argument = self.parse_assignment();
                if argument.is_none() {
                    // Skip the unparsable argument up to ',' or ')'
                    let mut depth = 0usize;
                    while !self.at_eof() {
                        match self.kind() {
                            TokenKind::LeftParen => depth += 1,
                            TokenKind::RightParen => {
                                if depth == 0 {
                                    break;
                                }
                                depth -= 1;
                            }
                            TokenKind::Comma if depth == 0 => break,
                            _ => {}
                        }
                        self.pos += 1;
                    }
                }
                let text: Vec<String> = self.tokens[start..self.pos]
                    .iter()
                    .map(|t| t.text.to_string())
                    .collect();
                argument_texts.push(text.join(" "));
                if let Some(argument) = argument {
                    argument_nodes.push(argument);
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "')' after call arguments");

        let mut node = Node::new(
            NodeKind::CallExpression {
                function_name: callee.name.clone(),
                caller_function: self.current_function.clone(),
                arguments: argument_texts,
            },
            callee.name.clone(),
            pos,
        );
        node.push(callee);
        for argument in argument_nodes {
            node.push(argument);
        }
        node
    }

    fn parse_primary(&mut self) -> Option<Node> {
        match self.kind() {
            kind if kind.is_literal() => {
                let token = self.bump();
                Some(Node::new(NodeKind::Literal, token.text.to_string(), token.pos))
            }
            TokenKind::True | TokenKind::False | TokenKind::Nullptr => {
                let token = self.bump();
                Some(Node::new(NodeKind::Literal, token.text.to_string(), token.pos))
            }
            TokenKind::This => {
                let token = self.bump();
                Some(Node::new(NodeKind::ThisExpr, token.text.to_string(), token.pos))
            }
            TokenKind::Identifier => {
                let pos = self.here();
                let name = self.qualified_name();

                // `f<int>(x)`: only treat `<...>` as template arguments when
                // a call follows, otherwise it is a comparison
                if self.check(TokenKind::Less) {
                    let mark = self.mark();
                    self.consume_template_args();
                    if !self.check(TokenKind::LeftParen) {
                        self.restore(mark);
                    }
                }

                Some(Node::new(NodeKind::Identifier, name, pos))
            }
            kind if kind.is_type_keyword() => {
                // Functional cast: `int(x)`, `double(y)`
                let token = self.bump();
                Some(Node::new(NodeKind::Identifier, token.text.to_string(), token.pos))
            }
            TokenKind::LeftParen => {
                self.pos += 1;
                let inner = self.parse_expression();
                self.expect(TokenKind::RightParen, "')' after expression");
                inner
            }
            TokenKind::LeftBracket => self.parse_lambda(),
            _ => {
                self.error_unexpected("an expression");
                None
            }
        }
    }

    /// Lambda introducer `[captures](params) specifiers { body }`.
    fn parse_lambda(&mut self) -> Option<Node> {
        let pos = self.here();
        self.pos += 1; // [

        let mut captures: Vec<LambdaCapture> = Vec::new();
        let mut captures_by_value = false;
        let mut captures_by_reference = false;
        let mut clause = String::from("[");

        while !self.check(TokenKind::RightBracket) && !self.at_eof() {
            match self.kind() {
                TokenKind::Equal => {
                    captures_by_value = true;
                    clause.push('=');
                    self.pos += 1;
                }
                TokenKind::Amp => {
                    self.pos += 1;
                    clause.push('&');
                    if self.check(TokenKind::Identifier) {
                        let name = self.bump().text.to_string();
                        clause.push_str(&name);
                        captures.push(LambdaCapture { name, by_ref: true, is_this: false });
                    } else {
                        captures_by_reference = true;
                    }
                }
                TokenKind::This => {
                    self.pos += 1;
                    clause.push_str("this");
                    captures.push(LambdaCapture {
                        name: "this".to_string(),
                        by_ref: true,
                        is_this: true,
                    });
                }
                TokenKind::Star if self.peek_kind(1) == TokenKind::This => {
                    self.pos += 2;
                    clause.push_str("*this");
                    captures.push(LambdaCapture {
                        name: "*this".to_string(),
                        by_ref: false,
                        is_this: true,
                    });
                }
                TokenKind::Identifier => {
                    let name = self.bump().text.to_string();
                    clause.push_str(&name);
                    captures.push(LambdaCapture { name, by_ref: false, is_this: false });
                }
                TokenKind::Comma => {
                    clause.push(',');
                    self.pos += 1;
                }
                _ => {
                    clause.push_str(&self.bump().text);
                }
            }
        }
        self.eat(TokenKind::RightBracket);
        clause.push(']');

        if self.check(TokenKind::LeftParen) {
            self.skip_balanced_parens();
        }

        let mut is_mutable = false;
        let mut is_constexpr = false;
        loop {
            match self.kind() {
                TokenKind::Mutable => {
                    is_mutable = true;
                    self.pos += 1;
                }
                TokenKind::Constexpr => {
                    is_constexpr = true;
                    self.pos += 1;
                }
                TokenKind::Noexcept => {
                    self.pos += 1;
                    if self.check(TokenKind::LeftParen) {
                        self.skip_balanced_parens();
                    }
                }
                TokenKind::Arrow => {
                    self.pos += 1;
                    self.parse_type();
                }
                _ => break,
            }
        }

        let mut node = Node::new(
            NodeKind::Lambda {
                capture_clause: clause,
                captures,
                captures_by_value,
                captures_by_reference,
                is_mutable,
                is_constexpr,
            },
            String::new(),
            pos,
        );

        if self.check(TokenKind::LeftBrace) {
            let body = self.parse_compound();
            node.push(body);
        } else {
            self.error_unexpected("'{' to open lambda body");
        }

        Some(node)
    }
}

fn assignment_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Equal => BinaryOp::Assign,
        TokenKind::PlusEqual => BinaryOp::PlusAssign,
        TokenKind::MinusEqual => BinaryOp::MinusAssign,
        TokenKind::StarEqual => BinaryOp::StarAssign,
        TokenKind::SlashEqual => BinaryOp::SlashAssign,
        TokenKind::PercentEqual => BinaryOp::PercentAssign,
        TokenKind::AmpEqual => BinaryOp::AmpAssign,
        TokenKind::PipeEqual => BinaryOp::PipeAssign,
        TokenKind::CaretEqual => BinaryOp::CaretAssign,
        TokenKind::LessLessEqual => BinaryOp::ShlAssign,
        TokenKind::GreaterGreaterEqual => BinaryOp::ShrAssign,
        _ => return None,
    };
    Some(op)
}

/// Binary operators with precedence; higher binds tighter.
fn binary_op(kind: TokenKind) -> Option<(u8, BinaryOp)> {
    let entry = match kind {
        TokenKind::PipePipe => (1, BinaryOp::LogicalOr),
        TokenKind::AmpAmp => (2, BinaryOp::LogicalAnd),
        TokenKind::Pipe => (3, BinaryOp::BitOr),
        TokenKind::Caret => (4, BinaryOp::BitXor),
        TokenKind::Amp => (5, BinaryOp::BitAnd),
        TokenKind::EqualEqual => (6, BinaryOp::Eq),
        TokenKind::NotEqual => (6, BinaryOp::Ne),
        TokenKind::Less => (7, BinaryOp::Lt),
        TokenKind::Greater => (7, BinaryOp::Gt),
        TokenKind::LessEqual => (7, BinaryOp::Le),
        TokenKind::GreaterEqual => (7, BinaryOp::Ge),
        TokenKind::Spaceship => (7, BinaryOp::Spaceship),
        TokenKind::LessLess => (8, BinaryOp::Shl),
        TokenKind::GreaterGreater => (8, BinaryOp::Shr),
        TokenKind::Plus => (9, BinaryOp::Add),
        TokenKind::Minus => (9, BinaryOp::Sub),
        TokenKind::Star => (10, BinaryOp::Mul),
        TokenKind::Slash => (10, BinaryOp::Div),
        TokenKind::Percent => (10, BinaryOp::Rem),
        _ => return None,
    };
    Some(entry)
}
