//! Statement parsing inside function bodies.

use cclint_ast::{Access, LoopType, Node, NodeKind};
use cclint_token::TokenKind;

use crate::Parser;

impl Parser {
    /// `{ statement* }`. Assumes the current token is `{`.
    pub(crate) fn parse_compound(&mut self) -> Node {
        let pos = self.here();
        let mut node = Node::new(NodeKind::Compound, String::new(), pos);
        if !self.expect(TokenKind::LeftBrace, "'{'") {
            return node;
        }

        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            let before = self.pos;
            if let Some(stmt) = self.parse_statement() {
                node.push(stmt);
            }
            if self.pos == before && !self.check(TokenKind::RightBrace) && !self.at_eof() {
                self.error_unexpected("a statement");
                self.pos += 1;
            }
        }
        if !self.eat(TokenKind::RightBrace) {
            self.error_unexpected("'}' to close block");
        }
        node
    }

    /// One statement. Returns `None` (after consuming what it could) for
    /// empty statements and unrecoverable positions.
    pub(crate) fn parse_statement(&mut self) -> Option<Node> {
        self.skip_trivia();
        self.skip_attributes();

        match self.kind() {
            TokenKind::Eof | TokenKind::RightBrace => None,
            TokenKind::LeftBrace => Some(self.parse_compound()),
            TokenKind::If => Some(self.parse_if()),
            TokenKind::Switch => Some(self.parse_switch()),
            TokenKind::For => Some(self.parse_for()),
            TokenKind::While => Some(self.parse_while()),
            TokenKind::Do => Some(self.parse_do()),
            TokenKind::Try => Some(self.parse_try()),
            TokenKind::Return => {
                let pos = self.here();
                self.pos += 1;
                let mut node = Node::new(NodeKind::Return, String::new(), pos);
                if !self.check(TokenKind::Semicolon) {
                    if let Some(expr) = self.parse_expression() {
                        node.push(expr);
                    }
                }
                self.eat(TokenKind::Semicolon);
                Some(node)
            }
            TokenKind::Break => {
                let pos = self.here();
                self.pos += 1;
                self.eat(TokenKind::Semicolon);
                Some(Node::new(NodeKind::Break, String::new(), pos))
            }
            TokenKind::Continue => {
                let pos = self.here();
                self.pos += 1;
                self.eat(TokenKind::Semicolon);
                Some(Node::new(NodeKind::Continue, String::new(), pos))
            }
            TokenKind::Goto => {
                let pos = self.here();
                self.pos += 1;
                let label = if self.check(TokenKind::Identifier) {
                    self.bump().text.to_string()
                } else {
                    self.error_unexpected("label after 'goto'");
                    String::new()
                };
                self.eat(TokenKind::Semicolon);
                Some(Node::new(NodeKind::Goto, label, pos))
            }
            TokenKind::Semicolon => {
                self.pos += 1;
                None
            }
            TokenKind::Using => Some(self.parse_using()),
            TokenKind::Typedef => Some(self.parse_typedef()),
            TokenKind::StaticAssert => Some(self.parse_static_assert()),
            TokenKind::Class | TokenKind::Struct | TokenKind::Enum => self.parse_declaration(),
            _ => {
                if self.looks_like_declaration() {
                    let declarator = self.parse_function_or_variable()?;
                    return Some(self.declarator_into_node(declarator, Access::None));
                }
                let pos = self.here();
                let expr = self.parse_expression();
                match expr {
                    Some(expr) => {
                        let mut node =
                            Node::new(NodeKind::ExpressionStatement, String::new(), pos);
                        node.push(expr);
                        self.eat(TokenKind::Semicolon);
                        Some(node)
                    }
                    None => {
                        self.recover(crate::Recovery::SkipToSemicolon);
                        None
                    }
                }
            }
        }
    }

    /// Local-declaration heuristic: a leading type keyword or qualifier, or
    /// a (qualified) type name directly followed by another identifier.
    fn looks_like_declaration(&mut self) -> bool {
        match self.kind() {
            k if k.is_type_keyword() => true,
            TokenKind::Const
            | TokenKind::Static
            | TokenKind::Constexpr
            | TokenKind::Mutable
            | TokenKind::ThreadLocal => true,
            TokenKind::Identifier => {
                let mark = self.mark();
                let type_name = self.parse_type();
                let is_declaration = !type_name.is_empty() && self.check(TokenKind::Identifier);
                self.restore(mark);
                is_declaration
            }
            _ => false,
        }
    }

    fn parse_if(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // if
        let is_constexpr = self.eat(TokenKind::Constexpr);

        let mut children = Vec::new();
        if self.expect(TokenKind::LeftParen, "'(' after 'if'") {
            if let Some(cond) = self.parse_expression() {
                children.push(cond);
            }
            // Init-statement form: `if (init; cond)`
            if self.eat(TokenKind::Semicolon) {
                if let Some(cond) = self.parse_expression() {
                    children.push(cond);
                }
            }
            self.expect(TokenKind::RightParen, "')' after condition");
        }

        let then_branch = self.parse_statement();
        let has_braces =
            matches!(then_branch.as_ref().map(|n| &n.kind), Some(NodeKind::Compound));
        if let Some(then_branch) = then_branch {
            children.push(then_branch);
        }

        let has_else = self.check(TokenKind::Else);
        if has_else {
            self.pos += 1;
            if let Some(else_branch) = self.parse_statement() {
                children.push(else_branch);
            }
        }

        let mut node =
            Node::new(NodeKind::If { has_braces, has_else, is_constexpr }, String::new(), pos);
        node.children = children;
        node
    }

    fn parse_switch(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // switch

        let mut children = Vec::new();
        if self.expect(TokenKind::LeftParen, "'(' after 'switch'") {
            if let Some(cond) = self.parse_expression() {
                children.push(cond);
            }
            self.expect(TokenKind::RightParen, "')' after switch condition");
        }

        let mut case_count = 0u32;
        let mut has_default = false;

        if self.expect(TokenKind::LeftBrace, "'{' after switch head") {
            while !self.check(TokenKind::RightBrace) && !self.at_eof() {
                self.skip_trivia();
                match self.kind() {
                    TokenKind::Case => {
                        self.pos += 1;
                        case_count += 1;
                        while !self.check(TokenKind::Colon)
                            && !self.check(TokenKind::Semicolon)
                            && !self.at_eof()
                        {
                            self.pos += 1;
                        }
                        self.eat(TokenKind::Colon);
                    }
                    TokenKind::Default => {
                        self.pos += 1;
                        has_default = true;
                        self.eat(TokenKind::Colon);
                    }
                    TokenKind::RightBrace | TokenKind::Eof => break,
                    _ => {
                        let before = self.pos;
                        if let Some(stmt) = self.parse_statement() {
                            children.push(stmt);
                        }
                        if self.pos == before {
                            self.pos += 1;
                        }
                    }
                }
            }
            self.eat(TokenKind::RightBrace);
        }

        let mut node =
            Node::new(NodeKind::Switch { case_count, has_default }, String::new(), pos);
        node.children = children;
        node
    }

    fn parse_for(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // for

        let mut loop_type = LoopType::For;
        if self.expect(TokenKind::LeftParen, "'(' after 'for'") {
            if self.header_has_top_level_colon() {
                loop_type = LoopType::RangeFor;
            }
            // Consume the header loosely; its structure is not modeled
            let mut depth = 1usize;
            while depth > 0 && !self.at_eof() {
                match self.kind() {
                    TokenKind::LeftParen => depth += 1,
                    TokenKind::RightParen => depth -= 1,
                    _ => {}
                }
                self.pos += 1;
            }
        }

        let body = self.parse_statement();
        let has_braces = matches!(body.as_ref().map(|n| &n.kind), Some(NodeKind::Compound));
        let mut node = Node::new(NodeKind::Loop { loop_type, has_braces }, String::new(), pos);
        if let Some(body) = body {
            node.push(body);
        }
        node
    }

    /// Look ahead inside a `for` header for a `:` at depth zero before the
    /// first `;` or the closing `)`; that makes it a range-based for.
    fn header_has_top_level_colon(&self) -> bool {
        let mut paren = 0i32;
        let mut bracket = 0i32;
        let mut brace = 0i32;
        let mut index = self.pos;
        while index < self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::LeftParen => paren += 1,
                TokenKind::RightParen => {
                    if paren == 0 {
                        return false;
                    }
                    paren -= 1;
                }
                TokenKind::LeftBracket => bracket += 1,
                TokenKind::RightBracket => bracket -= 1,
                TokenKind::LeftBrace => brace += 1,
                TokenKind::RightBrace => brace -= 1,
                TokenKind::Semicolon if paren == 0 && bracket == 0 && brace == 0 => {
                    return false;
                }
                TokenKind::Colon if paren == 0 && bracket == 0 && brace == 0 => return true,
                TokenKind::Eof => return false,
                _ => {}
            }
            index += 1;
        }
        false
    }

    fn parse_while(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // while

        let mut children = Vec::new();
        if self.expect(TokenKind::LeftParen, "'(' after 'while'") {
            if let Some(cond) = self.parse_expression() {
                children.push(cond);
            }
            self.expect(TokenKind::RightParen, "')' after while condition");
        }

        let body = self.parse_statement();
        let has_braces = matches!(body.as_ref().map(|n| &n.kind), Some(NodeKind::Compound));
        if let Some(body) = body {
            children.push(body);
        }

        let mut node = Node::new(
            NodeKind::Loop { loop_type: LoopType::While, has_braces },
            String::new(),
            pos,
        );
        node.children = children;
        node
    }

    fn parse_do(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // do

        let body = self.parse_statement();
        let has_braces = matches!(body.as_ref().map(|n| &n.kind), Some(NodeKind::Compound));

        let mut children = Vec::new();
        if let Some(body) = body {
            children.push(body);
        }

        self.expect(TokenKind::While, "'while' after do body");
        if self.expect(TokenKind::LeftParen, "'(' after 'while'") {
            if let Some(cond) = self.parse_expression() {
                children.push(cond);
            }
            self.expect(TokenKind::RightParen, "')' after do-while condition");
        }
        self.eat(TokenKind::Semicolon);

        let mut node = Node::new(
            NodeKind::Loop { loop_type: LoopType::DoWhile, has_braces },
            String::new(),
            pos,
        );
        node.children = children;
        node
    }

    fn parse_try(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // try

        let mut children = Vec::new();
        if self.check(TokenKind::LeftBrace) {
            children.push(self.parse_compound());
        } else {
            self.error_unexpected("'{' after 'try'");
        }

        let mut catch_count = 0u32;
        while self.check(TokenKind::Catch) {
            self.pos += 1;
            catch_count += 1;
            self.skip_balanced_parens();
            if self.check(TokenKind::LeftBrace) {
                children.push(self.parse_compound());
            }
        }

        let mut node = Node::new(NodeKind::Try { catch_count }, String::new(), pos);
        node.children = children;
        node
    }
}

/// Count the control-flow constructs that contribute to cyclomatic
/// complexity: `if` (an `else if` is a nested `if`), every loop flavor,
/// `case` labels, `catch` clauses, ternaries, and short-circuit `&&`/`||`.
pub(crate) fn branch_count(body: &Node) -> u32 {
    let mut count = 0u32;
    body.walk(&mut |node| match &node.kind {
        NodeKind::If { .. } => count += 1,
        NodeKind::Loop { .. } => count += 1,
        NodeKind::Switch { case_count, .. } => count += case_count,
        NodeKind::Try { catch_count } => count += catch_count,
        NodeKind::ConditionalExpr => count += 1,
        NodeKind::BinaryExpr { op } if op.is_short_circuit() => count += 1,
        _ => {}
    });
    count
}
