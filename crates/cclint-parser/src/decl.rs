//! Declaration parsing: namespaces, classes, enums, templates, typedefs,
//! using declarations, functions, and variables.

use cclint_ast::{
    Access, BaseClass, FriendKind, Node, NodeKind, TemplateParam, TemplateParamKind,
};
use cclint_token::{SourcePos, Token, TokenKind};

use crate::{Parser, Recovery};

/// What `parse_function_or_variable` found, before context decides whether
/// it is a free function, a method, a constructor, or a field.
pub(crate) enum Declarator {
    Function(FuncDecl),
    Variable(VarDecl),
}

pub(crate) struct FuncDecl {
    pub name: String,
    pub return_type: String,
    pub parameter_types: Vec<String>,
    pub parameter_names: Vec<String>,
    pub is_const: bool,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub is_explicit: bool,
    pub is_constexpr: bool,
    pub is_noexcept: bool,
    pub is_default: bool,
    pub is_delete: bool,
    pub pos: SourcePos,
    pub children: Vec<Node>,
    pub complexity: u32,
}

pub(crate) struct VarDecl {
    pub name: String,
    pub type_name: String,
    pub is_const: bool,
    pub is_static: bool,
    pub is_constexpr: bool,
    pub is_mutable: bool,
    pub pos: SourcePos,
    pub children: Vec<Node>,
}

impl Parser {
    /// Parse one declaration at namespace or translation-unit scope.
    pub(crate) fn parse_declaration(&mut self) -> Option<Node> {
        self.skip_trivia();
        self.skip_attributes();

        match self.kind() {
            TokenKind::Eof | TokenKind::RightBrace => None,
            TokenKind::Namespace => Some(self.parse_namespace()),
            TokenKind::Class | TokenKind::Struct | TokenKind::Union => self.parse_class(),
            TokenKind::Enum => Some(self.parse_enum()),
            TokenKind::Typedef => Some(self.parse_typedef()),
            TokenKind::Using => Some(self.parse_using()),
            TokenKind::Template => self.parse_template(),
            TokenKind::StaticAssert => Some(self.parse_static_assert()),
            TokenKind::Semicolon => {
                self.pos += 1;
                None
            }
            _ => {
                let declarator = self.parse_function_or_variable()?;
                Some(self.declarator_into_node(declarator, Access::None))
            }
        }
    }

    // ========== namespace ==========

    pub(crate) fn parse_namespace(&mut self) -> Node {
        let pos = self.here();
        self.expect(TokenKind::Namespace, "'namespace'");

        let name = self.qualified_name();
        let mut node = Node::new(NodeKind::Namespace, name, pos);

        if !self.expect(TokenKind::LeftBrace, "'{' after namespace name") {
            self.recover(Recovery::SkipToSemicolon);
            return node;
        }

        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            let before = self.pos;
            if let Some(child) = self.parse_declaration() {
                node.push(child);
            }
            if self.pos == before && !self.check(TokenKind::RightBrace) && !self.at_eof() {
                self.error_unexpected("a declaration");
                self.pos += 1;
            }
        }
        if !self.eat(TokenKind::RightBrace) {
            self.error_unexpected("'}' to close namespace");
        }

        node
    }

    // ========== class / struct / union ==========

    pub(crate) fn parse_class(&mut self) -> Option<Node> {
        let pos = self.here();
        let is_struct = match self.kind() {
            TokenKind::Struct | TokenKind::Union => true,
            TokenKind::Class => false,
            _ => {
                self.error_unexpected("'class' or 'struct'");
                return None;
            }
        };
        self.pos += 1;
        self.skip_attributes();

        if !self.check(TokenKind::Identifier) {
            self.error_unexpected("class name");
            self.recover(Recovery::SkipToSemicolon);
            return None;
        }
        let name = self.bump().text.to_string();

        // Explicit specialization arguments after the name
        if self.check(TokenKind::Less) {
            self.consume_template_args();
        }
        // `final` on the class head is a contextual identifier
        if self.check(TokenKind::Identifier) && &*self.current().text == "final" {
            self.pos += 1;
        }

        let bases = if self.eat(TokenKind::Colon) {
            self.parse_base_clause(is_struct)
        } else {
            Vec::new()
        };

        let mut node = Node::new(NodeKind::Class { is_struct, bases }, name.clone(), pos);

        if !self.check(TokenKind::LeftBrace) {
            // Forward declaration
            self.eat(TokenKind::Semicolon);
            return Some(node);
        }
        self.pos += 1; // {

        let saved_access = self.current_access;
        self.current_access = Access::class_default(is_struct);

        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            let before = self.pos;
            self.parse_member_into(&mut node, &name);
            if self.pos == before && !self.check(TokenKind::RightBrace) && !self.at_eof() {
                self.error_unexpected("a member declaration");
                self.pos += 1;
            }
        }
        if !self.eat(TokenKind::RightBrace) {
            self.error_unexpected("'}' to close class body");
        }
        self.eat(TokenKind::Semicolon);

        self.current_access = saved_access;
        Some(node)
    }

    /// Comma-separated `{virtual? access? name}` entries, up to the `{`.
    fn parse_base_clause(&mut self, is_struct: bool) -> Vec<BaseClass> {
        let mut bases = Vec::new();
        loop {
            let mut is_virtual = false;
            let mut access = Access::class_default(is_struct);
            loop {
                match self.kind() {
                    TokenKind::Virtual => {
                        is_virtual = true;
                        self.pos += 1;
                    }
                    TokenKind::Public => {
                        access = Access::Public;
                        self.pos += 1;
                    }
                    TokenKind::Protected => {
                        access = Access::Protected;
                        self.pos += 1;
                    }
                    TokenKind::Private => {
                        access = Access::Private;
                        self.pos += 1;
                    }
                    _ => break,
                }
            }

            let name = self.qualified_name();
            if self.check(TokenKind::Less) {
                self.consume_template_args();
            }
            if !name.is_empty() {
                bases.push(BaseClass { name, access, is_virtual });
            }

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        // Anything left before '{' is unparsable base-clause text
        while !self.check(TokenKind::LeftBrace)
            && !self.check(TokenKind::Semicolon)
            && !self.at_eof()
        {
            self.pos += 1;
        }
        bases
    }

    /// One class-body item: access specifier, friend, nested type, or a
    /// member function/field (re-classified into constructor, destructor,
    /// or operator nodes where the name says so).
    fn parse_member_into(&mut self, class_node: &mut Node, class_name: &str) {
        self.skip_trivia();
        self.skip_attributes();

        match self.kind() {
            TokenKind::RightBrace | TokenKind::Eof => {}
            TokenKind::Public => {
                self.pos += 1;
                self.current_access = Access::Public;
                self.expect(TokenKind::Colon, "':' after access specifier");
            }
            TokenKind::Protected => {
                self.pos += 1;
                self.current_access = Access::Protected;
                self.expect(TokenKind::Colon, "':' after access specifier");
            }
            TokenKind::Private => {
                self.pos += 1;
                self.current_access = Access::Private;
                self.expect(TokenKind::Colon, "':' after access specifier");
            }
            TokenKind::Friend => class_node.push(self.parse_friend()),
            TokenKind::Class | TokenKind::Struct | TokenKind::Union => {
                if let Some(nested) = self.parse_class() {
                    class_node.push(nested);
                }
            }
            TokenKind::Enum => {
                let nested = self.parse_enum();
                class_node.push(nested);
            }
            TokenKind::Typedef => {
                let node = self.parse_typedef();
                class_node.push(node);
            }
            TokenKind::Using => {
                let node = self.parse_using();
                class_node.push(node);
            }
            TokenKind::Template => {
                if let Some(node) = self.parse_template() {
                    class_node.push(node);
                }
            }
            TokenKind::StaticAssert => {
                let node = self.parse_static_assert();
                class_node.push(node);
            }
            TokenKind::Semicolon => {
                self.pos += 1;
            }
            _ => {
                if let Some(declarator) = self.parse_function_or_variable() {
                    let node = self.member_into_node(declarator, class_name);
                    class_node.push(node);
                }
            }
        }
    }

    fn parse_friend(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // friend

        let node = if self.eat(TokenKind::Class) || self.eat(TokenKind::Struct) {
            let target = self.qualified_name();
            Node::new(
                NodeKind::Friend { kind: FriendKind::Class, target_name: target.clone() },
                target,
                pos,
            )
        } else {
            // Function friend: keep the signature text up to the ';'
            let mut signature = String::new();
            while !self.check(TokenKind::Semicolon)
                && !self.check(TokenKind::LeftBrace)
                && !self.at_eof()
            {
                if !signature.is_empty() {
                    signature.push(' ');
                }
                signature.push_str(&self.bump().text);
            }
            // Friends defined in the class body carry a brace block
            if self.check(TokenKind::LeftBrace) {
                self.skip_balanced_braces();
            }
            Node::new(
                NodeKind::Friend { kind: FriendKind::Function, target_name: signature.clone() },
                signature,
                pos,
            )
        };
        self.eat(TokenKind::Semicolon);
        node
    }

    /// Re-classify a parsed member against the enclosing class.
    fn member_into_node(&mut self, declarator: Declarator, class_name: &str) -> Node {
        let access = self.current_access;
        match declarator {
            Declarator::Function(f) => {
                let is_ctor =
                    f.name == class_name || (f.name.is_empty() && f.return_type == class_name);
                if is_ctor {
                    let mut node = Node::new(
                        NodeKind::Constructor {
                            class_name: class_name.to_string(),
                            access,
                            is_explicit: f.is_explicit,
                            is_default: f.is_default,
                            is_delete: f.is_delete,
                            is_noexcept: f.is_noexcept,
                            is_constexpr: f.is_constexpr,
                        },
                        class_name.to_string(),
                        f.pos,
                    );
                    node.children = f.children;
                    return node;
                }

                if f.name.starts_with('~') {
                    let mut node = Node::new(
                        NodeKind::Destructor {
                            class_name: class_name.to_string(),
                            access,
                            is_virtual: f.is_virtual,
                            is_default: f.is_default,
                            is_delete: f.is_delete,
                            is_noexcept: f.is_noexcept,
                        },
                        f.name,
                        f.pos,
                    );
                    node.children = f.children;
                    return node;
                }

                if let Some(symbol) = f.name.strip_prefix("operator") {
                    let mut node = Node::new(
                        NodeKind::Operator {
                            symbol: symbol.to_string(),
                            is_member: true,
                            return_type: f.return_type,
                            access,
                        },
                        f.name.clone(),
                        f.pos,
                    );
                    node.children = f.children;
                    return node;
                }

                let mut node = Node::new(
                    NodeKind::Function {
                        return_type: f.return_type,
                        parameter_types: f.parameter_types,
                        parameter_names: f.parameter_names,
                        is_const: f.is_const,
                        is_static: f.is_static,
                        is_virtual: f.is_virtual,
                        is_override: f.is_override,
                        is_final: f.is_final,
                        access,
                        complexity: f.complexity,
                    },
                    f.name,
                    f.pos,
                );
                node.children = f.children;
                node
            }
            Declarator::Variable(v) => {
                let mut node = Node::new(
                    NodeKind::Field {
                        type_name: v.type_name,
                        is_const: v.is_const,
                        is_static: v.is_static,
                        is_mutable: v.is_mutable,
                        access,
                    },
                    v.name,
                    v.pos,
                );
                node.children = v.children;
                node
            }
        }
    }

    /// Build a namespace-scope node from a declarator.
    pub(crate) fn declarator_into_node(&mut self, declarator: Declarator, access: Access) -> Node {
        match declarator {
            Declarator::Function(f) => {
                if let Some(symbol) = f.name.strip_prefix("operator") {
                    let mut node = Node::new(
                        NodeKind::Operator {
                            symbol: symbol.to_string(),
                            is_member: false,
                            return_type: f.return_type,
                            access,
                        },
                        f.name.clone(),
                        f.pos,
                    );
                    node.children = f.children;
                    return node;
                }
                let mut node = Node::new(
                    NodeKind::Function {
                        return_type: f.return_type,
                        parameter_types: f.parameter_types,
                        parameter_names: f.parameter_names,
                        is_const: f.is_const,
                        is_static: f.is_static,
                        is_virtual: f.is_virtual,
                        is_override: f.is_override,
                        is_final: f.is_final,
                        access,
                        complexity: f.complexity,
                    },
                    f.name,
                    f.pos,
                );
                node.children = f.children;
                node
            }
            Declarator::Variable(v) => {
                let mut node = Node::new(
                    NodeKind::Variable {
                        type_name: v.type_name,
                        is_const: v.is_const,
                        is_static: v.is_static,
                        is_constexpr: v.is_constexpr,
                        access,
                    },
                    v.name,
                    v.pos,
                );
                node.children = v.children;
                node
            }
        }
    }

    // ========== enum ==========

    pub(crate) fn parse_enum(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // enum

        let is_class = self.eat(TokenKind::Class) || self.eat(TokenKind::Struct);
        let name =
            if self.check(TokenKind::Identifier) { self.bump().text.to_string() } else { String::new() };

        let underlying_type =
            if self.eat(TokenKind::Colon) { self.parse_type() } else { String::new() };

        let mut node = Node::new(NodeKind::Enum { is_class, underlying_type }, name, pos);

        if self.eat(TokenKind::LeftBrace) {
            while !self.check(TokenKind::RightBrace) && !self.at_eof() {
                self.skip_trivia();
                self.skip_attributes();
                if !self.check(TokenKind::Identifier) {
                    if self.check(TokenKind::RightBrace) || self.at_eof() {
                        break;
                    }
                    self.error_unexpected("enumerator name");
                    self.pos += 1;
                    continue;
                }
                let constant_pos = self.here();
                let constant_name = self.bump().text.to_string();

                let mut value = String::new();
                if self.eat(TokenKind::Equal) {
                    while !self.check(TokenKind::Comma)
                        && !self.check(TokenKind::RightBrace)
                        && !self.at_eof()
                    {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(&self.bump().text);
                    }
                }
                node.push(Node::new(
                    NodeKind::EnumConstant { value },
                    constant_name,
                    constant_pos,
                ));

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.eat(TokenKind::RightBrace);
        }
        self.eat(TokenKind::Semicolon);

        node
    }

    // ========== typedef / using ==========

    pub(crate) fn parse_typedef(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // typedef

        // The declarator name is the last identifier before the ';'
        let mut last_ident = String::new();
        while !self.check(TokenKind::Semicolon) && !self.at_eof() {
            let token = self.bump();
            if token.kind == TokenKind::Identifier {
                last_ident = token.text.to_string();
            }
        }
        self.eat(TokenKind::Semicolon);

        Node::new(NodeKind::Typedef, last_ident, pos)
    }

    pub(crate) fn parse_using(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // using

        // `using namespace x;` / `using x = y;` / `using n::x;`
        self.eat(TokenKind::Namespace);
        let name = self.qualified_name();
        self.skip_to_semicolon();

        Node::new(NodeKind::Using, name, pos)
    }

    // ========== template ==========

    pub(crate) fn parse_template(&mut self) -> Option<Node> {
        let pos = self.here();
        self.pos += 1; // template

        let parameters = if self.check(TokenKind::Less) {
            let tokens = self.consume_template_args();
            classify_template_params(&tokens)
        } else {
            Vec::new()
        };

        let mut node = Node::new(NodeKind::Template { parameters }, String::new(), pos);

        self.skip_trivia();
        let entity = match self.kind() {
            TokenKind::Class | TokenKind::Struct | TokenKind::Union => self.parse_class(),
            TokenKind::Using => Some(self.parse_using()),
            _ => {
                let declarator = self.parse_function_or_variable()?;
                Some(self.declarator_into_node(declarator, Access::None))
            }
        };

        let entity = entity?;
        node.name = entity.name.clone();
        node.push(entity);
        Some(node)
    }

    // ========== static_assert ==========

    pub(crate) fn parse_static_assert(&mut self) -> Node {
        let pos = self.here();
        self.pos += 1; // static_assert

        let mut condition = String::new();
        let mut message = String::new();

        if self.expect(TokenKind::LeftParen, "'(' after static_assert") {
            let mut depth = 1usize;
            let mut in_message = false;
            while depth > 0 && !self.at_eof() {
                match self.kind() {
                    TokenKind::LeftParen => depth += 1,
                    TokenKind::RightParen => {
                        depth -= 1;
                        if depth == 0 {
                            self.pos += 1;
                            break;
                        }
                    }
                    TokenKind::Comma if depth == 1 => {
                        in_message = true;
                        self.pos += 1;
                        continue;
                    }
                    _ => {}
                }
                let token = self.bump();
                let target = if in_message { &mut message } else { &mut condition };
                if in_message && token.kind.is_string_literal() {
                    message = token.value.to_string();
                    continue;
                }
                if !target.is_empty() {
                    target.push(' ');
                }
                target.push_str(&token.text);
            }
        }
        self.eat(TokenKind::Semicolon);

        Node::new(NodeKind::StaticAssert { condition, message }, String::new(), pos)
    }

    // ========== function / variable ==========

    /// The shared declaration path: leading modifiers, a type, a declarator
    /// name, then either a function (on `(`) or a variable.
    pub(crate) fn parse_function_or_variable(&mut self) -> Option<Declarator> {
        let pos = self.here();
        let start = self.pos;

        let mut is_static = false;
        let mut is_virtual = false;
        let mut is_constexpr = false;
        let mut is_const = false;
        let mut is_explicit = false;
        let mut is_mutable = false;
        loop {
            match self.kind() {
                TokenKind::Static => is_static = true,
                TokenKind::Virtual => is_virtual = true,
                TokenKind::Constexpr | TokenKind::Consteval | TokenKind::Constinit => {
                    is_constexpr = true
                }
                TokenKind::Explicit => is_explicit = true,
                TokenKind::Mutable => is_mutable = true,
                TokenKind::Const if !is_const => is_const = true,
                TokenKind::Inline | TokenKind::Extern | TokenKind::ThreadLocal => {}
                _ => break,
            }
            self.pos += 1;
        }

        let is_destructor = self.check(TokenKind::Tilde)
            && self.peek_kind(1) == TokenKind::Identifier;
        if is_destructor {
            self.pos += 1;
        }

        let mut return_type = String::new();
        if !is_destructor && !self.check(TokenKind::Operator) {
            return_type = self.parse_type();
        }

        let mut name = String::new();
        if is_destructor {
            if self.check(TokenKind::Identifier) {
                name = format!("~{}", self.bump().text);
            }
        } else if self.check(TokenKind::Operator) {
            self.pos += 1;
            name = format!("operator{}", self.parse_operator_symbol());
        } else if self.check(TokenKind::Identifier) {
            name = self.bump().text.to_string();
            // Qualified declarator: `C::f`, `n::C::f`, `C::operator=`
            while self.check(TokenKind::ColonColon) {
                self.pos += 1;
                if self.check(TokenKind::Operator) {
                    self.pos += 1;
                    name = format!("operator{}", self.parse_operator_symbol());
                    break;
                }
                if self.check(TokenKind::Tilde) {
                    self.pos += 1;
                    if self.check(TokenKind::Identifier) {
                        name = format!("~{}", self.bump().text);
                    }
                    break;
                }
                if self.check(TokenKind::Identifier) {
                    name = self.bump().text.to_string();
                } else {
                    break;
                }
            }
        }

        if return_type.is_empty() && name.is_empty() {
            // Nothing declaration-like here; undo any modifier consumption
            self.restore(start);
            return None;
        }

        if self.eat(TokenKind::LeftParen) {
            let (parameter_types, parameter_names) = self.parse_parameters();

            let mut func = FuncDecl {
                name,
                return_type,
                parameter_types,
                parameter_names,
                is_const: false,
                is_static,
                is_virtual,
                is_override: false,
                is_final: false,
                is_explicit,
                is_constexpr,
                is_noexcept: false,
                is_default: false,
                is_delete: false,
                pos,
                children: Vec::new(),
                complexity: 1,
            };

            // Post-qualifiers: const, noexcept, override/final (contextual)
            loop {
                match self.kind() {
                    TokenKind::Const => {
                        func.is_const = true;
                        self.pos += 1;
                    }
                    TokenKind::Noexcept => {
                        func.is_noexcept = true;
                        self.pos += 1;
                        if self.check(TokenKind::LeftParen) {
                            self.skip_balanced_parens();
                        }
                    }
                    TokenKind::Identifier if &*self.current().text == "override" => {
                        func.is_override = true;
                        self.pos += 1;
                    }
                    TokenKind::Identifier if &*self.current().text == "final" => {
                        func.is_final = true;
                        self.pos += 1;
                    }
                    TokenKind::AttributeStart => self.skip_attributes(),
                    _ => break,
                }
            }

            // Trailing return type
            if self.eat(TokenKind::Arrow) {
                let trailing = self.parse_type();
                if func.return_type.is_empty() || func.return_type == "auto" {
                    func.return_type = trailing;
                }
            }

            // `= default`, `= delete`, `= 0`
            if self.eat(TokenKind::Equal) {
                if self.eat(TokenKind::Default) {
                    func.is_default = true;
                } else if self.eat(TokenKind::Delete) {
                    func.is_delete = true;
                } else if self.check(TokenKind::IntegerLiteral) {
                    self.pos += 1; // pure virtual
                }
            }

            // Constructor initializer list
            if self.check(TokenKind::Colon) {
                self.skip_ctor_init_list();
            }

            if self.check(TokenKind::LeftBrace) {
                let enclosing =
                    std::mem::replace(&mut self.current_function, plain_name(&func.name));
                let body = self.parse_compound();
                self.current_function = enclosing;
                func.complexity = 1 + crate::stmt::branch_count(&body);
                func.children.push(body);
            } else {
                self.eat(TokenKind::Semicolon);
            }

            return Some(Declarator::Function(func));
        }

        let mut var = VarDecl {
            name,
            type_name: return_type,
            is_const,
            is_static,
            is_constexpr,
            is_mutable,
            pos,
            children: Vec::new(),
        };

        // Array declarator
        while self.check(TokenKind::LeftBracket) {
            self.pos += 1;
            while !self.check(TokenKind::RightBracket) && !self.at_eof() {
                self.pos += 1;
            }
            self.eat_right_bracket();
        }

        if self.eat(TokenKind::Equal) {
            if let Some(init) = self.parse_expression() {
                var.children.push(init);
            }
        } else if self.check(TokenKind::LeftParen) {
            self.skip_balanced_parens();
        } else if self.check(TokenKind::LeftBrace) {
            self.skip_balanced_braces();
        }

        self.skip_to_semicolon();
        Some(Declarator::Variable(var))
    }

    /// The symbol after the `operator` keyword. `()` and `[]` span two
    /// tokens; conversion operators name a type; everything else is one
    /// operator token.
    fn parse_operator_symbol(&mut self) -> String {
        if self.check(TokenKind::LeftParen) && self.peek_kind(1) == TokenKind::RightParen {
            self.pos += 2;
            return "()".to_string();
        }
        if self.check(TokenKind::LeftBracket) && self.peek_kind(1) == TokenKind::RightBracket {
            self.pos += 2;
            return "[]".to_string();
        }
        if self.check(TokenKind::AttributeStart) && self.peek_kind(1) == TokenKind::AttributeEnd {
            // `operator[][[...]]` never happens; `[[` here is really `[ [`
            self.pos += 2;
            return "[]".to_string();
        }
        if self.check(TokenKind::New) || self.check(TokenKind::Delete) {
            let mut symbol = self.bump().text.to_string();
            if self.check(TokenKind::LeftBracket)
                && self.peek_kind(1) == TokenKind::RightBracket
            {
                self.pos += 2;
                symbol.push_str("[]");
            }
            return symbol;
        }
        if self.kind().is_type_keyword() || self.check(TokenKind::Identifier) {
            // Conversion operator: `operator bool`, `operator std::string`
            return self.parse_type();
        }
        if self.check(TokenKind::LeftParen) || self.at_eof() {
            return String::new();
        }
        self.bump().text.to_string()
    }

    /// Parameter list after the already-consumed `(`: comma-separated at
    /// paren depth zero; each entry is a type, an optional name, and an
    /// optional default value which is skipped.
    fn parse_parameters(&mut self) -> (Vec<String>, Vec<String>) {
        let mut types = Vec::new();
        let mut names = Vec::new();
        let mut chunk: Vec<Token> = Vec::new();
        let mut depth = 0usize;
        let mut angle_depth = 0i32;

        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::LeftParen => {
                    depth += 1;
                    chunk.push(self.bump());
                }
                TokenKind::RightParen => {
                    if depth == 0 {
                        self.pos += 1;
                        break;
                    }
                    depth -= 1;
                    chunk.push(self.bump());
                }
                TokenKind::Less => {
                    angle_depth += 1;
                    chunk.push(self.bump());
                }
                TokenKind::Greater if angle_depth > 0 => {
                    angle_depth -= 1;
                    chunk.push(self.bump());
                }
                TokenKind::GreaterGreater if angle_depth > 0 => {
                    angle_depth -= 2;
                    chunk.push(self.bump());
                }
                TokenKind::Comma if depth == 0 && angle_depth <= 0 => {
                    self.pos += 1;
                    push_parameter(&mut types, &mut names, &chunk);
                    chunk.clear();
                }
                _ => chunk.push(self.bump()),
            }
        }

        if !chunk.is_empty() {
            push_parameter(&mut types, &mut names, &chunk);
        }
        (types, names)
    }

    /// Skip a `: member_(init), other_{init}` constructor initializer list.
    /// A `{` directly after an identifier is an init brace; any other `{`
    /// is the function body and stops the skip.
    fn skip_ctor_init_list(&mut self) {
        self.pos += 1; // :
        let mut prev_was_name = false;
        while !self.at_eof() {
            match self.kind() {
                TokenKind::LeftParen => {
                    self.skip_balanced_parens();
                    prev_was_name = false;
                }
                TokenKind::LeftBrace => {
                    if prev_was_name {
                        self.skip_balanced_braces();
                        prev_was_name = false;
                    } else {
                        return;
                    }
                }
                TokenKind::Semicolon => return,
                TokenKind::Identifier => {
                    self.pos += 1;
                    prev_was_name = true;
                }
                TokenKind::Less => {
                    self.consume_template_args();
                    prev_was_name = true;
                }
                _ => {
                    self.pos += 1;
                    prev_was_name = false;
                }
            }
        }
    }

    /// Accumulate a type: cv-qualifiers, type keywords, (qualified)
    /// identifiers, template arguments, and `* & &&`. Stops before an
    /// identifier that looks like the declarator name.
    pub(crate) fn parse_type(&mut self) -> String {
        let mut tokens: Vec<Token> = Vec::new();
        let mut has_base = false;

        loop {
            let kind = self.kind();
            let prev_kind = tokens.last().map(|t| t.kind);

            match kind {
                TokenKind::Const | TokenKind::Volatile | TokenKind::Typename => {
                    tokens.push(self.bump());
                }
                k if k.is_type_keyword() => {
                    has_base = true;
                    tokens.push(self.bump());
                    if k == TokenKind::Decltype && self.check(TokenKind::LeftParen) {
                        let start = self.pos;
                        self.skip_balanced_parens();
                        for i in start..self.pos {
                            tokens.push(self.tokens[i].clone());
                        }
                    }
                }
                TokenKind::Identifier => {
                    // A second bare identifier is the declarator name
                    if has_base && prev_kind != Some(TokenKind::ColonColon) {
                        break;
                    }
                    has_base = true;
                    tokens.push(self.bump());
                }
                TokenKind::ColonColon => {
                    tokens.push(self.bump());
                }
                TokenKind::Less if has_base => {
                    tokens.extend(self.consume_template_args());
                }
                TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp => {
                    if !has_base {
                        break;
                    }
                    tokens.push(self.bump());
                }
                _ => break,
            }
        }

        join_type_tokens(&tokens)
    }

    /// A possibly-qualified name: `ident (:: ident)*`.
    pub(crate) fn qualified_name(&mut self) -> String {
        let mut name = String::new();
        if !self.check(TokenKind::Identifier) {
            return name;
        }
        name.push_str(&self.bump().text);
        while self.check(TokenKind::ColonColon) && self.peek_kind(1) == TokenKind::Identifier {
            self.pos += 2;
            name.push_str("::");
            name.push_str(&self.tokens[self.pos - 1].text);
        }
        name
    }
}

/// Split one parameter chunk into its type and name. The default value
/// after a top-level `=` is dropped; a trailing identifier is the name.
fn push_parameter(types: &mut Vec<String>, names: &mut Vec<String>, chunk: &[Token]) {
    let mut tokens = chunk;
    if let Some(eq) = tokens.iter().position(|t| t.kind == TokenKind::Equal) {
        tokens = &tokens[..eq];
    }
    if tokens.is_empty() {
        return;
    }
    if tokens.len() == 1 && tokens[0].kind == TokenKind::Ellipsis {
        types.push("...".to_string());
        names.push(String::new());
        return;
    }

    let (name, type_tokens) = match tokens.last() {
        Some(last)
            if last.kind == TokenKind::Identifier
                && tokens.len() > 1
                && tokens[tokens.len() - 2].kind != TokenKind::ColonColon =>
        {
            (last.text.to_string(), &tokens[..tokens.len() - 1])
        }
        _ => (String::new(), tokens),
    };

    types.push(join_type_tokens(type_tokens));
    names.push(name);
}

/// Join type tokens with C++-ish spacing: tight around `::`, `<`, `>`,
/// `*`, `&`, and commas.
pub(crate) fn join_type_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<TokenKind> = None;
    for token in tokens {
        let tight_after = matches!(prev, Some(TokenKind::ColonColon | TokenKind::Less));
        let tight_before = matches!(
            token.kind,
            TokenKind::ColonColon
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::GreaterGreater
                | TokenKind::Star
                | TokenKind::Amp
                | TokenKind::AmpAmp
                | TokenKind::Comma
        );
        if !out.is_empty() && !tight_after && !tight_before {
            out.push(' ');
        }
        out.push_str(&token.text);
        prev = Some(token.kind);
    }
    out
}

/// Name without namespace or class qualifiers, used to tag call sites.
fn plain_name(name: &str) -> String {
    name.rsplit("::").next().unwrap_or(name).to_string()
}

/// Classify the tokens of a `template<...>` parameter list into records.
fn classify_template_params(tokens: &[Token]) -> Vec<TemplateParam> {
    // Strip the outer angle brackets, then split on depth-1 commas
    if tokens.len() < 2 {
        return Vec::new();
    }
    let inner = &tokens[1..tokens.len() - 1];

    let mut params = Vec::new();
    let mut chunk: Vec<&Token> = Vec::new();
    let mut depth = 0i32;
    for token in inner {
        match token.kind {
            TokenKind::Less => depth += 1,
            TokenKind::Greater => depth -= 1,
            TokenKind::GreaterGreater => depth -= 2,
            TokenKind::Comma if depth == 0 => {
                if let Some(param) = classify_one_param(&chunk) {
                    params.push(param);
                }
                chunk.clear();
                continue;
            }
            _ => {}
        }
        chunk.push(token);
    }
    if let Some(param) = classify_one_param(&chunk) {
        params.push(param);
    }
    params
}

fn classify_one_param(chunk: &[&Token]) -> Option<TemplateParam> {
    let first = chunk.first()?;
    let last_ident = chunk
        .iter()
        .rev()
        .find(|t| t.kind == TokenKind::Identifier)
        .map(|t| t.text.to_string())
        .unwrap_or_default();

    let kind = match first.kind {
        TokenKind::Template => TemplateParamKind::Template,
        TokenKind::Typename | TokenKind::Class => TemplateParamKind::Type,
        k if k.is_type_keyword() => TemplateParamKind::NonType,
        _ => TemplateParamKind::Type,
    };
    Some(TemplateParam { kind, name: last_ident })
}
