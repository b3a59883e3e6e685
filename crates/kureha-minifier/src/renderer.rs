use kureha_lang::{
    Alternate, BinaryOperator, Block, BlockStyle, Body, Call, CallOperator, ConditionalKind, Expr, LoopKind, Node,
    StringPart, VariableKind,
};

use crate::{
    Error, RenderOptions, UnsupportedConstruct,
    buffer::{RenderBuffer, is_word_char},
    interpolation::{Splice, splice},
    literal,
    params::ParamsDelimiter,
    precedence::{Operator, Side, needs_parens},
    separator::{Boundary, SeparatorState, StatementClass, transition},
};

type Result<T> = std::result::Result<T, Error>;

/// Calls that may drop their argument parentheses in statement position.
const COMMAND_CALLS: &[&str] = &["puts", "print", "p", "pp", "warn", "raise", "require", "require_relative"];

/// Where a node is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// A member of a statement sequence.
    Statement,
    Expression,
    /// Directly inside grouping parentheses the renderer has already emitted.
    Grouped,
}

pub(crate) struct Renderer<'a> {
    pub(crate) options: &'a RenderOptions,
    pub(crate) buffer: RenderBuffer,
    /// Inside a `while`/`until`/`for` header, where `do` belongs to the loop.
    in_loop_header: bool,
}

/// Renders the statements of an interpolation splice in a scope of their own.
pub(crate) fn render_embedded(statements: &[Node], options: &RenderOptions) -> Result<String> {
    let mut renderer = Renderer::new(options);
    let state = renderer.sequence(statements, SeparatorState::Start)?;
    renderer.close_with_delimiter(state, "");
    Ok(renderer.buffer.into_string())
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            buffer: RenderBuffer::new(options.space_after_keywords),
            in_loop_header: false,
        }
    }

    pub fn render(mut self, node: &Node) -> Result<String> {
        match &node.expr {
            Expr::Program(statements) | Expr::Statements(statements) => {
                self.sequence(statements, SeparatorState::Start)?;
            }
            _ => {
                self.sequence(std::slice::from_ref(node), SeparatorState::Start)?;
            }
        }

        Ok(self.buffer.into_string())
    }

    pub(crate) fn sequence(&mut self, statements: &[Node], state: SeparatorState) -> Result<SeparatorState> {
        let mut state = state;

        for statement in statements {
            let class = self.classify(statement);
            let (boundary, next) = transition(state, class);

            if class != StatementClass::Skipped {
                self.push_boundary(boundary);
                self.statement(statement)?;
            }

            state = next;
        }

        Ok(state)
    }

    fn statement(&mut self, node: &Node) -> Result<()> {
        match &node.expr {
            Expr::Comment(text) => {
                self.buffer.push_raw("#");
                self.buffer.push_raw(&text.replace('\n', "\n#"));
                Ok(())
            }
            Expr::BlankLine => Ok(()),
            _ => self.node(node, Placement::Statement),
        }
    }

    fn classify(&self, node: &Node) -> StatementClass {
        match &node.expr {
            Expr::Comment(_) if self.options.strip_comments => StatementClass::Skipped,
            Expr::Comment(_) => StatementClass::Comment,
            Expr::BlankLine if self.options.strip_blank_lines => StatementClass::Skipped,
            Expr::BlankLine => StatementClass::BlankLine,
            Expr::Def { .. }
            | Expr::Class { .. }
            | Expr::SingletonClass { .. }
            | Expr::Module { .. }
            | Expr::For { .. }
            | Expr::Case { .. }
            | Expr::Begin(_) => StatementClass::BlockClosing,
            Expr::Loop { do_while: true, .. } => StatementClass::Plain,
            Expr::Conditional { .. } | Expr::Loop { .. } if !self.uses_modifier_form(node) => {
                StatementClass::BlockClosing
            }
            _ if self.ends_with_do_block(node) => StatementClass::BlockClosing,
            _ => StatementClass::Plain,
        }
    }

    fn push_boundary(&mut self, boundary: Boundary) {
        match boundary {
            Boundary::None => {}
            Boundary::Separator => self.buffer.push_raw(self.options.separator()),
            Boundary::Newline => self.buffer.push_raw("\n"),
            Boundary::BlankLine => self.buffer.push_raw("\n\n"),
        }
    }

    /// Emits a clause keyword (`else`, `when`, ...) after the statements of the previous clause.
    fn clause(&mut self, state: SeparatorState, keyword: &str, takes_operand: bool) {
        let (boundary, _) = transition(state, StatementClass::Terminator);
        self.push_boundary(boundary);

        if takes_operand {
            self.buffer.push_operand_keyword(keyword);
        } else {
            self.buffer.push_keyword(keyword);
        }
    }

    fn close_with_keyword(&mut self, state: SeparatorState, keyword: &str) {
        self.clause(state, keyword, false);
    }

    pub(crate) fn close_with_delimiter(&mut self, state: SeparatorState, delimiter: &str) {
        let (boundary, _) = transition(state, StatementClass::Delimiter);
        self.push_boundary(boundary);
        self.buffer.push_str(delimiter);
    }

    /// Postfix `statement if predicate` is only used where the source wrote it
    /// that way and the statement stays a single plain, block-free one.
    fn uses_modifier_form(&self, node: &Node) -> bool {
        match &node.expr {
            Expr::Conditional {
                modifier: true,
                alternate: None,
                consequent,
                ..
            } => self.fits_modifier(consequent),
            Expr::Loop {
                modifier: true,
                do_while: false,
                body,
                ..
            } => self.fits_modifier(body),
            _ => false,
        }
    }

    fn fits_modifier(&self, statements: &[Node]) -> bool {
        let [statement] = statements else {
            return false;
        };

        !statement.expr.is_trivia()
            && !matches!(statement.expr, Expr::MultiAssign { .. })
            && self.classify(statement) == StatementClass::Plain
            && !carries_block(statement)
    }

    fn ends_with_do_block(&self, node: &Node) -> bool {
        let block = match &node.expr {
            Expr::Call(call) => call.block.as_ref(),
            Expr::Super { block, .. } => block.as_ref(),
            Expr::Lambda(block) => Some(block),
            _ => None,
        };

        block.is_some_and(|block| !self.uses_brace(block))
    }

    fn uses_brace(&self, block: &Block) -> bool {
        self.in_loop_header || (block.style == BlockStyle::Brace && !block.body.has_clauses())
    }

    pub(crate) fn node(&mut self, node: &Node, placement: Placement) -> Result<()> {
        match &node.expr {
            Expr::Program(_) | Expr::Comment(_) | Expr::BlankLine => Err(UnsupportedConstruct::at(node).into()),
            Expr::Unsupported { kind } => Err(UnsupportedConstruct::new(kind.clone(), node.range).into()),
            Expr::Statements(statements) | Expr::Parentheses(statements) => match statements.as_slice() {
                [single] if !single.expr.is_trivia() => self.node(single, placement),
                _ => self.group(statements),
            },
            Expr::Def {
                receiver,
                name,
                params,
                body,
            } => {
                if !literal::is_method_name(name) {
                    return Err(UnsupportedConstruct::at(node).into());
                }

                self.buffer.push_operand_keyword("def");
                if let Some(receiver) = receiver {
                    match receiver.expr {
                        Expr::SelfRef | Expr::Variable { .. } | Expr::ConstantPath { .. } => {
                            self.node(receiver, Placement::Expression)?
                        }
                        _ => self.parenthesized(receiver)?,
                    }
                    self.buffer.push_str(".");
                }
                self.buffer.push_str(name);

                if let Some(params) = params.as_ref().filter(|params| !params.is_empty()) {
                    self.buffer.push_str("(");
                    self.params(params, ParamsDelimiter::Parentheses)?;
                    self.buffer.push_str(")");
                }

                self.body(body)
            }
            Expr::Class { path, superclass, body } => {
                self.buffer.push_operand_keyword("class");
                self.constant_path(path)?;
                if let Some(superclass) = superclass {
                    self.buffer.push_str("<");
                    self.primary(superclass)?;
                }
                self.body(body)
            }
            Expr::SingletonClass { target, body } => {
                self.buffer.push_keyword("class");
                self.buffer.push_str("<<");
                self.primary(target)?;
                self.body(body)
            }
            Expr::Module { path, body } => {
                self.buffer.push_operand_keyword("module");
                self.constant_path(path)?;
                self.body(body)
            }
            Expr::Conditional {
                kind,
                predicate,
                consequent,
                alternate,
                ..
            } => {
                let keyword = match kind {
                    ConditionalKind::If => "if",
                    ConditionalKind::Unless => "unless",
                };

                if placement == Placement::Statement && self.uses_modifier_form(node) {
                    self.statement(&consequent[0])?;
                    self.buffer.push_operand_keyword(keyword);
                    return self.header(predicate);
                }

                self.conditional(keyword, predicate, consequent, alternate.as_ref(), *kind)
            }
            Expr::Ternary {
                predicate,
                consequent,
                alternate,
            } => {
                self.operand(predicate, Operator::Ternary, Side::Left)?;
                self.buffer.push_raw(" ? ");
                self.operand(consequent, Operator::Ternary, Side::Operand)?;
                self.buffer.push_raw(" : ");
                self.operand(alternate, Operator::Ternary, Side::Right)
            }
            Expr::Case { subject, whens, else_ } => {
                if whens.is_empty() {
                    return Err(UnsupportedConstruct::at(node).into());
                }

                match subject {
                    Some(subject) => {
                        self.buffer.push_operand_keyword("case");
                        self.header(subject)?;
                    }
                    None => self.buffer.push_keyword("case"),
                }

                let mut state = SeparatorState::AfterStatement;
                for when in whens {
                    self.clause(state, "when", true);
                    self.list(&when.conditions)?;
                    state = self.sequence(&when.body, SeparatorState::AfterStatement)?;
                }

                if let Some(statements) = else_ {
                    self.clause(state, "else", false);
                    state = self.sequence(statements, SeparatorState::AfterStatement)?;
                }

                self.close_with_keyword(state, "end");
                Ok(())
            }
            Expr::Loop {
                kind,
                predicate,
                body,
                do_while,
                ..
            } => {
                let keyword = match kind {
                    LoopKind::While => "while",
                    LoopKind::Until => "until",
                };

                if *do_while {
                    self.buffer.push_keyword("begin");
                    let state = self.sequence(body, SeparatorState::AfterStatement)?;
                    self.close_with_keyword(state, "end");
                    self.buffer.push_operand_keyword(keyword);
                    return self.loop_header(predicate);
                }

                if placement == Placement::Statement && self.uses_modifier_form(node) {
                    self.statement(&body[0])?;
                    self.buffer.push_operand_keyword(keyword);
                    return self.loop_header(predicate);
                }

                self.buffer.push_operand_keyword(keyword);
                self.loop_header(predicate)?;
                let state = self.sequence(body, SeparatorState::AfterStatement)?;
                self.close_with_keyword(state, "end");
                Ok(())
            }
            Expr::For {
                targets,
                collection,
                body,
            } => {
                self.buffer.push_operand_keyword("for");
                self.targets(targets)?;
                self.buffer.push_operand_keyword("in");
                self.loop_header(collection)?;
                let state = self.sequence(body, SeparatorState::AfterStatement)?;
                self.close_with_keyword(state, "end");
                Ok(())
            }
            Expr::Begin(body) => {
                self.buffer.push_keyword("begin");
                self.body(body)
            }
            Expr::RescueModifier { expression, rescue } => {
                self.operand(expression, Operator::RescueModifier, Side::Left)?;
                self.buffer.push_operand_keyword("rescue");
                self.operand(rescue, Operator::RescueModifier, Side::Right)
            }
            Expr::Return(args) => self.keyword_command("return", args),
            Expr::Break(args) => self.keyword_command("break", args),
            Expr::Next(args) => self.keyword_command("next", args),
            Expr::Redo => {
                self.buffer.push_keyword("redo");
                Ok(())
            }
            Expr::Retry => {
                self.buffer.push_keyword("retry");
                Ok(())
            }
            Expr::Yield(args) => {
                self.buffer.push_keyword("yield");
                if !args.is_empty() {
                    self.arguments(args)?;
                }
                Ok(())
            }
            Expr::Super { args, block } => {
                self.buffer.push_keyword("super");
                if let Some(args) = args {
                    self.arguments(args)?;
                }
                self.attached_block(block.as_ref())
            }
            Expr::Alias { new_name, old_name } => {
                self.buffer.push_operand_keyword("alias");
                self.method_reference(new_name)?;
                self.buffer.push_raw(" ");
                self.method_reference(old_name)
            }
            Expr::Undef(names) => {
                self.buffer.push_operand_keyword("undef");
                for (index, name) in names.iter().enumerate() {
                    if index > 0 {
                        self.buffer.push_str(",");
                    }
                    self.method_reference(name)?;
                }
                Ok(())
            }
            Expr::Defined(expression) => {
                self.buffer.push_str("defined?(");
                self.node(expression, Placement::Grouped)?;
                self.buffer.push_str(")");
                Ok(())
            }
            Expr::Lambda(block) => {
                self.buffer.push_str("->");
                let params = block.params.as_ref().filter(|params| !params.is_empty());
                if params.is_some() || !block.locals.is_empty() {
                    self.buffer.push_str("(");
                    if let Some(params) = params {
                        self.params(params, ParamsDelimiter::Parentheses)?;
                    }
                    self.block_locals(&block.locals);
                    self.buffer.push_str(")");
                }
                self.block_body(block, false)
            }
            Expr::Call(call) => self.call(node, call, placement),
            Expr::BinaryOp { op, left, right } => {
                let operator = binary_form(*op, right);
                self.operand(left, operator, Side::Left)?;

                match operator {
                    Operator::KeywordAnd | Operator::KeywordOr => self.buffer.push_operand_keyword(operator.symbol()),
                    _ => self.buffer.push_str(operator.symbol()),
                }

                self.operand(right, operator, Side::Right)
            }
            Expr::UnaryOp { op, operand } => {
                let operator = Operator::from(*op);
                self.buffer.push_str(operator.symbol());
                self.prefix_operand(operand, operator)
            }
            Expr::Integer(text) => {
                self.buffer.push_str(&literal::integer(text));
                Ok(())
            }
            Expr::Float(value) => {
                self.buffer.push_str(&literal::float(*value));
                Ok(())
            }
            Expr::True => self.word("true"),
            Expr::False => self.word("false"),
            Expr::Nil => self.word("nil"),
            Expr::SelfRef => self.word("self"),
            Expr::Symbol(name) => {
                self.buffer.push_str(&literal::symbol(name));
                Ok(())
            }
            Expr::String(content) => {
                self.buffer.push_str(&literal::string(content));
                Ok(())
            }
            Expr::InterpolatedString(parts) => self.spliced(parts, Splice::String),
            Expr::InterpolatedSymbol(parts) => self.spliced(parts, Splice::Symbol),
            Expr::XString(parts) => self.spliced(parts, Splice::XString),
            Expr::Regex { parts, flags } => self.spliced(parts, Splice::Regex { flags }),
            Expr::StringConcat(pieces) => {
                let mut parts = Vec::new();
                concat_parts(pieces, &mut parts)?;
                self.spliced(&parts, Splice::String)
            }
            Expr::Array(elements) => self.array(elements),
            Expr::Hash(pairs) => {
                self.buffer.push_str("{");
                self.list(pairs)?;
                self.buffer.push_str("}");
                Ok(())
            }
            Expr::KeywordHash(pairs) => self.list(pairs),
            Expr::Pair { key, value } => self.pair(key, value),
            Expr::Range { left, right, exclusive } => {
                let operator = if *exclusive {
                    Operator::ExclusiveRange
                } else {
                    Operator::Range
                };

                if let Some(left) = left {
                    self.operand(left, operator, Side::Left)?;
                }
                self.buffer.push_str(operator.symbol());
                if let Some(right) = right {
                    self.operand(right, operator, Side::Right)?;
                }
                Ok(())
            }
            Expr::Splat(operand) => self.prefixed("*", operand.as_deref()),
            Expr::DoubleSplat(operand) => self.prefixed("**", operand.as_deref()),
            Expr::BlockArgument(operand) => self.prefixed("&", operand.as_deref()),
            Expr::ForwardingArguments => {
                self.buffer.push_str("...");
                Ok(())
            }
            Expr::Variable { name, .. } => {
                self.buffer.push_str(name);
                Ok(())
            }
            Expr::ConstantPath { parent, name } => {
                if let Some(parent) = parent {
                    self.primary(parent)?;
                }
                self.buffer.push_str("::");
                self.buffer.push_str(name);
                Ok(())
            }
            Expr::Assign { target, value } => {
                self.assign_target(target)?;
                self.buffer.push_str("=");
                self.operand(value, Operator::Assign, Side::Right)
            }
            Expr::OpAssign {
                target,
                operator,
                value,
            } => {
                if !assignable_operator(*operator) {
                    return Err(UnsupportedConstruct::at(node).into());
                }

                self.assign_target(target)?;
                self.buffer.push_str(Operator::from(*operator).symbol());
                self.buffer.push_str("=");
                self.operand(value, Operator::Assign, Side::Right)
            }
            Expr::MultiAssign { targets, values } => {
                if placement == Placement::Expression {
                    return self.parenthesized(node);
                }

                self.targets(targets)?;
                if let [single] = targets.as_slice()
                    && !matches!(single.expr, Expr::Splat(_))
                {
                    self.buffer.push_str(",");
                }
                self.buffer.push_str("=");
                self.list(values)
            }
            Expr::MultiTarget(targets) => {
                self.buffer.push_str("(");
                self.targets(targets)?;
                self.buffer.push_str(")");
                Ok(())
            }
        }
    }

    fn word(&mut self, word: &str) -> Result<()> {
        self.buffer.push_str(word);
        Ok(())
    }

    fn spliced(&mut self, parts: &[StringPart], kind: Splice<'_>) -> Result<()> {
        let text = splice(parts, kind, self.options)?;
        match kind {
            Splice::Regex { flags } => self.buffer.push_regex(&text, flags.is_empty()),
            _ => self.buffer.push_str(&text),
        }
        Ok(())
    }

    fn group(&mut self, statements: &[Node]) -> Result<()> {
        self.buffer.push_str("(");
        let state = self.sequence(statements, SeparatorState::Start)?;
        self.close_with_delimiter(state, ")");
        Ok(())
    }

    fn parenthesized(&mut self, node: &Node) -> Result<()> {
        self.buffer.push_str("(");
        self.node(node, Placement::Grouped)?;
        self.buffer.push_str(")");
        Ok(())
    }

    /// Renders `node` on `side` of `parent`, grouping it when the parent would otherwise capture it.
    pub(crate) fn operand(&mut self, node: &Node, parent: Operator, side: Side) -> Result<()> {
        if needs_parens(operator_of(node), parent, side) {
            self.parenthesized(node)
        } else {
            self.node(node, Placement::Expression)
        }
    }

    /// Receivers, superclasses and scope parents: anything operator-shaped is grouped.
    fn primary(&mut self, node: &Node) -> Result<()> {
        if operator_of(node).is_some() {
            self.parenthesized(node)
        } else {
            self.node(node, Placement::Expression)
        }
    }

    /// One element of a comma-separated list.
    pub(crate) fn list_item(&mut self, node: &Node) -> Result<()> {
        match operator_of(node) {
            Some(Operator::RescueModifier | Operator::KeywordAnd | Operator::KeywordOr) => self.parenthesized(node),
            _ => self.node(node, Placement::Expression),
        }
    }

    /// Predicates, loop collections and `case` subjects. A bare `rescue` modifier there
    /// would take the whole construct as its left side.
    fn header(&mut self, node: &Node) -> Result<()> {
        match operator_of(node) {
            Some(Operator::RescueModifier) => self.parenthesized(node),
            _ => self.node(node, Placement::Expression),
        }
    }

    pub(crate) fn list(&mut self, nodes: &[Node]) -> Result<()> {
        for (index, node) in nodes.iter().enumerate() {
            if index > 0 {
                self.buffer.push_str(",");
            }
            self.list_item(node)?;
        }
        Ok(())
    }

    fn arguments(&mut self, args: &[Node]) -> Result<()> {
        self.buffer.push_str("(");
        self.list(args)?;
        self.buffer.push_str(")");
        Ok(())
    }

    /// `-2.abs` reads as `(-2).abs`, so a sign never touches a numeric literal that starts a longer operand.
    fn prefix_operand(&mut self, operand: &Node, operator: Operator) -> Result<()> {
        if matches!(operator, Operator::Negate | Operator::UnaryPlus) && signs_numeric_literal(operand) {
            self.parenthesized(operand)
        } else {
            self.operand(operand, operator, Side::Operand)
        }
    }

    fn prefixed(&mut self, prefix: &str, operand: Option<&Node>) -> Result<()> {
        self.buffer.push_str(prefix);
        match operand {
            Some(operand) => self.primary(operand),
            None => Ok(()),
        }
    }

    fn body(&mut self, body: &Body) -> Result<()> {
        let mut state = self.sequence(&body.statements, SeparatorState::AfterStatement)?;

        for rescue in &body.rescues {
            if rescue.exceptions.is_empty() {
                self.clause(state, "rescue", false);
            } else {
                self.clause(state, "rescue", true);
                self.list(&rescue.exceptions)?;
            }

            if let Some(reference) = &rescue.reference {
                self.buffer.push_str("=>");
                self.assign_target(reference)?;
            }

            state = self.sequence(&rescue.body, SeparatorState::AfterStatement)?;
        }

        if let Some(statements) = &body.else_ {
            self.clause(state, "else", false);
            state = self.sequence(statements, SeparatorState::AfterStatement)?;
        }

        if let Some(statements) = &body.ensure {
            self.clause(state, "ensure", false);
            state = self.sequence(statements, SeparatorState::AfterStatement)?;
        }

        self.close_with_keyword(state, "end");
        Ok(())
    }

    fn conditional(
        &mut self,
        keyword: &str,
        predicate: &Node,
        consequent: &[Node],
        alternate: Option<&Alternate>,
        kind: ConditionalKind,
    ) -> Result<()> {
        self.buffer.push_operand_keyword(keyword);
        self.header(predicate)?;
        let mut state = self.sequence(consequent, SeparatorState::AfterStatement)?;
        let mut alternate = alternate;

        while let Some(branch) = alternate {
            match branch {
                Alternate::Else(statements) => {
                    self.clause(state, "else", false);
                    state = self.sequence(statements, SeparatorState::AfterStatement)?;
                    alternate = None;
                }
                Alternate::Elsif(node) => match &node.expr {
                    Expr::Conditional {
                        kind: ConditionalKind::If,
                        predicate,
                        consequent,
                        alternate: next,
                        modifier: false,
                    } if kind == ConditionalKind::If => {
                        self.clause(state, "elsif", true);
                        self.header(predicate)?;
                        state = self.sequence(consequent, SeparatorState::AfterStatement)?;
                        alternate = next.as_ref();
                    }
                    _ => return Err(UnsupportedConstruct::new("elsif", node.range).into()),
                },
            }
        }

        self.close_with_keyword(state, "end");
        Ok(())
    }

    fn loop_header(&mut self, node: &Node) -> Result<()> {
        let in_loop_header = std::mem::replace(&mut self.in_loop_header, true);
        let result = self.header(node);
        self.in_loop_header = in_loop_header;
        result
    }

    fn keyword_command(&mut self, keyword: &str, args: &[Node]) -> Result<()> {
        match args {
            [] => {
                self.buffer.push_keyword(keyword);
                Ok(())
            }
            // `return {}` would open a block rather than a hash.
            [single] if matches!(single.expr, Expr::Hash(_)) => {
                self.buffer.push_keyword(keyword);
                self.arguments(args)
            }
            _ => {
                self.buffer.push_operand_keyword(keyword);
                self.list(args)
            }
        }
    }

    fn constant_path(&mut self, path: &Node) -> Result<()> {
        match &path.expr {
            Expr::Variable {
                kind: VariableKind::Constant,
                ..
            }
            | Expr::ConstantPath { .. } => self.node(path, Placement::Expression),
            _ => Err(UnsupportedConstruct::at(path).into()),
        }
    }

    /// Method names in `alias` and `undef`.
    fn method_reference(&mut self, node: &Node) -> Result<()> {
        match &node.expr {
            Expr::Symbol(name) if literal::is_method_name(name) => {
                self.buffer.push_str(name);
                Ok(())
            }
            Expr::Symbol(_) | Expr::InterpolatedSymbol(_) => self.node(node, Placement::Expression),
            Expr::Variable {
                kind: VariableKind::Global,
                name,
            } => {
                self.buffer.push_str(name);
                Ok(())
            }
            _ => Err(UnsupportedConstruct::at(node).into()),
        }
    }

    fn targets(&mut self, targets: &[Node]) -> Result<()> {
        for (index, target) in targets.iter().enumerate() {
            if index > 0 {
                self.buffer.push_str(",");
            }
            self.assign_target(target)?;
        }
        Ok(())
    }

    fn assign_target(&mut self, target: &Node) -> Result<()> {
        match &target.expr {
            Expr::Variable { .. } | Expr::ConstantPath { .. } | Expr::MultiTarget(_) => {
                self.node(target, Placement::Expression)
            }
            Expr::Splat(operand) => {
                self.buffer.push_str("*");
                match operand {
                    Some(operand) => self.assign_target(operand),
                    None => Ok(()),
                }
            }
            Expr::Call(Call {
                receiver: Some(receiver),
                name,
                args,
                block: None,
                ..
            }) if name == "[]" => {
                self.primary(receiver)?;
                self.buffer.push_str("[");
                self.list(args)?;
                self.buffer.push_str("]");
                Ok(())
            }
            Expr::Call(Call {
                receiver: Some(receiver),
                operator,
                name,
                args,
                block: None,
                ..
            }) if args.is_empty() && literal::is_identifier(name) => {
                self.primary(receiver)?;
                self.buffer.push_str(call_operator(*operator));
                self.buffer.push_str(name);
                Ok(())
            }
            _ => Err(UnsupportedConstruct::new("assignment_target", target.range).into()),
        }
    }

    fn pair(&mut self, key: &Node, value: &Node) -> Result<()> {
        match &key.expr {
            Expr::Symbol(name) if literal::is_label(name) => {
                self.buffer.push_str(name);
                self.buffer.push_str(":");
            }
            Expr::Symbol(name) => {
                self.buffer.push_str(&literal::string(name));
                self.buffer.push_str(":");
            }
            Expr::InterpolatedSymbol(parts) => {
                self.spliced(parts, Splice::String)?;
                self.buffer.push_str(":");
            }
            _ => {
                self.list_item(key)?;
                self.buffer.push_str("=>");
            }
        }

        self.list_item(value)
    }

    fn array(&mut self, elements: &[Node]) -> Result<()> {
        let words = elements
            .iter()
            .map(|element| match &element.expr {
                Expr::String(content) => Some(('w', content.as_str())),
                Expr::Symbol(name) => Some(('i', name.as_str())),
                _ => None,
            })
            .collect::<Option<Vec<_>>>();

        if let Some(words) = words
            && let Some(&(sigil, _)) = words.first()
            && words.iter().all(|(kind, _)| *kind == sigil)
        {
            let texts = words.iter().map(|(_, text)| *text).collect::<Vec<_>>();

            if let Some(word_array) = literal::word_array(sigil, &texts) {
                let bracketed = 2 + texts
                    .iter()
                    .map(|text| match sigil {
                        'w' => literal::string(text).len() + 1,
                        _ => literal::symbol(text).len() + 1,
                    })
                    .sum::<usize>()
                    - 1;

                if word_array.len() < bracketed {
                    self.buffer.push_str(&word_array);
                    return Ok(());
                }
            }
        }

        self.buffer.push_str("[");
        self.list(elements)?;
        self.buffer.push_str("]");
        Ok(())
    }

    fn call(&mut self, node: &Node, call: &Call, placement: Placement) -> Result<()> {
        if let Some(receiver) = call.receiver.as_deref()
            && call.block.is_none()
        {
            if let Some(operator) = infix_operator(call) {
                self.operand(receiver, operator, Side::Left)?;
                self.buffer.push_str(operator.symbol());
                return self.operand(&call.args[0], operator, Side::Right);
            }

            if let Some(operator) = prefix_operator(call) {
                self.buffer.push_str(operator.symbol());
                return self.prefix_operand(receiver, operator);
            }

            if let Some((value, indices)) = index_write(call) {
                self.primary(receiver)?;
                self.buffer.push_str("[");
                self.list(indices)?;
                self.buffer.push_str("]=");
                return self.operand(value, Operator::Assign, Side::Right);
            }

            if let Some((attribute, value)) = attribute_write(call) {
                self.primary(receiver)?;
                self.buffer.push_str(call_operator(call.operator));
                self.buffer.push_str(attribute);
                self.buffer.push_str("=");
                return self.operand(value, Operator::Assign, Side::Right);
            }
        }

        if call.name.is_empty() {
            return Err(UnsupportedConstruct::at(node).into());
        }

        if let Some(receiver) = call.receiver.as_deref() {
            if call.name == "[]" && call.operator == CallOperator::Dot {
                self.primary(receiver)?;
                self.buffer.push_str("[");
                self.list(&call.args)?;
                self.buffer.push_str("]");
                return self.attached_block(call.block.as_ref());
            }

            self.primary(receiver)?;
            self.buffer.push_str(call_operator(call.operator));
        } else if placement == Placement::Statement
            && let Some(argument) = command_argument(call)
        {
            self.buffer.push_operand_keyword(&call.name);
            return self.node(argument, Placement::Expression);
        }

        self.buffer.push_str(&call.name);

        let operator_method = !call.name.starts_with(is_word_char);
        let needs_arguments = !call.args.is_empty()
            || operator_method
            || (call.receiver.is_none()
                && !call.variable_call
                && !call.name.ends_with(['?', '!'])
                && (call.block.is_none() || call.name.starts_with(|c: char| c.is_uppercase())));

        if needs_arguments {
            self.arguments(&call.args)?;
        }

        self.attached_block(call.block.as_ref())
    }

    fn attached_block(&mut self, block: Option<&Block>) -> Result<()> {
        match block {
            Some(block) => self.block_body(block, true),
            None => Ok(()),
        }
    }

    /// Lambdas pass `with_params: false`; their parameters precede the body.
    fn block_body(&mut self, block: &Block, with_params: bool) -> Result<()> {
        let has_params = with_params && (block.params.is_some() || !block.locals.is_empty());

        if self.uses_brace(block) {
            self.buffer.push_str("{");
            if has_params {
                self.block_params(block)?;
            }

            if block.body.has_clauses() {
                self.buffer.push_keyword("begin");
                self.body(&block.body)?;
                self.close_with_delimiter(SeparatorState::Start, "}");
            } else {
                let state = self.sequence(&block.body.statements, SeparatorState::Start)?;
                self.close_with_delimiter(state, "}");
            }

            return Ok(());
        }

        self.buffer.push_keyword("do");
        if has_params {
            self.block_params(block)?;
        }
        self.body(&block.body)
    }

    fn block_params(&mut self, block: &Block) -> Result<()> {
        self.buffer.push_str("|");
        if let Some(params) = &block.params {
            self.params(params, ParamsDelimiter::Pipes)?;
        }
        self.block_locals(&block.locals);
        self.buffer.push_str("|");
        Ok(())
    }

    fn block_locals(&mut self, locals: &[kureha_lang::Name]) {
        if locals.is_empty() {
            return;
        }

        self.buffer.push_str(";");
        for (index, local) in locals.iter().enumerate() {
            if index > 0 {
                self.buffer.push_str(",");
            }
            self.buffer.push_str(local);
        }
    }
}

/// Operator a node renders as at its top level, if any.
pub(crate) fn operator_of(node: &Node) -> Option<Operator> {
    match &node.expr {
        Expr::BinaryOp { op, right, .. } => Some(binary_form(*op, right)),
        Expr::UnaryOp { op, .. } => Some(Operator::from(*op)),
        Expr::Call(call) if call.receiver.is_some() && call.block.is_none() => infix_operator(call)
            .or_else(|| prefix_operator(call))
            .or_else(|| (index_write(call).is_some() || attribute_write(call).is_some()).then_some(Operator::Assign)),
        Expr::Range { exclusive: true, .. } => Some(Operator::ExclusiveRange),
        Expr::Range { exclusive: false, .. } => Some(Operator::Range),
        Expr::Ternary { .. } => Some(Operator::Ternary),
        Expr::RescueModifier { .. } => Some(Operator::RescueModifier),
        Expr::Assign { .. } | Expr::OpAssign { .. } | Expr::MultiAssign { .. } => Some(Operator::Assign),
        Expr::Integer(text) if text.starts_with('-') => Some(Operator::Negate),
        Expr::Float(value) if value.is_sign_negative() && !value.is_nan() => Some(Operator::Negate),
        Expr::Statements(statements) | Expr::Parentheses(statements) => match statements.as_slice() {
            [single] if !single.expr.is_trivia() => operator_of(single),
            _ => None,
        },
        _ => None,
    }
}

/// Whether a sign pushed before `node` would fuse with a numeric literal that only starts it.
/// `-2**2` is still `-(2**2)` in Ruby.
fn signs_numeric_literal(node: &Node) -> bool {
    match &node.expr {
        Expr::Integer(_) | Expr::Float(_) => false,
        Expr::BinaryOp {
            op: BinaryOperator::Pow,
            left,
            ..
        } if is_numeric_literal(left) => false,
        Expr::Statements(statements) | Expr::Parentheses(statements) => match statements.as_slice() {
            [single] if !single.expr.is_trivia() => signs_numeric_literal(single),
            _ => false,
        },
        _ => leads_with_numeric_literal(node),
    }
}

fn is_numeric_literal(node: &Node) -> bool {
    matches!(node.expr, Expr::Integer(_) | Expr::Float(_))
}

/// Whether the rendered text of `node` begins with a numeric literal.
fn leads_with_numeric_literal(node: &Node) -> bool {
    match &node.expr {
        Expr::Integer(_) | Expr::Float(_) => true,
        Expr::BinaryOp { op, left, right } => {
            !needs_parens(operator_of(left), binary_form(*op, right), Side::Left) && leads_with_numeric_literal(left)
        }
        Expr::Call(call) => match call.receiver.as_deref() {
            None => false,
            Some(_) if call.block.is_none() && prefix_operator(call).is_some() => false,
            Some(receiver) => match infix_operator(call).filter(|_| call.block.is_none()) {
                Some(operator) => {
                    !needs_parens(operator_of(receiver), operator, Side::Left) && leads_with_numeric_literal(receiver)
                }
                None => operator_of(receiver).is_none() && leads_with_numeric_literal(receiver),
            },
        },
        Expr::Statements(statements) | Expr::Parentheses(statements) => match statements.as_slice() {
            [single] if !single.expr.is_trivia() => leads_with_numeric_literal(single),
            _ => false,
        },
        _ => false,
    }
}

/// `and`/`or` render as `&&`/`||` unless the right side is a jump such as `return`,
/// which only the keyword forms accept.
fn binary_form(op: BinaryOperator, right: &Node) -> Operator {
    match op {
        BinaryOperator::KeywordAnd if !is_jump(right) => Operator::And,
        BinaryOperator::KeywordOr if !is_jump(right) => Operator::Or,
        _ => Operator::from(op),
    }
}

fn is_jump(node: &Node) -> bool {
    match &node.expr {
        Expr::Return(_) | Expr::Break(_) | Expr::Next(_) | Expr::Redo | Expr::Retry => true,
        Expr::Parentheses(statements) => matches!(statements.as_slice(), [single] if is_jump(single)),
        _ => false,
    }
}

fn is_plain_argument(node: &Node) -> bool {
    !matches!(
        node.expr,
        Expr::Splat(_)
            | Expr::DoubleSplat(_)
            | Expr::BlockArgument(_)
            | Expr::KeywordHash(_)
            | Expr::ForwardingArguments
    )
}

fn infix_operator(call: &Call) -> Option<Operator> {
    match (&call.receiver, call.args.as_slice(), &call.block) {
        (Some(_), [argument], None) if call.operator == CallOperator::Dot && is_plain_argument(argument) => {
            Operator::from_method_name(&call.name)
        }
        _ => None,
    }
}

fn prefix_operator(call: &Call) -> Option<Operator> {
    match (&call.receiver, call.args.as_slice(), &call.block) {
        (Some(_), [], None) if call.operator == CallOperator::Dot => Operator::from_prefix_method_name(&call.name),
        _ => None,
    }
}

/// `recv[a, b] = value` written as a `[]=` call.
fn index_write(call: &Call) -> Option<(&Node, &[Node])> {
    match call.args.split_last() {
        Some((value, indices))
            if call.name == "[]="
                && call.operator == CallOperator::Dot
                && call.block.is_none()
                && is_plain_argument(value) =>
        {
            Some((value, indices))
        }
        _ => None,
    }
}

/// `recv.name = value` written as a `name=` call.
fn attribute_write(call: &Call) -> Option<(&str, &Node)> {
    let attribute = call.name.strip_suffix('=')?;

    match call.args.as_slice() {
        [value] if call.block.is_none() && literal::is_identifier(attribute) && is_plain_argument(value) => {
            Some((attribute, value))
        }
        _ => None,
    }
}

/// The single argument of an output-like call that may drop its parentheses.
fn command_argument(call: &Call) -> Option<&Node> {
    let [argument] = call.args.as_slice() else {
        return None;
    };

    if call.block.is_some() || !COMMAND_CALLS.contains(&call.name.as_str()) {
        return None;
    }

    match &argument.expr {
        Expr::String(_) | Expr::InterpolatedString(_) | Expr::StringConcat(_) => Some(argument),
        Expr::Variable { .. } | Expr::True | Expr::False | Expr::Nil | Expr::SelfRef => Some(argument),
        Expr::Integer(text) if !text.starts_with('-') => Some(argument),
        Expr::Call(Call {
            variable_call: true, ..
        }) => Some(argument),
        _ => None,
    }
}

fn call_operator(operator: CallOperator) -> &'static str {
    match operator {
        CallOperator::Dot => ".",
        CallOperator::SafeNavigation => "&.",
    }
}

fn assignable_operator(operator: BinaryOperator) -> bool {
    matches!(
        operator,
        BinaryOperator::Pow
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod
            | BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Shl
            | BinaryOperator::Shr
            | BinaryOperator::BitAnd
            | BinaryOperator::BitOr
            | BinaryOperator::BitXor
            | BinaryOperator::And
            | BinaryOperator::Or
    )
}

/// Whether a statement has a block anywhere along its call chain or operands.
fn carries_block(node: &Node) -> bool {
    match &node.expr {
        Expr::Call(call) => {
            call.block.is_some()
                || call.receiver.as_deref().is_some_and(carries_block)
                || call.args.iter().any(carries_block)
        }
        Expr::Super { args, block } => block.is_some() || args.iter().flatten().any(carries_block),
        Expr::Lambda(_) => true,
        Expr::Assign { value, .. } | Expr::OpAssign { value, .. } => carries_block(value),
        Expr::BinaryOp { left, right, .. } => carries_block(left) || carries_block(right),
        Expr::UnaryOp { operand, .. } => carries_block(operand),
        Expr::Return(args) | Expr::Break(args) | Expr::Next(args) | Expr::Yield(args) => {
            args.iter().any(carries_block)
        }
        Expr::Parentheses(statements) => statements.iter().any(carries_block),
        _ => false,
    }
}

/// Flattens adjacent string literals into the parts of one literal.
fn concat_parts(pieces: &[Node], parts: &mut Vec<StringPart>) -> Result<()> {
    for piece in pieces {
        match &piece.expr {
            Expr::String(content) => parts.push(StringPart::Text(content.clone())),
            Expr::InterpolatedString(inner) => parts.extend(inner.iter().cloned()),
            Expr::StringConcat(inner) => concat_parts(inner, parts)?,
            _ => return Err(UnsupportedConstruct::at(piece).into()),
        }
    }
    Ok(())
}
