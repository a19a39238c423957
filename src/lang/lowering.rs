//! Lowering of the tree-sitter concrete syntax tree into [`AstNode`]s.
//!
//! tree-sitter-python produces a concrete tree (`function_definition`,
//! `expression_statement`, `binary_operator`, ...). Consumers of pyshape
//! expect the node vocabulary of CPython's `ast` module instead, so this
//! module rebuilds that shape: contexts and operators become child nodes,
//! `elif` chains nest, chained assignments collapse, and children follow
//! CPython's field order.

use tree_sitter::Node;

use crate::core::errors::{PyshapeError, Result};
use crate::lang::ast::{AstNode, LiteralValue};

type Lowered = Result<AstNode>;

/// Expression context attached to names, attributes, subscripts and
/// containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Load,
    Store,
    Del,
}

impl Ctx {
    fn node(self) -> AstNode {
        AstNode::bare(match self {
            Ctx::Load => "Load",
            Ctx::Store => "Store",
            Ctx::Del => "Del",
        })
    }
}

/// 1-based line of a concrete node.
fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// Named children, ignoring comments and line continuations.
fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// All children (named and anonymous), ignoring extras.
fn all_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn has_token(node: Node, token: &str) -> bool {
    all_children(node)
        .iter()
        .any(|child| !child.is_named() && child.kind() == token)
}

fn starts_with_async(node: Node) -> bool {
    node.child(0).is_some_and(|child| child.kind() == "async")
}

/// Build a syntax error in the `message (<unknown>, line N)` form.
pub(crate) fn syntax_error(node: Node, message: &str) -> PyshapeError {
    let line = line_of(node);
    PyshapeError::parse_at(
        "python",
        format!("{message} (<unknown>, line {line})"),
        line,
        node.start_position().column + 1,
    )
}

fn unsupported(node: Node) -> PyshapeError {
    PyshapeError::internal(format!(
        "unsupported syntax node '{}' at line {}",
        node.kind(),
        line_of(node)
    ))
}

fn binary_operator_name(token: &str) -> Option<&'static str> {
    Some(match token {
        "+" => "Add",
        "-" => "Sub",
        "*" => "Mult",
        "@" => "MatMult",
        "/" => "Div",
        "%" => "Mod",
        "//" => "FloorDiv",
        "**" => "Pow",
        "<<" => "LShift",
        ">>" => "RShift",
        "|" => "BitOr",
        "^" => "BitXor",
        "&" => "BitAnd",
        _ => return None,
    })
}

fn unary_operator_name(token: &str) -> Option<&'static str> {
    Some(match token {
        "+" => "UAdd",
        "-" => "USub",
        "~" => "Invert",
        _ => return None,
    })
}

fn comparison_operator_name(token: &str) -> Option<&'static str> {
    Some(match token {
        "<" => "Lt",
        "<=" => "LtE",
        "==" => "Eq",
        "!=" => "NotEq",
        ">" => "Gt",
        ">=" => "GtE",
        "in" => "In",
        "not in" => "NotIn",
        "is" => "Is",
        "is not" => "IsNot",
        _ => return None,
    })
}

/// Positional, keyword-only and variadic parameters collected while
/// walking a parameter list.
#[derive(Default)]
struct Parameters {
    posonly: Vec<AstNode>,
    args: Vec<AstNode>,
    vararg: Option<AstNode>,
    kwonly: Vec<AstNode>,
    kw_defaults: Vec<Option<AstNode>>,
    kwarg: Option<AstNode>,
    defaults: Vec<AstNode>,
    after_star: bool,
}

impl Parameters {
    fn push(&mut self, param: Node, arg: AstNode, default: Option<AstNode>) -> Result<()> {
        if self.after_star {
            self.kwonly.push(arg);
            self.kw_defaults.push(default);
            return Ok(());
        }
        if default.is_none() && !self.defaults.is_empty() {
            return Err(syntax_error(param, "non-default argument follows default argument"));
        }
        self.args.push(arg);
        self.defaults.extend(default);
        Ok(())
    }

    fn into_node(self) -> AstNode {
        AstNode::bare("arguments")
            .with_children(self.posonly)
            .with_children(self.args)
            .with_opt(self.vararg)
            .with_children(self.kwonly)
            .with_children(self.kw_defaults.into_iter().flatten())
            .with_opt(self.kwarg)
            .with_children(self.defaults)
    }
}

/// One `for ... in ...` clause of a comprehension with its trailing `if`s.
struct Generator {
    target: AstNode,
    iter: AstNode,
    ifs: Vec<AstNode>,
}

/// Converts a parsed tree-sitter tree into an owned [`AstNode`] tree.
pub struct Lowering<'s> {
    source: &'s str,
}

impl<'s> Lowering<'s> {
    /// Create a lowering pass over `source`, which must be the text the tree
    /// was parsed from.
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn text(&self, node: Node) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// Lower a `module` root into a `Module` node.
    pub fn module(&self, root: Node) -> Lowered {
        let mut module = AstNode::bare("Module");
        for child in named_children(root) {
            module.children.push(self.statement(child)?);
        }
        Ok(module)
    }

    fn block(&self, block: Option<Node>, owner: Node) -> Result<Vec<AstNode>> {
        let Some(block) = block else {
            return Err(syntax_error(owner, "expected an indented block"));
        };
        let statements = named_children(block);
        if statements.is_empty() {
            return Err(syntax_error(owner, "expected an indented block"));
        }
        statements
            .into_iter()
            .map(|statement| self.statement(statement))
            .collect()
    }

    fn body(&self, node: Node, field: &str) -> Result<Vec<AstNode>> {
        self.block(node.child_by_field_name(field), node)
    }

    fn statement(&self, node: Node) -> Lowered {
        let line = line_of(node);
        match node.kind() {
            "expression_statement" => self.expression_statement(node),
            "pass_statement" => Ok(AstNode::at("Pass", line)),
            "break_statement" => Ok(AstNode::at("Break", line)),
            "continue_statement" => Ok(AstNode::at("Continue", line)),
            "return_statement" => {
                let value = named_children(node)
                    .first()
                    .map(|value| self.value(*value))
                    .transpose()?;
                Ok(AstNode::at("Return", line).with_opt(value))
            }
            "delete_statement" => {
                let mut delete = AstNode::at("Delete", line);
                for target in named_children(node) {
                    if target.kind() == "expression_list" {
                        for element in named_children(target) {
                            delete.children.push(self.delete_target(element)?);
                        }
                    } else {
                        delete.children.push(self.delete_target(target)?);
                    }
                }
                Ok(delete)
            }
            "raise_statement" => {
                let cause = node.child_by_field_name("cause");
                let exc = named_children(node)
                    .into_iter()
                    .find(|child| Some(*child) != cause)
                    .map(|exc| self.value(exc))
                    .transpose()?;
                let cause = cause.map(|cause| self.load(cause)).transpose()?;
                Ok(AstNode::at("Raise", line).with_opt(exc).with_opt(cause))
            }
            "assert_statement" => {
                let mut assert = AstNode::at("Assert", line);
                for part in named_children(node) {
                    assert.children.push(self.load(part)?);
                }
                Ok(assert)
            }
            "global_statement" => Ok(AstNode::at("Global", line)),
            "nonlocal_statement" => Ok(AstNode::at("Nonlocal", line)),
            "import_statement" => Ok(AstNode::at("Import", line).with_children(self.aliases(node))),
            "import_from_statement" | "future_import_statement" => {
                Ok(AstNode::at("ImportFrom", line).with_children(self.aliases(node)))
            }
            "if_statement" => self.if_statement(node),
            "for_statement" => self.for_statement(node),
            "while_statement" => {
                let test = self.required_load(node, "condition")?;
                Ok(AstNode::at("While", line)
                    .with_child(test)
                    .with_children(self.body(node, "body")?)
                    .with_children(self.orelse(node)?))
            }
            "try_statement" => self.try_statement(node),
            "with_statement" => self.with_statement(node),
            "function_definition" => self.function(node, Vec::new()),
            "class_definition" => self.class(node, Vec::new()),
            "decorated_definition" => self.decorated(node),
            "match_statement" => self.match_statement(node),
            "type_alias_statement" => self.type_alias(node),
            "print_statement" => Err(syntax_error(
                node,
                "Missing parentheses in call to 'print'. Did you mean print(...)?",
            )),
            "exec_statement" => Err(syntax_error(
                node,
                "Missing parentheses in call to 'exec'",
            )),
            _ => Err(unsupported(node)),
        }
    }

    /// Lower a `del` target, rejecting anything that cannot be deleted.
    fn delete_target(&self, target: Node) -> Lowered {
        let what = match target.kind() {
            "identifier" | "attribute" | "subscript" => return self.expr(target, Ctx::Del),
            "tuple" | "list" | "parenthesized_expression" | "expression_list" => {
                for element in named_children(target) {
                    self.delete_target(element)?;
                }
                return self.expr(target, Ctx::Del);
            }
            "call" => "function call",
            "list_splat" => "starred",
            "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none"
            | "ellipsis" => "literal",
            _ => "expression",
        };
        Err(syntax_error(target, &format!("cannot delete {what}")))
    }

    fn expression_statement(&self, node: Node) -> Lowered {
        let line = line_of(node);
        let children = named_children(node);
        match children.as_slice() {
            [single] if single.kind() == "assignment" => self.assignment(*single),
            [single] if single.kind() == "augmented_assignment" => self.augmented_assignment(*single),
            [single] => Ok(AstNode::at("Expr", line).with_child(self.value(*single)?)),
            [first, ..] => {
                let mut tuple = AstNode::at("Tuple", line_of(*first));
                for element in &children {
                    tuple.children.push(self.value(*element)?);
                }
                Ok(AstNode::at("Expr", line).with_child(tuple.with_child(Ctx::Load.node())))
            }
            [] => Err(syntax_error(node, "invalid syntax")),
        }
    }

    fn assignment(&self, node: Node) -> Lowered {
        let line = line_of(node);
        let left = node
            .child_by_field_name("left")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;

        if let Some(annotation) = node.child_by_field_name("type") {
            let value = node
                .child_by_field_name("right")
                .map(|value| self.value(value))
                .transpose()?;
            return Ok(AstNode::at("AnnAssign", line)
                .with_child(self.expr(left, Ctx::Store)?)
                .with_child(self.annotation(annotation)?)
                .with_opt(value));
        }

        let mut assign = AstNode::at("Assign", line);
        assign.children.push(self.expr(left, Ctx::Store)?);
        let mut right = node.child_by_field_name("right");
        while let Some(current) = right {
            match current.kind() {
                "assignment" if current.child_by_field_name("type").is_none() => {
                    let target = current
                        .child_by_field_name("left")
                        .ok_or_else(|| syntax_error(current, "invalid syntax"))?;
                    assign.children.push(self.expr(target, Ctx::Store)?);
                    right = current.child_by_field_name("right");
                }
                "assignment" | "augmented_assignment" => {
                    return Err(syntax_error(current, "invalid syntax"));
                }
                _ => {
                    assign.children.push(self.value(current)?);
                    return Ok(assign);
                }
            }
        }
        Err(syntax_error(node, "invalid syntax"))
    }

    fn augmented_assignment(&self, node: Node) -> Lowered {
        let line = line_of(node);
        let target = node
            .child_by_field_name("left")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let operator = node
            .child_by_field_name("operator")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let value = node
            .child_by_field_name("right")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let op = binary_operator_name(operator.kind().trim_end_matches('='))
            .ok_or_else(|| syntax_error(operator, "invalid syntax"))?;

        Ok(AstNode::at("AugAssign", line)
            .with_child(self.expr(target, Ctx::Store)?)
            .with_child(AstNode::bare(op))
            .with_child(self.value(value)?))
    }

    fn aliases(&self, node: Node) -> Vec<AstNode> {
        let mut aliases: Vec<AstNode> = field_children(node, "name")
            .into_iter()
            .map(|name| AstNode::at("alias", line_of(name)))
            .collect();
        aliases.extend(
            named_children(node)
                .into_iter()
                .filter(|child| child.kind() == "wildcard_import")
                .map(|star| AstNode::at("alias", line_of(star))),
        );
        aliases
    }

    fn orelse(&self, node: Node) -> Result<Vec<AstNode>> {
        match node.child_by_field_name("alternative") {
            Some(alternative) if alternative.kind() == "else_clause" => {
                self.body(alternative, "body")
            }
            _ => Ok(Vec::new()),
        }
    }

    fn if_statement(&self, node: Node) -> Lowered {
        let mut orelse = Vec::new();
        for alternative in field_children(node, "alternative").into_iter().rev() {
            orelse = match alternative.kind() {
                "else_clause" => self.body(alternative, "body")?,
                "elif_clause" => vec![AstNode::at("If", line_of(alternative))
                    .with_child(self.required_load(alternative, "condition")?)
                    .with_children(self.body(alternative, "consequence")?)
                    .with_children(orelse)],
                _ => return Err(unsupported(alternative)),
            };
        }

        Ok(AstNode::at("If", line_of(node))
            .with_child(self.required_load(node, "condition")?)
            .with_children(self.body(node, "consequence")?)
            .with_children(orelse))
    }

    fn for_statement(&self, node: Node) -> Lowered {
        let kind = if starts_with_async(node) { "AsyncFor" } else { "For" };
        let target = node
            .child_by_field_name("left")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let iter = node
            .child_by_field_name("right")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;

        Ok(AstNode::at(kind, line_of(node))
            .with_child(self.expr(target, Ctx::Store)?)
            .with_child(self.value(iter)?)
            .with_children(self.body(node, "body")?)
            .with_children(self.orelse(node)?))
    }

    fn try_statement(&self, node: Node) -> Lowered {
        let mut kind = "Try";
        let mut handlers = Vec::new();
        let mut orelse = Vec::new();
        let mut finalbody = Vec::new();

        for clause in named_children(node) {
            match clause.kind() {
                "except_clause" => {
                    let group = has_token(clause, "*");
                    if !handlers.is_empty() && group != (kind == "TryStar") {
                        return Err(syntax_error(
                            clause,
                            "cannot have both 'except' and 'except*' on the same 'try'",
                        ));
                    }
                    if group {
                        kind = "TryStar";
                    }
                    handlers.push(self.except_handler(clause)?);
                }
                "else_clause" => orelse = self.body(clause, "body")?,
                "finally_clause" => {
                    let block = named_children(clause)
                        .into_iter()
                        .find(|child| child.kind() == "block");
                    finalbody = self.block(block, clause)?;
                }
                _ => {}
            }
        }

        Ok(AstNode::at(kind, line_of(node))
            .with_children(self.body(node, "body")?)
            .with_children(handlers)
            .with_children(orelse)
            .with_children(finalbody))
    }

    fn except_handler(&self, clause: Node) -> Lowered {
        if has_token(clause, ",") {
            return Err(syntax_error(
                clause,
                "multiple exception types must be parenthesized",
            ));
        }
        let children = named_children(clause);
        let block = children.iter().copied().find(|child| child.kind() == "block");
        let exc_type = match children.iter().find(|child| child.kind() != "block") {
            Some(first) if first.kind() == "as_pattern" => named_children(*first)
                .first()
                .map(|inner| self.load(*inner))
                .transpose()?,
            Some(first) => Some(self.load(*first)?),
            None => None,
        };

        Ok(AstNode::at("ExceptHandler", line_of(clause))
            .with_opt(exc_type)
            .with_children(self.block(block, clause)?))
    }

    fn with_statement(&self, node: Node) -> Lowered {
        let kind = if starts_with_async(node) { "AsyncWith" } else { "With" };
        let mut with = AstNode::at(kind, line_of(node));

        for clause in named_children(node) {
            if clause.kind() != "with_clause" {
                continue;
            }
            for item in named_children(clause) {
                with.children.push(self.with_item(item)?);
            }
        }

        Ok(with.with_children(self.body(node, "body")?))
    }

    fn with_item(&self, item: Node) -> Lowered {
        let value = item
            .child_by_field_name("value")
            .or_else(|| named_children(item).first().copied())
            .ok_or_else(|| syntax_error(item, "invalid syntax"))?;

        if value.kind() != "as_pattern" {
            return Ok(AstNode::bare("withitem").with_child(self.load(value)?));
        }

        let parts = named_children(value);
        let context = parts
            .first()
            .ok_or_else(|| syntax_error(value, "invalid syntax"))?;
        let target = value.child_by_field_name("alias").or_else(|| parts.get(1).copied());
        let optional_vars = target.map(|target| self.as_target(target)).transpose()?;

        Ok(AstNode::bare("withitem")
            .with_child(self.load(*context)?)
            .with_opt(optional_vars))
    }

    fn as_target(&self, target: Node) -> Lowered {
        if target.kind() == "as_pattern_target" {
            return match named_children(target).first() {
                Some(inner) => self.expr(*inner, Ctx::Store),
                None => Ok(AstNode::at("Name", line_of(target)).with_child(Ctx::Store.node())),
            };
        }
        self.expr(target, Ctx::Store)
    }

    fn decorated(&self, node: Node) -> Lowered {
        let mut decorators = Vec::new();
        for child in named_children(node) {
            if child.kind() == "decorator" {
                let expression = named_children(child)
                    .first()
                    .copied()
                    .ok_or_else(|| syntax_error(child, "invalid syntax"))?;
                decorators.push(self.load(expression)?);
            }
        }

        let definition = node
            .child_by_field_name("definition")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        match definition.kind() {
            "function_definition" => self.function(definition, decorators),
            "class_definition" => self.class(definition, decorators),
            _ => Err(unsupported(definition)),
        }
    }

    fn function(&self, node: Node, decorators: Vec<AstNode>) -> Lowered {
        let kind = if starts_with_async(node) {
            "AsyncFunctionDef"
        } else {
            "FunctionDef"
        };
        let returns = node
            .child_by_field_name("return_type")
            .map(|returns| self.annotation(returns))
            .transpose()?;

        Ok(AstNode::at(kind, line_of(node))
            .with_child(self.parameters(node.child_by_field_name("parameters"))?)
            .with_children(self.body(node, "body")?)
            .with_children(decorators)
            .with_opt(returns)
            .with_children(self.type_params(node)?))
    }

    fn class(&self, node: Node, decorators: Vec<AstNode>) -> Lowered {
        let (bases, keywords) = match node.child_by_field_name("superclasses") {
            Some(superclasses) => self.arguments(superclasses)?,
            None => (Vec::new(), Vec::new()),
        };

        Ok(AstNode::at("ClassDef", line_of(node))
            .with_children(bases)
            .with_children(keywords)
            .with_children(self.body(node, "body")?)
            .with_children(decorators)
            .with_children(self.type_params(node)?))
    }

    fn type_params(&self, node: Node) -> Result<Vec<AstNode>> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Ok(Vec::new());
        };
        let mut type_vars = Vec::new();
        for param in named_children(params) {
            let mut type_var = AstNode::at("TypeVar", line_of(param));
            if let Some(constrained) = named_children(param)
                .into_iter()
                .find(|inner| inner.kind() == "constrained_type")
            {
                if let Some(bound) = named_children(constrained).get(1) {
                    type_var.children.push(self.annotation(*bound)?);
                }
            }
            type_vars.push(type_var);
        }
        Ok(type_vars)
    }

    fn parameters(&self, params: Option<Node>) -> Lowered {
        let mut collected = Parameters::default();
        let Some(params) = params else {
            return Ok(collected.into_node());
        };

        for param in named_children(params) {
            let line = line_of(param);
            match param.kind() {
                "identifier" => collected.push(param, AstNode::at("arg", line), None)?,
                "typed_parameter" => {
                    let annotation = param
                        .child_by_field_name("type")
                        .map(|annotation| self.annotation(annotation))
                        .transpose()?;
                    let arg = AstNode::at("arg", line).with_opt(annotation);
                    match named_children(param).first().map(|inner| inner.kind()) {
                        Some("list_splat_pattern") => {
                            collected.vararg = Some(arg);
                            collected.after_star = true;
                        }
                        Some("dictionary_splat_pattern") => collected.kwarg = Some(arg),
                        _ => collected.push(param, arg, None)?,
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    let name = param
                        .child_by_field_name("name")
                        .ok_or_else(|| syntax_error(param, "invalid syntax"))?;
                    if name.kind() == "tuple_pattern" {
                        return Err(syntax_error(param, "invalid syntax"));
                    }
                    let annotation = param
                        .child_by_field_name("type")
                        .map(|annotation| self.annotation(annotation))
                        .transpose()?;
                    let default = param
                        .child_by_field_name("value")
                        .map(|value| self.load(value))
                        .transpose()?;
                    let arg = AstNode::at("arg", line).with_opt(annotation);
                    collected.push(param, arg, default)?;
                }
                "list_splat_pattern" => {
                    collected.vararg = Some(AstNode::at("arg", line));
                    collected.after_star = true;
                }
                "dictionary_splat_pattern" => collected.kwarg = Some(AstNode::at("arg", line)),
                "keyword_separator" => collected.after_star = true,
                "positional_separator" => {
                    let args = std::mem::take(&mut collected.args);
                    collected.posonly.extend(args);
                }
                "tuple_pattern" => return Err(syntax_error(param, "invalid syntax")),
                _ => return Err(unsupported(param)),
            }
        }

        Ok(collected.into_node())
    }

    fn match_statement(&self, node: Node) -> Lowered {
        let line = line_of(node);
        let subjects = field_children(node, "subject");
        let subject = match subjects.as_slice() {
            [single] => self.load(*single)?,
            [first, ..] => {
                let mut tuple = AstNode::at("Tuple", line_of(*first));
                for subject in &subjects {
                    tuple.children.push(self.load(*subject)?);
                }
                tuple.with_child(Ctx::Load.node())
            }
            [] => return Err(syntax_error(node, "invalid syntax")),
        };

        let mut matched = AstNode::at("Match", line).with_child(subject);
        let cases = node
            .child_by_field_name("body")
            .map(named_children)
            .unwrap_or_default();
        for case in cases.into_iter().filter(|case| case.kind() == "case_clause") {
            matched.children.push(self.match_case(case)?);
        }
        Ok(matched)
    }

    fn match_case(&self, case: Node) -> Lowered {
        let patterns: Vec<Node> = named_children(case)
            .into_iter()
            .filter(|child| child.kind() == "case_pattern")
            .collect();
        let pattern = match patterns.as_slice() {
            [single] => self.pattern(*single)?,
            [first, ..] => {
                let mut sequence = AstNode::at("MatchSequence", line_of(*first));
                for pattern in &patterns {
                    sequence.children.push(self.pattern(*pattern)?);
                }
                sequence
            }
            [] => return Err(syntax_error(case, "invalid syntax")),
        };
        let guard = case
            .child_by_field_name("guard")
            .and_then(|guard| named_children(guard).first().copied())
            .map(|guard| self.load(guard))
            .transpose()?;

        Ok(AstNode::bare("match_case")
            .with_child(pattern)
            .with_opt(guard)
            .with_children(self.body(case, "consequence")?))
    }

    fn pattern(&self, node: Node) -> Lowered {
        let line = line_of(node);
        match node.kind() {
            "case_pattern" => {
                let inner = named_children(node);
                match inner.as_slice() {
                    [] => Ok(AstNode::at("MatchAs", line)),
                    [single] if has_token(node, "-") => {
                        let negated = AstNode::at("UnaryOp", line)
                            .with_child(AstNode::bare("USub"))
                            .with_child(self.load(*single)?);
                        Ok(AstNode::at("MatchValue", line).with_child(negated))
                    }
                    [single] => self.pattern(*single),
                    [first, ..] => Err(unsupported(*first)),
                }
            }
            "as_pattern" => {
                let inner = named_children(node)
                    .first()
                    .map(|inner| self.pattern(*inner))
                    .transpose()?;
                Ok(AstNode::at("MatchAs", line).with_opt(inner))
            }
            "union_pattern" => self.pattern_list("MatchOr", node),
            "list_pattern" | "tuple_pattern" => self.pattern_list("MatchSequence", node),
            "splat_pattern" => Ok(AstNode::at("MatchStar", line)),
            "dict_pattern" => {
                let mut mapping = AstNode::at("MatchMapping", line);
                for key in field_children(node, "key") {
                    mapping.children.push(self.pattern_value(key)?);
                }
                for value in field_children(node, "value") {
                    mapping.children.push(self.pattern(value)?);
                }
                Ok(mapping)
            }
            "class_pattern" => {
                let mut class = AstNode::at("MatchClass", line);
                let mut keywords = Vec::new();
                for child in named_children(node) {
                    match child.kind() {
                        "dotted_name" => class.children.push(self.dotted_name(child)?),
                        "keyword_pattern" => {
                            let value = named_children(child)
                                .last()
                                .copied()
                                .ok_or_else(|| syntax_error(child, "invalid syntax"))?;
                            keywords.push(self.pattern(value)?);
                        }
                        _ => class.children.push(self.pattern(child)?),
                    }
                }
                Ok(class.with_children(keywords))
            }
            "keyword_pattern" => match named_children(node).last() {
                Some(value) => self.pattern(*value),
                None => Err(syntax_error(node, "invalid syntax")),
            },
            "dotted_name" if named_children(node).len() == 1 => Ok(AstNode::at("MatchAs", line)),
            "identifier" => Ok(AstNode::at("MatchAs", line)),
            "true" | "false" | "none" => Ok(AstNode::at("MatchSingleton", line)),
            _ => Ok(AstNode::at("MatchValue", line).with_child(self.pattern_value(node)?)),
        }
    }

    fn pattern_list(&self, kind: &'static str, node: Node) -> Lowered {
        let mut list = AstNode::at(kind, line_of(node));
        for child in named_children(node) {
            list.children.push(self.pattern(child)?);
        }
        Ok(list)
    }

    /// Value positions inside patterns: literals, dotted names and
    /// `real +/- imag` complex literals.
    fn pattern_value(&self, node: Node) -> Lowered {
        match node.kind() {
            "dotted_name" => self.dotted_name(node),
            "case_pattern" => match named_children(node).first() {
                Some(inner) if has_token(node, "-") => Ok(AstNode::at("UnaryOp", line_of(node))
                    .with_child(AstNode::bare("USub"))
                    .with_child(self.load(*inner)?)),
                Some(inner) => self.pattern_value(*inner),
                None => Err(syntax_error(node, "invalid syntax")),
            },
            "complex_pattern" => {
                let line = line_of(node);
                let children = all_children(node);
                let mut operands = Vec::new();
                let mut negate_first = false;
                let mut op = "Add";
                for child in &children {
                    if child.is_named() {
                        operands.push(self.load(*child)?);
                    } else if child.kind() == "-" && operands.is_empty() {
                        negate_first = true;
                    } else if child.kind() == "-" {
                        op = "Sub";
                    }
                }
                let mut operands = operands.into_iter();
                let (Some(mut left), Some(right)) = (operands.next(), operands.next()) else {
                    return Err(syntax_error(node, "invalid syntax"));
                };
                if negate_first {
                    left = AstNode::at("UnaryOp", line)
                        .with_child(AstNode::bare("USub"))
                        .with_child(left);
                }
                Ok(AstNode::at("BinOp", line)
                    .with_child(left)
                    .with_child(AstNode::bare(op))
                    .with_child(right))
            }
            _ => self.load(node),
        }
    }

    fn type_alias(&self, node: Node) -> Lowered {
        let parts = named_children(node);
        let [name, value] = parts.as_slice() else {
            return Err(syntax_error(node, "invalid syntax"));
        };
        let name_line = line_of(*name);

        Ok(AstNode::at("TypeAlias", line_of(node))
            .with_child(AstNode::at("Name", name_line).with_child(Ctx::Store.node()))
            .with_child(self.annotation(*value)?))
    }

    fn required_load(&self, node: Node, field: &str) -> Lowered {
        let child = node
            .child_by_field_name(field)
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        self.load(child)
    }

    fn load(&self, node: Node) -> Lowered {
        self.expr(node, Ctx::Load)
    }

    /// Right-hand sides and other value positions: bare tuples, `yield`
    /// and regular expressions.
    fn value(&self, node: Node) -> Lowered {
        match node.kind() {
            "yield" => self.yield_expr(node),
            _ => self.load(node),
        }
    }

    fn expr(&self, node: Node, ctx: Ctx) -> Lowered {
        let line = line_of(node);
        match node.kind() {
            "identifier" | "keyword_identifier" => {
                Ok(AstNode::at("Name", line).with_child(ctx.node()))
            }
            "integer" => Ok(AstNode::literal(
                "Num",
                line,
                LiteralValue::number(self.text(node), false),
            )),
            "float" => Ok(AstNode::literal(
                "Num",
                line,
                LiteralValue::number(self.text(node), true),
            )),
            "true" => Ok(AstNode::literal("NameConstant", line, LiteralValue::Bool(true))),
            "false" => Ok(AstNode::literal("NameConstant", line, LiteralValue::Bool(false))),
            "none" => Ok(AstNode::literal("NameConstant", line, LiteralValue::None)),
            "ellipsis" => Ok(AstNode::at("Ellipsis", line)),
            "string" | "concatenated_string" => self.string(node),
            "attribute" => {
                let object = node
                    .child_by_field_name("object")
                    .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
                Ok(AstNode::at("Attribute", line)
                    .with_child(self.load(object)?)
                    .with_child(ctx.node()))
            }
            "subscript" => self.subscript(node, ctx),
            "call" => self.call(node),
            "list" | "list_pattern" => self.elements("List", node, ctx),
            "tuple" | "tuple_pattern" | "expression_list" | "pattern_list" => {
                self.elements("Tuple", node, ctx)
            }
            "set" => {
                let mut set = AstNode::at("Set", line);
                for element in named_children(node) {
                    set.children.push(self.element(element, Ctx::Load)?);
                }
                Ok(set)
            }
            "dictionary" => self.dictionary(node),
            "list_comprehension" => self.comprehension("ListComp", node),
            "set_comprehension" => self.comprehension("SetComp", node),
            "generator_expression" => self.comprehension("GeneratorExp", node),
            "dictionary_comprehension" => self.comprehension("DictComp", node),
            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) if inner.kind() == "yield" => self.yield_expr(*inner),
                Some(inner) => self.expr(*inner, ctx),
                None => Err(syntax_error(node, "invalid syntax")),
            },
            "binary_operator" => {
                let (left, operator, right) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("right"),
                );
                let (Some(left), Some(operator), Some(right)) = (left, operator, right) else {
                    return Err(syntax_error(node, "invalid syntax"));
                };
                let op = binary_operator_name(operator.kind())
                    .ok_or_else(|| syntax_error(operator, "invalid syntax"))?;
                Ok(AstNode::at("BinOp", line)
                    .with_child(self.load(left)?)
                    .with_child(AstNode::bare(op))
                    .with_child(self.load(right)?))
            }
            "unary_operator" => {
                let (Some(operator), Some(argument)) = (
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("argument"),
                ) else {
                    return Err(syntax_error(node, "invalid syntax"));
                };
                let op = unary_operator_name(operator.kind())
                    .ok_or_else(|| syntax_error(operator, "invalid syntax"))?;
                Ok(AstNode::at("UnaryOp", line)
                    .with_child(AstNode::bare(op))
                    .with_child(self.load(argument)?))
            }
            "not_operator" => Ok(AstNode::at("UnaryOp", line)
                .with_child(AstNode::bare("Not"))
                .with_child(self.required_load(node, "argument")?)),
            "boolean_operator" => self.boolean_operator(node),
            "comparison_operator" => self.comparison(node),
            "lambda" => {
                let params = node.child_by_field_name("parameters");
                Ok(AstNode::at("Lambda", line)
                    .with_child(self.parameters(params)?)
                    .with_child(self.required_load(node, "body")?))
            }
            "conditional_expression" => {
                let parts = named_children(node);
                let [body, test, orelse] = parts.as_slice() else {
                    return Err(syntax_error(node, "invalid syntax"));
                };
                Ok(AstNode::at("IfExp", line)
                    .with_child(self.load(*test)?)
                    .with_child(self.load(*body)?)
                    .with_child(self.load(*orelse)?))
            }
            "named_expression" => {
                let name = node
                    .child_by_field_name("name")
                    .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
                Ok(AstNode::at("NamedExpr", line)
                    .with_child(self.expr(name, Ctx::Store)?)
                    .with_child(self.required_load(node, "value")?))
            }
            "await" => {
                let value = named_children(node)
                    .first()
                    .copied()
                    .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
                Ok(AstNode::at("Await", line).with_child(self.load(value)?))
            }
            "yield" => self.yield_expr(node),
            "list_splat" | "list_splat_pattern" => {
                let value = named_children(node)
                    .first()
                    .copied()
                    .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
                Ok(AstNode::at("Starred", line)
                    .with_child(self.expr(value, ctx)?)
                    .with_child(ctx.node()))
            }
            "parenthesized_list_splat" => match named_children(node).first() {
                Some(inner) => self.expr(*inner, ctx),
                None => Err(syntax_error(node, "invalid syntax")),
            },
            "dotted_name" => self.dotted_name(node),
            "as_pattern" => match named_children(node).first() {
                Some(inner) => self.expr(*inner, ctx),
                None => Err(syntax_error(node, "invalid syntax")),
            },
            "type" | "generic_type" | "union_type" | "member_type" | "splat_type"
            | "constrained_type" => self.annotation(node),
            _ => Err(unsupported(node)),
        }
    }

    fn element(&self, node: Node, ctx: Ctx) -> Lowered {
        match node.kind() {
            "yield" => self.yield_expr(node),
            _ => self.expr(node, ctx),
        }
    }

    fn elements(&self, kind: &'static str, node: Node, ctx: Ctx) -> Lowered {
        let mut container = AstNode::at(kind, line_of(node));
        for element in named_children(node) {
            container.children.push(self.element(element, ctx)?);
        }
        Ok(container.with_child(ctx.node()))
    }

    fn dictionary(&self, node: Node) -> Lowered {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        for entry in named_children(node) {
            match entry.kind() {
                "pair" => {
                    keys.push(self.required_load(entry, "key")?);
                    values.push(self.required_load(entry, "value")?);
                }
                "dictionary_splat" => {
                    let value = named_children(entry)
                        .first()
                        .copied()
                        .ok_or_else(|| syntax_error(entry, "invalid syntax"))?;
                    values.push(self.load(value)?);
                }
                _ => return Err(unsupported(entry)),
            }
        }

        Ok(AstNode::at("Dict", line_of(node))
            .with_children(keys)
            .with_children(values))
    }

    fn comprehension(&self, kind: &'static str, node: Node) -> Lowered {
        let body = node
            .child_by_field_name("body")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let mut lowered = AstNode::at(kind, line_of(node));
        if body.kind() == "pair" {
            lowered.children.push(self.required_load(body, "key")?);
            lowered.children.push(self.required_load(body, "value")?);
        } else {
            lowered.children.push(self.load(body)?);
        }

        let mut generators: Vec<Generator> = Vec::new();
        for clause in named_children(node) {
            match clause.kind() {
                "for_in_clause" => {
                    let target = clause
                        .child_by_field_name("left")
                        .ok_or_else(|| syntax_error(clause, "invalid syntax"))?;
                    let sources: Vec<Node> = field_children(clause, "right")
                        .into_iter()
                        .filter(|source| source.is_named())
                        .collect();
                    if sources.len() > 1 {
                        return Err(syntax_error(clause, unparenthesized_message(node)));
                    }
                    let iter = match sources.first() {
                        Some(single) => self.load(*single)?,
                        None => return Err(syntax_error(clause, "invalid syntax")),
                    };
                    generators.push(Generator {
                        target: self.expr(target, Ctx::Store)?,
                        iter,
                        ifs: Vec::new(),
                    });
                }
                "if_clause" => {
                    let condition = named_children(clause)
                        .first()
                        .copied()
                        .ok_or_else(|| syntax_error(clause, "invalid syntax"))?;
                    let condition = self.load(condition)?;
                    match generators.last_mut() {
                        Some(generator) => generator.ifs.push(condition),
                        None => return Err(syntax_error(clause, "invalid syntax")),
                    }
                }
                _ => {}
            }
        }

        Ok(lowered.with_children(generators.into_iter().map(|generator| {
            AstNode::bare("comprehension")
                .with_child(generator.target)
                .with_child(generator.iter)
                .with_children(generator.ifs)
        })))
    }

    fn call(&self, node: Node) -> Lowered {
        let function = node
            .child_by_field_name("function")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let arguments = node
            .child_by_field_name("arguments")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;

        let (args, keywords) = if arguments.kind() == "generator_expression" {
            (vec![self.load(arguments)?], Vec::new())
        } else {
            self.arguments(arguments)?
        };

        Ok(AstNode::at("Call", line_of(node))
            .with_child(self.load(function)?)
            .with_children(args)
            .with_children(keywords))
    }

    /// Split an `argument_list` into positional arguments and keywords.
    fn arguments(&self, list: Node) -> Result<(Vec<AstNode>, Vec<AstNode>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        let mut double_star = false;
        let children = named_children(list);
        for argument in &children {
            let argument = *argument;
            let line = line_of(argument);
            match argument.kind() {
                "keyword_argument" => keywords.push(
                    AstNode::at("keyword", line).with_child(self.required_load(argument, "value")?),
                ),
                "dictionary_splat" => {
                    let value = named_children(argument)
                        .first()
                        .copied()
                        .ok_or_else(|| syntax_error(argument, "invalid syntax"))?;
                    keywords.push(AstNode::at("keyword", line).with_child(self.load(value)?));
                    double_star = true;
                }
                "list_splat" if double_star => {
                    return Err(syntax_error(
                        argument,
                        "iterable argument unpacking follows keyword argument unpacking",
                    ));
                }
                "list_splat" => args.push(self.element(argument, Ctx::Load)?),
                _ if double_star => {
                    return Err(syntax_error(
                        argument,
                        "positional argument follows keyword argument unpacking",
                    ));
                }
                _ if !keywords.is_empty() => {
                    return Err(syntax_error(
                        argument,
                        "positional argument follows keyword argument",
                    ));
                }
                "generator_expression"
                    if children.len() > 1 && argument.start_byte() == list.start_byte() =>
                {
                    return Err(syntax_error(
                        argument,
                        "Generator expression must be parenthesized",
                    ));
                }
                _ => args.push(self.element(argument, Ctx::Load)?),
            }
        }
        Ok((args, keywords))
    }

    fn subscript(&self, node: Node, ctx: Ctx) -> Lowered {
        let value = node
            .child_by_field_name("value")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let subscripts = field_children(node, "subscript");

        let slice = match subscripts.as_slice() {
            [] => return Err(syntax_error(node, "invalid syntax")),
            [single] if single.kind() == "slice" => self.slice(*single)?,
            [single] => AstNode::bare("Index").with_child(self.load(*single)?),
            _ if subscripts.iter().any(|sub| sub.kind() == "slice") => {
                let mut dims = AstNode::bare("ExtSlice");
                for sub in &subscripts {
                    dims.children.push(if sub.kind() == "slice" {
                        self.slice(*sub)?
                    } else {
                        AstNode::bare("Index").with_child(self.load(*sub)?)
                    });
                }
                dims
            }
            [first, ..] => {
                let mut tuple = AstNode::at("Tuple", line_of(*first));
                for sub in &subscripts {
                    tuple.children.push(self.load(*sub)?);
                }
                AstNode::bare("Index").with_child(tuple.with_child(Ctx::Load.node()))
            }
        };

        Ok(AstNode::at("Subscript", line_of(node))
            .with_child(self.load(value)?)
            .with_child(slice)
            .with_child(ctx.node()))
    }

    /// `lower:upper:step`, where each part is optional and positioned by
    /// the colons around it.
    fn slice(&self, node: Node) -> Lowered {
        let mut parts: [Option<AstNode>; 3] = [None, None, None];
        let mut colons = 0usize;
        for child in all_children(node) {
            if child.is_named() {
                if let Some(part) = parts.get_mut(colons) {
                    *part = Some(self.load(child)?);
                }
            } else if child.kind() == ":" {
                colons += 1;
            }
        }
        let [lower, upper, step] = parts;
        Ok(AstNode::bare("Slice")
            .with_opt(lower)
            .with_opt(upper)
            .with_opt(step))
    }

    fn boolean_operator(&self, node: Node) -> Lowered {
        let operator = node
            .child_by_field_name("operator")
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let op = match operator.kind() {
            "and" => "And",
            "or" => "Or",
            _ => return Err(syntax_error(operator, "invalid syntax")),
        };

        let mut values = Vec::new();
        self.collect_bool_operands(node, operator.kind(), &mut values)?;
        Ok(AstNode::at("BoolOp", line_of(node))
            .with_child(AstNode::bare(op))
            .with_children(values))
    }

    /// Flatten a left-nested chain of the same boolean operator.
    fn collect_bool_operands(&self, node: Node, token: &str, out: &mut Vec<AstNode>) -> Result<()> {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return Err(syntax_error(node, "invalid syntax"));
        };

        let same_operator = left.kind() == "boolean_operator"
            && left
                .child_by_field_name("operator")
                .is_some_and(|operator| operator.kind() == token);
        if same_operator {
            self.collect_bool_operands(left, token, out)?;
        } else {
            out.push(self.load(left)?);
        }
        out.push(self.load(right)?);
        Ok(())
    }

    fn comparison(&self, node: Node) -> Lowered {
        let mut operands = Vec::new();
        for operand in named_children(node) {
            operands.push(self.load(operand)?);
        }
        let mut ops = Vec::new();
        for operator in field_children(node, "operators") {
            if operator.kind() == "<>" {
                return Err(syntax_error(operator, "invalid syntax"));
            }
            let op = comparison_operator_name(operator.kind())
                .ok_or_else(|| syntax_error(operator, "invalid syntax"))?;
            ops.push(AstNode::bare(op));
        }
        if operands.len() != ops.len() + 1 {
            return Err(syntax_error(node, "invalid syntax"));
        }

        let mut operands = operands.into_iter();
        let mut compare = AstNode::at("Compare", line_of(node));
        compare.children.extend(operands.next());
        Ok(compare.with_children(ops).with_children(operands))
    }

    fn yield_expr(&self, node: Node) -> Lowered {
        let kind = if has_token(node, "from") { "YieldFrom" } else { "Yield" };
        let value = named_children(node)
            .first()
            .map(|value| self.load(*value))
            .transpose()?;
        Ok(AstNode::at(kind, line_of(node)).with_opt(value))
    }

    fn dotted_name(&self, node: Node) -> Lowered {
        let mut parts = named_children(node).into_iter();
        let first = parts
            .next()
            .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
        let mut lowered = AstNode::at("Name", line_of(first)).with_child(Ctx::Load.node());
        for _ in parts {
            lowered = AstNode::at("Attribute", line_of(node))
                .with_child(lowered)
                .with_child(Ctx::Load.node());
        }
        Ok(lowered)
    }

    /// Annotation positions, where tree-sitter has dedicated type syntax.
    fn annotation(&self, node: Node) -> Lowered {
        let line = line_of(node);
        match node.kind() {
            "type" => match named_children(node).as_slice() {
                [single] => self.annotation(*single),
                _ => Err(syntax_error(node, "invalid syntax")),
            },
            "generic_type" => {
                let parts = named_children(node);
                let [base, params] = parts.as_slice() else {
                    return Err(syntax_error(node, "invalid syntax"));
                };
                let args = named_children(*params);
                let index = match args.as_slice() {
                    [single] => self.annotation(*single)?,
                    [first, ..] => {
                        let mut tuple = AstNode::at("Tuple", line_of(*first));
                        for arg in &args {
                            tuple.children.push(self.annotation(*arg)?);
                        }
                        tuple.with_child(Ctx::Load.node())
                    }
                    [] => return Err(syntax_error(*params, "invalid syntax")),
                };
                Ok(AstNode::at("Subscript", line)
                    .with_child(self.annotation(*base)?)
                    .with_child(AstNode::bare("Index").with_child(index))
                    .with_child(Ctx::Load.node()))
            }
            "union_type" => {
                let parts = named_children(node);
                let [left, right] = parts.as_slice() else {
                    return Err(syntax_error(node, "invalid syntax"));
                };
                Ok(AstNode::at("BinOp", line)
                    .with_child(self.annotation(*left)?)
                    .with_child(AstNode::bare("BitOr"))
                    .with_child(self.annotation(*right)?))
            }
            "member_type" => {
                let base = named_children(node)
                    .first()
                    .copied()
                    .ok_or_else(|| syntax_error(node, "invalid syntax"))?;
                Ok(AstNode::at("Attribute", line)
                    .with_child(self.annotation(base)?)
                    .with_child(Ctx::Load.node()))
            }
            "splat_type" => Ok(AstNode::at("Starred", line)
                .with_child(AstNode::at("Name", line).with_child(Ctx::Load.node()))
                .with_child(Ctx::Load.node())),
            "constrained_type" => match named_children(node).first() {
                Some(base) => self.annotation(*base),
                None => Err(syntax_error(node, "invalid syntax")),
            },
            _ => self.load(node),
        }
    }

    fn string(&self, node: Node) -> Lowered {
        let line = line_of(node);
        let parts = if node.kind() == "concatenated_string" {
            named_children(node)
        } else {
            vec![node]
        };

        if let Some(backtick) = parts
            .iter()
            .find(|part| self.text(**part).starts_with('`'))
        {
            return Err(syntax_error(*backtick, "invalid syntax"));
        }

        let prefixes: Vec<String> = parts
            .iter()
            .map(|part| self.string_prefix(*part))
            .collect();
        let any_fstring = prefixes.iter().any(|prefix| prefix.contains('f'));
        let bytes = prefixes.iter().filter(|prefix| prefix.contains('b')).count();

        if bytes > 0 && bytes < parts.len() {
            return Err(syntax_error(node, "cannot mix bytes and nonbytes literals"));
        }
        if bytes > 0 {
            return Ok(AstNode::at("Bytes", line));
        }
        if !any_fstring {
            return Ok(AstNode::at("Str", line));
        }

        let mut joined = AstNode::at("JoinedStr", line);
        for (part, prefix) in parts.iter().zip(&prefixes) {
            if !prefix.contains('f') {
                if self.has_string_content(*part) {
                    push_literal_piece(&mut joined.children);
                }
                continue;
            }
            for piece in named_children(*part) {
                match piece.kind() {
                    "string_content" | "escape_sequence" | "escape_interpolation" => {
                        push_literal_piece(&mut joined.children);
                    }
                    "interpolation" => joined.children.push(self.interpolation(piece)?),
                    _ => {}
                }
            }
        }
        Ok(joined)
    }

    fn string_prefix(&self, part: Node) -> String {
        let start = named_children(part)
            .into_iter()
            .find(|child| child.kind() == "string_start")
            .map_or_else(|| self.text(part), |start| self.text(start));
        start
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    fn has_string_content(&self, part: Node) -> bool {
        named_children(part).iter().any(|child| {
            matches!(
                child.kind(),
                "string_content" | "escape_sequence" | "escape_interpolation"
            )
        })
    }

    fn interpolation(&self, node: Node) -> Lowered {
        let expression = node
            .child_by_field_name("expression")
            .or_else(|| named_children(node).first().copied())
            .ok_or_else(|| syntax_error(node, "f-string: empty expression not allowed"))?;
        let format_spec = node
            .child_by_field_name("format_specifier")
            .map(|spec| self.format_spec(spec))
            .transpose()?;

        Ok(AstNode::bare("FormattedValue")
            .with_child(self.value(expression)?)
            .with_opt(format_spec))
    }

    fn format_spec(&self, node: Node) -> Lowered {
        let mut spec = AstNode::bare("JoinedStr");
        for child in all_children(node) {
            match child.kind() {
                "format_expression" | "interpolation" => {
                    spec.children.push(self.interpolation(child)?);
                }
                ":" if !child.is_named() && child.start_byte() == node.start_byte() => {}
                _ if !self.text(child).is_empty() => push_literal_piece(&mut spec.children),
                _ => {}
            }
        }
        Ok(spec)
    }
}

/// Message for a comprehension whose `in` clause lists several values
/// without parentheses.
fn unparenthesized_message(comprehension: Node) -> &'static str {
    let call_argument = comprehension.kind() == "generator_expression"
        && comprehension
            .parent()
            .is_some_and(|parent| parent.kind() == "call");
    if call_argument {
        "Generator expression must be parenthesized"
    } else {
        "invalid syntax"
    }
}

/// Append a literal `Str` piece to an f-string, merging with a directly
/// preceding one.
fn push_literal_piece(values: &mut Vec<AstNode>) {
    if values.last().is_some_and(|last| last.kind == "Str") {
        return;
    }
    values.push(AstNode::bare("Str"));
}
