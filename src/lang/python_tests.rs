use super::*;
use crate::lang::ast::LiteralValue;

/// Render a subtree as `Kind(child child ...)` for compact assertions.
fn shape(node: &AstNode) -> String {
    if node.children.is_empty() {
        return node.kind.to_string();
    }
    let children: Vec<String> = node.children.iter().map(shape).collect();
    format!("{}({})", node.kind, children.join(" "))
}

fn parse(source: &str) -> AstNode {
    let mut adapter = PythonAdapter::new().unwrap();
    adapter.parse_module(source).unwrap()
}

fn first_statement(source: &str) -> String {
    let module = parse(source);
    shape(&module.children[0])
}

#[test]
fn test_python_adapter_creation() {
    let adapter = PythonAdapter::new();
    assert!(adapter.is_ok(), "Should create Python adapter successfully");
}

#[test]
fn test_empty_and_comment_only_sources() {
    assert!(parse("").children.is_empty());
    assert!(parse("# Just a comment\n").children.is_empty());
}

#[test]
fn test_simple_assignment() {
    assert_eq!(first_statement("x = 1"), "Assign(Name(Store) Num)");
}

#[test]
fn test_chained_assignment_collapses_targets() {
    assert_eq!(
        first_statement("a = b = 2"),
        "Assign(Name(Store) Name(Store) Num)"
    );
}

#[test]
fn test_annotated_and_augmented_assignment() {
    assert_eq!(
        first_statement("x: int = 5"),
        "AnnAssign(Name(Store) Name(Load) Num)"
    );
    assert_eq!(first_statement("x += 1"), "AugAssign(Name(Store) Add Num)");
}

#[test]
fn test_tuple_unpacking_target() {
    assert_eq!(
        first_statement("a, b = c"),
        "Assign(Tuple(Name(Store) Name(Store) Store) Name(Load))"
    );
}

#[test]
fn test_elif_chain_nests_in_orelse() {
    let source = "if x:\n    pass\nelif y:\n    pass\nelse:\n    pass\n";
    let module = parse(source);
    let outer = &module.children[0];

    assert_eq!(
        shape(outer),
        "If(Name(Load) Pass If(Name(Load) Pass Pass))"
    );
    assert_eq!(outer.line, Some(1));
    assert_eq!(outer.children[2].line, Some(3));
    assert_eq!(outer.children[2].children[2].line, Some(6));
}

#[test]
fn test_boolean_chain_is_flattened() {
    assert_eq!(
        first_statement("a or b or c"),
        "Expr(BoolOp(Or Name(Load) Name(Load) Name(Load)))"
    );
    assert_eq!(
        first_statement("a and b or c"),
        "Expr(BoolOp(Or BoolOp(And Name(Load) Name(Load)) Name(Load)))"
    );
}

#[test]
fn test_comparison_chain_orders_ops_before_comparators() {
    assert_eq!(
        first_statement("1 < x <= 3"),
        "Expr(Compare(Num Lt LtE Name(Load) Num))"
    );
    assert_eq!(
        first_statement("a not in b"),
        "Expr(Compare(Name(Load) NotIn Name(Load)))"
    );
}

#[test]
fn test_operators_become_children() {
    assert_eq!(
        first_statement("-x + y * 2"),
        "Expr(BinOp(UnaryOp(USub Name(Load)) Add BinOp(Name(Load) Mult Num)))"
    );
    assert_eq!(first_statement("not x"), "Expr(UnaryOp(Not Name(Load)))");
}

#[test]
fn test_function_parameters_follow_field_order() {
    let source = "def f(a, b=1, *args, c, d=2, **kw):\n    pass\n";
    assert_eq!(
        first_statement(source),
        "FunctionDef(arguments(arg arg arg arg arg Num arg Num) Pass)"
    );
}

#[test]
fn test_positional_only_parameters() {
    let module = parse("def f(a, /, b):\n    pass\n");
    let arguments = &module.children[0].children[0];
    assert_eq!(arguments.kind, "arguments");
    assert_eq!(arguments.children.len(), 2);
    assert!(arguments.line.is_none());
}

#[test]
fn test_decorators_follow_body_and_def_line_is_used() {
    let module = parse("@dec\ndef f() -> int:\n    return 1\n");
    let function = &module.children[0];

    assert_eq!(
        shape(function),
        "FunctionDef(arguments Return(Num) Name(Load) Name(Load))"
    );
    assert_eq!(function.line, Some(2));
    assert_eq!(function.children[2].line, Some(1));
}

#[test]
fn test_class_with_bases_and_keywords() {
    assert_eq!(
        first_statement("class A(B, metaclass=M):\n    x = 1\n"),
        "ClassDef(Name(Load) keyword(Name(Load)) Assign(Name(Store) Num))"
    );
}

#[test]
fn test_async_constructs() {
    let source = "async def f():\n    async for x in y:\n        await x\n";
    assert_eq!(
        first_statement(source),
        "AsyncFunctionDef(arguments AsyncFor(Name(Store) Name(Load) Expr(Await(Name(Load)))))"
    );
}

#[test]
fn test_call_arguments_and_keywords() {
    assert_eq!(
        first_statement("f(a, *b, c=1, **d)"),
        "Expr(Call(Name(Load) Name(Load) Starred(Name(Load) Load) keyword(Num) keyword(Name(Load))))"
    );
}

#[test]
fn test_subscripts_wrap_slices() {
    assert_eq!(
        first_statement("a[1:2]"),
        "Expr(Subscript(Name(Load) Slice(Num Num) Load))"
    );
    assert_eq!(
        first_statement("a[i]"),
        "Expr(Subscript(Name(Load) Index(Name(Load)) Load))"
    );
    assert_eq!(
        first_statement("a[::2]"),
        "Expr(Subscript(Name(Load) Slice(Num) Load))"
    );
}

#[test]
fn test_comprehension_records() {
    assert_eq!(
        first_statement("[x for x in y if x]"),
        "Expr(ListComp(Name(Load) comprehension(Name(Store) Name(Load) Name(Load))))"
    );
    assert_eq!(
        first_statement("{k: v for k, v in items}"),
        "Expr(DictComp(Name(Load) Name(Load) comprehension(Tuple(Name(Store) Name(Store) Store) Name(Load))))"
    );
}

#[test]
fn test_dictionary_keys_then_values() {
    assert_eq!(
        first_statement("{'a': 1, **rest}"),
        "Expr(Dict(Str Num Name(Load)))"
    );
}

#[test]
fn test_literals() {
    let module = parse("1\n2.5\n3j\nTrue\nNone\n...\nb'x'\n");
    let values: Vec<&AstNode> = module.children.iter().map(|expr| &expr.children[0]).collect();

    assert_eq!(values[0].value, Some(LiteralValue::Int("1".into())));
    assert_eq!(values[1].value, Some(LiteralValue::Float("2.5".into())));
    assert_eq!(values[2].value, Some(LiteralValue::Complex("3j".into())));
    assert_eq!(values[3].value, Some(LiteralValue::Bool(true)));
    assert_eq!(values[4].value, Some(LiteralValue::None));
    assert_eq!(values[5].kind, "Ellipsis");
    assert_eq!(values[6].kind, "Bytes");
}

#[test]
fn test_fstring_becomes_joined_str() {
    assert_eq!(
        first_statement("f\"a{x}b\""),
        "Expr(JoinedStr(Str FormattedValue(Name(Load)) Str))"
    );
}

#[test]
fn test_concatenated_strings_merge() {
    assert_eq!(first_statement("'a' 'b'"), "Expr(Str)");
}

#[test]
fn test_try_with_handlers() {
    let source = "try:\n    pass\nexcept ValueError as e:\n    pass\nelse:\n    pass\nfinally:\n    pass\n";
    assert_eq!(
        first_statement(source),
        "Try(Pass ExceptHandler(Name(Load) Pass) Pass Pass)"
    );
}

#[test]
fn test_with_items() {
    assert_eq!(
        first_statement("with open(p) as f:\n    pass\n"),
        "With(withitem(Call(Name(Load) Name(Load)) Name(Store)) Pass)"
    );
}

#[test]
fn test_delete_uses_del_context() {
    assert_eq!(first_statement("del x"), "Delete(Name(Del))");
}

#[test]
fn test_imports_produce_aliases() {
    assert_eq!(first_statement("import os, sys as system"), "Import(alias alias)");
    assert_eq!(first_statement("from a import b"), "ImportFrom(alias)");
    assert_eq!(first_statement("from a import *"), "ImportFrom(alias)");
}

#[test]
fn test_lambda_always_has_arguments() {
    assert_eq!(first_statement("lambda: 0"), "Expr(Lambda(arguments Num))");
}

#[test]
fn test_multiline_statement_keeps_child_lines() {
    let module = parse("x = (1,\n     2)\n");
    let assign = &module.children[0];
    let tuple = &assign.children[1];

    assert_eq!(assign.line, Some(1));
    assert_eq!(tuple.kind, "Tuple");
    assert_eq!(tuple.children[1].line, Some(2));
}

#[test]
fn test_syntax_error_reports_line() {
    let mut adapter = PythonAdapter::new().unwrap();
    let err = adapter.parse_module("x = 1\ndef f(:\n").unwrap_err();

    assert!(err.is_syntax_error());
    assert!(err.to_string().starts_with("invalid syntax"), "{err}");
    if let PyshapeError::Parse { line, .. } = err {
        assert_eq!(line, Some(2));
    }
}

#[test]
fn test_python2_print_is_rejected() {
    let mut adapter = PythonAdapter::new().unwrap();
    assert!(adapter.parse_module("print 'hello'\n").is_err());
}

fn syntax_error_message(source: &str) -> String {
    let mut adapter = PythonAdapter::new().unwrap();
    let err = adapter.parse_module(source).unwrap_err();
    assert!(err.is_syntax_error(), "{source:?}: {err}");
    err.to_string()
}

fn kinds(source: &str) -> Vec<&'static str> {
    parse(source).descendants().map(|node| node.kind).collect()
}

#[test]
fn test_except_star_lowers_to_try_star() {
    let source = "try:\n    pass\nexcept* ValueError:\n    pass\nexcept* (TypeError, KeyError) as eg:\n    pass\n";
    assert_eq!(
        first_statement(source),
        "TryStar(Pass ExceptHandler(Name(Load) Pass) ExceptHandler(Tuple(Name(Load) Name(Load) Load) Pass))"
    );
}

#[test]
fn test_except_and_except_star_cannot_mix() {
    let source = "try:\n    pass\nexcept ValueError:\n    pass\nexcept* TypeError:\n    pass\n";
    assert_eq!(
        syntax_error_message(source),
        "cannot have both 'except' and 'except*' on the same 'try' (<unknown>, line 5)"
    );
}

#[test]
fn test_match_statement_patterns() {
    let source = "match point:\n    case [0, *rest]:\n        pass\n    case Point(x=0) if rest:\n        pass\n    case _:\n        pass\n";
    let module = parse(source);
    let matched = &module.children[0];
    assert_eq!(matched.kind, "Match");
    assert_eq!(matched.children.len(), 4);

    let seen = kinds(source);
    for kind in ["match_case", "MatchSequence", "MatchValue", "MatchStar", "MatchClass", "MatchAs"] {
        assert!(seen.contains(&kind), "missing {kind} in {seen:?}");
    }
    assert!(matched.children[1..].iter().all(|case| case.line.is_none()));
}

#[test]
fn test_type_alias_statement() {
    assert_eq!(
        first_statement("type Alias = int\n"),
        "TypeAlias(Name(Store) Name(Load))"
    );
}

#[test]
fn test_fstring_format_spec_is_nested_joined_str() {
    assert_eq!(
        first_statement("f\"{x:>{width}}\""),
        "Expr(JoinedStr(FormattedValue(Name(Load) JoinedStr(Str FormattedValue(Name(Load))))))"
    );
}

#[test]
fn test_python2_except_comma_is_rejected() {
    let source = "try:\n    pass\nexcept ValueError, e:\n    pass\n";
    assert_eq!(
        syntax_error_message(source),
        "multiple exception types must be parenthesized (<unknown>, line 3)"
    );
}

#[test]
fn test_python2_backtick_repr_is_rejected() {
    assert_eq!(
        syntax_error_message("x = `y`\n"),
        "invalid syntax (<unknown>, line 1)"
    );
}

#[test]
fn test_non_default_parameter_after_default_is_rejected() {
    assert_eq!(
        syntax_error_message("def f(x=1, y):\n    pass\n"),
        "non-default argument follows default argument (<unknown>, line 1)"
    );
    assert!(parse("def f(x=1, *, y):\n    pass\n").children[0].kind == "FunctionDef");
}

#[test]
fn test_call_argument_order_is_enforced() {
    assert_eq!(
        syntax_error_message("f(a=1, b)\n"),
        "positional argument follows keyword argument (<unknown>, line 1)"
    );
    assert_eq!(
        syntax_error_message("f(**k, b)\n"),
        "positional argument follows keyword argument unpacking (<unknown>, line 1)"
    );
    assert_eq!(
        syntax_error_message("f(**k, *a)\n"),
        "iterable argument unpacking follows keyword argument unpacking (<unknown>, line 1)"
    );
    assert_eq!(
        first_statement("f(a=1, *b)"),
        "Expr(Call(Name(Load) Starred(Name(Load) Load) keyword(Num)))"
    );
}

#[test]
fn test_delete_rejects_calls_and_literals() {
    assert_eq!(
        syntax_error_message("del f()\n"),
        "cannot delete function call (<unknown>, line 1)"
    );
    assert_eq!(
        syntax_error_message("del x, 1\n"),
        "cannot delete literal (<unknown>, line 1)"
    );
    assert_eq!(
        first_statement("del a.b, c[0]"),
        "Delete(Attribute(Name(Load) Del) Subscript(Name(Load) Index(Num) Del))"
    );
}

#[test]
fn test_unparenthesized_generator_with_more_arguments_is_rejected() {
    assert_eq!(
        syntax_error_message("f(x for x in y, 1)\n"),
        "Generator expression must be parenthesized (<unknown>, line 1)"
    );
    assert_eq!(
        first_statement("f(x for x in y)"),
        "Expr(Call(Name(Load) GeneratorExp(Name(Load) comprehension(Name(Store) Name(Load)))))"
    );
}
