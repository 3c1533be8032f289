use super::api::{parse_to_ast, ExprParser, Rule};
use super::ast::*;

use pest::consumes_to;
use pest::parses_to;
use pest::Parser;

#[test]
fn test_decimal_number_with_no_dot() {
    parses_to! {
        parser: ExprParser,
        input: "10",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 2)
        ]
    };
}

#[test]
fn test_decimal_number_with_exponent() {
    parses_to! {
        parser: ExprParser,
        input: "1.5e3",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 5)
        ]
    };
}

#[test]
fn test_string_literal_keeps_inner_text() {
    parses_to! {
        parser: ExprParser,
        input: "'a\\'b'",
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 6, [
                single_string_inner(1, 5)
            ])
        ]
    };
}

#[test]
fn test_reserved_words_are_no_identifiers() {
    assert!(ExprParser::parse(Rule::identifier, "return").is_err());
    assert!(ExprParser::parse(Rule::identifier, "typeof").is_err());
    let pair = ExprParser::parse(Rule::identifier, "returnValue")
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(pair.as_str(), "returnValue");
}

fn single_expression(code: &str) -> ExpressionType {
    let mut program = parse_to_ast(code).unwrap();
    assert_eq!(program.body.len(), 1);
    match program.body.remove(0) {
        StatementType::ExpressionStatement { expression, .. } => *expression,
        other => panic!("Expected an expression statement, got {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    match single_expression("1 + 2 * 3") {
        ExpressionType::BinaryExpression {
            operator, right, ..
        } => {
            assert_eq!(operator, BinaryOperator::Add);
            assert!(matches!(
                *right,
                ExpressionType::BinaryExpression {
                    operator: BinaryOperator::Multiply,
                    ..
                }
            ));
        }
        other => panic!("Unexpected expression {:?}", other),
    }
}

#[test]
fn test_member_call_chain() {
    match single_expression("self.items[0].name(1, 'x')") {
        ExpressionType::CallExpression { callee, arguments, .. } => {
            assert_eq!(arguments.len(), 2);
            assert!(matches!(
                *callee,
                ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression { .. })
            ));
        }
        other => panic!("Unexpected expression {:?}", other),
    }
}

#[test]
fn test_equality_is_not_assignment() {
    assert!(matches!(
        single_expression("a == b"),
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::LooselyEqual,
            ..
        }
    ));
    assert!(matches!(
        single_expression("a.b = 3"),
        ExpressionType::AssignmentExpression { .. }
    ));
}

#[test]
fn test_unary_operators_nest_right_to_left() {
    match single_expression("!-x") {
        ExpressionType::UnaryExpression { operator, argument, .. } => {
            assert_eq!(operator, UnaryOperator::LogicalNot);
            assert!(matches!(
                *argument,
                ExpressionType::UnaryExpression {
                    operator: UnaryOperator::Minus,
                    ..
                }
            ));
        }
        other => panic!("Unexpected expression {:?}", other),
    }
}

#[test]
fn test_statements() {
    let program = parse_to_ast("let a = 1, b; if (a > b) { return a; } else return b;").unwrap();
    assert_eq!(program.body.len(), 2);
    match &program.body[0] {
        StatementType::VariableDeclaration { kind, declarations, .. } => {
            assert_eq!(*kind, VariableDeclarationKind::Let);
            assert_eq!(declarations.len(), 2);
            assert!(declarations[1].init.is_none());
        }
        other => panic!("Unexpected statement {:?}", other),
    }
    match &program.body[1] {
        StatementType::IfStatement { alternate, .. } => assert!(alternate.is_some()),
        other => panic!("Unexpected statement {:?}", other),
    }
}

#[test]
fn test_object_literal_with_shorthand_and_quoted_keys() {
    match single_expression("({a: 1, 'b c': 2, d})") {
        ExpressionType::ObjectExpression { properties, .. } => {
            let keys: Vec<&str> = properties.iter().map(|p| p.key.as_str()).collect();
            assert_eq!(keys, vec!["a", "b c", "d"]);
        }
        other => panic!("Unexpected expression {:?}", other),
    }
}

#[test]
fn test_syntax_error() {
    assert!(parse_to_ast("1 +").is_err());
    assert!(parse_to_ast("let = 3").is_err());
}
