use std::time::Instant;

use pest::error::{Error, ErrorVariant};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/expr_grammar.pest"] // relative to src
pub struct ExprParser;

const TAB_WIDTH: usize = 2;

impl ExprParser {
    pub fn parse_to_ast_from_str(script: &str) -> Result<ProgramData, Error<Rule>> {
        parse_to_ast(script)
    }

    pub fn parse_to_token_tree(script: &str) -> Result<String, String> {
        parse_to_token_tree(script)
    }
}

pub fn parse_to_token_tree(script: &str) -> Result<String, String> {
    let mut tree = vec![];
    let start = Instant::now();
    let result = ExprParser::parse(Rule::script, script);
    let total_time = Instant::now().saturating_duration_since(start);
    debug!(elapsed_ms = total_time.as_millis() as u64, "parsed script");

    match result {
        Ok(pairs) => {
            for pair in pairs {
                tree.push(pair_to_string(pair, 0).join("\n"));
            }
        }
        Err(rule) => {
            return Err(format!("Parse error due to {:?}", rule));
        }
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    let string_pads = " ".repeat(level * TAB_WIDTH);
    tree.push(format!("{}{}", string_pads, rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

pub fn parse_to_ast(script: &str) -> Result<ProgramData, Error<Rule>> {
    let mut pairs = ExprParser::parse(Rule::script, script)?;
    let script_pair = match pairs.next() {
        Some(pair) => pair,
        None => {
            return Err(Error::new_from_pos(
                ErrorVariant::CustomError {
                    message: "Empty parse result".to_string(),
                },
                pest::Position::from_start(script),
            ))
        }
    };
    let meta = get_meta(&script_pair);
    let mut body = vec![];
    for pair in script_pair.into_inner() {
        match pair.as_rule() {
            Rule::statement => body.push(build_ast_from_statement(pair)?),
            Rule::EOI => { /* Do nothing */ }
            _ => return Err(get_unexpected_error(1, &pair)),
        }
    }
    Ok(ProgramData { meta, body })
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn get_meta(pair: &Pair<Rule>) -> Meta {
    Meta {
        start_index: pair.as_span().start(),
        end_index: pair.as_span().end(),
    }
}

/// First inner pair of `pair`, failing with a parse error if there is none.
fn first_inner(pair: Pair<Rule>, id: i32) -> Result<Pair<Rule>, Error<Rule>> {
    let end = pair.as_span().end_pos();
    let rule = pair.as_rule();
    pair.into_inner().next().ok_or_else(|| {
        let message = format!("Missing child of [{:?}] - {}", rule, id);
        Error::new_from_pos(ErrorVariant::CustomError { message }, end)
    })
}

fn is_keyword(rule: Rule) -> bool {
    match rule {
        Rule::if_keyword
        | Rule::else_keyword
        | Rule::return_keyword
        | Rule::assignment_operator => true,
        _ => false,
    }
}

fn build_ast_from_statement(pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
    let inner_pair = first_inner(pair, 2)?;
    let meta = get_meta(&inner_pair);
    Ok(match inner_pair.as_rule() {
        Rule::block_statement => {
            let mut body = vec![];
            for statement_pair in inner_pair.into_inner() {
                body.push(build_ast_from_statement(statement_pair)?);
            }
            StatementType::BlockStatement(BlockStatementData { meta, body })
        }
        Rule::empty_statement => StatementType::EmptyStatement { meta },
        Rule::variable_statement => build_ast_from_variable_statement(inner_pair)?,
        Rule::if_statement => {
            let mut children = inner_pair.into_inner().filter(|p| !is_keyword(p.as_rule()));
            let (test, consequent) = match (children.next(), children.next()) {
                (Some(test), Some(consequent)) => (test, consequent),
                _ => return Err(missing_child_error(&meta, 3)),
            };
            let alternate = match children.next() {
                Some(p) => Some(Box::new(build_ast_from_statement(p)?)),
                None => None,
            };
            StatementType::IfStatement {
                meta,
                test: Box::new(build_ast_from_expression(test)?),
                consequent: Box::new(build_ast_from_statement(consequent)?),
                alternate,
            }
        }
        Rule::return_statement => {
            let argument = match inner_pair.into_inner().find(|p| !is_keyword(p.as_rule())) {
                Some(p) => Some(Box::new(build_ast_from_expression(p)?)),
                None => None,
            };
            StatementType::ReturnStatement { meta, argument }
        }
        Rule::expression_statement => StatementType::ExpressionStatement {
            meta,
            expression: Box::new(build_ast_from_expression(first_inner(inner_pair, 4)?)?),
        },
        _ => return Err(get_unexpected_error(5, &inner_pair)),
    })
}

fn missing_child_error(meta: &Meta, id: i32) -> Error<Rule> {
    Error::new_from_pos(
        ErrorVariant::CustomError {
            message: format!("Missing child at {} - {}", meta.start_index, id),
        },
        pest::Position::from_start(""),
    )
}

fn build_ast_from_variable_statement(pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
    let meta = get_meta(&pair);
    let mut kind = VariableDeclarationKind::Var;
    let mut declarations = vec![];
    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::declaration_kind => {
                kind = match inner_pair.as_str() {
                    "let" => VariableDeclarationKind::Let,
                    "const" => VariableDeclarationKind::Const,
                    _ => VariableDeclarationKind::Var,
                }
            }
            Rule::variable_declaration => {
                let declaration_meta = get_meta(&inner_pair);
                let mut children = inner_pair.into_inner().filter(|p| !is_keyword(p.as_rule()));
                let id_pair = match children.next() {
                    Some(p) => p,
                    None => return Err(missing_child_error(&declaration_meta, 6)),
                };
                let id = IdentifierData {
                    name: id_pair.as_str().to_string(),
                    meta: get_meta(&id_pair),
                };
                let init = match children.next() {
                    Some(p) => Some(Box::new(build_ast_from_expression(p)?)),
                    None => None,
                };
                declarations.push(VariableDeclaratorData {
                    meta: declaration_meta,
                    id,
                    init,
                });
            }
            _ => return Err(get_unexpected_error(7, &inner_pair)),
        }
    }
    Ok(StatementType::VariableDeclaration {
        meta,
        kind,
        declarations,
    })
}

fn build_ast_from_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let meta = get_meta(&pair);
    match pair.as_rule() {
        Rule::literal => build_ast_from_literal(first_inner(pair, 8)?),
        Rule::expression | Rule::primary_expression | Rule::parenthesized_expression => {
            build_ast_from_expression(first_inner(pair, 9)?)
        }
        Rule::assignment_expression => {
            let mut children = pair.into_inner().filter(|p| !is_keyword(p.as_rule()));
            let first = match children.next() {
                Some(p) => p,
                None => return Err(missing_child_error(&meta, 10)),
            };
            match children.next() {
                Some(right) => Ok(ExpressionType::AssignmentExpression {
                    meta,
                    left: Box::new(build_ast_from_expression(first)?),
                    right: Box::new(build_ast_from_expression(right)?),
                }),
                None => build_ast_from_expression(first),
            }
        }
        Rule::conditional_expression => {
            let mut children = pair.into_inner();
            let test = match children.next() {
                Some(p) => build_ast_from_expression(p)?,
                None => return Err(missing_child_error(&meta, 11)),
            };
            match (children.next(), children.next()) {
                (Some(consequent), Some(alternate)) => Ok(ExpressionType::ConditionalExpression {
                    meta,
                    test: Box::new(test),
                    consequent: Box::new(build_ast_from_expression(consequent)?),
                    alternate: Box::new(build_ast_from_expression(alternate)?),
                }),
                _ => Ok(test),
            }
        }
        Rule::logical_or_expression
        | Rule::logical_and_expression
        | Rule::equality_expression
        | Rule::relational_expression
        | Rule::additive_expression
        | Rule::multiplicative_expression => build_ast_from_binary_chain(pair),
        Rule::unary_expression => build_ast_from_unary_expression(pair),
        Rule::left_hand_side_expression => build_ast_from_left_hand_side_expression(pair),
        Rule::array_literal => {
            let mut elements = vec![];
            for inner_pair in pair.into_inner() {
                elements.push(build_ast_from_expression(inner_pair)?);
            }
            Ok(ExpressionType::ArrayExpression { meta, elements })
        }
        Rule::object_literal => {
            let mut properties = vec![];
            for inner_pair in pair.into_inner() {
                properties.push(build_ast_from_property_definition(inner_pair)?);
            }
            Ok(ExpressionType::ObjectExpression { meta, properties })
        }
        Rule::identifier => Ok(ExpressionType::Identifier(IdentifierData {
            name: pair.as_str().to_string(),
            meta,
        })),
        _ => Err(get_unexpected_error(12, &pair)),
    }
}

fn build_ast_from_property_definition(pair: Pair<Rule>) -> Result<PropertyData, Error<Rule>> {
    let meta = get_meta(&pair);
    let mut children = pair.into_inner();
    let key_pair = match children.next() {
        Some(p) => p,
        None => return Err(missing_child_error(&meta, 13)),
    };
    match children.next() {
        Some(value_pair) => {
            let name_pair = first_inner(key_pair, 14)?;
            let key = match name_pair.as_rule() {
                Rule::string_literal => string_literal_value(name_pair)?,
                Rule::numeric_literal => match parse_numeric_literal(&name_pair)? {
                    NumberLiteralType::IntegerLiteral(i) => i.to_string(),
                    NumberLiteralType::FloatLiteral(f) => f.to_string(),
                },
                _ => name_pair.as_str().to_string(),
            };
            Ok(PropertyData {
                meta,
                key,
                value: build_ast_from_expression(value_pair)?,
            })
        }
        None => {
            let name = key_pair.as_str().to_string();
            let identifier_meta = get_meta(&key_pair);
            Ok(PropertyData {
                meta,
                key: name.clone(),
                value: ExpressionType::Identifier(IdentifierData {
                    name,
                    meta: identifier_meta,
                }),
            })
        }
    }
}

fn build_ast_from_binary_chain(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let start_index = pair.as_span().start();
    let mut children = pair.into_inner();
    let first = match children.next() {
        Some(p) => p,
        None => return Err(missing_child_error(&Meta { start_index, end_index: start_index }, 15)),
    };
    let mut left = build_ast_from_expression(first)?;
    while let Some(operator_pair) = children.next() {
        let right_pair = match children.next() {
            Some(p) => p,
            None => return Err(get_unexpected_error(16, &operator_pair)),
        };
        let meta = Meta {
            start_index,
            end_index: right_pair.as_span().end(),
        };
        let right = Box::new(build_ast_from_expression(right_pair)?);
        let left_box = Box::new(left);
        left = match operator_pair.as_str() {
            "||" => ExpressionType::LogicalExpression {
                meta,
                operator: LogicalOperator::Or,
                left: left_box,
                right,
            },
            "&&" => ExpressionType::LogicalExpression {
                meta,
                operator: LogicalOperator::And,
                left: left_box,
                right,
            },
            operator => ExpressionType::BinaryExpression {
                meta,
                operator: match operator {
                    "===" => BinaryOperator::StrictlyEqual,
                    "!==" => BinaryOperator::StrictlyUnequal,
                    "==" => BinaryOperator::LooselyEqual,
                    "!=" => BinaryOperator::LooselyUnequal,
                    "<=" => BinaryOperator::LessThanEqual,
                    ">=" => BinaryOperator::GreaterThanEqual,
                    "<" => BinaryOperator::LessThan,
                    ">" => BinaryOperator::GreaterThan,
                    "in" => BinaryOperator::In,
                    "+" => BinaryOperator::Add,
                    "-" => BinaryOperator::Subtract,
                    "*" => BinaryOperator::Multiply,
                    "/" => BinaryOperator::Divide,
                    "%" => BinaryOperator::Modulo,
                    _ => return Err(get_unexpected_error(17, &operator_pair)),
                },
                left: left_box,
                right,
            },
        };
    }
    Ok(left)
}

fn build_ast_from_unary_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let mut operators = vec![];
    let mut argument = None;
    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::unary_operator => {
                let operator = match inner_pair.as_str() {
                    "!" => UnaryOperator::LogicalNot,
                    "-" => UnaryOperator::Minus,
                    "+" => UnaryOperator::Plus,
                    "typeof" => UnaryOperator::TypeOf,
                    _ => return Err(get_unexpected_error(18, &inner_pair)),
                };
                operators.push((operator, inner_pair.as_span().start()));
            }
            _ => argument = Some(inner_pair),
        }
    }
    let argument_pair = match argument {
        Some(p) => p,
        None => return Err(missing_child_error(&Meta { start_index: 0, end_index: 0 }, 19)),
    };
    let end_index = argument_pair.as_span().end();
    let mut expression = build_ast_from_expression(argument_pair)?;
    while let Some((operator, start_index)) = operators.pop() {
        expression = ExpressionType::UnaryExpression {
            meta: Meta {
                start_index,
                end_index,
            },
            operator,
            argument: Box::new(expression),
        };
    }
    Ok(expression)
}

fn build_ast_from_left_hand_side_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let start_index = pair.as_span().start();
    let mut children = pair.into_inner();
    let mut object = match children.next() {
        Some(p) => build_ast_from_expression(p)?,
        None => return Err(missing_child_error(&Meta { start_index, end_index: start_index }, 20)),
    };
    for suffix in children {
        let meta = Meta {
            start_index,
            end_index: suffix.as_span().end(),
        };
        object = match suffix.as_rule() {
            Rule::member_suffix => {
                let name_pair = first_inner(suffix, 21)?;
                ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
                    meta,
                    object: Box::new(object),
                    property: IdentifierData {
                        name: name_pair.as_str().to_string(),
                        meta: get_meta(&name_pair),
                    },
                })
            }
            Rule::computed_member_suffix => {
                let property = build_ast_from_expression(first_inner(suffix, 22)?)?;
                ExpressionType::MemberExpression(MemberExpressionType::ComputedMemberExpression {
                    meta,
                    object: Box::new(object),
                    property: Box::new(property),
                })
            }
            Rule::call_suffix => {
                let mut arguments = vec![];
                for argument in suffix.into_inner() {
                    arguments.push(build_ast_from_expression(argument)?);
                }
                ExpressionType::CallExpression {
                    meta,
                    callee: Box::new(object),
                    arguments,
                }
            }
            _ => return Err(get_unexpected_error(23, &suffix)),
        };
    }
    Ok(object)
}

fn build_ast_from_literal(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let meta = get_meta(&pair);
    let value = match pair.as_rule() {
        Rule::null_literal => LiteralType::NullLiteral,
        Rule::undefined_literal => LiteralType::UndefinedLiteral,
        Rule::boolean_literal => LiteralType::BooleanLiteral(pair.as_str() == "true"),
        Rule::numeric_literal => LiteralType::NumberLiteral(parse_numeric_literal(&pair)?),
        Rule::string_literal => LiteralType::StringLiteral(string_literal_value(pair)?),
        _ => return Err(get_unexpected_error(24, &pair)),
    };
    Ok(ExpressionType::Literal(LiteralData { meta, value }))
}

fn parse_numeric_literal(pair: &Pair<Rule>) -> Result<NumberLiteralType, Error<Rule>> {
    let text = pair.as_str();
    if text.starts_with("0x") || text.starts_with("0X") {
        return i64::from_str_radix(&text[2..], 16)
            .map(NumberLiteralType::IntegerLiteral)
            .map_err(|_| get_unexpected_error(25, pair));
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(NumberLiteralType::IntegerLiteral(i));
        }
    }
    let normalized = if text.starts_with('.') {
        format!("0{}", text)
    } else {
        text.to_string()
    };
    normalized
        .parse::<f64>()
        .map(NumberLiteralType::FloatLiteral)
        .map_err(|_| get_unexpected_error(26, pair))
}

fn string_literal_value(pair: Pair<Rule>) -> Result<String, Error<Rule>> {
    let inner_pair = first_inner(pair, 27)?;
    Ok(unescape(inner_pair.as_str()))
}

fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('u') => {
                let code: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&code, 16).ok().and_then(std::char::from_u32) {
                    Some(decoded) if code.len() == 4 => {
                        result.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => result.push('u'),
                }
            }
            Some(other) => result.push(other),
            None => {}
        }
    }
    result
}
