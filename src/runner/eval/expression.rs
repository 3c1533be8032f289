//! Expression evaluation.
//!
//! Evaluates the restricted expression language against an `EvalContext`.
//! Values read from the graph which are still deferred (`Value::Lazy`) are
//! forced on access, so scripts only ever observe evaluated results.

use crate::parser::ast::{
    BinaryOperator, ExpressionType, LiteralData, LiteralType, LogicalOperator,
    MemberExpressionType, NumberLiteralType, PropertyData, UnaryOperator,
};
use crate::runner::ds::error::EvalErrorType;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::operations::type_conversion::{
    number_value, to_boolean, to_display_string, to_number, type_of, TYPE_STR_UNDEFINED,
};
use crate::runner::ds::value::{PatternRef, Value};

use super::types::{EvalContext, ValueResult};

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),

        ExpressionType::Identifier(id) => settle(ctx.get_binding(&id.name)?),

        ExpressionType::ArrayExpression { elements, .. } => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                items.push(evaluate_expression(element, ctx)?);
            }
            Ok(Value::new_sequence(items))
        }

        ExpressionType::ObjectExpression { properties, .. } => {
            evaluate_object_expression(properties, ctx)
        }

        ExpressionType::UnaryExpression {
            operator, argument, ..
        } => evaluate_unary_expression(operator, argument, ctx),

        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
            ..
        } => evaluate_binary_expression(operator, left, right, ctx),

        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
            ..
        } => evaluate_logical_expression(operator, left, right, ctx),

        ExpressionType::AssignmentExpression { left, right, .. } => {
            evaluate_assignment_expression(left, right, ctx)
        }

        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
            ..
        } => {
            let test_val = evaluate_expression(test, ctx)?;
            if to_boolean(&test_val) {
                evaluate_expression(consequent, ctx)
            } else {
                evaluate_expression(alternate, ctx)
            }
        }

        ExpressionType::MemberExpression(member) => {
            let (object, key) = evaluate_member_target(member, ctx)?;
            get_member(&object, &key)
        }

        ExpressionType::CallExpression {
            callee, arguments, ..
        } => {
            let function = evaluate_expression(callee, ctx)?;
            let mut args = Vec::with_capacity(arguments.len());
            for argument in arguments {
                args.push(evaluate_expression(argument, ctx)?);
            }
            match function {
                Value::Function(f) => f.call(&args),
                other => Err(EvalErrorType::TypeError(format!(
                    "{} is not a function",
                    describe_callee(callee, &other)
                ))),
            }
        }
    }
}

/// Evaluate a literal and return its value.
fn evaluate_literal(lit: &LiteralData) -> Value {
    match &lit.value {
        LiteralType::NullLiteral => Value::Null,
        LiteralType::UndefinedLiteral => Value::Undefined,
        LiteralType::BooleanLiteral(b) => Value::Boolean(*b),
        LiteralType::StringLiteral(s) => Value::String(s.clone()),
        LiteralType::NumberLiteral(n) => match n {
            NumberLiteralType::IntegerLiteral(i) => Value::integer(*i),
            NumberLiteralType::FloatLiteral(f) => Value::float(*f),
        },
    }
}

fn evaluate_object_expression(properties: &[PropertyData], ctx: &mut EvalContext) -> ValueResult {
    let record = Value::new_record(vec![]);
    for property in properties {
        let value = evaluate_expression(&property.value, ctx)?;
        if let Value::Record(r) = &record {
            r.borrow_mut().set(property.key.clone(), value);
        }
    }
    Ok(record)
}

/// Forces deferred values. Chained thunks are forced until a plain value
/// comes out.
pub fn settle(value: Value) -> ValueResult {
    match value {
        Value::Lazy(lazy) => {
            let forced = lazy.force().map_err(EvalErrorType::from)?;
            settle(forced)
        }
        other => Ok(other),
    }
}

fn evaluate_member_target(
    member: &MemberExpressionType,
    ctx: &mut EvalContext,
) -> Result<(Value, Value), EvalErrorType> {
    match member {
        MemberExpressionType::SimpleMemberExpression {
            object, property, ..
        } => {
            let object = evaluate_expression(object, ctx)?;
            Ok((object, Value::String(property.name.clone())))
        }
        MemberExpressionType::ComputedMemberExpression {
            object, property, ..
        } => {
            let object = evaluate_expression(object, ctx)?;
            let key = evaluate_expression(property, ctx)?;
            Ok((object, key))
        }
    }
}

fn as_index(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) => {
            let f = n.as_f64();
            if f >= 0.0 && f.fract() == 0.0 && f < usize::MAX as f64 {
                Some(f as usize)
            } else {
                None
            }
        }
        Value::String(s) => s.parse::<usize>().ok(),
        _ => None,
    }
}

/// Property read with graph specific accessors (`length`, `size`, ...).
pub fn get_member(object: &Value, key: &Value) -> ValueResult {
    let name = to_display_string(key);
    let value = match object {
        Value::Undefined | Value::Null => {
            return Err(EvalErrorType::TypeError(format!(
                "Cannot read properties of {} (reading '{}')",
                to_display_string(object),
                name
            )));
        }
        Value::Lazy(_) => return get_member(&settle(object.clone())?, key),
        Value::Record(r) => r.borrow().get(&name).cloned().unwrap_or(Value::Undefined),
        Value::Sequence(s) => {
            if name == "length" {
                Value::integer(s.borrow().len() as i64)
            } else {
                let item = as_index(key).and_then(|i| s.borrow().get(i).cloned());
                item.unwrap_or(Value::Undefined)
            }
        }
        Value::String(s) => {
            if name == "length" {
                Value::integer(s.chars().count() as i64)
            } else {
                as_index(key)
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Undefined)
            }
        }
        Value::Mapping(m) if name == "size" => Value::integer(m.borrow().len() as i64),
        Value::Set(s) if name == "size" => Value::integer(s.borrow().len() as i64),
        Value::Blob(b) if name == "size" => Value::integer(b.size() as i64),
        Value::Blob(b) if name == "type" => Value::string(b.mime_type()),
        Value::Function(f) if name == "name" => Value::string(&f.name),
        Value::Pattern(p) if name == "source" => Value::string(p.borrow().source()),
        Value::Pattern(p) if name == "flags" => Value::string(p.borrow().flags()),
        Value::Pattern(p) if name == "global" => Value::Boolean(p.borrow().is_global()),
        Value::Pattern(p) if name == "test" => Value::new_function(pattern_test(p.clone())),
        _ => Value::Undefined,
    };
    settle(value)
}

/// `pattern.test(text)`, advancing the pattern's `lastIndex` like any other
/// match.
fn pattern_test(pattern: PatternRef) -> FunctionObject {
    FunctionObject::new("test", move |args| {
        let text = to_display_string(args.first().unwrap_or(&Value::Undefined));
        Ok(Value::Boolean(pattern.borrow_mut().test(&text)))
    })
}

/// Largest run of `undefined` holes a single index write may open up at the
/// end of a sequence.
pub const MAX_SEQUENCE_GAP: usize = 1 << 16;

/// Property write. Only records and sequences accept new members.
pub fn set_member(object: &Value, key: &Value, value: Value) -> Result<(), EvalErrorType> {
    match object {
        Value::Lazy(_) => set_member(&settle(object.clone())?, key, value),
        Value::Record(r) => {
            r.borrow_mut().set(to_display_string(key), value);
            Ok(())
        }
        Value::Sequence(s) => match as_index(key) {
            Some(i) => {
                let mut items = s.borrow_mut();
                if i >= items.len() {
                    if i - items.len() > MAX_SEQUENCE_GAP {
                        return Err(EvalErrorType::RangeError(format!(
                            "Invalid array length for index {}",
                            i
                        )));
                    }
                    items.resize(i + 1, Value::Undefined);
                }
                items[i] = value;
                Ok(())
            }
            None => Err(EvalErrorType::RangeError(format!(
                "Invalid array index '{}'",
                to_display_string(key)
            ))),
        },
        _ => Err(EvalErrorType::TypeError(format!(
            "Cannot set property '{}' of {}",
            to_display_string(key),
            type_of(object)
        ))),
    }
}

fn evaluate_assignment_expression(
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    match left {
        ExpressionType::Identifier(id) => {
            let value = evaluate_expression(right, ctx)?;
            ctx.set_binding(&id.name, value.clone())?;
            Ok(value)
        }
        ExpressionType::MemberExpression(member) => {
            let (object, key) = evaluate_member_target(member, ctx)?;
            let value = evaluate_expression(right, ctx)?;
            set_member(&object, &key, value.clone())?;
            Ok(value)
        }
        _ => Err(EvalErrorType::SyntaxError(
            "Invalid left-hand side in assignment".to_string(),
        )),
    }
}

/// Evaluate a unary expression.
fn evaluate_unary_expression(
    operator: &UnaryOperator,
    argument: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    match operator {
        UnaryOperator::TypeOf => {
            if let ExpressionType::Identifier(id) = argument {
                if !ctx.has_binding(&id.name) {
                    return Ok(Value::string(TYPE_STR_UNDEFINED));
                }
            }
            let value = evaluate_expression(argument, ctx)?;
            Ok(Value::string(type_of(&value)))
        }
        UnaryOperator::LogicalNot => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(Value::Boolean(!to_boolean(&value)))
        }
        UnaryOperator::Minus => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(number_value(-to_number(&value)))
        }
        UnaryOperator::Plus => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(number_value(to_number(&value)))
        }
    }
}

/// Evaluate a binary expression.
fn evaluate_binary_expression(
    operator: &BinaryOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    let left_val = evaluate_expression(left, ctx)?;
    let right_val = evaluate_expression(right, ctx)?;

    match operator {
        // Arithmetic
        BinaryOperator::Add => Ok(add_values(&left_val, &right_val)),
        BinaryOperator::Subtract => Ok(numeric_op(&left_val, &right_val, |a, b| a - b)),
        BinaryOperator::Multiply => Ok(numeric_op(&left_val, &right_val, |a, b| a * b)),
        BinaryOperator::Divide => Ok(numeric_op(&left_val, &right_val, |a, b| a / b)),
        BinaryOperator::Modulo => Ok(numeric_op(&left_val, &right_val, |a, b| a % b)),

        // Comparison
        BinaryOperator::LessThan => Ok(compare_values(&left_val, &right_val, |o| o.is_lt())),
        BinaryOperator::GreaterThan => Ok(compare_values(&left_val, &right_val, |o| o.is_gt())),
        BinaryOperator::LessThanEqual => Ok(compare_values(&left_val, &right_val, |o| o.is_le())),
        BinaryOperator::GreaterThanEqual => {
            Ok(compare_values(&left_val, &right_val, |o| o.is_ge()))
        }

        // Equality
        BinaryOperator::StrictlyEqual => Ok(Value::Boolean(left_val == right_val)),
        BinaryOperator::StrictlyUnequal => Ok(Value::Boolean(left_val != right_val)),
        BinaryOperator::LooselyEqual => Ok(Value::Boolean(loose_equality(&left_val, &right_val))),
        BinaryOperator::LooselyUnequal => {
            Ok(Value::Boolean(!loose_equality(&left_val, &right_val)))
        }

        BinaryOperator::In => has_member(&right_val, &left_val).map(Value::Boolean),
    }
}

/// Evaluate a logical expression with short-circuit evaluation.
fn evaluate_logical_expression(
    operator: &LogicalOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    let left_val = evaluate_expression(left, ctx)?;

    match operator {
        LogicalOperator::And => {
            if !to_boolean(&left_val) {
                Ok(left_val)
            } else {
                evaluate_expression(right, ctx)
            }
        }
        LogicalOperator::Or => {
            if to_boolean(&left_val) {
                Ok(left_val)
            } else {
                evaluate_expression(right, ctx)
            }
        }
    }
}

fn is_primitive(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) => {
            true
        }
        _ => false,
    }
}

fn add_values(left: &Value, right: &Value) -> Value {
    let concatenates = |v: &Value| matches!(v, Value::String(_)) || !is_primitive(v);
    if concatenates(left) || concatenates(right) {
        return Value::String(format!(
            "{}{}",
            to_display_string(left),
            to_display_string(right)
        ));
    }
    number_value(to_number(left) + to_number(right))
}

fn numeric_op<F>(left: &Value, right: &Value, op: F) -> Value
where
    F: Fn(f64, f64) -> f64,
{
    number_value(op(to_number(left), to_number(right)))
}

fn compare_values<F>(left: &Value, right: &Value, cmp: F) -> Value
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    };
    Value::Boolean(ordering.map(cmp).unwrap_or(false))
}

fn loose_equality(left: &Value, right: &Value) -> bool {
    if std::mem::discriminant(left) == std::mem::discriminant(right) {
        return left == right;
    }

    match (left, right) {
        (Value::Null, Value::Undefined) | (Value::Undefined, Value::Null) => true,
        (Value::Undefined, _) | (Value::Null, _) | (_, Value::Undefined) | (_, Value::Null) => {
            false
        }
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            to_number(left) == to_number(right)
        }
        (Value::Boolean(b), _) => loose_equality(&Value::integer(*b as i64), right),
        (_, Value::Boolean(b)) => loose_equality(left, &Value::integer(*b as i64)),
        (Value::String(s), other) | (other, Value::String(s)) if !is_primitive(other) => {
            &to_display_string(other) == s
        }
        (Value::Number(n), other) | (other, Value::Number(n)) if !is_primitive(other) => {
            to_number(other) == n.as_f64()
        }
        _ => false,
    }
}

fn has_member(object: &Value, key: &Value) -> Result<bool, EvalErrorType> {
    match object {
        Value::Lazy(_) => has_member(&settle(object.clone())?, key),
        Value::Record(r) => Ok(r.borrow().has_own_property(&to_display_string(key))),
        Value::Sequence(s) => {
            let name = to_display_string(key);
            Ok(name == "length" || as_index(key).map(|i| i < s.borrow().len()).unwrap_or(false))
        }
        Value::Mapping(_) | Value::Set(_) => Ok(to_display_string(key) == "size"),
        _ => Err(EvalErrorType::TypeError(format!(
            "Cannot use 'in' operator to search for '{}' in {}",
            to_display_string(key),
            to_display_string(object)
        ))),
    }
}

fn describe_callee(callee: &ExpressionType, value: &Value) -> String {
    match callee {
        ExpressionType::Identifier(id) => id.name.clone(),
        ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
            property,
            ..
        }) => property.name.clone(),
        _ => to_display_string(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::pattern::Pattern;
    use crate::runner::ds::value::NumberType;

    #[test]
    fn test_loose_equality() {
        assert!(loose_equality(&Value::Null, &Value::Undefined));
        assert!(loose_equality(&Value::integer(1), &Value::string("1")));
        assert!(loose_equality(&Value::Boolean(true), &Value::integer(1)));
        assert!(!loose_equality(&Value::Null, &Value::integer(0)));
        assert!(!loose_equality(
            &Value::Number(NumberType::NaN),
            &Value::Number(NumberType::NaN)
        ));
    }

    #[test]
    fn test_add_concatenates_strings() {
        assert_eq!(
            add_values(&Value::string("a"), &Value::integer(1)),
            Value::string("a1")
        );
        assert_eq!(add_values(&Value::integer(2), &Value::integer(3)), Value::integer(5));
        assert_eq!(
            add_values(&Value::new_sequence(vec![Value::integer(1)]), &Value::integer(1)),
            Value::string("11")
        );
    }

    #[test]
    fn test_member_access() {
        let seq = Value::new_sequence(vec![Value::integer(7)]);
        assert_eq!(get_member(&seq, &Value::string("length")).unwrap(), Value::integer(1));
        assert_eq!(get_member(&seq, &Value::integer(0)).unwrap(), Value::integer(7));
        assert_eq!(get_member(&seq, &Value::integer(3)).unwrap(), Value::Undefined);
        assert!(get_member(&Value::Null, &Value::string("a")).is_err());
    }

    #[test]
    fn test_set_member_grows_sequence() {
        let seq = Value::new_sequence(vec![]);
        set_member(&seq, &Value::integer(1), Value::string("x")).unwrap();
        assert_eq!(seq.size(), Some(2));
        assert!(set_member(&Value::integer(1), &Value::string("a"), Value::Null).is_err());
    }

    #[test]
    fn test_pattern_members() {
        let pattern = Value::new_pattern(Pattern::new("a", "g").unwrap());
        assert_eq!(get_member(&pattern, &Value::string("global")).unwrap(), Value::Boolean(true));
        let test = match get_member(&pattern, &Value::string("test")).unwrap() {
            Value::Function(f) => f,
            other => panic!("expected a function, got {:?}", other),
        };
        assert_eq!(test.call(&[Value::string("ba")]).unwrap(), Value::Boolean(true));
        assert_eq!(test.call(&[Value::string("ba")]).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_set_member_rejects_huge_index() {
        let seq = Value::new_sequence(vec![Value::integer(1)]);
        assert!(matches!(
            set_member(&seq, &Value::integer(1_000_000_000_000_000), Value::integer(1)),
            Err(EvalErrorType::RangeError(_))
        ));
        assert_eq!(seq.size(), Some(1));
        let edge = (MAX_SEQUENCE_GAP + 1) as i64;
        set_member(&seq, &Value::integer(edge), Value::Null).unwrap();
        assert_eq!(seq.size(), Some(MAX_SEQUENCE_GAP + 2));
    }
}
