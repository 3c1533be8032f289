//! Statement execution.

use crate::parser::ast::{
    BlockStatementData, ExpressionType, ProgramData, StatementType, VariableDeclarationKind,
    VariableDeclaratorData,
};
use crate::runner::ds::error::EvalErrorType;
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::value::Value;

use super::expression::evaluate_expression;
use super::types::{Completion, EvalContext, EvalResult, ValueResult};

/// Runs a whole script. The result is the returned value, `undefined` when
/// the script completes without `return`.
pub fn execute_program(program: &ProgramData, ctx: &mut EvalContext) -> ValueResult {
    for stmt in &program.body {
        let completion = execute_statement(stmt, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion.get_value());
        }
    }
    Ok(Value::Undefined)
}

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, ctx: &mut EvalContext) -> EvalResult {
    match stmt {
        StatementType::EmptyStatement { .. } => Ok(Completion::normal()),

        StatementType::ExpressionStatement { expression, .. } => {
            let value = evaluate_expression(expression, ctx)?;
            Ok(Completion::normal_with_value(value))
        }

        StatementType::BlockStatement(block) => execute_block_statement(block, ctx),

        StatementType::VariableDeclaration {
            kind, declarations, ..
        } => execute_variable_declaration(kind, declarations, ctx),

        StatementType::IfStatement {
            test,
            consequent,
            alternate,
            ..
        } => execute_if_statement(test, consequent, alternate.as_ref().map(|a| a.as_ref()), ctx),

        StatementType::ReturnStatement { argument, .. } => {
            let value = if let Some(arg) = argument {
                evaluate_expression(arg, ctx)?
            } else {
                Value::Undefined
            };
            Ok(Completion::return_value(value))
        }
    }
}

/// Execute a block statement in its own lexical scope.
fn execute_block_statement(block: &BlockStatementData, ctx: &mut EvalContext) -> EvalResult {
    ctx.push_block_scope();
    let result = execute_statement_list(&block.body, ctx);
    ctx.pop_block_scope();
    result
}

fn execute_statement_list(statements: &[StatementType], ctx: &mut EvalContext) -> EvalResult {
    let mut last = Completion::normal();
    for stmt in statements {
        let completion = execute_statement(stmt, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
        if completion.value.is_some() {
            last = completion;
        }
    }
    Ok(last)
}

fn execute_variable_declaration(
    kind: &VariableDeclarationKind,
    declarations: &[VariableDeclaratorData],
    ctx: &mut EvalContext,
) -> EvalResult {
    for declarator in declarations {
        let name = &declarator.id.name;
        let value = match &declarator.init {
            Some(init) => Some(evaluate_expression(init, ctx)?),
            None => None,
        };
        match kind {
            VariableDeclarationKind::Var => ctx.declare_var(name, value)?,
            VariableDeclarationKind::Let => {
                ctx.create_binding(name, value.unwrap_or(Value::Undefined), true, false)?
            }
            VariableDeclarationKind::Const => match value {
                Some(v) => ctx.create_binding(name, v, false, false)?,
                None => {
                    return Err(EvalErrorType::SyntaxError(
                        "Missing initializer in const declaration".to_string(),
                    ));
                }
            },
        }
    }
    Ok(Completion::normal())
}

fn execute_if_statement(
    test: &ExpressionType,
    consequent: &StatementType,
    alternate: Option<&StatementType>,
    ctx: &mut EvalContext,
) -> EvalResult {
    let test_val = evaluate_expression(test, ctx)?;
    if to_boolean(&test_val) {
        execute_statement(consequent, ctx)
    } else if let Some(alt) = alternate {
        execute_statement(alt, ctx)
    } else {
        Ok(Completion::normal())
    }
}
