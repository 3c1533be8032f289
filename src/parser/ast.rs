//! Syntax tree of the script language run by evaluation directives.

use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

pub trait HasMeta {
    fn get_meta(&self) -> &Meta;
}

#[derive(Debug)]
pub struct IdentifierData {
    pub name: String,
    pub meta: Meta,
}

impl HasMeta for IdentifierData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

#[derive(Debug)]
pub enum ExpressionType {
    Literal(LiteralData),
    Identifier(IdentifierData),
    ArrayExpression {
        meta: Meta,
        elements: Vec<ExpressionType>,
    },
    ObjectExpression {
        meta: Meta,
        properties: Vec<PropertyData>,
    },
    UnaryExpression {
        meta: Meta,
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    BinaryExpression {
        meta: Meta,
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        meta: Meta,
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    AssignmentExpression {
        meta: Meta,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        meta: Meta,
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    MemberExpression(MemberExpressionType),
    CallExpression {
        meta: Meta,
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
}

impl HasMeta for ExpressionType {
    fn get_meta(&self) -> &Meta {
        match self {
            ExpressionType::Literal(data) => &data.meta,
            ExpressionType::Identifier(data) => &data.meta,
            ExpressionType::ArrayExpression { meta, .. } => &meta,
            ExpressionType::ObjectExpression { meta, .. } => &meta,
            ExpressionType::UnaryExpression { meta, .. } => &meta,
            ExpressionType::BinaryExpression { meta, .. } => &meta,
            ExpressionType::LogicalExpression { meta, .. } => &meta,
            ExpressionType::AssignmentExpression { meta, .. } => &meta,
            ExpressionType::ConditionalExpression { meta, .. } => &meta,
            ExpressionType::MemberExpression(data) => data.get_meta(),
            ExpressionType::CallExpression { meta, .. } => &meta,
        }
    }
}

#[derive(Debug)]
pub enum MemberExpressionType {
    SimpleMemberExpression {
        meta: Meta,
        object: Box<ExpressionType>,
        property: IdentifierData,
    },
    ComputedMemberExpression {
        meta: Meta,
        object: Box<ExpressionType>,
        property: Box<ExpressionType>,
    },
}

impl HasMeta for MemberExpressionType {
    fn get_meta(&self) -> &Meta {
        match self {
            MemberExpressionType::SimpleMemberExpression { meta, .. } => &meta,
            MemberExpressionType::ComputedMemberExpression { meta, .. } => &meta,
        }
    }
}

#[derive(Debug)]
pub struct PropertyData {
    pub meta: Meta,
    pub key: String,
    pub value: ExpressionType,
}

#[derive(Debug, PartialEq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    LogicalNot,
    TypeOf,
}

#[derive(Debug, PartialEq)]
pub enum BinaryOperator {
    LooselyEqual,
    LooselyUnequal,
    StrictlyEqual,
    StrictlyUnequal,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    In,
}

#[derive(Debug, PartialEq)]
pub enum LogicalOperator {
    Or,
    And,
}

#[derive(Debug)]
pub struct LiteralData {
    pub meta: Meta,
    pub value: LiteralType,
}

#[derive(Debug, PartialEq)]
pub enum LiteralType {
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    UndefinedLiteral,
    NumberLiteral(NumberLiteralType),
}

#[derive(Debug, PartialEq)]
pub enum NumberLiteralType {
    IntegerLiteral(i64),
    FloatLiteral(f64),
}

#[derive(Debug)]
pub struct ProgramData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
}

impl HasMeta for ProgramData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

#[derive(Debug)]
pub struct BlockStatementData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
}

#[derive(Debug, PartialEq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug)]
pub struct VariableDeclaratorData {
    pub meta: Meta,
    pub id: IdentifierData,
    pub init: Option<Box<ExpressionType>>,
}

#[derive(Debug)]
pub enum StatementType {
    ExpressionStatement {
        meta: Meta,
        expression: Box<ExpressionType>,
    },
    BlockStatement(BlockStatementData),
    EmptyStatement {
        meta: Meta,
    },
    VariableDeclaration {
        meta: Meta,
        kind: VariableDeclarationKind,
        declarations: Vec<VariableDeclaratorData>,
    },
    IfStatement {
        meta: Meta,
        test: Box<ExpressionType>,
        consequent: Box<StatementType>,
        alternate: Option<Box<StatementType>>,
    },
    ReturnStatement {
        meta: Meta,
        argument: Option<Box<ExpressionType>>,
    },
}

impl HasMeta for StatementType {
    fn get_meta(&self) -> &Meta {
        match self {
            StatementType::ExpressionStatement { meta, .. } => &meta,
            StatementType::BlockStatement(data) => &data.meta,
            StatementType::EmptyStatement { meta } => &meta,
            StatementType::VariableDeclaration { meta, .. } => &meta,
            StatementType::IfStatement { meta, .. } => &meta,
            StatementType::ReturnStatement { meta, .. } => &meta,
        }
    }
}
