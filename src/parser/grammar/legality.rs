//! Operator legality table
//!
//! Every binary operator application is looked up in [`RULES`] by
//! `(operator, left kind, right kind)`. A missing entry is a type error
//! reported at parse time, before any field data is touched. Location
//! agreement is checked separately and is the same for every operator.

use std::fmt;

use crate::base::Kind;
use crate::base::Kind::{
    Logical as L, Scalar as S, SphericalTensor as H, SymmTensor as Y, Tensor as T, Vector as V,
};

/// Binary operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `&`, single contraction
    Inner,
    /// `^`, cross product
    Cross,
    /// `&&` between tensor-like operands
    DoubleInner,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    /// `&&` between logical operands
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Inner => "&",
            BinaryOp::Cross => "^",
            BinaryOp::DoubleInner | BinaryOp::And => "&&",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// One legal operator application and its result kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub op: BinaryOp,
    pub left: Kind,
    pub right: Kind,
    pub result: Kind,
}

macro_rules! rules {
    ($($op:ident ($left:ident, $right:ident) => $result:ident;)*) => {
        &[$(Rule { op: BinaryOp::$op, left: $left, right: $right, result: $result },)*]
    };
}

/// The complete binary operator table.
pub static RULES: &[Rule] = rules! {
    // + and -
    Add(S, S) => S;
    Add(V, V) => V;
    Add(T, T) => T;
    Add(Y, Y) => Y;
    Add(H, H) => H;
    Sub(S, S) => S;
    Sub(V, V) => V;
    Sub(T, T) => T;
    Sub(Y, Y) => Y;
    Sub(H, H) => H;

    // scaling
    Mul(S, S) => S;
    Mul(S, V) => V;
    Mul(S, T) => T;
    Mul(S, Y) => Y;
    Mul(S, H) => H;
    Mul(V, S) => V;
    Mul(T, S) => T;
    Mul(Y, S) => Y;
    Mul(H, S) => H;
    Div(S, S) => S;
    Div(V, S) => V;
    Div(T, S) => T;
    Div(Y, S) => Y;
    Div(H, S) => H;
    Mod(S, S) => S;

    // single contraction
    Inner(V, V) => S;
    Inner(T, V) => V;
    Inner(V, T) => V;
    Inner(Y, V) => V;
    Inner(V, Y) => V;
    Inner(H, V) => V;
    Inner(V, H) => V;
    Inner(T, T) => T;
    Inner(Y, T) => T;
    Inner(T, Y) => T;
    Inner(H, T) => T;
    Inner(T, H) => T;

    Cross(V, V) => V;

    // double contraction, any pair of tensor-like kinds
    DoubleInner(T, T) => S;
    DoubleInner(T, Y) => S;
    DoubleInner(T, H) => S;
    DoubleInner(Y, T) => S;
    DoubleInner(Y, Y) => S;
    DoubleInner(Y, H) => S;
    DoubleInner(H, T) => S;
    DoubleInner(H, Y) => S;
    DoubleInner(H, H) => S;

    // comparisons and logic
    Lt(S, S) => L;
    Gt(S, S) => L;
    Le(S, S) => L;
    Ge(S, S) => L;
    Eq(S, S) => L;
    Ne(S, S) => L;
    And(L, L) => L;
    Or(L, L) => L;
};

/// Result kind of `left op right`, if the combination is legal.
pub fn binary_result(op: BinaryOp, left: Kind, right: Kind) -> Option<Kind> {
    RULES
        .iter()
        .find(|r| r.op == op && r.left == left && r.right == right)
        .map(|r| r.result)
}

pub fn unary_result(op: UnaryOp, operand: Kind) -> Option<Kind> {
    match op {
        UnaryOp::Neg if operand.is_numeric() => Some(operand),
        UnaryOp::Not if operand == Kind::Logical => Some(Kind::Logical),
        _ => None,
    }
}

/// `cond ? a : b` is legal for a logical condition and branches of one kind.
pub fn ternary_result(cond: Kind, then: Kind, otherwise: Kind) -> Option<Kind> {
    (cond == Kind::Logical && then == otherwise).then_some(then)
}

/// Operator symbols that may follow an operand of kind `left`.
pub fn operators_after(left: Kind) -> Vec<&'static str> {
    let mut symbols: Vec<&'static str> = Vec::new();
    for rule in RULES.iter().filter(|r| r.left == left) {
        let symbol = rule.op.symbol();
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

/// Right operand kinds accepted by `left op _`.
pub fn right_operands(op: BinaryOp, left: Kind) -> Vec<Kind> {
    RULES
        .iter()
        .filter(|r| r.op == op && r.left == left)
        .map(|r| r.right)
        .collect()
}
