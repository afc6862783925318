//! Declared binding powers
//!
//! Lowest to highest: `?:`, `||`, logical `&&`, `== !=`, `< > <= >=`,
//! `+ -`, `* / % & ^` and tensor `&&`, unary `- !`, component access.
//! All binary operators are left-associative; `?:` is right-associative.

use super::legality::BinaryOp;
use crate::base::Kind;
use crate::parser::SyntaxKind;

/// Left binding power of `?`.
pub const TERNARY: u8 = 2;
/// Right binding power of the else branch of `?:`.
pub const TERNARY_ELSE: u8 = 1;
/// Left binding power of logical `&&`, the weakest reading of `&&`.
pub const LOGICAL_AND: u8 = 5;
/// Right binding power of prefix `-` and `!`.
pub const PREFIX: u8 = 15;
/// Left binding power of `.component`.
pub const POSTFIX: u8 = 17;

/// Operator and `(left, right)` binding powers for an infix token.
///
/// `&&` means logical AND after a logical operand and double contraction
/// after a tensor-like one; after any other kind it is not an operator.
pub fn infix(token: SyntaxKind, left: Kind) -> Option<(BinaryOp, u8, u8)> {
    let op = match token {
        SyntaxKind::PIPE_PIPE => return Some((BinaryOp::Or, 3, 4)),
        SyntaxKind::AMP_AMP if left == Kind::Logical => return Some((BinaryOp::And, LOGICAL_AND, LOGICAL_AND + 1)),
        SyntaxKind::AMP_AMP if left.is_tensor_like() => BinaryOp::DoubleInner,
        SyntaxKind::EQ_EQ => return Some((BinaryOp::Eq, 7, 8)),
        SyntaxKind::BANG_EQ => return Some((BinaryOp::Ne, 7, 8)),
        SyntaxKind::LT => return Some((BinaryOp::Lt, 9, 10)),
        SyntaxKind::GT => return Some((BinaryOp::Gt, 9, 10)),
        SyntaxKind::LT_EQ => return Some((BinaryOp::Le, 9, 10)),
        SyntaxKind::GT_EQ => return Some((BinaryOp::Ge, 9, 10)),
        SyntaxKind::PLUS => return Some((BinaryOp::Add, 11, 12)),
        SyntaxKind::MINUS => return Some((BinaryOp::Sub, 11, 12)),
        SyntaxKind::STAR => BinaryOp::Mul,
        SyntaxKind::SLASH => BinaryOp::Div,
        SyntaxKind::PERCENT => BinaryOp::Mod,
        SyntaxKind::AMP => BinaryOp::Inner,
        SyntaxKind::CARET => BinaryOp::Cross,
        _ => return None,
    };
    Some((op, 13, 14))
}

/// True for tokens that can only continue an expression as infix operators.
pub fn is_operator_token(token: SyntaxKind) -> bool {
    matches!(
        token,
        SyntaxKind::PIPE_PIPE
            | SyntaxKind::AMP_AMP
            | SyntaxKind::EQ_EQ
            | SyntaxKind::BANG_EQ
            | SyntaxKind::LT
            | SyntaxKind::GT
            | SyntaxKind::LT_EQ
            | SyntaxKind::GT_EQ
            | SyntaxKind::PLUS
            | SyntaxKind::MINUS
            | SyntaxKind::STAR
            | SyntaxKind::SLASH
            | SyntaxKind::PERCENT
            | SyntaxKind::AMP
            | SyntaxKind::CARET
    )
}
