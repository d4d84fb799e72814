//! Expression tree evaluation.
//!
//! References are resolved through a caller-supplied callback, so the
//! evaluator knows nothing about grids, bounds or cycles. Whatever error the
//! callback returns is propagated unchanged.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::CellError;

/// Digits kept after the decimal point by [`normalize`].
pub const ROUND_DIGITS: i32 = 10;

/// Absolute tolerance used by `=`.
pub const EQ_TOLERANCE: f64 = 1e-9;

/// Evaluate `expr`, calling `resolve` for every cell reference encountered.
pub fn evaluate<F>(expr: &Expr, resolve: &mut F) -> Result<f64, CellError>
where
    F: FnMut(&str) -> Result<f64, CellError>,
{
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Reference(addr) => resolve(addr),
        Expr::Group(inner) => evaluate(inner, resolve),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, resolve)?;
            match op {
                UnaryOp::Not => Ok(if value != 0.0 { 0.0 } else { 1.0 }),
                UnaryOp::Pos => Ok(value),
                UnaryOp::Neg if value == 0.0 => Ok(0.0),
                UnaryOp::Neg => normalize(-value),
                UnaryOp::Inc => normalize(value + 1.0),
                UnaryOp::Dec => normalize(value - 1.0),
            }
        }
        Expr::Binary { op, left, right } => {
            let l = evaluate(left, resolve)?;
            let r = evaluate(right, resolve)?;
            match op {
                BinaryOp::Add => normalize(l + r),
                BinaryOp::Sub => normalize(l - r),
                BinaryOp::Mul => normalize(l * r),
                BinaryOp::Div if r == 0.0 => Err(CellError::DivisionByZero),
                BinaryOp::Div => normalize(l / r),
                BinaryOp::Gt => Ok(truth(l > r)),
                BinaryOp::Lt => Ok(truth(l < r)),
                BinaryOp::Eq => Ok(truth((l - r).abs() < EQ_TOLERANCE)),
            }
        }
    }
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Reject infinities and NaN, then round to [`ROUND_DIGITS`] decimals.
///
/// Ties round half to even. Exact zero (either sign) comes back as `0.0`
/// without rounding.
pub fn normalize(value: f64) -> Result<f64, CellError> {
    if value.is_infinite() {
        return Err(CellError::Overflow);
    }
    if value.is_nan() {
        return Err(CellError::NotANumber);
    }
    if value == 0.0 {
        return Ok(0.0);
    }
    Ok(round_to_digits(value, ROUND_DIGITS))
}

fn round_to_digits(value: f64, digits: i32) -> f64 {
    // Past 1e16 an f64 has no fractional digits left to round.
    if value.abs() >= 1e16 {
        return value;
    }
    let scale = 10f64.powi(digits);
    let rounded = (value * scale).round_ties_even() / scale;
    if rounded.is_finite() { rounded } else { value }
}
