//! Operator precedence over flat operator runs.
//!
//! The grammar hands the builder a head operand followed by a flat list of
//! `(operator, operands)` parts. The merger keeps an accumulator whose
//! top-level operator is tracked explicitly, and for each part either
//!
//! - **descends**: the new operator binds tighter than the accumulator's top,
//!   so it replaces the top's trailing operand (the last argument of a binary
//!   call, or the last element of an n-ary call's collection), or
//! - **wraps**: the whole accumulator becomes the seed of the new operator.
//!
//! Arithmetic has two ranks: relational operators sit below `+ - * /`, which
//! are not ranked against each other and therefore group left to right.
//! Boolean has `or` below `and`.

use std::fmt;

use tracing::trace;

use crate::base::SourceSpan;
use crate::model::{AppliedFunction, ValueSpecification};
use crate::parser::SyntaxKind;

/// How an operator lays out its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `op(a, b)`; a run of operands nests left-associatively.
    Binary,
    /// `op([a, b, c])`; a run of operands shares one call.
    NAry,
}

/// An operator the merger can place.
pub trait MergeOperator: Copy + fmt::Debug {
    /// Higher binds tighter.
    fn rank(self) -> u8;
    fn arity(self) -> Arity;
    fn function_name(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Times,
    Divide,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl ArithmeticOp {
    pub fn from_kind(kind: SyntaxKind) -> Option<Self> {
        Some(match kind {
            SyntaxKind::PLUS => Self::Plus,
            SyntaxKind::MINUS => Self::Minus,
            SyntaxKind::STAR => Self::Times,
            SyntaxKind::SLASH => Self::Divide,
            SyntaxKind::LT => Self::LessThan,
            SyntaxKind::LT_EQ => Self::LessThanEqual,
            SyntaxKind::GT => Self::GreaterThan,
            SyntaxKind::GT_EQ => Self::GreaterThanEqual,
            _ => return None,
        })
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanEqual | Self::GreaterThan | Self::GreaterThanEqual
        )
    }
}

impl MergeOperator for ArithmeticOp {
    fn rank(self) -> u8 {
        if self.is_relational() { 0 } else { 1 }
    }

    fn arity(self) -> Arity {
        match self {
            Self::Plus | Self::Minus | Self::Times => Arity::NAry,
            _ => Arity::Binary,
        }
    }

    fn function_name(self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Times => "times",
            Self::Divide => "divide",
            Self::LessThan => "lessThan",
            Self::LessThanEqual => "lessThanEqual",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanEqual => "greaterThanEqual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    And,
    Or,
}

impl BooleanOp {
    pub fn from_kind(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::AMP_AMP => Some(Self::And),
            SyntaxKind::PIPE_PIPE => Some(Self::Or),
            _ => None,
        }
    }
}

impl MergeOperator for BooleanOp {
    fn rank(self) -> u8 {
        match self {
            Self::Or => 0,
            Self::And => 1,
        }
    }

    fn arity(self) -> Arity {
        Arity::Binary
    }

    fn function_name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// One operator part: the operator and the operands that followed it.
pub type Part<Op> = (Op, Vec<ValueSpecification>);

/// Fold `seed` and `parts` into one call tree.
pub fn merge<Op: MergeOperator>(seed: ValueSpecification, parts: Vec<Part<Op>>) -> ValueSpecification {
    let mut top: Option<Op> = None;
    let mut value = seed;
    for (op, operands) in parts {
        value = match top {
            Some(current) if op.rank() > current.rank() => {
                trace!(?op, top = ?current, "descend");
                descend(current, value, op, operands)
            }
            _ => {
                trace!(?op, "wrap");
                top = Some(op);
                apply(op, value, operands)
            }
        };
    }
    value
}

/// Build `op` with `seed` as its first operand.
fn apply<Op: MergeOperator>(op: Op, seed: ValueSpecification, operands: Vec<ValueSpecification>) -> ValueSpecification {
    match op.arity() {
        Arity::NAry => {
            let source = cover(seed.source(), operands.last().and_then(|v| v.source()));
            let mut values = Vec::with_capacity(operands.len() + 1);
            values.push(seed);
            values.extend(operands);
            ValueSpecification::applied(
                op.function_name(),
                vec![ValueSpecification::collection(values, source.clone())],
                source,
            )
        }
        Arity::Binary => operands.into_iter().fold(seed, |left, right| {
            let source = cover(left.source(), right.source());
            ValueSpecification::applied(op.function_name(), vec![left, right], source)
        }),
    }
}

/// Rebuild `value` (a call of `top`) with its trailing operand replaced by
/// `op` applied to that operand.
fn descend<Op: MergeOperator>(
    top: Op,
    value: ValueSpecification,
    op: Op,
    operands: Vec<ValueSpecification>,
) -> ValueSpecification {
    let ValueSpecification::AppliedFunction(AppliedFunction {
        function,
        mut parameters,
        source,
    }) = value
    else {
        return apply(op, value, operands);
    };

    let replaced = match (top.arity(), parameters.pop()) {
        (Arity::Binary, Some(last)) => apply(op, last, operands),
        (Arity::NAry, Some(ValueSpecification::Collection(collection))) => {
            let collection_source = collection.source.clone();
            let mut values = collection.into_values();
            if let Some(last) = values.pop() {
                values.push(apply(op, last, operands));
            }
            let new_source = cover(collection_source.as_ref(), values.last().and_then(|v| v.source()));
            ValueSpecification::collection(values, new_source)
        }
        (_, Some(other)) => apply(op, other, operands),
        (_, None) => {
            return ValueSpecification::applied(function, parameters, source);
        }
    };
    let source = cover(source.as_ref(), replaced.source());
    parameters.push(replaced);
    ValueSpecification::applied(function, parameters, source)
}

/// Smallest span covering both ends; `None` if either end is synthetic.
pub(crate) fn cover(first: Option<&SourceSpan>, last: Option<&SourceSpan>) -> Option<SourceSpan> {
    match (first, last) {
        (Some(a), Some(b)) => Some(a.cover(b)),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}
