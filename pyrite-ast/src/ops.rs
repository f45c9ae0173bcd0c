//! Operator expressions introduced when builtin calls are rewritten.

use crate::arena::AstArena;
use crate::dtype::{promote, DataKind, DataType};
use crate::node::{BinaryOp, Node, NodeKind, TypeInfo, UnaryOp};

/// Typing of an arithmetic expression over `operands`
///
/// The result kind is the highest promotion rung present (Bool arithmetic
/// yields Integer). Precision is the widest operand of that kind, the rank
/// and layout come from the highest-rank operand.
pub fn arithmetic_type(operands: &[&Node<'_>]) -> TypeInfo {
    let kind = match promote(operands.iter().map(|n| n.data_kind())) {
        Some(DataKind::Bool) => DataKind::Integer,
        Some(kind) => kind,
        None => return TypeInfo::untyped(),
    };

    let precision = operands
        .iter()
        .filter(|n| n.data_kind() == kind)
        .map(|n| n.precision())
        .max()
        .unwrap_or_else(|| kind.default_precision());

    let dtype = DataType::new(kind, precision);
    match operands.iter().max_by_key(|n| n.rank()) {
        Some(widest) if widest.rank() > 0 => {
            let mut ty = TypeInfo::with_unknown_shape(dtype, widest.rank(), widest.order());
            ty.shape = widest.shape().clone();
            ty
        }
        _ => TypeInfo::scalar(dtype),
    }
}

fn binary<'a>(
    arena: &'a AstArena<'a>,
    op: BinaryOp,
    left: &'a Node<'a>,
    right: &'a Node<'a>,
) -> &'a Node<'a> {
    let ty = match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => arithmetic_type(&[left, right]),
        BinaryOp::And | BinaryOp::IsNot => TypeInfo::scalar(DataType::bool()),
    };
    arena.alloc(NodeKind::Binary { op, left, right }, ty)
}

pub fn add<'a>(arena: &'a AstArena<'a>, left: &'a Node<'a>, right: &'a Node<'a>) -> &'a Node<'a> {
    binary(arena, BinaryOp::Add, left, right)
}

pub fn sub<'a>(arena: &'a AstArena<'a>, left: &'a Node<'a>, right: &'a Node<'a>) -> &'a Node<'a> {
    binary(arena, BinaryOp::Sub, left, right)
}

pub fn mul<'a>(arena: &'a AstArena<'a>, left: &'a Node<'a>, right: &'a Node<'a>) -> &'a Node<'a> {
    binary(arena, BinaryOp::Mul, left, right)
}

/// Short-circuit conjunction; `right` is only evaluated when `left` holds
pub fn and<'a>(arena: &'a AstArena<'a>, left: &'a Node<'a>, right: &'a Node<'a>) -> &'a Node<'a> {
    binary(arena, BinaryOp::And, left, right)
}

pub fn is_not<'a>(
    arena: &'a AstArena<'a>,
    left: &'a Node<'a>,
    right: &'a Node<'a>,
) -> &'a Node<'a> {
    binary(arena, BinaryOp::IsNot, left, right)
}

pub fn neg<'a>(arena: &'a AstArena<'a>, operand: &'a Node<'a>) -> &'a Node<'a> {
    let ty = arithmetic_type(&[operand]);
    arena.alloc(
        NodeKind::Unary {
            op: UnaryOp::Neg,
            operand,
        },
        ty,
    )
}

pub fn not<'a>(arena: &'a AstArena<'a>, operand: &'a Node<'a>) -> &'a Node<'a> {
    arena.alloc(
        NodeKind::Unary {
            op: UnaryOp::Not,
            operand,
        },
        TypeInfo::scalar(DataType::bool()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Order;
    use crate::shape::Shape;

    #[test]
    fn test_arithmetic_promotes() {
        let arena = AstArena::new();
        let i = arena.int(1);
        let x = arena.float(2.0);
        let z = arena.imaginary_unit();

        assert_eq!(add(&arena, i, x).dtype(), DataType::real(8));
        assert_eq!(mul(&arena, x, z).dtype(), DataType::complex(8));
        assert_eq!(sub(&arena, i, i).dtype(), DataType::integer(4));
    }

    #[test]
    fn test_bool_arithmetic_is_integer() {
        let arena = AstArena::new();
        let t = arena.boolean(true);
        assert_eq!(add(&arena, t, t).dtype(), DataType::integer(4));
    }

    #[test]
    fn test_precision_is_widest_of_result_kind() {
        let arena = AstArena::new();
        let narrow = arena.variable("a", TypeInfo::scalar(DataType::real(4)));
        let wide_int = arena.variable("n", TypeInfo::scalar(DataType::integer(8)));
        // the 8-byte integer does not widen a 4-byte float result
        assert_eq!(add(&arena, narrow, wide_int).dtype(), DataType::real(4));
    }

    #[test]
    fn test_array_operand_sets_rank() {
        let arena = AstArena::new();
        let v = arena.variable(
            "v",
            TypeInfo::array(DataType::real(8), Shape::fixed(&[5]), Order::ColumnMajor),
        );
        let e = mul(&arena, arena.int(2), v);
        assert_eq!(e.rank(), 1);
        assert_eq!(e.shape(), &Shape::fixed(&[5]));
        assert_eq!(e.order(), Order::ColumnMajor);
    }

    #[test]
    fn test_logical_ops_are_bool() {
        let arena = AstArena::new();
        let x = arena.float(1.0);
        let nil = arena.nil();
        assert_eq!(is_not(&arena, x, nil).dtype(), DataType::bool());
        assert_eq!(not(&arena, x).dtype(), DataType::bool());
        assert_eq!(neg(&arena, x).dtype(), DataType::real(8));
    }
}
