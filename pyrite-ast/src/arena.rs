use typed_arena::Arena;

use crate::dtype::{DataKind, DataType};
use crate::node::{Literal, Node, NodeKind, TypeInfo};

/// Arena owning every node of one compilation unit
///
/// Nodes reference their children by `&'a Node<'a>`; all of them are
/// released together when the arena is dropped.
pub struct AstArena<'a> {
    nodes: Arena<Node<'a>>,
}

impl<'a> AstArena<'a> {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
        }
    }

    pub fn alloc(&'a self, kind: NodeKind<'a>, ty: TypeInfo) -> &'a Node<'a> {
        self.nodes.alloc(Node::new(kind, ty))
    }

    /// Literal at the default precision of its kind
    pub fn literal(&'a self, lit: Literal) -> &'a Node<'a> {
        let dtype = DataType::of(lit.kind());
        self.literal_with_precision(lit, dtype.precision)
    }

    pub fn literal_with_precision(&'a self, lit: Literal, precision: u8) -> &'a Node<'a> {
        let dtype = DataType::new(lit.kind(), precision);
        self.alloc(NodeKind::Literal(lit), TypeInfo::scalar(dtype))
    }

    pub fn int(&'a self, value: i64) -> &'a Node<'a> {
        self.literal(Literal::Integer(value))
    }

    pub fn float(&'a self, value: f64) -> &'a Node<'a> {
        self.literal(Literal::Float(value))
    }

    pub fn complex(&'a self, real: f64, imag: f64) -> &'a Node<'a> {
        self.literal(Literal::Complex { real, imag })
    }

    pub fn boolean(&'a self, value: bool) -> &'a Node<'a> {
        self.literal(Literal::Bool(value))
    }

    pub fn string(&'a self, value: impl Into<String>) -> &'a Node<'a> {
        self.literal(Literal::String(value.into()))
    }

    pub fn nil(&'a self) -> &'a Node<'a> {
        self.literal(Literal::Nil)
    }

    pub fn imaginary_unit(&'a self) -> &'a Node<'a> {
        self.literal(Literal::ImaginaryUnit)
    }

    pub fn variable(&'a self, name: impl Into<String>, ty: TypeInfo) -> &'a Node<'a> {
        self.alloc(
            NodeKind::Variable {
                name: name.into(),
                is_optional: false,
            },
            ty,
        )
    }

    /// Variable that may hold the unset sentinel
    pub fn optional_variable(&'a self, name: impl Into<String>, ty: TypeInfo) -> &'a Node<'a> {
        self.alloc(
            NodeKind::Variable {
                name: name.into(),
                is_optional: true,
            },
            ty,
        )
    }

    /// Scalar variable of the given kind at its default precision
    pub fn scalar(&'a self, name: impl Into<String>, kind: DataKind) -> &'a Node<'a> {
        self.variable(name, TypeInfo::scalar(DataType::of(kind)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AstArena<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_default_precisions() {
        let arena = AstArena::new();
        assert_eq!(arena.int(1).dtype(), DataType::integer(4));
        assert_eq!(arena.float(1.0).dtype(), DataType::real(8));
        assert_eq!(arena.complex(1.0, 2.0).dtype(), DataType::complex(8));
        assert_eq!(arena.boolean(true).dtype(), DataType::bool());
        assert_eq!(arena.string("x").dtype(), DataType::string());
        assert_eq!(arena.len(), 5);
    }

    #[test]
    fn test_identity_vs_equal_values() {
        let arena = AstArena::new();
        let a = arena.int(7);
        let b = arena.int(7);
        assert!(Node::same(a, a));
        assert!(!Node::same(a, b));
    }
}
