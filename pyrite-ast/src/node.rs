use serde::Serialize;
use std::fmt;

use crate::dtype::{DataKind, DataType, Order, Ownership};
use crate::shape::Shape;

/// Typing facts carried by every node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeInfo {
    pub dtype: DataType,
    pub rank: usize,
    pub shape: Shape,
    pub order: Order,
    pub ownership: Ownership,
}

impl TypeInfo {
    pub fn scalar(dtype: DataType) -> Self {
        Self {
            dtype,
            rank: 0,
            shape: Shape::scalar(),
            order: Order::RowMajor,
            ownership: Ownership::Owned,
        }
    }

    /// Array with a known shape; rank is the number of dimensions
    pub fn array(dtype: DataType, shape: Shape, order: Order) -> Self {
        let rank = shape.dims().map_or(0, |dims| dims.len());
        Self {
            dtype,
            rank,
            shape,
            order,
            ownership: Ownership::Owned,
        }
    }

    pub fn with_unknown_shape(dtype: DataType, rank: usize, order: Order) -> Self {
        Self {
            dtype,
            rank,
            shape: Shape::Unknown,
            order,
            ownership: Ownership::Owned,
        }
    }

    /// Placeholder for values typed at their point of use (empty aggregates)
    pub fn untyped() -> Self {
        Self::with_unknown_shape(DataType::generic(), 0, Order::RowMajor)
    }

    pub fn aliased(mut self) -> Self {
        self.ownership = Ownership::Alias;
        self
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Complex { real: f64, imag: f64 },
    Bool(bool),
    String(String),
    ImaginaryUnit,
    /// The unset sentinel of optional values
    Nil,
}

impl Literal {
    pub fn kind(&self) -> DataKind {
        match self {
            Literal::Integer(_) => DataKind::Integer,
            Literal::Float(_) => DataKind::Real,
            Literal::Complex { .. } | Literal::ImaginaryUnit => DataKind::Complex,
            Literal::Bool(_) => DataKind::Bool,
            Literal::String(_) => DataKind::String,
            Literal::Nil => DataKind::Void,
        }
    }

    /// Value of a real-valued literal (Integer, Float, Bool)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Integer(v) => Some(*v as f64),
            Literal::Float(v) => Some(*v),
            Literal::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Real and imaginary parts of any numeric literal
    pub fn as_complex(&self) -> Option<(f64, f64)> {
        match self {
            Literal::Complex { real, imag } => Some((*real, *imag)),
            Literal::ImaginaryUnit => Some((0.0, 1.0)),
            other => other.as_f64().map(|v| (v, 0.0)),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_complex() == Some((0.0, 0.0))
    }

    /// Real part as a Float sub-literal
    pub fn real_part(&self) -> Option<Literal> {
        self.as_complex().map(|(re, _)| Literal::Float(re))
    }

    /// Imaginary part as a Float sub-literal
    pub fn imag_part(&self) -> Option<Literal> {
        self.as_complex().map(|(_, im)| Literal::Float(im))
    }

    /// The zero value of a kind
    pub fn zero_of(kind: DataKind) -> Option<Literal> {
        match kind {
            DataKind::Integer => Some(Literal::Integer(0)),
            DataKind::Real => Some(Literal::Float(0.0)),
            DataKind::Complex => Some(Literal::Complex {
                real: 0.0,
                imag: 0.0,
            }),
            DataKind::Bool => Some(Literal::Bool(false)),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Complex { real, imag } => write!(f, "({:?}{:+?}j)", real, imag),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::ImaginaryUnit => f.write_str("1j"),
            Literal::Nil => f.write_str("None"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Short-circuit: the right operand is only evaluated when the left is true
    And,
    IsNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A complex value assembled from two parts, or a cast of an existing complex
#[derive(Debug, Clone, Serialize)]
pub struct ComplexValue<'a> {
    pub real: &'a Node<'a>,
    pub imag: &'a Node<'a>,
    pub is_cast: bool,
    internal: Option<&'a Node<'a>>,
}

impl<'a> ComplexValue<'a> {
    pub(crate) fn assembled(real: &'a Node<'a>, imag: &'a Node<'a>) -> Self {
        Self {
            real,
            imag,
            is_cast: false,
            internal: None,
        }
    }

    pub(crate) fn cast(real: &'a Node<'a>, imag: &'a Node<'a>, operand: &'a Node<'a>) -> Self {
        Self {
            real,
            imag,
            is_cast: true,
            internal: Some(operand),
        }
    }

    /// The operand being reinterpreted; only set for casts
    pub fn internal_var(&self) -> Option<&'a Node<'a>> {
        self.internal
    }
}

/// Elements of a tuple or list
#[derive(Debug, Clone, Serialize)]
pub struct Aggregate<'a> {
    pub elements: Vec<&'a Node<'a>>,
    pub is_homogeneous: bool,
    /// Element shapes differ although the dtypes agree
    pub inconsistent_shape: bool,
}

#[derive(Debug, Clone, Serialize)]
pub enum NodeKind<'a> {
    Literal(Literal),
    Variable { name: String, is_optional: bool },
    Unary { op: UnaryOp, operand: &'a Node<'a> },
    Binary { op: BinaryOp, left: &'a Node<'a>, right: &'a Node<'a> },

    Real(&'a Node<'a>),
    Imag(&'a Node<'a>),
    Bool(&'a Node<'a>),
    Int(&'a Node<'a>),
    Float(&'a Node<'a>),
    Complex(ComplexValue<'a>),

    Tuple(Aggregate<'a>),
    List(Aggregate<'a>),

    Len(&'a Node<'a>),
    Abs(&'a Node<'a>),
    Sum(&'a Node<'a>),
    Max(&'a Node<'a>),
    Min(&'a Node<'a>),
    Print(Vec<&'a Node<'a>>),
}

/// A typed AST value
///
/// Nodes live in an [`AstArena`](crate::AstArena) and are only handed out
/// as shared references, so their typing never changes after construction.
#[derive(Debug, Serialize)]
pub struct Node<'a> {
    kind: NodeKind<'a>,
    ty: TypeInfo,
}

impl<'a> Node<'a> {
    pub(crate) fn new(kind: NodeKind<'a>, ty: TypeInfo) -> Self {
        Self { kind, ty }
    }

    pub fn kind(&self) -> &NodeKind<'a> {
        &self.kind
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.ty
    }

    pub fn dtype(&self) -> DataType {
        self.ty.dtype
    }

    pub fn data_kind(&self) -> DataKind {
        self.ty.dtype.kind
    }

    pub fn precision(&self) -> u8 {
        self.ty.dtype.precision
    }

    pub fn rank(&self) -> usize {
        self.ty.rank
    }

    pub fn shape(&self) -> &Shape {
        &self.ty.shape
    }

    pub fn order(&self) -> Order {
        self.ty.order
    }

    pub fn ownership(&self) -> Ownership {
        self.ty.ownership
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            NodeKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.as_literal().is_some()
    }

    /// Literal whose value compares equal to zero
    pub fn is_literal_zero(&self) -> bool {
        self.as_literal().is_some_and(Literal::is_zero)
    }

    pub fn is_optional(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Variable {
                is_optional: true,
                ..
            }
        )
    }

    /// False only for empty aggregates, whose typing is deferred
    pub fn is_typed(&self) -> bool {
        match &self.kind {
            NodeKind::Tuple(agg) | NodeKind::List(agg) => !agg.elements.is_empty(),
            _ => true,
        }
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate<'a>> {
        match &self.kind {
            NodeKind::Tuple(agg) | NodeKind::List(agg) => Some(agg),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexValue<'a>> {
        match &self.kind {
            NodeKind::Complex(value) => Some(value),
            _ => None,
        }
    }

    /// Node identity, as opposed to structural equality
    pub fn same(a: &Node<'a>, b: &Node<'a>) -> bool {
        std::ptr::eq(a, b)
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, items: &[&Node<'_>]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match &self.kind {
            NodeKind::Literal(lit) => write!(f, "{}", lit),
            NodeKind::Variable { name, .. } => f.write_str(name),
            NodeKind::Unary { op: UnaryOp::Neg, operand } => write!(f, "(-{})", operand),
            NodeKind::Unary { op: UnaryOp::Not, operand } => write!(f, "(not {})", operand),
            NodeKind::Binary { op, left, right } => {
                let symbol = match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::And => "and",
                    BinaryOp::IsNot => "is not",
                };
                write!(f, "({} {} {})", left, symbol, right)
            }
            NodeKind::Real(x) => write!(f, "{}.real", x),
            NodeKind::Imag(x) => write!(f, "{}.imag", x),
            NodeKind::Bool(x) => write!(f, "bool({})", x),
            NodeKind::Int(x) => write!(f, "int({})", x),
            NodeKind::Float(x) => write!(f, "float({})", x),
            NodeKind::Complex(c) => write!(f, "complex({}, {})", c.real, c.imag),
            NodeKind::Tuple(agg) => {
                f.write_str("(")?;
                list(f, &agg.elements)?;
                f.write_str(")")
            }
            NodeKind::List(agg) => {
                f.write_str("[")?;
                list(f, &agg.elements)?;
                f.write_str("]")
            }
            NodeKind::Len(x) => write!(f, "len({})", x),
            NodeKind::Abs(x) => write!(f, "abs({})", x),
            NodeKind::Sum(x) => write!(f, "sum({})", x),
            NodeKind::Max(x) => write!(f, "max({})", x),
            NodeKind::Min(x) => write!(f, "min({})", x),
            NodeKind::Print(args) => {
                f.write_str("print(")?;
                list(f, args)?;
                f.write_str(")")
            }
        }
    }
}
