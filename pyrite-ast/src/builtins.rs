//! Builtin constructs and their self-typing constructors.
//!
//! A constructor may replace the call by a folded literal, hand back its
//! operand untouched, rewrite the call into an operator expression or build
//! a dedicated node; [`Construct`] records which of these happened.

use log::{debug, trace};
use serde::Serialize;
use std::fmt;

use crate::arena::AstArena;
use crate::dtype::{promote, DataKind, DataType, Order, Ownership};
use crate::error::{ConstructError, ConstructResult};
use crate::node::{Aggregate, ComplexValue, Literal, Node, NodeKind, TypeInfo};
use crate::ops;
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    Abs,
    Bool,
    Complex,
    Enumerate,
    Float,
    Int,
    Len,
    List,
    Map,
    Max,
    Min,
    Not,
    Print,
    Range,
    Sum,
    Tuple,
    Zip,
    Real,
    Imag,
}

/// Host-language builtin names, sorted by name
pub static BUILTINS: &[(&str, BuiltinKind)] = &[
    ("abs", BuiltinKind::Abs),
    ("bool", BuiltinKind::Bool),
    ("complex", BuiltinKind::Complex),
    ("enumerate", BuiltinKind::Enumerate),
    ("float", BuiltinKind::Float),
    ("imag", BuiltinKind::Imag),
    ("int", BuiltinKind::Int),
    ("len", BuiltinKind::Len),
    ("list", BuiltinKind::List),
    ("map", BuiltinKind::Map),
    ("max", BuiltinKind::Max),
    ("min", BuiltinKind::Min),
    ("not", BuiltinKind::Not),
    ("print", BuiltinKind::Print),
    ("range", BuiltinKind::Range),
    ("real", BuiltinKind::Real),
    ("sum", BuiltinKind::Sum),
    ("tuple", BuiltinKind::Tuple),
    ("zip", BuiltinKind::Zip),
];

impl BuiltinKind {
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS
            .binary_search_by(|(n, _)| (*n).cmp(name))
            .ok()
            .map(|i| BUILTINS[i].1)
    }

    pub fn name(&self) -> &'static str {
        BUILTINS
            .iter()
            .find(|(_, kind)| kind == self)
            .map_or("<builtin>", |(name, _)| name)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        BUILTINS.iter().map(|(name, _)| *name)
    }

    /// Builtins that cast a value to a dtype (`bool`, `complex`, `float`, `int`)
    pub fn datatype_cast(name: &str) -> Option<Self> {
        Self::from_name(name).filter(|kind| kind.cast_target().is_some())
    }

    pub fn cast_target(&self) -> Option<DataKind> {
        match self {
            BuiltinKind::Bool => Some(DataKind::Bool),
            BuiltinKind::Complex => Some(DataKind::Complex),
            BuiltinKind::Float => Some(DataKind::Real),
            BuiltinKind::Int => Some(DataKind::Integer),
            _ => None,
        }
    }

    /// Builtins producing a loop descriptor rather than a value
    pub fn is_iteration(&self) -> bool {
        matches!(
            self,
            BuiltinKind::Range | BuiltinKind::Zip | BuiltinKind::Enumerate | BuiltinKind::Map
        )
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a value-producing builtin constructor
#[derive(Debug, Clone, Copy)]
pub enum Construct<'a> {
    /// A literal replaced the call
    Folded(&'a Node<'a>),
    /// The operand itself is the result
    Passthrough(&'a Node<'a>),
    /// An operator expression replaced the call
    Rewritten(&'a Node<'a>),
    Built(&'a Node<'a>),
}

impl<'a> Construct<'a> {
    pub fn node(&self) -> &'a Node<'a> {
        match *self {
            Construct::Folded(n)
            | Construct::Passthrough(n)
            | Construct::Rewritten(n)
            | Construct::Built(n) => n,
        }
    }

    pub fn is_folded(&self) -> bool {
        matches!(self, Construct::Folded(_))
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Construct::Passthrough(_))
    }
}

/// Loop descriptors; they have no dtype of their own
#[derive(Debug, Clone)]
pub enum Iteration<'a> {
    Range {
        start: &'a Node<'a>,
        stop: &'a Node<'a>,
        step: &'a Node<'a>,
    },
    Zip(Vec<&'a Node<'a>>),
    Enumerate(&'a Node<'a>),
    Map {
        function: &'a Node<'a>,
        iterables: Vec<&'a Node<'a>>,
    },
}

#[derive(Debug, Clone)]
pub enum Builtin<'a> {
    Value(Construct<'a>),
    Iteration(Iteration<'a>),
}

impl<'a> Builtin<'a> {
    pub fn value(&self) -> Option<&'a Node<'a>> {
        match self {
            Builtin::Value(construct) => Some(construct.node()),
            Builtin::Iteration(_) => None,
        }
    }

    pub fn iteration(&self) -> Option<&Iteration<'a>> {
        match self {
            Builtin::Iteration(iteration) => Some(iteration),
            Builtin::Value(_) => None,
        }
    }
}

fn expect_arity(
    kind: BuiltinKind,
    found: usize,
    min: usize,
    max: Option<usize>,
    expected: &'static str,
) -> ConstructResult<()> {
    if found < min || max.is_some_and(|max| found > max) {
        return Err(ConstructError::Arity {
            builtin: kind.name(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Construct the builtin `kind` applied to `args`
pub fn construct_builtin<'a>(
    arena: &'a AstArena<'a>,
    kind: BuiltinKind,
    args: &[&'a Node<'a>],
) -> ConstructResult<Builtin<'a>> {
    use BuiltinKind as B;

    match kind {
        B::Tuple | B::List | B::Print | B::Range | B::Zip | B::Map => {}
        B::Complex => expect_arity(kind, args.len(), 1, Some(2), "1 or 2")?,
        _ => expect_arity(kind, args.len(), 1, Some(1), "1")?,
    }

    let value = match kind {
        B::Abs => abs(arena, args[0]),
        B::Bool => bool_(arena, args[0]),
        B::Complex => complex(arena, args[0], args.get(1).copied())?,
        B::Float => float(arena, args[0]),
        B::Int => int(arena, args[0])?,
        B::Len => len(arena, args[0]),
        B::List => list(arena, args)?,
        B::Tuple => tuple(arena, args)?,
        B::Max => max(arena, args[0])?,
        B::Min => min(arena, args[0])?,
        B::Sum => sum(arena, args[0])?,
        B::Not => Construct::Rewritten(ops::not(arena, args[0])),
        B::Print => print(arena, args),
        B::Real => real(arena, args[0]),
        B::Imag => imag(arena, args[0])?,
        B::Range => return range(arena, args).map(Builtin::Iteration),
        B::Zip => return zip(args).map(Builtin::Iteration),
        B::Enumerate => return Ok(Builtin::Iteration(enumerate(args[0]))),
        B::Map => return map(args).map(Builtin::Iteration),
    };
    Ok(Builtin::Value(value))
}

// ---------------------------------------------------------------------------
// complex parts

/// `x.real`; a non-complex value is its own real part
pub fn real<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> Construct<'a> {
    if !x.dtype().is_complex() {
        trace!("real part of {} elided", x);
        return Construct::Passthrough(x);
    }
    Construct::Built(arena.alloc(
        NodeKind::Real(x),
        TypeInfo::scalar(DataType::real(x.precision())),
    ))
}

/// `x.imag`; a non-complex value has a zero imaginary part of its own dtype
pub fn imag<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> ConstructResult<Construct<'a>> {
    if x.dtype().is_complex() {
        return Ok(Construct::Built(arena.alloc(
            NodeKind::Imag(x),
            TypeInfo::scalar(DataType::real(x.precision())),
        )));
    }
    let zero = Literal::zero_of(x.data_kind()).ok_or(ConstructError::UnknownOperand {
        builtin: "imag",
        dtype: x.dtype(),
    })?;
    Ok(Construct::Folded(
        arena.literal_with_precision(zero, x.precision()),
    ))
}

// ---------------------------------------------------------------------------
// dtype casts

/// `bool(x)`; an optional operand is tested against the unset sentinel first
pub fn bool_<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> Construct<'a> {
    let test = arena.alloc(NodeKind::Bool(x), TypeInfo::scalar(DataType::bool()));
    if x.is_optional() {
        let guard = ops::is_not(arena, x, arena.nil());
        debug!("guarding bool({}) against None", x);
        return Construct::Rewritten(ops::and(arena, guard, test));
    }
    Construct::Built(test)
}

pub fn int<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> ConstructResult<Construct<'a>> {
    let target = DataType::of(DataKind::Integer);
    let folded = match x.as_literal() {
        Some(Literal::Integer(v)) => Some(integer_in_range(*v as f64, target.precision)),
        Some(Literal::Float(v)) => Some(integer_in_range(v.trunc(), target.precision)),
        _ => None,
    };
    match folded {
        Some(Some(v)) => {
            debug!("folded int({}) into {}", x, v);
            Ok(Construct::Folded(
                arena.literal_with_precision(Literal::Integer(v), target.precision),
            ))
        }
        Some(None) => Err(ConstructError::InvalidLiteral {
            builtin: "int",
            literal: x.to_string(),
        }),
        None => Ok(Construct::Built(
            arena.alloc(NodeKind::Int(x), TypeInfo::scalar(target)),
        )),
    }
}

/// `v` as an integer of `precision` bytes, if it is finite and representable
fn integer_in_range(v: f64, precision: u8) -> Option<i64> {
    let bits = (u32::from(precision) * 8).clamp(8, 64);
    let bound = (1i128 << (bits - 1)) as f64;
    (v.is_finite() && v >= -bound && v < bound).then(|| v as i64)
}

pub fn float<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> Construct<'a> {
    let target = DataType::of(DataKind::Real);
    let folded = match x.as_literal() {
        Some(Literal::Integer(v)) => Some(*v as f64),
        Some(Literal::Float(v)) => Some(*v),
        _ => None,
    };
    if let Some(v) = folded {
        debug!("folded float({}) into {:?}", x, v);
        return Construct::Folded(arena.literal_with_precision(Literal::Float(v), target.precision));
    }
    Construct::Built(arena.alloc(NodeKind::Float(x), TypeInfo::scalar(target)))
}

/// `complex(arg0, arg1)`, with `arg1` defaulting to the literal `0.0`
pub fn complex<'a>(
    arena: &'a AstArena<'a>,
    arg0: &'a Node<'a>,
    arg1: Option<&'a Node<'a>>,
) -> ConstructResult<Construct<'a>> {
    let arg1 = arg1.unwrap_or_else(|| arena.float(0.0));
    let target = DataType::of(DataKind::Complex);

    if let (Some(lit0), Some(lit1)) = (arg0.as_literal(), arg1.as_literal()) {
        let parts = |lit: &Literal| {
            lit.as_complex().ok_or_else(|| ConstructError::InvalidLiteral {
                builtin: "complex",
                literal: lit.to_string(),
            })
        };
        let (re0, im0) = parts(lit0)?;
        let (re1, im1) = parts(lit1)?;
        // arg1 is scaled by the imaginary unit before it is added
        let real = re0 - im1;
        let imag = im0 + re1;
        debug!("folded complex({}, {}) into ({}, {})", arg0, arg1, real, imag);
        return Ok(Construct::Folded(arena.literal_with_precision(
            Literal::Complex { real, imag },
            target.precision,
        )));
    }

    let complex0 = arg0.dtype().is_complex();
    let complex1 = arg1.dtype().is_complex();

    if complex0 && complex1 {
        let scaled = ops::mul(arena, arg1, arena.imaginary_unit());
        return Ok(Construct::Rewritten(ops::add(arena, arg0, scaled)));
    }

    let value = if complex0 && arg1.is_literal_zero() {
        ComplexValue::cast(
            real(arena, arg0).node(),
            imag(arena, arg0)?.node(),
            arg0,
        )
    } else if complex0 {
        let imag_part = ops::add(arena, imag(arena, arg0)?.node(), arg1);
        ComplexValue::assembled(real(arena, arg0).node(), imag_part)
    } else if complex1 {
        let imag1 = imag(arena, arg1)?.node();
        let real_part = if arg0.is_literal_zero() {
            ops::neg(arena, imag1)
        } else {
            ops::sub(arena, arg0, imag1)
        };
        ComplexValue::assembled(real_part, real(arena, arg1).node())
    } else {
        ComplexValue::assembled(arg0, arg1)
    };

    Ok(Construct::Built(arena.alloc(
        NodeKind::Complex(value),
        TypeInfo::scalar(target),
    )))
}

// ---------------------------------------------------------------------------
// aggregates

fn aggregate_type(elements: &[&Node<'_>]) -> ConstructResult<(TypeInfo, bool, bool)> {
    let Some(first) = elements.first() else {
        return Ok((TypeInfo::untyped(), false, false));
    };
    let count = elements.len();
    let max_rank = elements.iter().map(|e| e.rank()).max().unwrap_or(0);

    let is_homogeneous = elements.iter().all(|e| {
        !e.dtype().is_generic()
            && e.data_kind() == first.data_kind()
            && e.rank() == first.rank()
            && e.order() == first.order()
    });
    let inconsistent_shape = elements.iter().any(|e| e.shape() != first.shape());

    if !is_homogeneous {
        let ty = TypeInfo {
            dtype: DataType::generic(),
            rank: max_rank + 1,
            shape: first.shape().prepend(count),
            order: Order::RowMajor,
            ownership: Ownership::Owned,
        };
        return Ok((ty, false, inconsistent_shape));
    }

    if elements.iter().any(|e| e.data_kind() == DataKind::String) {
        return Ok((TypeInfo::scalar(DataType::string()), true, inconsistent_shape));
    }

    let kind = promote(elements.iter().map(|e| e.data_kind())).ok_or(
        ConstructError::UndeterminedDtype {
            dtype: first.dtype(),
            count,
        },
    )?;
    let precision = elements
        .iter()
        .filter(|e| e.data_kind() == kind)
        .map(|e| e.precision())
        .max()
        .unwrap_or_else(|| kind.default_precision());

    let all_known = elements.iter().all(|e| e.shape().is_known());
    let (rank, shape) = if all_known {
        let shape = first.shape().prepend(count);
        (shape.dims().map_or(max_rank + 1, |d| d.len()), shape)
    } else {
        (max_rank + 1, Shape::Unknown)
    };

    let ty = TypeInfo {
        dtype: DataType::new(kind, precision),
        rank,
        shape,
        order: Order::RowMajor,
        ownership: Ownership::Owned,
    };
    Ok((ty, true, inconsistent_shape))
}

fn aggregate<'a>(
    arena: &'a AstArena<'a>,
    elements: &[&'a Node<'a>],
    make: fn(Aggregate<'a>) -> NodeKind<'a>,
) -> ConstructResult<Construct<'a>> {
    let (ty, is_homogeneous, inconsistent_shape) = aggregate_type(elements)?;
    trace!(
        "aggregate of {} element(s): {} rank {} homogeneous={}",
        elements.len(),
        ty.dtype,
        ty.rank,
        is_homogeneous
    );
    let agg = Aggregate {
        elements: elements.to_vec(),
        is_homogeneous,
        inconsistent_shape,
    };
    Ok(Construct::Built(arena.alloc(make(agg), ty)))
}

pub fn tuple<'a>(
    arena: &'a AstArena<'a>,
    elements: &[&'a Node<'a>],
) -> ConstructResult<Construct<'a>> {
    aggregate(arena, elements, NodeKind::Tuple)
}

pub fn list<'a>(
    arena: &'a AstArena<'a>,
    elements: &[&'a Node<'a>],
) -> ConstructResult<Construct<'a>> {
    aggregate(arena, elements, NodeKind::List)
}

// ---------------------------------------------------------------------------
// queries and reductions

pub fn len<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> Construct<'a> {
    Construct::Built(arena.alloc(
        NodeKind::Len(x),
        TypeInfo::scalar(DataType::of(DataKind::Integer)),
    ))
}

pub fn abs<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> Construct<'a> {
    let kind = if x.data_kind() == DataKind::Integer {
        DataKind::Integer
    } else {
        DataKind::Real
    };
    let ty = TypeInfo {
        dtype: DataType::of(kind),
        rank: x.rank(),
        shape: x.shape().clone(),
        order: x.order(),
        ownership: Ownership::Owned,
    };
    Construct::Built(arena.alloc(NodeKind::Abs(x), ty))
}

fn reduction<'a>(
    arena: &'a AstArena<'a>,
    builtin: &'static str,
    x: &'a Node<'a>,
    make: fn(&'a Node<'a>) -> NodeKind<'a>,
) -> ConstructResult<Construct<'a>> {
    if x.rank() == 0 || !x.data_kind().is_numeric() {
        return Err(ConstructError::UnknownOperand {
            builtin,
            dtype: x.dtype(),
        });
    }
    Ok(Construct::Built(
        arena.alloc(make(x), TypeInfo::scalar(x.dtype())),
    ))
}

pub fn sum<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> ConstructResult<Construct<'a>> {
    reduction(arena, "sum", x, NodeKind::Sum)
}

pub fn max<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> ConstructResult<Construct<'a>> {
    reduction(arena, "max", x, NodeKind::Max)
}

pub fn min<'a>(arena: &'a AstArena<'a>, x: &'a Node<'a>) -> ConstructResult<Construct<'a>> {
    reduction(arena, "min", x, NodeKind::Min)
}

pub fn print<'a>(arena: &'a AstArena<'a>, args: &[&'a Node<'a>]) -> Construct<'a> {
    Construct::Built(arena.alloc(
        NodeKind::Print(args.to_vec()),
        TypeInfo::scalar(DataType::void()),
    ))
}

// ---------------------------------------------------------------------------
// loop descriptors

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`
pub fn range<'a>(arena: &'a AstArena<'a>, args: &[&'a Node<'a>]) -> ConstructResult<Iteration<'a>> {
    let (start, stop, step) = match *args {
        [stop] => (arena.int(0), stop, arena.int(1)),
        [start, stop] => (start, stop, arena.int(1)),
        [start, stop, step] => (start, stop, step),
        _ => {
            return Err(ConstructError::Arity {
                builtin: "range",
                expected: "1 to 3",
                found: args.len(),
            })
        }
    };
    Ok(Iteration::Range { start, stop, step })
}

pub fn zip<'a>(args: &[&'a Node<'a>]) -> ConstructResult<Iteration<'a>> {
    expect_arity(BuiltinKind::Zip, args.len(), 2, None, "at least 2")?;
    Ok(Iteration::Zip(args.to_vec()))
}

pub fn enumerate<'a>(iterable: &'a Node<'a>) -> Iteration<'a> {
    Iteration::Enumerate(iterable)
}

/// `map(function, iterable, ...)`
pub fn map<'a>(args: &[&'a Node<'a>]) -> ConstructResult<Iteration<'a>> {
    expect_arity(BuiltinKind::Map, args.len(), 2, None, "at least 2")?;
    Ok(Iteration::Map {
        function: args[0],
        iterables: args[1..].to_vec(),
    })
}
