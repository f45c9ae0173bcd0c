use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of one array dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    Fixed(usize),
    /// Size only known at run time, named by the expression that computes it
    Symbolic(String),
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{}", n),
            Dim::Symbolic(name) => f.write_str(name),
        }
    }
}

/// Shape of a value: unknown, or one size per dimension (empty for scalars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Unknown,
    Known(Vec<Dim>),
}

impl Shape {
    pub fn scalar() -> Self {
        Shape::Known(Vec::new())
    }

    pub fn fixed(sizes: &[usize]) -> Self {
        Shape::Known(sizes.iter().map(|&n| Dim::Fixed(n)).collect())
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Shape::Known(_))
    }

    pub fn dims(&self) -> Option<&[Dim]> {
        match self {
            Shape::Known(dims) => Some(dims),
            Shape::Unknown => None,
        }
    }

    /// `(count,)` followed by this shape; stays unknown when this shape is unknown
    pub fn prepend(&self, count: usize) -> Shape {
        match self {
            Shape::Known(dims) => {
                let mut out = Vec::with_capacity(dims.len() + 1);
                out.push(Dim::Fixed(count));
                out.extend(dims.iter().cloned());
                Shape::Known(out)
            }
            Shape::Unknown => Shape::Unknown,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Unknown => f.write_str("(?)"),
            Shape::Known(dims) => {
                f.write_str("(")?;
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", dim)?;
                }
                if dims.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}
