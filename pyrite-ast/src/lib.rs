pub mod arena;
pub mod builtins;
pub mod dtype;
pub mod error;
pub mod node;
pub mod ops;
pub mod shape;

pub use arena::AstArena;
pub use builtins::{construct_builtin, Builtin, BuiltinKind, Construct, Iteration, BUILTINS};
pub use dtype::{promote, DataKind, DataType, Order, Ownership};
pub use error::{ConstructError, ConstructResult};
pub use node::{Aggregate, BinaryOp, ComplexValue, Literal, Node, NodeKind, TypeInfo, UnaryOp};
pub use shape::{Dim, Shape};
