pub mod error;
pub mod format;
pub mod generator;
pub mod signature;

pub use error::WrapperError;
pub use generator::{
    ArgConversion, ArgKeywords, Generated, ResultConversion, WrapperGenerator, WrapperSpec,
    KEYWORD_LIST_NAME,
};
pub use signature::{FunctionSignature, Parameter};
