pub mod config;
pub mod lowering;
pub mod registry;
pub mod wrapper;

pub use config::{ConfigError, RegistryConfig};
pub use lowering::BuiltinLowering;
pub use registry::{Registries, RegistryBuilder};
pub use wrapper::{
    FunctionSignature, Generated, Parameter, WrapperError, WrapperGenerator, WrapperSpec,
};
