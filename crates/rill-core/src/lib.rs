pub mod cast;
pub mod error;
pub mod types;
pub mod value;

pub use cast::*;
pub use error::EngineError;
pub use error::ErrorKind;
pub use types::*;
pub use value::*;
