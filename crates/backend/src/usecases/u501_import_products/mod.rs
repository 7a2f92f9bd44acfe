pub mod error;
pub mod executor;
pub mod parser;

pub use error::ImportError;
pub use executor::ImportExecutor;
