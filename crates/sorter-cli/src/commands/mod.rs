//! Command implementations.

pub mod ask;
pub mod extract;
pub mod run;

pub use self::ask::execute_ask;
pub use self::extract::execute_extract;
pub use self::run::execute_run;
