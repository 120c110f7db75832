mod clock;
mod context;
mod convert;
mod database;
mod dialect;
mod error;
mod executor;
mod expression;
mod metamodel;
mod reactive;
mod registry;
mod row;
mod runner;
mod statement;
mod value;

pub use ::anyhow::Context as ErrorContext;
pub use clock::*;
pub use context::*;
pub use convert::*;
pub use database::*;
pub use dialect::*;
pub use error::*;
pub use executor::*;
pub use expression::*;
pub use metamodel::*;
pub use reactive::*;
pub use registry::*;
pub use row::*;
pub use runner::*;
pub use statement::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
