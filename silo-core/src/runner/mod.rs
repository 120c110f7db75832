mod delete;
mod insert;
mod script;
mod select;
mod support;
mod update;
mod upsert;

pub use delete::*;
pub use insert::*;
pub use script::*;
pub use select::*;
pub use support::*;
pub use update::*;
pub use upsert::*;
