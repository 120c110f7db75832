mod delete;
mod insert;
mod options;
mod script;
mod select;
mod update;
mod upsert;

pub use delete::*;
pub use insert::*;
pub use options::*;
pub use script::*;
pub use select::*;
pub use update::*;
pub use upsert::*;
