mod binding;
mod builder;
mod cache;
mod config;
mod connection;
mod decode_type;
mod error;
mod executor;
mod field;
mod grammar;
mod join;
mod manager;
mod mapped;
mod mapper;
mod naming;
mod predicate;
mod query_log;
mod session;
mod syntax;
mod table_ref;
mod tag;
mod util;
mod value;

pub use ::anyhow::Context;
pub use binding::*;
pub use builder::*;
pub use cache::*;
pub use config::*;
pub use connection::*;
pub use decode_type::*;
pub use error::*;
pub use executor::*;
pub use field::*;
pub use grammar::*;
pub use join::*;
pub use manager::*;
pub use mapped::*;
pub use mapper::*;
pub use naming::*;
pub use predicate::*;
pub use query_log::*;
pub use session::*;
pub use syntax::*;
pub use table_ref::*;
pub use tag::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
