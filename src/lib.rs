#![deny(rust_2018_idioms)]

pub mod reconcile;
pub use reconcile::function::{process, reconcile};

pub mod assemble;
pub mod date;
pub mod history;
pub mod join;
pub mod sanitize;
pub mod table;
pub mod value;

pub use value::{RawRecord, Value};
