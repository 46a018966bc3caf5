//! Attribute values, characteristics and per-character stores.

mod characteristic;
mod overlay;
mod store;
mod value;

pub use characteristic::*;
pub use overlay::*;
pub use store::*;
pub use value::*;
