pub mod catalog;
pub mod store;

pub use catalog::Catalog;
pub use store::{FileModelStore, ModelStore};

#[cfg(test)]
pub use store::MockModelStore;
