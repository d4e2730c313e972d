pub mod check;
pub mod collect;
pub mod enrich;

// Re-export command functions for convenience
pub use check::{check, CheckParams};
pub use collect::collect;
pub use enrich::{enrich, Field};
