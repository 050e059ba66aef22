mod extendible_hash_table;
mod hash_comparator;
mod hash_fn;

pub use extendible_hash_table::*;
pub use hash_comparator::*;
pub use hash_fn::*;
