//! Storage layer: values, tuples, the memory pool, and table heaps

mod pool;
mod table;
mod tuple;

pub use pool::{MemoryPool, PoolHandle};
pub use table::Table;
pub use tuple::{Tuple, Value};
