pub mod heap;
pub mod utf8;
pub mod value;


pub use heap::{Heap, Object, MAX_OBJ_NUM};
pub use value::{Handle, Value};
