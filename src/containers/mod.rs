mod keyed_vec;
mod stamp_set;

pub(crate) use keyed_vec::KeyedVec;

pub use keyed_vec::StorageKey;
pub use stamp_set::StampSet;
