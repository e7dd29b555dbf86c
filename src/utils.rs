mod fatal;
mod increment_u32_id;
mod increment_u64_id;
mod now;

pub(crate) use fatal::fatal;
pub use increment_u32_id::increment_u32_id;
pub use increment_u64_id::increment_u64_id;
pub use now::now;
