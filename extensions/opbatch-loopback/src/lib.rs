mod connector;
pub use connector::*;

pub mod error;

mod handle;
pub use handle::*;

mod shared_state;

mod transport;
pub use transport::*;

mod validate;
pub use validate::validate_batch;
