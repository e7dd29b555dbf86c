mod caller_interface;
pub use caller_interface::*;

pub mod error;

mod handler_table;
pub use handler_table::*;

mod serve_unary;
pub use serve_unary::*;

mod unary_endpoint;
pub use unary_endpoint::*;

mod unary_response;
pub use unary_response::*;
