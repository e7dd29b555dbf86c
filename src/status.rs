mod status_code;
mod status_struct;

pub use status_code::StatusCode;
pub use status_struct::Status;
