mod metadata_array;
mod metadata_map;

pub use metadata_array::{MetadataArray, MetadataArrayError, MetadataEntry};
pub use metadata_map::MetadataMap;
