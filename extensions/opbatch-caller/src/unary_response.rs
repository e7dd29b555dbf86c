use opbatch::metadata::MetadataMap;

/// A successful unary call: the decoded response and the metadata the
/// server sent around it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryResponse<T> {
    pub message: T,
    pub initial_metadata: MetadataMap,
    pub trailing_metadata: MetadataMap,
}
