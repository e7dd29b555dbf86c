use crate::constants::BINARY_ERROR_DETAILS_KEY;
use crate::metadata::MetadataMap;
use std::collections::TryReserveError;
use std::fmt;

/// A single header as handed to a transport. Both halves borrow the storage
/// of the `MetadataMap` (or status) the array was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataEntry<'a> {
    pub key: &'a str,
    pub value: &'a [u8],
}

#[derive(Debug)]
pub enum MetadataArrayError {
    /// The entry storage for the array could not be reserved.
    AllocationFailed(TryReserveError),
}

impl fmt::Display for MetadataArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataArrayError::AllocationFailed(e) => {
                write!(f, "failed to allocate metadata array: {}", e)
            }
        }
    }
}

impl std::error::Error for MetadataArrayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MetadataArrayError::AllocationFailed(e) => Some(e),
        }
    }
}

impl From<TryReserveError> for MetadataArrayError {
    fn from(e: TryReserveError) -> Self {
        MetadataArrayError::AllocationFailed(e)
    }
}

/// Flattened view of a metadata collection, ready to be attached to a
/// transport operation descriptor.
///
/// The array never copies header bytes. It borrows the source map, so the
/// borrow checker keeps the map alive and unmodified for as long as a
/// descriptor referencing the array exists. An array with zero entries is
/// "absent": transports must read that as no metadata, not as an error.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MetadataArray<'a> {
    entries: Option<Vec<MetadataEntry<'a>>>,
}

impl<'a> MetadataArray<'a> {
    /// Builds the array for `metadata`, appending `optional_error_details`
    /// under `BINARY_ERROR_DETAILS_KEY` when it is non-empty.
    ///
    /// The entry count is `metadata.len() + (details empty ? 0 : 1)`. The
    /// storage is reserved in one step, so an allocation failure leaves no
    /// partially filled array behind.
    pub fn fill(
        metadata: &'a MetadataMap,
        optional_error_details: &'a [u8],
    ) -> Result<Self, MetadataArrayError> {
        let count = metadata.len() + usize::from(!optional_error_details.is_empty());
        if count == 0 {
            return Ok(Self { entries: None });
        }

        let mut entries = Vec::new();
        entries.try_reserve_exact(count)?;

        for (key, value) in metadata.iter() {
            entries.push(MetadataEntry {
                key,
                value: value.as_ref(),
            });
        }

        if !optional_error_details.is_empty() {
            entries.push(MetadataEntry {
                key: BINARY_ERROR_DETAILS_KEY,
                value: optional_error_details,
            });
        }

        Ok(Self {
            entries: Some(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when the builder produced no array at all.
    pub fn is_absent(&self) -> bool {
        self.entries.is_none()
    }

    pub fn entries(&self) -> &[MetadataEntry<'a>] {
        self.entries.as_deref().unwrap_or(&[])
    }

    /// Copies the entries into an owned map. Transports call this when they
    /// need the headers to outlive the `start_batch` call.
    pub fn to_metadata_map(&self) -> MetadataMap {
        self.entries()
            .iter()
            .map(|entry| (entry.key, bytes::Bytes::copy_from_slice(entry.value)))
            .collect()
    }
}
