use crate::error::DsvError;

/// Represents the result of reading an item from the reader.
///
/// - `Ok(Some(item))` when an item was decoded
/// - `Ok(None)` at the end of the stream
/// - `Err(error)` when reading or decoding failed
pub type ItemReaderResult<I> = Result<Option<I>, DsvError>;

/// A trait for reading items one at a time.
pub trait ItemReader<I> {
    /// Reads the next item, or `Ok(None)` once the source is exhausted.
    fn read(&self) -> ItemReaderResult<I>;
}
