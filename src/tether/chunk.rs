//! Fixed-size partitioning of the work list

use crate::tether::Error;

/// Split `items` into contiguous chunks of at most `chunk_size` elements.
///
/// Input order is preserved and only the last chunk may be short, so chunk
/// membership is fully determined by the (sorted) discovery order.
pub fn partition<T>(items: &[T], chunk_size: usize) -> Result<Vec<&[T]>, Error> {
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize);
    }
    Ok(items.chunks(chunk_size).collect())
}
