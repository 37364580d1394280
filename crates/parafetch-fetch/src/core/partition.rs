use crate::data::ChunkSpec;
use crate::error::{Error, Result};

/// Split `total_len` bytes into at most `workers` contiguous inclusive ranges.
///
/// Every range has `ceil(total_len / workers)` bytes except the last, which is
/// clamped to `total_len - 1`. When `workers >= total_len` each range is a
/// single byte. Trailing ranges that would start past the end are dropped, so
/// the returned indices are always `0..len` and no range is empty.
///
/// An empty resource yields an empty plan.
///
/// # Examples
///
/// ```
/// use parafetch_fetch::core::partition;
///
/// let specs = partition(1000, 4).unwrap();
/// let bounds: Vec<_> = specs.iter().map(|s| (s.start, s.end)).collect();
/// assert_eq!(bounds, [(0, 249), (250, 499), (500, 749), (750, 999)]);
/// ```
pub fn partition(total_len: u64, workers: u32) -> Result<Vec<ChunkSpec>> {
    if workers == 0 {
        return Err(Error::InvalidWorkerCount);
    }
    if total_len == 0 {
        return Ok(Vec::new());
    }

    // div_ceil is already 1 when workers >= total_len
    let chunk_size = total_len.div_ceil(u64::from(workers));
    let last = total_len - 1;

    let specs = (0..workers)
        .map_while(|index| {
            let start = u64::from(index).checked_mul(chunk_size)?;
            (start <= last).then(|| ChunkSpec {
                index,
                start,
                end: start.saturating_add(chunk_size - 1).min(last),
            })
        })
        .collect();

    Ok(specs)
}
