use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// A buffer could not be reserved; the caller may retry with a smaller batch
    Allocation {
        /// Which buffer was being sized
        what: &'static str,
        /// Requested number of elements
        len: usize,
    },
    /// An input array is not aligned with the anchors
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A predecessor link that does not point backwards
    InvalidPredecessor { index: usize, predecessor: i32 },
    /// A predecessor link between anchors of different read pairs
    MixedReadPair { index: usize, predecessor: i32 },
    /// More anchors than a `u32` anchor index can address
    TooManyAnchors { len: usize },
    /// The worker pool could not be started
    ThreadPool(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Allocation { what, len } => {
                write!(f, "Allocation error: cannot reserve {} elements for {}", len, what)
            }
            ChainError::LengthMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "Length mismatch: {} has {} entries, expected {}",
                what, actual, expected
            ),
            ChainError::InvalidPredecessor { index, predecessor } => write!(
                f,
                "Invalid predecessor {} for anchor {}: must be -1 or a lower index",
                predecessor, index
            ),
            ChainError::MixedReadPair { index, predecessor } => write!(
                f,
                "Mixed read pairs: anchor {} links to anchor {} of another read pair",
                index, predecessor
            ),
            ChainError::TooManyAnchors { len } => write!(
                f,
                "Too many anchors: {} exceeds the limit of {}",
                len,
                u32::MAX
            ),
            ChainError::ThreadPool(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<rayon::ThreadPoolBuildError> for ChainError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        ChainError::ThreadPool(e.to_string())
    }
}

/// Reserves exactly `len` elements, mapping exhaustion to [`ChainError::Allocation`].
pub(crate) fn try_alloc<T>(what: &'static str, len: usize) -> Result<Vec<T>, ChainError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ChainError::Allocation { what, len })?;
    Ok(buf)
}
