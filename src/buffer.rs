//! Growable accumulation buffer for in-flight transfers
//!
//! Body chunks arrive in arbitrary sizes; `ChunkBuffer` accumulates them with
//! an amortized-doubling capacity schedule so a transfer of unknown length
//! costs O(log n) reallocations instead of one per chunk.
//!
//! # Capacity schedule
//!
//! - No storage is reserved until the first append.
//! - The first append reserves 4096 bytes.
//! - Whenever an append would overflow the reservation, it doubles (possibly
//!   several times for one large chunk) before the bytes are copied in.
//! - The reservation therefore is always a power-of-two multiple of 4096,
//!   and after N total bytes it is the smallest `4096 << k >= N`.
//!
//! The peak cost of this scheme is holding up to ~2x the final payload size
//! at the reallocation instant.
//!
//! Each transfer owns its own `ChunkBuffer`; there is no shared accumulator
//! state, so concurrent transfers cannot corrupt one another.

/// Bytes reserved by the first append
const INITIAL_CAPACITY: usize = 4096;

/// Accumulation buffer with an amortized-doubling capacity schedule
///
/// # Examples
///
/// ```
/// use homebrew_dl::buffer::ChunkBuffer;
///
/// let mut buf = ChunkBuffer::new();
/// buf.append(b"hello ");
/// buf.append(b"world");
/// assert_eq!(buf.len(), 11);
/// assert_eq!(buf.capacity(), 4096);
///
/// let payload = buf.take();
/// assert_eq!(payload, b"hello world");
/// assert_eq!(buf.capacity(), 0);
/// ```
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    buf: Vec<u8>,
    /// Reserved bytes in the doubling schedule (0 until the first append)
    reserved: usize,
}

impl ChunkBuffer {
    /// Create an empty buffer; no storage is allocated until the first append
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk, growing the reservation by doubling as needed
    ///
    /// Appending an empty chunk is a no-op and does not trigger the initial
    /// allocation.
    pub fn append(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        if self.reserved == 0 {
            self.reserved = INITIAL_CAPACITY;
        }
        while self.buf.len() + chunk.len() > self.reserved {
            self.reserved <<= 1;
        }
        if self.reserved > self.buf.capacity() {
            self.buf.reserve_exact(self.reserved - self.buf.len());
        }

        self.buf.extend_from_slice(chunk);
        debug_assert!(self.buf.len() <= self.reserved);
    }

    /// Number of bytes accumulated so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if no bytes have been accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current reservation in the doubling schedule, in bytes
    ///
    /// Zero before the first append and after [`take`](Self::take) /
    /// [`reset`](Self::reset).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.reserved
    }

    /// Borrow the accumulated bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Take ownership of the accumulated bytes, leaving the buffer empty
    /// with zero reservation
    pub fn take(&mut self) -> Vec<u8> {
        self.reserved = 0;
        std::mem::take(&mut self.buf)
    }

    /// Discard the accumulated bytes and release the storage
    pub fn reset(&mut self) {
        self.reserved = 0;
        self.buf = Vec::new();
    }
}
