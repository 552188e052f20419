use crate::Price;

/// Fixed-capacity window over the last `capacity` values.
///
/// Tracks how many of the held values are non-zero, so callers keeping a
/// running sum can snap it back to an exact zero once every non-zero value
/// has been evicted.
#[derive(Clone, Debug)]
pub(crate) struct RingBuffer {
    buffer: Vec<Price>,
    head: usize,
    len: usize,
    capacity: usize,
    non_zero: usize,
}

impl RingBuffer {
    #[must_use]
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            head: 0,
            len: 0,
            capacity,
            non_zero: 0,
        }
    }

    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        self.len == self.capacity
    }

    #[inline]
    pub(crate) fn has_non_zero(&self) -> bool {
        self.non_zero > 0
    }

    /// Appends `value`, returning the evicted oldest value once full.
    #[inline]
    pub(crate) fn push(&mut self, value: Price) -> Option<Price> {
        if value != 0.0 {
            self.non_zero += 1;
        }

        if self.is_ready() {
            let old = self.buffer[self.head];

            self.buffer[self.head] = value;

            self.head += 1;
            if self.head == self.capacity {
                self.head = 0;
            }

            if old != 0.0 {
                self.non_zero -= 1;
            }

            Some(old)
        } else {
            self.buffer[self.len] = value;
            self.len += 1;

            None
        }
    }
}
