pub type TrackId = u64;

/// Issues track identities for one tracker instance. Identities grow
/// strictly and are never handed out twice; once `u64::MAX` was issued the
/// allocator is exhausted.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Option<TrackId>,
}

impl IdAllocator {
    pub fn new(first: TrackId) -> Self {
        Self { next: Some(first) }
    }

    /// Next identity, `None` when the id space is used up.
    pub fn next(&mut self) -> Option<TrackId> {
        let id = self.next?;
        self.next = id.checked_add(1);

        Some(id)
    }

    #[inline]
    pub fn peek(&self) -> Option<TrackId> {
        self.next
    }

    /// Identities that can still be issued
    pub fn remaining(&self) -> u64 {
        match self.next {
            Some(next) => (u64::MAX - next).saturating_add(1),
            None => 0,
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}
