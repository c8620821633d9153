//! Cache lifetime ceiling carried along a redirect chain.

/// Smallest cache lifetime (ms) seen on any redirect so far; unset until the
/// first cacheable redirect. Can only go down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCeiling(Option<u64>);

impl CacheCeiling {
    pub fn unset() -> Self {
        Self(None)
    }

    pub fn get(self) -> Option<u64> {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0.is_some()
    }

    /// Lowers the ceiling to `ttl_ms` if that is smaller (or if unset).
    pub fn lower(&mut self, ttl_ms: u64) {
        self.0 = Some(self.0.map_or(ttl_ms, |c| c.min(ttl_ms)));
    }

    /// `ttl_ms` capped at the ceiling.
    pub fn clamp(self, ttl_ms: u64) -> u64 {
        self.0.map_or(ttl_ms, |c| c.min(ttl_ms))
    }
}
