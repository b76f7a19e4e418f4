//! Per-operation cache options.

use std::time::Duration;

// == Cache Options ==
/// Options accepted by every cache operation.
///
/// | field  | meaning                                     | default |
/// |--------|---------------------------------------------|---------|
/// | `ttl`  | lifetime of the written entry               | none (never expires) |
/// | `size` | caller-declared value size in bytes         | none (measured on `set`) |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    pub ttl: Option<Duration>,
    pub size: Option<usize>,
}

impl CacheOptions {
    /// Options carrying only a TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            size: None,
        }
    }

    /// Sets the declared size.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Keeps a caller-declared size, otherwise uses `measured`.
    pub(crate) fn or_size(mut self, measured: usize) -> Self {
        self.size = self.size.or(Some(measured));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_size_wins_over_measured() {
        let options = CacheOptions::default().size(10).or_size(99);
        assert_eq!(options.size, Some(10));

        let options = CacheOptions::with_ttl(Duration::from_secs(1)).or_size(99);
        assert_eq!(options.size, Some(99));
        assert_eq!(options.ttl, Some(Duration::from_secs(1)));
    }
}
