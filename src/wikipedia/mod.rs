mod client;

pub use client::{WikipediaClient, DEFAULT_THUMBNAIL_SIZE};

use async_trait::async_trait;

/// Best-effort lookup of a representative image for a singer name.
///
/// Implementations must never fail the surrounding operation: any lookup
/// problem resolves to `None`.
#[async_trait]
pub trait SingerImageResolver: Send + Sync {
    /// Returns an image URL for the given name, or `None` if nothing suitable
    /// could be found.
    async fn resolve(&self, name: &str) -> Option<String>;

    /// Pass-through variant: an already known image URL is returned unchanged
    /// without a lookup, otherwise this behaves like [`resolve`](Self::resolve).
    async fn resolve_with_cache(&self, name: &str, existing: Option<String>) -> Option<String> {
        match existing {
            Some(url) => Some(url),
            None => self.resolve(name).await,
        }
    }
}

/// Resolver that never finds an image. Used when image lookups are disabled
/// and in tests.
pub struct NoopImageResolver;

#[async_trait]
impl SingerImageResolver for NoopImageResolver {
    async fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}
