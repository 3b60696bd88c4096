//! Template source abstraction

use crate::error::Result;
use crate::templates::types::TemplateRecord;
use async_trait::async_trait;

/// Anything that can enumerate HTML templates under some root
///
/// Implementations recurse arbitrarily deep, skip hidden entries and
/// dependency caches without descending, and skip unreadable entries
/// instead of failing. Only an unreachable root fails the scan.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Enumerate every template under the source root
    async fn scan(&self) -> Result<Vec<TemplateRecord>>;

    /// Human-readable description of the root, for logs
    fn describe(&self) -> String;
}
