use std::path::Path;

/// The platform's media index (the Android media scanner, say).
///
/// Requests are fire-and-forget: completion is reported asynchronously by the
/// platform, if at all, and only ever logged.
pub trait MediaIndexer {
    fn scan(&self, path: &Path);
}

/// Indexer for platforms without a media index; it only logs the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogIndexer;

impl MediaIndexer for LogIndexer {
    fn scan(&self, path: &Path) {
        log::info!("Media index refresh requested for {}", path.display());
    }
}
