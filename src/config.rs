use std::{path::PathBuf, time::Duration};

/// Application settings that Rocket's own config doesn't cover
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory uploaded images are stored in
    pub media_root: PathBuf,
    /// How long rendered home page is served from cache
    pub index_cache_ttl: Duration,
}

impl Settings {
    pub fn new(media_root: impl Into<PathBuf>, index_cache_ttl: Duration) -> Self {
        Self {
            media_root: media_root.into(),
            index_cache_ttl,
        }
    }
}
