//! In-memory registry of downloaded media blobs.
//!
//! Each blob is addressed by an [`ObjectUrl`] that stays valid until it is
//! revoked, mirroring browser object URLs.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const URL_PREFIX: &str = "blob:story-studio/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Clone, Default)]
pub struct MediaStore {
    blobs: Arc<Mutex<HashMap<ObjectUrl, MediaBlob>>>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_object_url(&self, bytes: Vec<u8>, mime_type: &str) -> ObjectUrl {
        let url = ObjectUrl(format!("{}{}", URL_PREFIX, Uuid::new_v4()));
        tracing::debug!("Registered {} ({} bytes, {})", url, bytes.len(), mime_type);
        self.blobs.lock().unwrap().insert(
            url.clone(),
            MediaBlob {
                mime_type: mime_type.to_string(),
                bytes: Arc::new(bytes),
            },
        );
        url
    }

    pub fn get(&self, url: &ObjectUrl) -> Option<MediaBlob> {
        self.blobs.lock().unwrap().get(url).cloned()
    }

    /// Returns whether the URL was still live.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        let removed = self.blobs.lock().unwrap().remove(url).is_some();
        if removed {
            tracing::debug!("Revoked {}", url);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_revoke() {
        let store = MediaStore::new();
        let url = store.create_object_url(vec![1, 2, 3], "video/mp4");

        assert!(url.as_str().starts_with(URL_PREFIX));
        let blob = store.get(&url).unwrap();
        assert_eq!(blob.mime_type, "video/mp4");
        assert_eq!(*blob.bytes, vec![1, 2, 3]);

        assert!(store.revoke(&url));
        assert!(store.get(&url).is_none());
        assert!(!store.revoke(&url));
        assert!(store.is_empty());
    }

    #[test]
    fn test_urls_are_unique() {
        let store = MediaStore::new();
        let a = store.create_object_url(vec![], "video/mp4");
        let b = store.create_object_url(vec![], "video/mp4");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }
}
