use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use crate::constraints::{ContentType, Platform};
use crate::errors::PersistenceError;
use crate::wire::PersistedContent;

/// ========================================
/// Content persistence
/// ========================================
///
/// Narrow outbound boundary. The orchestrator writes each accepted result
/// exactly once, write-behind; downstream favorites/deletion are someone
/// else's job.

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_content(&self, content: PersistedContent) -> Result<Uuid, PersistenceError>;
}

pub fn category_for(platform: Platform, content_type: ContentType) -> String {
    let media = match content_type {
        ContentType::TextOnly => "text",
        ContentType::ImagePost | ContentType::Carousel => "image",
        ContentType::VideoPost | ContentType::Story => "video",
    };
    format!("{}/{}", platform.as_str(), media)
}

#[derive(Default)]
pub struct InMemoryContentStore {
    records: Mutex<HashMap<Uuid, PersistedContent>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<PersistedContent> {
        self.records.lock().get(&id).cloned()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn create_content(&self, content: PersistedContent) -> Result<Uuid, PersistenceError> {
        let id = content.id;
        self.records.lock().insert(id, content);
        Ok(id)
    }
}
