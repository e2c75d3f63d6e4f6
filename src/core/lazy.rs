//! core::lazy
//!
//! Per-course cache of lazily rendered lessons.
//!
//! # State machine
//!
//! ```text
//! Open --(request / load rounds)--> Open --freeze()--> Frozen
//! ```
//!
//! While open, asking for a lesson that is not loaded records the slug as
//! requested, so URLs of not-yet-rendered lessons can be built without a
//! render. Requested slugs are fetched in batches by the course loader, at
//! most [`MAX_LINK_DEPTH`] rounds per resolution. Once frozen, the cache
//! never changes: a request for an unknown lesson is a lookup error.

use indexmap::{IndexMap, IndexSet};

use super::types::NodeId;

/// Maximum number of batch fetch rounds in one resolution.
pub const MAX_LINK_DEPTH: usize = 50;

/// Lifecycle state of a course's lesson cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheState {
    #[default]
    Open,
    Frozen,
}

/// Outcome of asking the cache for a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonHandle {
    /// The lesson is loaded
    Loaded(NodeId),
    /// The lesson is queued for the next fetch round
    Requested,
}

/// The lesson is not loaded and the cache is frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotLoaded(pub String);

/// Loaded and requested lessons of one course.
#[derive(Debug, Clone, Default)]
pub struct LessonCache {
    state: CacheState,
    lessons: IndexMap<String, NodeId>,
    requested: IndexSet<String>,
}

impl LessonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == CacheState::Frozen
    }

    /// Loaded lesson, without requesting it.
    pub fn get(&self, slug: &str) -> Option<NodeId> {
        self.lessons.get(slug).copied()
    }

    /// Loaded lessons in load order.
    pub fn lessons(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.lessons.iter().map(|(slug, id)| (slug.as_str(), *id))
    }

    /// Look up a lesson, queueing it if the cache is still open.
    pub fn request(&mut self, slug: &str) -> Result<LessonHandle, NotLoaded> {
        if let Some(id) = self.get(slug) {
            return Ok(LessonHandle::Loaded(id));
        }
        match self.state {
            CacheState::Open => {
                self.requested.insert(slug.to_string());
                Ok(LessonHandle::Requested)
            }
            CacheState::Frozen => Err(NotLoaded(slug.to_string())),
        }
    }

    /// Requested slugs that are not loaded yet, in request order.
    pub fn pending(&self) -> Vec<String> {
        self.requested
            .iter()
            .filter(|slug| !self.lessons.contains_key(*slug))
            .cloned()
            .collect()
    }

    /// Record a loaded lesson and drop it from the requested set.
    pub fn insert(&mut self, slug: String, id: NodeId) {
        self.requested.shift_remove(&slug);
        self.lessons.insert(slug, id);
    }

    /// Forbid further lazy loading. Idempotent.
    pub fn freeze(&mut self) {
        self.state = CacheState::Frozen;
        self.requested.clear();
    }
}

/// Engine state of one course that is not part of its fields.
#[derive(Debug, Clone, Default)]
pub struct CourseState {
    /// Whether this is the canonical (non-run) instance of the course
    pub canonical: bool,
    pub lessons: LessonCache,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_cache_queues_unknown_lessons() {
        let mut cache = LessonCache::new();
        assert_eq!(cache.request("beginners/install"), Ok(LessonHandle::Requested));
        assert_eq!(cache.request("beginners/install"), Ok(LessonHandle::Requested));
        assert_eq!(cache.request("beginners/cmdline"), Ok(LessonHandle::Requested));
        assert_eq!(cache.pending(), vec!["beginners/install", "beginners/cmdline"]);
    }

    #[test]
    fn inserted_lessons_leave_the_queue() {
        let mut cache = LessonCache::new();
        cache.request("a").unwrap();
        cache.insert("a".into(), NodeId::new(7));
        assert!(cache.pending().is_empty());
        assert_eq!(cache.request("a"), Ok(LessonHandle::Loaded(NodeId::new(7))));
    }

    #[test]
    fn frozen_cache_rejects_unknown_lessons() {
        let mut cache = LessonCache::new();
        cache.insert("a".into(), NodeId::new(3));
        cache.request("b").unwrap();
        cache.freeze();
        assert!(cache.is_frozen());
        assert!(cache.pending().is_empty());
        assert_eq!(cache.request("a"), Ok(LessonHandle::Loaded(NodeId::new(3))));
        assert_eq!(cache.request("b"), Err(NotLoaded("b".into())));
    }
}
