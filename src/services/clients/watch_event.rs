/// A typed event from a live watch stream.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent<T> {
    Added(T),
    Modified(T),
    Deleted(T),
    /// Carries the resource version the stream has caught up to.
    Bookmark(String),
}

impl<T> WatchEvent<T> {
    pub fn object(&self) -> Option<&T> {
        match self {
            WatchEvent::Added(object) | WatchEvent::Modified(object) | WatchEvent::Deleted(object) => Some(object),
            WatchEvent::Bookmark(_) => None,
        }
    }
}
