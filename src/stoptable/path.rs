//! Persistent frame-index paths.
//!
//! Every cell of a new stop table extends a path from the previous table
//! by exactly one frame. Storing paths as a shared, append-only linked
//! list makes that extension O(1) and lets the previous table be
//! recycled while its paths live on inside the new one.

use std::sync::Arc;

#[derive(Debug)]
struct Node {
    frame: usize,
    prev: Option<Arc<Node>>,
}

/// An ascending sequence of frame indices, newest frame last.
#[derive(Debug, Clone, Default)]
pub struct StopPath {
    head: Option<Arc<Node>>,
    len: usize,
}

impl StopPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two-frame path `[start, end]`.
    pub fn pair(start: usize, end: usize) -> Self {
        Self::new().append(start).append(end)
    }

    /// A new path with `frame` appended. `self` is left untouched and
    /// shares its nodes with the result.
    pub fn append(&self, frame: usize) -> Self {
        debug_assert!(self.last().map_or(true, |last| last < frame));
        Self {
            head: Some(Arc::new(Node {
                frame,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last(&self) -> Option<usize> {
        self.head.as_ref().map(|node| node.frame)
    }

    /// Frames in ascending order.
    pub fn to_vec(&self) -> Vec<usize> {
        let mut frames = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            frames.push(node.frame);
            cursor = node.prev.as_deref();
        }
        frames.reverse();
        frames
    }
}
