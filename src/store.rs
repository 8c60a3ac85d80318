//! The host side of a reduction: where curves come from and go back to.
//!
//! The reduction never owns keyframes. It reads samples through
//! [`CurveStore`], computes everything, and only then writes keys and
//! handles back through the same trait.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReduceError, Result};
use crate::ncurve::Sample;
use crate::tweak::Anchor;

/// Access to a set of animation channels.
pub trait CurveStore {
    fn channel_count(&self) -> usize;

    /// Display name, used for reporting only.
    fn channel_name(&self, channel: usize) -> String {
        format!("channel {channel}")
    }

    /// `(frame, value)` pairs in ascending frame order.
    fn samples(&self, channel: usize) -> Result<Vec<Sample>>;

    /// Replace every key of `channel` with `keys`, dropping handles.
    fn replace_keys(&mut self, channel: usize, keys: &[Sample]) -> Result<()>;

    /// Set the handle values of key `key`. `None` sides are left as they are.
    fn set_handles(&mut self, channel: usize, key: usize, anchor: Anchor) -> Result<()>;
}

/// One stored key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_out: Option<f64>,
}

impl From<Sample> for Keyframe {
    fn from(s: Sample) -> Self {
        Self {
            frame: s.frame,
            value: s.value,
            handle_in: None,
            handle_out: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub keys: Vec<Keyframe>,
}

impl Channel {
    /// A channel with one key per integer frame, starting at frame 0.
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        Self {
            name: name.into(),
            keys: values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample::new(i as f64, v).into())
                .collect(),
        }
    }
}

/// Plain in-memory store, also the JSON document format of the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub channels: Vec<Channel>,
}

impl MemoryStore {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    /// Read a JSON document. Keys are sorted by frame on load.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut store: Self = serde_json::from_str(&text)?;
        for channel in &mut store.channels {
            channel.keys.sort_by(|a, b| a.frame.total_cmp(&b.frame));
        }
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    fn channel(&self, channel: usize) -> Result<&Channel> {
        self.channels
            .get(channel)
            .ok_or_else(|| ReduceError::Store(format!("no channel {channel}")))
    }

    fn channel_mut(&mut self, channel: usize) -> Result<&mut Channel> {
        self.channels
            .get_mut(channel)
            .ok_or_else(|| ReduceError::Store(format!("no channel {channel}")))
    }
}

impl CurveStore for MemoryStore {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel_name(&self, channel: usize) -> String {
        self.channels
            .get(channel)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn samples(&self, channel: usize) -> Result<Vec<Sample>> {
        Ok(self
            .channel(channel)?
            .keys
            .iter()
            .map(|k| Sample::new(k.frame, k.value))
            .collect())
    }

    fn replace_keys(&mut self, channel: usize, keys: &[Sample]) -> Result<()> {
        self.channel_mut(channel)?.keys = keys.iter().map(|&s| s.into()).collect();
        Ok(())
    }

    fn set_handles(&mut self, channel: usize, key: usize, anchor: Anchor) -> Result<()> {
        let ch = self.channel_mut(channel)?;
        let n_keys = ch.keys.len();
        let k = ch
            .keys
            .get_mut(key)
            .ok_or_else(|| ReduceError::Store(format!("no key {key} of {n_keys} in channel {channel}")))?;
        if let Some(p1) = anchor.p1 {
            k.handle_in = Some(p1);
        }
        if let Some(p2) = anchor.p2 {
            k.handle_out = Some(p2);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_drops_handles() {
        let mut store = MemoryStore::new(vec![Channel::from_values("x", &[1.0, 2.0, 3.0])]);
        store
            .set_handles(0, 1, Anchor { p1: Some(0.5), p2: None })
            .unwrap();
        assert_eq!(store.channels[0].keys[1].handle_in, Some(0.5));
        assert_eq!(store.channels[0].keys[1].handle_out, None);

        store
            .replace_keys(0, &[Sample::new(0.0, 1.0), Sample::new(2.0, 3.0)])
            .unwrap();
        assert_eq!(store.channels[0].keys.len(), 2);
        assert!(store.channels[0].keys.iter().all(|k| k.handle_in.is_none()));
    }

    #[test]
    fn missing_channel_is_a_store_error() {
        let store = MemoryStore::default();
        assert!(matches!(store.samples(3), Err(ReduceError::Store(_))));
    }

    #[test]
    fn json_document_shape() {
        let store: MemoryStore = serde_json::from_str(
            r#"{ "channels": [ { "name": "loc.x", "keys": [
                { "frame": 0, "value": 1.5 },
                { "frame": 1, "value": 2.0, "handle_in": 0.25 }
            ] } ] }"#,
        )
        .unwrap();
        assert_eq!(store.channel_name(0), "loc.x");
        assert_eq!(store.samples(0).unwrap()[0], Sample::new(0.0, 1.5));
        let text = serde_json::to_string(&store).unwrap();
        assert!(!text.contains("handle_out"));
    }
}
