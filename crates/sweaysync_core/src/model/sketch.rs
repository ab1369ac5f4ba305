//! Opaque sketch payload attached to a workout.
//!
//! The bytes come from the drawing surface and go back to it unchanged.
//! Core never decodes them.

use serde::{Deserialize, Serialize};

/// Freehand drawing serialized by the capture surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SketchBlob(Vec<u8>);

impl SketchBlob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Blank canvas. Still a present sketch, distinct from `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for SketchBlob {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::SketchBlob;

    #[test]
    fn blank_canvas_is_empty_but_present() {
        let blank = SketchBlob::empty();
        assert!(blank.is_empty());
        assert_eq!(blank.len(), 0);
        assert_eq!(Some(blank), Some(SketchBlob::new(Vec::new())));
    }

    #[test]
    fn bytes_are_kept_verbatim() {
        let sketch = SketchBlob::from(vec![0x00, 0xff, 0x10]);
        assert_eq!(sketch.len(), 3);
        assert!(!sketch.is_empty());
        assert_eq!(sketch.as_bytes(), &[0x00, 0xff, 0x10]);
    }
}
