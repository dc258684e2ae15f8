//! Immutable view over a cached value

use std::fmt;

use bytes::Bytes;

use crate::lru::Weighted;

/// Read-only cached value
///
/// Cloning is cheap (reference counted); callers can never mutate the copy
/// held by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the raw bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy the bytes out
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Underlying shared buffer
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(s.as_bytes()),
        }
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl Weighted for ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_accessors() {
        let view = ByteView::from(b"630".to_vec());
        assert_eq!(view.len(), 3);
        assert_eq!(view.as_slice(), b"630");
        assert_eq!(view.to_string(), "630");
        assert!(ByteView::default().is_empty());
    }

    #[test]
    fn test_copy_is_detached() {
        let view = ByteView::from("abc");
        let mut copy = view.to_vec();
        copy[0] = b'z';
        assert_eq!(view.as_slice(), b"abc");
    }
}
