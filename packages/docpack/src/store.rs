//! # Backing Store
//!
//! Authoritative bytes of one part between flush points. Only the typed
//! model flush and the tree write-back replace them, which is why `replace`
//! is crate-private.

/// Byte buffer with a generation counter and CRC32 checksum
#[derive(Debug, Clone, Default)]
pub struct BackingStore {
    bytes: Vec<u8>,
    generation: u64,
    checksum: u32,
}

impl BackingStore {
    pub fn new(bytes: Vec<u8>) -> Self {
        let checksum = crc32fast::hash(&bytes);
        Self {
            bytes,
            generation: 0,
            checksum,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of times the bytes have been replaced
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn replace(&mut self, bytes: Vec<u8>) {
        self.checksum = crc32fast::hash(&bytes);
        self.bytes = bytes;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_bumps_generation_and_checksum() {
        let mut store = BackingStore::new(b"<a/>".to_vec());
        let before = store.checksum();
        assert_eq!(store.generation(), 0);

        store.replace(b"<b/>".to_vec());
        assert_eq!(store.generation(), 1);
        assert_eq!(store.bytes(), b"<b/>");
        assert_ne!(store.checksum(), before);
    }

    #[test]
    fn test_identical_bytes_still_count_as_new_generation() {
        let mut store = BackingStore::new(b"<a/>".to_vec());
        let checksum = store.checksum();

        store.replace(b"<a/>".to_vec());
        assert_eq!(store.generation(), 1);
        assert_eq!(store.checksum(), checksum);
    }
}
