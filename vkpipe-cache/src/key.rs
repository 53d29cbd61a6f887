/// Trait for objects that can be used as part of a key for a cached object.
pub trait CacheKey {
    /// Get a byte representation of the object that
    /// will be fed into the hash.
    fn hash_bytes(&self) -> &[u8];
}

impl CacheKey for [u8] {
    fn hash_bytes(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> CacheKey for [u8; N] {
    fn hash_bytes(&self) -> &[u8] {
        self
    }
}

impl CacheKey for Vec<u8> {
    fn hash_bytes(&self) -> &[u8] {
        self
    }
}

impl CacheKey for str {
    fn hash_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl CacheKey for String {
    fn hash_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<T: CacheKey + ?Sized> CacheKey for &T {
    fn hash_bytes(&self) -> &[u8] {
        (**self).hash_bytes()
    }
}
