#[allow(clippy::disallowed_types)]
pub type Hasher = ahash::AHasher;
pub type BuildHasher = std::hash::BuildHasherDefault<Hasher>;

// DOS is of no concern to us
pub type OrderMap<K, V> = ordermap::OrderMap<K, V, BuildHasher>;

/// Creates an empty [OrderMap] with room for `capacity` entries
pub fn order_map_with_capacity<K, V>(capacity: usize) -> OrderMap<K, V> {
    OrderMap::with_capacity_and_hasher(capacity, BuildHasher::default())
}
