//! Stable content hashes for memoization keys.
//!
//! - strings: SHA-256 hex digest
//! - sequences: digest of the `|`-joined element hashes (order matters)
//! - mappings: sequence hash of the sorted `<keyhash;valuehash>` pair strings
//!   (insertion order does not matter)

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};

/// A value with a hash that is identical across runs and platforms.
pub trait StableHash {
    fn stable_hash(&self) -> String;
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hash of an ordered sequence of already computed hashes.
pub fn hash_sequence(hashes: &[String]) -> String {
    digest(hashes.join("|").as_bytes())
}

fn hash_pairs<'a, K, V>(pairs: impl Iterator<Item = (&'a K, &'a V)>) -> String
where
    K: StableHash + ?Sized + 'a,
    V: StableHash + ?Sized + 'a,
{
    let mut pairs: Vec<String> = pairs
        .map(|(k, v)| format!("<{};{}>", k.stable_hash(), v.stable_hash()))
        .collect();
    pairs.sort();
    pairs.stable_hash()
}

impl StableHash for str {
    fn stable_hash(&self) -> String {
        digest(self.as_bytes())
    }
}

impl StableHash for String {
    fn stable_hash(&self) -> String {
        self.as_str().stable_hash()
    }
}

impl<T: StableHash + ?Sized> StableHash for &T {
    fn stable_hash(&self) -> String {
        (**self).stable_hash()
    }
}

impl<T: StableHash> StableHash for [T] {
    fn stable_hash(&self) -> String {
        let hashes: Vec<String> = self.iter().map(StableHash::stable_hash).collect();
        hash_sequence(&hashes)
    }
}

impl<T: StableHash> StableHash for Vec<T> {
    fn stable_hash(&self) -> String {
        self.as_slice().stable_hash()
    }
}

impl<K: StableHash, V: StableHash> StableHash for BTreeMap<K, V> {
    fn stable_hash(&self) -> String {
        hash_pairs(self.iter())
    }
}

impl<K: StableHash, V: StableHash, S> StableHash for HashMap<K, V, S> {
    fn stable_hash(&self) -> String {
        hash_pairs(self.iter())
    }
}

/// Cache key of a call: hash of `[function, args, kwargs]`.
pub fn call_key(function: &str, args: &[&str], kwargs: &BTreeMap<&str, &str>) -> String {
    hash_sequence(&[
        function.stable_hash(),
        args.stable_hash(),
        kwargs.stable_hash(),
    ])
}
