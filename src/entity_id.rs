use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Short, kind-prefixed id such as `T-1a2b`. `exists` is consulted so the id
/// is unique within the caller's collection.
pub fn generate_entity_id<F>(prefix: &str, mut exists: F) -> String
where
    F: FnMut(&str) -> bool,
{
    for width in [4usize, 6, 8] {
        for _ in 0..32 {
            let candidate = format!("{}-{}", prefix, short_hash(width));
            if !exists(&candidate) {
                return candidate;
            }
        }
    }

    loop {
        let candidate = format!("{}-{}", prefix, Uuid::now_v7().simple());
        if !exists(&candidate) {
            return candidate;
        }
    }
}

fn short_hash(width: usize) -> String {
    let seed = Uuid::now_v7().to_string();
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..width].to_string()
}
