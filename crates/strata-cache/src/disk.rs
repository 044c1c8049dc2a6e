use strata_core::Result;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A persistent cache of opaque payloads keyed by string.
///
/// Each entry is a file under the cache directory: the key on the first
/// line, a unix expiry timestamp on the second, then the raw payload.
/// Expired, unreadable, or malformed entries read as misses. Expiry uses
/// wall-clock time so entries outlive the process.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };

        let (stored_key, rest) = split_line(&bytes)?;
        let (expiry, payload) = split_line(rest)?;
        if stored_key != key.as_bytes() {
            // Sanitized filenames can collide across keys.
            tracing::debug!(key, path = %path.display(), "cache entry key mismatch");
            return None;
        }
        let expiry: u64 = std::str::from_utf8(expiry).ok()?.trim().parse().ok()?;
        if unix_now() > expiry {
            tracing::debug!(key, "cache entry expired");
            return None;
        }
        tracing::debug!(key, "cache hit");
        Some(payload.to_vec())
    }

    pub fn save(&self, key: &str, payload: &[u8], ttl: Duration) -> Result<()> {
        let path = self.entry_path(key);
        let expiry = unix_now() + ttl.as_secs();
        let mut file = fs::File::create(&path)?;
        file.write_all(key.as_bytes())?;
        file.write_all(b"\n")?;
        file.write_all(expiry.to_string().as_bytes())?;
        file.write_all(b"\n")?;
        file.write_all(payload)?;
        tracing::debug!(key, path = %path.display(), "cache entry written");
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(name)
    }
}

fn split_line(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let at = bytes.iter().position(|&b| b == b'\n')?;
    Some((&bytes[..at], &bytes[at + 1..]))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> (DiskCache, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        (cache, dir)
    }

    #[test]
    fn saved_payloads_read_back() {
        let (cache, _dir) = cache();
        cache
            .save("api/Universe?region=10", b"payload", Duration::from_secs(60))
            .unwrap();
        assert_eq!(
            cache.lookup("api/Universe?region=10"),
            Some(b"payload".to_vec())
        );
    }

    #[test]
    fn missing_keys_are_misses() {
        let (cache, _dir) = cache();
        assert_eq!(cache.lookup("never-saved"), None);
    }

    #[test]
    fn expired_entries_are_misses() {
        let (cache, _dir) = cache();
        cache.save("k", b"payload", Duration::ZERO).unwrap();
        // expiry is recorded in whole seconds; ZERO ttl is already past
        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(cache.lookup("k"), None);
    }

    #[test]
    fn corrupt_entries_are_misses() {
        let (cache, dir) = cache();
        cache.save("k", b"payload", Duration::from_secs(60)).unwrap();
        fs::write(dir.path().join("k"), b"not a cache entry").unwrap();
        assert_eq!(cache.lookup("k"), None);
    }

    #[test]
    fn colliding_filenames_do_not_cross_keys() {
        let (cache, _dir) = cache();
        // both keys sanitize to the same filename
        cache.save("a/b", b"slash", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.lookup("a_b"), None);
        assert_eq!(cache.lookup("a/b"), Some(b"slash".to_vec()));
    }

    #[test]
    fn payloads_may_contain_newlines() {
        let (cache, _dir) = cache();
        cache
            .save("k", b"line one\nline two\n", Duration::from_secs(60))
            .unwrap();
        assert_eq!(cache.lookup("k"), Some(b"line one\nline two\n".to_vec()));
    }

    #[test]
    fn entries_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = DiskCache::new(dir.path()).unwrap();
            cache.save("k", b"payload", Duration::from_secs(60)).unwrap();
        }
        let cache = DiskCache::new(dir.path()).unwrap();
        assert_eq!(cache.lookup("k"), Some(b"payload".to_vec()));
    }
}
