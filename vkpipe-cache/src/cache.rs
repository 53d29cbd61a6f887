use crate::cacheable::Cacheable;
use crate::error::CacheError;
use crate::key::CacheKey;
use platform_dirs::AppDirs;
use rusqlite::{params, DatabaseName, OptionalExtension};
use std::path::{Path, PathBuf};

pub use rusqlite::Connection;

const CACHE_DB_NAME: &str = "vkpipe.db";

/// Get the default cache directory, creating it if it does not exist.
///
/// Falls back to a `vkpipe` directory under the current working directory
/// when the platform cache directory can not be determined.
pub fn get_cache_dir() -> Result<PathBuf, CacheError> {
    let cache_dir =
        if let Some(cache_dir) = AppDirs::new(Some("vkpipe"), false).map(|a| a.cache_dir) {
            cache_dir
        } else {
            let mut current_dir = std::env::current_dir()?;
            current_dir.push("vkpipe");
            current_dir
        };

    std::fs::create_dir_all(&cache_dir)?;

    Ok(cache_dir)
}

/// Open the cache database in the default cache directory.
pub fn get_cache() -> Result<Connection, CacheError> {
    let cache_dir = get_cache_dir()?;
    open_cache(&cache_dir)
}

/// Open the cache database in the given directory, creating the directory
/// and the cache table if needed.
pub fn open_cache(cache_dir: &Path) -> Result<Connection, CacheError> {
    std::fs::create_dir_all(cache_dir)?;
    let mut conn = Connection::open(cache_dir.join(CACHE_DB_NAME))?;

    // journal_mode can not be changed inside a transaction.
    let _mode: String = conn.pragma_update_and_check(
        Some(DatabaseName::Main),
        "journal_mode",
        "wal",
        |row| row.get(0),
    )?;

    let tx = conn.transaction()?;
    tx.execute(
        r#"create table if not exists cache (
        type text not null,
        id blob not null,
        value blob not null,
        primary key (id, type)
    )"#,
        [],
    )?;
    tx.commit()?;
    Ok(conn)
}

/// Hash a set of keys into the id a blob is stored under.
pub fn hash_keys<H: CacheKey>(keys: &[H]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for subkey in keys {
        hasher.update(subkey.hash_bytes());
    }
    hasher.finalize()
}

/// Read the raw blob stored under `index` and `key`, if any.
pub fn get_blob(conn: &Connection, index: &str, key: &[u8]) -> Result<Option<Vec<u8>>, CacheError> {
    let value = conn
        .query_row(
            "select value from cache where (type = (?1) and id = (?2))",
            params![index, key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Store a raw blob under `index` and `key`, replacing any previous value.
pub fn set_blob(conn: &Connection, index: &str, key: &[u8], value: &[u8]) -> Result<(), CacheError> {
    conn.execute(
        "insert or replace into cache (type, id, value) values (?1, ?2, ?3)",
        params![index, key, value],
    )?;
    Ok(())
}

/// Look up a cached object by its keys.
///
/// Returns `None` if there is no entry, or if the stored bytes could not be
/// decoded. Database errors are logged and treated as a miss.
pub fn get_cached_blob<T, H, const KEY_SIZE: usize>(
    conn: &Connection,
    index: &str,
    keys: &[H; KEY_SIZE],
) -> Option<T>
where
    H: CacheKey,
    T: Cacheable,
{
    let hashkey = hash_keys(keys);
    match get_blob(conn, index, hashkey.as_bytes()) {
        Ok(Some(blob)) => T::from_bytes(&blob),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("failed to read {index} from the cache: {e}");
            None
        }
    }
}

/// Store an object under the hash of its keys.
pub fn cache_blob<T, H, const KEY_SIZE: usize>(
    conn: &Connection,
    index: &str,
    keys: &[H; KEY_SIZE],
    value: &T,
) -> Result<(), CacheError>
where
    H: CacheKey,
    T: Cacheable,
{
    let Some(bytes) = value.to_bytes() else {
        return Err(CacheError::EncodeError);
    };

    let hashkey = hash_keys(keys);
    set_blob(conn, index, hashkey.as_bytes(), &bytes)?;
    tracing::debug!("stored {} bytes for {index}", bytes.len());
    Ok(())
}
