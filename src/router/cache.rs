//! Checksum-protected route cache
//!
//! A cache file is a JSON payload followed by eight lowercase hex characters
//! holding the CRC32 (IEEE) of the payload:
//!
//! ```text
//! {"version":1,"tree":{...},"backward":[...]}1a2b3c4d
//! ```
//!
//! The checksum is verified before anything is deserialized, so a damaged file
//! is rejected as a whole and never yields a partial table.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::tree::{BackwardEntry, RouteNode, RouteTable};
use crate::error::{Result, RouterError};
use crate::handler::HandlerId;

/// Bumped whenever the payload layout changes
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Length of the hex checksum trailer
pub const CHECKSUM_LEN: usize = 8;

#[derive(Serialize)]
struct PayloadRef<'a> {
    version: u32,
    tree: &'a RouteNode,
    backward: Vec<(&'a HandlerId, &'a Vec<BackwardEntry>)>,
}

#[derive(Deserialize)]
struct Payload {
    version: u32,
    tree: RouteNode,
    backward: Vec<(HandlerId, Vec<BackwardEntry>)>,
}

/// CRC32 of `payload` as eight lowercase hex characters
#[must_use]
pub fn checksum(payload: &[u8]) -> String {
    format!("{:08x}", crc32fast::hash(payload))
}

/// Serialize a table into cache bytes
pub fn encode(table: &RouteTable) -> Result<Vec<u8>> {
    let payload = PayloadRef {
        version: CACHE_FORMAT_VERSION,
        tree: table.root(),
        backward: table.backward_index().iter().collect(),
    };
    let mut bytes = serde_json::to_vec(&payload)
        .map_err(|e| RouterError::corrupt(format!("failed to encode route table: {}", e)))?;
    let sum = checksum(&bytes);
    bytes.extend_from_slice(sum.as_bytes());
    Ok(bytes)
}

/// Verify and deserialize cache bytes
///
/// Returns `Ok(None)` for empty input: nothing has been cached yet.
pub fn decode(bytes: &[u8]) -> Result<Option<RouteTable>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    if bytes.len() < CHECKSUM_LEN {
        return Err(reject(format!(
            "{} bytes is too short to hold a checksum",
            bytes.len()
        )));
    }

    let (payload, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let expected = checksum(payload);
    if trailer != expected.as_bytes() {
        return Err(reject(format!(
            "checksum mismatch: stored '{}', computed '{}'",
            String::from_utf8_lossy(trailer),
            expected
        )));
    }

    let decoded: Payload = serde_json::from_slice(payload)
        .map_err(|e| reject(format!("undecodable payload: {}", e)))?;
    if decoded.version != CACHE_FORMAT_VERSION {
        return Err(reject(format!(
            "format version {} is not supported (expected {})",
            decoded.version, CACHE_FORMAT_VERSION
        )));
    }

    let table = RouteTable::from_parts(decoded.tree, decoded.backward.into_iter().collect());
    info!(
        routes_count = table.len(),
        bytes = bytes.len(),
        "Route table loaded from cache"
    );
    Ok(Some(table))
}

fn reject(reason: String) -> RouterError {
    error!(reason = %reason, "Route cache rejected");
    RouterError::corrupt(reason)
}

/// Read and decode a cache file; a missing file counts as empty
pub fn read_file(path: &Path) -> Result<Option<RouteTable>> {
    match fs::read(path) {
        Ok(bytes) => decode(&bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(RouterError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Encode a table and write it through a sibling temp file and a rename
pub fn write_file(path: &Path, table: &RouteTable) -> Result<()> {
    let bytes = encode(table)?;
    let tmp = path.with_extension("tmp");
    let io = |source| RouterError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, &bytes).map_err(io)?;
    fs::rename(&tmp, path).map_err(io)?;
    info!(
        path = %path.display(),
        routes_count = table.len(),
        bytes = bytes.len(),
        "Route cache written"
    );
    Ok(())
}
