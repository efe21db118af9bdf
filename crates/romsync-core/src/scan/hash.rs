//! Content hashing for ROM identity.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use sha1::{Digest, Sha1};

/// Lower-case hex SHA-1 of a file, streamed so large images never sit in memory.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha1::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
