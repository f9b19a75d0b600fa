//! Template bundle archives.
//!
//! A bundle travels as a gzip-compressed tar whose entries sit under
//! `templates/`. Integrity is an optional `sha256:<hex>` digest over the
//! compressed bytes.

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

const DIGEST_PREFIX: &str = "sha256:";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported digest '{0}', expected 'sha256:<hex>'")]
    UnsupportedDigest(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("archive entry '{0}' escapes the bundle directory")]
    UnsafeEntry(PathBuf),

    #[error("archive contains no files")]
    Empty,
}

/// `sha256:<hex>` digest of `bytes`.
pub fn sha256_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{DIGEST_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Check `bytes` against an expected `sha256:<hex>` digest.
///
/// Hex comparison is case-insensitive.
pub fn verify_digest(bytes: &[u8], expected: &str) -> Result<(), ArchiveError> {
    let Some(hex_part) = expected.strip_prefix(DIGEST_PREFIX) else {
        return Err(ArchiveError::UnsupportedDigest(expected.to_string()));
    };

    let actual = sha256_digest(bytes);
    if !actual[DIGEST_PREFIX.len()..].eq_ignore_ascii_case(hex_part) {
        return Err(ArchiveError::DigestMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Unpack `bytes` into `dest` and return the number of regular files.
///
/// Entries that would land outside `dest` abort the unpack.
pub fn unpack(bytes: &[u8], dest: &Path) -> Result<usize, ArchiveError> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut files = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let is_file = entry.header().entry_type().is_file();
        let path = entry.path()?.into_owned();

        if !entry.unpack_in(dest)? {
            return Err(ArchiveError::UnsafeEntry(path));
        }
        if is_file {
            files += 1;
        }
    }

    Ok(files)
}

/// Pack every file under `dir` into a bundle archive, paths relative to `dir`.
pub fn pack_dir(dir: &Path) -> Result<Vec<u8>, ArchiveError> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|_| ArchiveError::UnsafeEntry(entry.path().to_path_buf()))?;
        builder.append_path_with_name(entry.path(), rel)?;
    }

    Ok(builder.into_inner()?.finish()?)
}

/// Pack in-memory `(path, content)` pairs into a bundle archive.
pub fn pack_files<P, C>(files: &[(P, C)]) -> Result<Vec<u8>, ArchiveError>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for (path, content) in files {
        let content = content.as_ref();
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, content)?;
    }

    Ok(builder.into_inner()?.finish()?)
}

/// Read a digest sidecar: the first token, `sha256:` added when missing.
///
/// Accepts both a bare digest and `sha256sum` output.
pub fn read_sidecar(path: &Path) -> Result<Option<String>, ArchiveError> {
    let mut raw = String::new();
    match fs::File::open(path) {
        Ok(mut file) => {
            file.read_to_string(&mut raw)?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let Some(token) = raw.split_whitespace().next() else {
        return Ok(None);
    };
    if token.starts_with(DIGEST_PREFIX) {
        Ok(Some(token.to_string()))
    } else {
        Ok(Some(format!("{DIGEST_PREFIX}{token}")))
    }
}
