// src/file.rs
//
// Crash-consistent file replacement: write a randomly-suffixed sibling,
// sync, rename over the target. The rename is the atomicity boundary; any
// earlier failure removes the temp file and leaves the target as it was.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use rand::RngCore;

pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_sibling(path);
    let cleanup = |e| {
        let _ = fs::remove_file(&tmp);
        e
    };

    let mut f = File::create(&tmp)?;
    f.write_all(bytes)
        .and_then(|_| f.sync_all())
        .map_err(cleanup)?;
    drop(f);

    fs::rename(&tmp, path).map_err(cleanup)
}

/// Temp name next to the target so the final rename never crosses a
/// filesystem boundary. The random suffix keeps concurrent writers from
/// clobbering each other's temp file.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut rnd = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut rnd);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.{}.tmp", name, hex::encode(rnd)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("blob");

        write_atomic(&target, b"one").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"one");

        write_atomic(&target, b"two").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"two");

        // No temp litter left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn failed_write_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("blob");
        write_atomic(&target, b"keep").unwrap();

        // Target's parent missing -> create of the temp fails.
        let bad = dir.path().join("missing").join("blob");
        assert!(write_atomic(&bad, b"x").is_err());
        assert_eq!(fs::read(&target).unwrap(), b"keep");
    }
}
