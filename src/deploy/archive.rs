//! Packaging the work tree for upload.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directory names never packaged
const EXCLUDED: &[&str] = &[".git"];

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED.contains(&name))
}

/// Write `source` as a gzip tar to `dest`, skipping version-control metadata.
///
/// Entry names are relative to `source`. Returns the number of files packed.
pub fn pack_tree(source: &Path, dest: &Path) -> Result<usize> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    let dest_abs = fs::canonicalize(parent)
        .with_context(|| format!("Failed to resolve {}", parent.display()))?
        .join(dest.file_name().unwrap_or_default());

    let file = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);

    let mut files = 0;
    for entry in WalkDir::new(source)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
    {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        let rel = path.strip_prefix(source).unwrap_or(path);
        if rel.as_os_str().is_empty() {
            continue;
        }
        // The archive may live inside the tree being packed.
        if fs::canonicalize(path).is_ok_and(|p| p == dest_abs) {
            continue;
        }

        if entry.file_type().is_dir() {
            builder
                .append_dir(rel, path)
                .with_context(|| format!("Failed to add {}", path.display()))?;
        } else {
            builder
                .append_path_with_name(path, rel)
                .with_context(|| format!("Failed to add {}", path.display()))?;
            files += 1;
        }
    }

    let encoder = builder
        .into_inner()
        .context("Failed to finish archive")?;
    encoder.finish().context("Failed to finish compression")?;
    log::debug!("packed {files} files from {} into {}", source.display(), dest.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::BTreeSet;

    fn entry_names(archive: &Path) -> BTreeSet<String> {
        let file = File::open(archive).unwrap();
        let mut ar = tar::Archive::new(GzDecoder::new(file));
        ar.entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_pack_excludes_git() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("builder")).unwrap();
        fs::create_dir_all(src.path().join(".git/objects")).unwrap();
        fs::write(src.path().join("builder/Dockerfile"), "FROM java\n").unwrap();
        fs::write(src.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(src.path().join("README.md"), "otp\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("otp-dockerdeploy.tgz");
        let files = pack_tree(src.path(), &archive).unwrap();

        assert_eq!(files, 2);
        let names = entry_names(&archive);
        assert!(names.contains("builder"));
        assert!(names.contains("builder/Dockerfile"));
        assert!(names.contains("README.md"));
        assert!(!names.iter().any(|n| n.starts_with(".git")));
    }

    #[test]
    fn test_pack_skips_archive_inside_tree() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("fabfile"), "x").unwrap();
        let archive = src.path().join("bundle.tgz");

        let files = pack_tree(src.path(), &archive).unwrap();
        assert_eq!(files, 1);
        assert!(!entry_names(&archive).contains("bundle.tgz"));
    }

    #[test]
    fn test_pack_nested_git_dir_excluded() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("server/.git")).unwrap();
        fs::write(src.path().join("server/.git/config"), "").unwrap();
        fs::write(src.path().join("server/Dockerfile"), "FROM java\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("a.tgz");
        pack_tree(src.path(), &archive).unwrap();
        let names = entry_names(&archive);
        assert!(names.contains("server/Dockerfile"));
        assert!(!names.iter().any(|n| n.contains(".git")));
    }
}
