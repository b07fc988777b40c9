use std::collections::VecDeque;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::warn;
use crate::core::error::{Error, ErrorKind, Result};

/// Breadth-first file discovery under a set of root paths.
///
/// Dot-entries are skipped. Entries within a directory are visited in
/// sorted name order so a corpus always yields the same file ordering,
/// which the incremental merge and the index tests rely on.
pub struct Walker {
    pub recurse: bool,
    pub follow_links: bool,
}

impl Walker {
    pub fn new(recurse: bool, follow_links: bool) -> Self {
        Walker {
            recurse,
            follow_links,
        }
    }

    /// Expand roots (files and/or directories) into the ordered file list.
    pub fn collect(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        // Queue of (dir, depth); depth 0 dirs are the roots themselves and
        // always expand one level even when recursion is off.
        let mut queue: VecDeque<(PathBuf, u32)> = VecDeque::new();

        for root in roots {
            let meta = fs::metadata(root).map_err(|e| {
                Error::new(
                    ErrorKind::Usage,
                    format!("cannot stat root {}: {}", root.display(), e),
                )
            })?;
            if meta.is_dir() {
                queue.push_back((root.clone(), 0));
            } else {
                files.push(root.clone());
            }
        }

        while let Some((dir, depth)) = queue.pop_front() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };

            let mut names: Vec<PathBuf> = Vec::new();
            for entry in entries {
                let entry = entry?;
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
                names.push(entry.path());
            }
            names.sort();

            for path in names {
                let link_meta = fs::symlink_metadata(&path)?;
                if link_meta.file_type().is_symlink() && !self.follow_links {
                    continue;
                }
                let meta = match fs::metadata(&path) {
                    Ok(meta) => meta,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                        continue;
                    }
                };
                if meta.is_dir() {
                    if self.recurse || depth == 0 {
                        queue.push_back((path, depth + 1));
                    }
                } else if meta.is_file() {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}

/// Root paths from the argument list, or one per line on stdin when the
/// sole argument is `-`.
pub fn roots_from_args(args: &[String]) -> Result<Vec<PathBuf>> {
    if args.len() == 1 && args[0] == "-" {
        let stdin = std::io::stdin();
        let mut roots = Vec::new();
        for line in stdin.lock().lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                roots.push(PathBuf::from(trimmed));
            }
        }
        return Ok(roots);
    }
    if args.is_empty() {
        return Err(Error::new(
            ErrorKind::Usage,
            "no input roots given".to_string(),
        ));
    }
    Ok(args.iter().map(PathBuf::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn touch(path: &Path) {
        File::create(path).unwrap().write_all(b"word\n").unwrap();
    }

    #[test]
    fn walks_breadth_first_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        touch(&root.join("b.txt"));
        touch(&root.join("a.txt"));
        touch(&root.join("sub/c.txt"));
        touch(&root.join(".hidden"));

        let walker = Walker::new(true, false);
        let files = walker.collect(&[root.to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // Root level first (breadth-first), then the subdirectory.
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn no_recurse_still_expands_the_root_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        touch(&root.join("top.txt"));
        touch(&root.join("sub/deep.txt"));

        let walker = Walker::new(false, false);
        let files = walker.collect(&[root.to_path_buf()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.txt"));
    }

    #[test]
    fn missing_root_is_a_usage_error() {
        let walker = Walker::new(true, false);
        let err = walker
            .collect(&[PathBuf::from("/no/such/root")])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Usage);
    }
}
