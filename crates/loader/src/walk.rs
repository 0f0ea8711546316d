use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of inspecting one path during a walk.
enum Entry {
    File,
    Dir(Vec<PathBuf>),
    Skip,
}

/// Reads the metadata of `path` and, for directories, its children sorted by
/// name. Symlinks and permission-denied paths are skipped.
fn inspect(path: &Path) -> anyhow::Result<Entry> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            debug!(path = %path.display(), "Permission denied");
            return Ok(Entry::Skip);
        }
        Err(e) => return Err(e.into()),
    };
    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        debug!(path = %path.display(), "Symlink skipped");
        return Ok(Entry::Skip);
    }
    if file_type.is_file() {
        return Ok(Entry::File);
    }
    if !file_type.is_dir() {
        return Ok(Entry::Skip);
    }
    let entries = match fs::read_dir(path) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            debug!(path = %path.display(), "Permission denied");
            return Ok(Entry::Skip);
        }
        Err(e) => return Err(e.into()),
    };
    let mut children = Vec::new();
    for entry_res in entries {
        match entry_res {
            Ok(e) => children.push(e.path()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                debug!(path = %path.display(), "Permission denied");
            }
            Err(e) => return Err(e.into()),
        }
    }
    children.sort();
    Ok(Entry::Dir(children))
}

/// Breadth-first walk calling `callback` for every regular file below
/// `path`. Children are visited in name order so repeated walks of the same
/// tree yield the same sequence.
pub fn visit<F, C>(path: &Path, excludes: &F, callback: &mut C) -> anyhow::Result<()>
where
    F: Fn(&Path) -> bool,
    C: FnMut(&Path) -> anyhow::Result<()>,
{
    let mut pending: VecDeque<PathBuf> = VecDeque::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    pending.push_back(path.to_path_buf());

    while let Some(current) = pending.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if excludes(&current) {
            debug!(path = %current.display(), "Path excluded");
            continue;
        }
        match inspect(&current)? {
            Entry::File => {
                debug!(path = %current.display(), "File discovered");
                callback(&current)?;
            }
            Entry::Dir(children) => {
                debug!(path = %current.display(), "Entering directory");
                pending.extend(children);
            }
            Entry::Skip => {}
        }
    }

    Ok(())
}

/// Returns true when the file name of `path` ends with `suffix`.
///
/// # Example
/// ```
/// use loader::has_suffix;
/// use std::path::Path;
/// assert!(has_suffix(Path::new("a/B.smali"), "smali"));
/// assert!(!has_suffix(Path::new("a/B.java"), "smali"));
/// assert!(!has_suffix(Path::new("/"), "smali"));
/// ```
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// Collects every file below `root` whose name ends with `suffix`.
pub fn collect_files<F>(root: &Path, suffix: &str, excludes: &F) -> anyhow::Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    visit(root, excludes, &mut |p: &Path| {
        if has_suffix(p, suffix) {
            files.push(p.to_path_buf());
        }
        Ok(())
    })?;
    Ok(files)
}

/// Directories exactly `depth` levels below `root`, sorted by path.
///
/// Depth 0 is the root itself. Excluded directories and everything below
/// them are left out.
pub fn dirs_at_depth<F>(root: &Path, depth: usize, excludes: &F) -> anyhow::Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut level = vec![root.to_path_buf()];
    for _ in 0..depth {
        let mut next = Vec::new();
        for dir in &level {
            if let Entry::Dir(children) = inspect(dir)? {
                next.extend(children.into_iter().filter(|c| c.is_dir() && !c.is_symlink()));
            }
        }
        level = next;
    }
    level.retain(|d| {
        let excluded = excludes(d);
        if excluded {
            debug!(path = %d.display(), "Path excluded");
        }
        !excluded
    });
    level.sort();
    Ok(level)
}
