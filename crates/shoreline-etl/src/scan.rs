//! Shapefile discovery.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Whether `path` names a shapefile (`.shp`, any case).
pub fn is_shapefile(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("shp"))
}

/// Strip the single quotes some shells and GIS tool dialogs wrap paths in.
fn clean_path(raw: &str) -> Option<PathBuf> {
    let cleaned = raw.trim().replace('\'', "");
    if cleaned.is_empty() {
        None
    } else {
        Some(PathBuf::from(cleaned))
    }
}

/// List the shapefiles directly inside `dir`, or anywhere below it when
/// `include_subdirs` is set. Results are sorted.
pub fn shapefiles_in(dir: &Path, include_subdirs: bool) -> Vec<PathBuf> {
    let walker = WalkDir::new(dir).follow_links(true);
    let walker = if include_subdirs {
        walker
    } else {
        walker.max_depth(1)
    };

    let mut found: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_shapefile(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    found.sort();
    found
}

/// Collect the shapefiles to process.
///
/// Explicitly named files come first, in the order given, followed by the
/// shapefiles found in each directory. Empty entries are ignored and a
/// missing directory is skipped with a warning.
pub fn gather_shapefiles<S: AsRef<str>>(
    files: &[S],
    dirs: &[S],
    include_subdirs: bool,
) -> Vec<PathBuf> {
    let mut shapefiles: Vec<PathBuf> = files
        .iter()
        .filter_map(|f| clean_path(f.as_ref()))
        .collect();

    let dirs: Vec<PathBuf> = dirs.iter().filter_map(|d| clean_path(d.as_ref())).collect();
    if !dirs.is_empty() {
        log::info!("Getting shapefiles in specified directory(ies)...");
    }

    for dir in dirs {
        if !dir.is_dir() {
            log::warn!("{} is not a directory, skipping", dir.display());
            continue;
        }
        for path in shapefiles_in(&dir, include_subdirs) {
            log::debug!("Found {}", path.display());
            shapefiles.push(path);
        }
    }

    shapefiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn layout() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b_shore.shp"));
        touch(&root.join("a_shore.SHP"));
        touch(&root.join("a_shore.dbf"));
        touch(&root.join("notes.txt"));
        touch(&root.join("nested").join("deep.shp"));
        temp_dir
    }

    #[test]
    fn test_is_shapefile() {
        assert!(is_shapefile(Path::new("/data/coast.shp")));
        assert!(is_shapefile(Path::new("/data/COAST.SHP")));
        assert!(!is_shapefile(Path::new("/data/coast.shx")));
        assert!(!is_shapefile(Path::new("/data/coast.shp.xml")));
        assert!(!is_shapefile(Path::new("/data/coast")));
    }

    #[test]
    fn test_shapefiles_in_top_level_only() {
        let temp_dir = layout();
        let found = shapefiles_in(temp_dir.path(), false);
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_shore.SHP", "b_shore.shp"]);
    }

    #[test]
    fn test_shapefiles_in_recursive() {
        let temp_dir = layout();
        let found = shapefiles_in(temp_dir.path(), true);
        assert_eq!(found.len(), 3);
        assert!(found.iter().any(|p| p.ends_with("nested/deep.shp")));
    }

    #[cfg(unix)]
    #[test]
    fn test_shapefiles_in_follows_symlinks() {
        let temp_dir = layout();
        let linked = temp_dir.path().join("linked");
        fs::create_dir_all(&linked).unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("b_shore.shp"),
            linked.join("alias.shp"),
        )
        .unwrap();

        let found = shapefiles_in(&linked, false);
        assert_eq!(found, vec![linked.join("alias.shp")]);
    }

    #[test]
    fn test_gather_explicit_files_first_and_quotes_stripped() {
        let temp_dir = layout();
        let dir = temp_dir.path().to_string_lossy().to_string();
        let files = vec!["'/data/first.shp'".to_string(), String::new()];
        let found = gather_shapefiles(&files, &[dir], false);
        assert_eq!(found[0], PathBuf::from("/data/first.shp"));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_gather_skips_missing_directory() {
        let found = gather_shapefiles(&["x.shp"], &["/definitely/not/here"], true);
        assert_eq!(found, vec![PathBuf::from("x.shp")]);
    }

    #[test]
    fn test_gather_nothing() {
        let empty: [&str; 0] = [];
        assert!(gather_shapefiles(&empty, &empty, false).is_empty());
    }
}
