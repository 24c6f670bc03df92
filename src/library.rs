use std::path::{Path, PathBuf};

use crate::audio::{format_tag, SUPPORTED_FORMATS};

/// A decodable sound file found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct SoundEntry {
    pub path: PathBuf,    // absolute path
    pub relative: String, // display path (relative to search root)
    pub name: String,     // filename without extension
    pub dir: String,      // parent folder name
    pub format: String,   // lowercase extension
}

/// Per-user data directory (~/.taptrap/)
pub fn taptrap_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taptrap")
}

/// Global sound directory (~/.taptrap/samples/)
pub fn library_dir() -> PathBuf {
    taptrap_home().join("samples")
}

pub fn ensure_library_dir() -> std::io::Result<PathBuf> {
    let dir = library_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Project-local ./samples first, then the global library. Missing dirs are skipped.
pub fn search_dirs() -> Vec<PathBuf> {
    [PathBuf::from("./samples"), library_dir()]
        .into_iter()
        .filter(|d| d.is_dir())
        .collect()
}

/// Scan directories recursively for files with a supported format
pub fn scan_sounds(dirs: &[PathBuf]) -> Vec<SoundEntry> {
    let mut entries = Vec::new();
    for dir in dirs {
        scan_dir(dir, dir, &mut entries);
    }
    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    entries
}

fn scan_dir(root: &Path, current: &Path, entries: &mut Vec<SoundEntry>) {
    let Ok(read_dir) = std::fs::read_dir(current) else {
        log::debug!("skipping unreadable directory {}", current.display());
        return;
    };

    for entry in read_dir.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(root, &path, entries);
            continue;
        }

        let Some(format) = format_tag(&path) else {
            continue;
        };
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let dir = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        entries.push(SoundEntry {
            path: path.canonicalize().unwrap_or(path),
            relative,
            name,
            dir,
            format,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_finds_supported_files_recursively() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("drums")).unwrap();
        fs::write(root.path().join("drums/kick.wav"), b"").unwrap();
        fs::write(root.path().join("Clap.WAV"), b"").unwrap();
        fs::write(root.path().join("notes.txt"), b"").unwrap();
        fs::write(root.path().join("song.mp3"), b"").unwrap();
        fs::write(root.path().join("README"), b"").unwrap();

        let entries = scan_sounds(&[root.path().to_path_buf()]);

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Clap", "kick"]);
        assert!(entries.iter().all(|e| e.format == "wav"));
        assert_eq!(entries[1].dir, "drums");
        assert!(entries[1].path.is_absolute());
    }

    #[test]
    fn test_missing_dir_yields_nothing() {
        let root = tempfile::tempdir().unwrap();
        let gone = root.path().join("nope");
        assert!(scan_sounds(&[gone]).is_empty());
    }
}
