use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

/// Zip `dir` into `<parent>/<dirname>_<timestamp>.zip`. The directory itself is
/// left untouched.
pub fn zip_backup_dir(dir: &Path) -> io::Result<PathBuf> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a directory: {}", dir.display()),
        ));
    }
    let parent = dir.parent().unwrap_or(Path::new("."));
    let name = dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("profile");
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let mut dest = parent.join(format!("{name}_{ts}.zip"));
    // two backups in the same second
    let mut n = 1;
    while dest.exists() {
        n += 1;
        dest = parent.join(format!("{name}_{ts}-{n}.zip"));
    }

    let file = fs::File::create(&dest)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| io::Error::other(e.to_string()))?;
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(dir) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let name = rel.to_string_lossy().replace('\\', "/");
        if path.is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            zip.write_all(&fs::read(path)?)?;
        }
    }
    zip.finish()?;
    info!(source = %dir.display(), archive = %dest.display(), "backup written");
    Ok(dest)
}
