//! Runtime archive extraction and packaging
//!
//! Base runtimes ship as `.tar.gz` (unix-like platforms) or `.zip`
//! (windows); generated images are packaged in the same format as the
//! target's own archive. All functions here block and are meant to run on
//! the blocking thread pool.

use crate::error::{JlinkError, JlinkResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// Format implied by a file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }
}

/// File name without its archive extension
pub fn strip_archive_extension(name: &str) -> &str {
    [".tar.gz", ".tgz", ".zip"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// Extract `archive` into `dest`
pub fn unpack(archive: &Path, dest: &Path) -> JlinkResult<()> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = ArchiveFormat::from_file_name(&name)
        .ok_or_else(|| JlinkError::archive(archive, "unknown archive format"))?;

    debug!("Extracting {} into {}", archive.display(), dest.display());
    fs::create_dir_all(dest).map_err(|e| JlinkError::archive(dest, e))?;

    let file = File::open(archive).map_err(|e| JlinkError::archive(archive, e))?;
    match format {
        ArchiveFormat::TarGz => {
            let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
            tar.set_preserve_mtime(true);
            tar.unpack(dest).map_err(|e| JlinkError::archive(archive, e))
        }
        ArchiveFormat::Zip => {
            let mut zip = ZipArchive::new(file).map_err(|e| JlinkError::archive(archive, e))?;
            zip.extract(dest).map_err(|e| JlinkError::archive(archive, e))
        }
    }
}

/// Package the directory `src` into `dest`, with `src`'s name as the root entry
pub fn pack(src: &Path, dest: &Path, format: ArchiveFormat) -> JlinkResult<()> {
    let root = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| JlinkError::archive(src, "source has no directory name"))?;

    debug!("Packaging {} into {}", src.display(), dest.display());
    let result = match format {
        ArchiveFormat::TarGz => pack_tar_gz(src, dest, &root),
        ArchiveFormat::Zip => pack_zip(src, dest, &root).map_err(io::Error::other),
    };
    result.map_err(|e| JlinkError::archive(dest, e))
}

fn pack_tar_gz(src: &Path, dest: &Path, root: &str) -> io::Result<()> {
    let encoder = GzEncoder::new(BufWriter::new(File::create(dest)?), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all(root, src)?;

    let mut writer = builder.into_inner()?.finish()?;
    writer.flush()
}

fn pack_zip(src: &Path, dest: &Path, root: &str) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut name = root.to_string();
        for component in rel.components() {
            name.push('/');
            name.push_str(&component.as_os_str().to_string_lossy());
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else if file_type.is_symlink() {
            let target = fs::read_link(entry.path())?;
            zip.add_symlink(name, target.to_string_lossy().into_owned(), options)?;
        } else {
            let mode = file_mode(&entry.metadata().map_err(io::Error::from)?);
            zip.start_file(name, options.unix_permissions(mode))?;
            io::copy(&mut File::open(entry.path())?, &mut zip)?;
        }
    }

    zip.finish()?.flush()?;
    Ok(())
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn file_mode(_metadata: &fs::Metadata) -> u32 {
    0o644
}
