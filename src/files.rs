//! Attachment loading
//!
//! The composer never touches the filesystem directly: path attachments are
//! resolved through a [`FileSource`], read once, and copied into the parts.

use crate::error::{Error, Result};
use crate::mimebody::BinaryPart;
use crate::options::{Attachment, FileContent};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplier of file contents for path attachments
pub trait FileSource {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl FileSource for LocalFiles {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// In-memory files keyed by path
impl FileSource for HashMap<PathBuf, Vec<u8>> {
    fn exists(&self, path: &Path) -> bool {
        self.contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// Turn attachment descriptors into binary parts
pub(crate) fn load_files<F>(attachments: Vec<Attachment>, inline: bool, files: &F) -> Result<Vec<BinaryPart>>
where
    F: FileSource + ?Sized,
{
    attachments
        .into_iter()
        .map(|attachment| load_file(attachment, inline, files))
        .collect()
}

fn load_file<F>(attachment: Attachment, inline: bool, files: &F) -> Result<BinaryPart>
where
    F: FileSource + ?Sized,
{
    match attachment {
        Attachment::Path(path) => {
            if !files.exists(&path) {
                return Err(Error::AttachmentNotFound(path));
            }
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    Error::InvalidParam(format!("attachment path {} has no file name", path.display()))
                })?;
            let content = files.read(&path)?;
            debug!(path = %path.display(), size = content.len(), inline, "loaded attachment");
            BinaryPart::new(filename, content, inline)
        }
        Attachment::Data { filename, content } => {
            if filename.is_empty() {
                return Err(Error::InvalidParam("attachment filename is empty".into()));
            }
            match content {
                FileContent::Binary(content) => BinaryPart::new(filename, content, inline),
                FileContent::NotBinary(found) => {
                    debug!(%filename, %found, "rejected attachment content");
                    Err(Error::ContentNotBinary)
                }
            }
        }
        Attachment::Malformed(found) => Err(Error::InvalidParam(format!(
            "attachment must be a path or a {{filename, content}} object, found {}",
            found
        ))),
    }
}
