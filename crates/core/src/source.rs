//! File-system access consumed by extraction.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// The two primitives the pipeline needs from a file system.
pub trait SourceFs: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// [`SourceFs`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl SourceFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}
