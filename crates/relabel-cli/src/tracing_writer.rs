//! Writer for the optional log file layer.
//!
//! The file layer is built with `.with_ansi(false)`, so lines are written
//! as formatted.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "relabel.log";

/// [`MakeWriter`](tracing_subscriber::fmt::MakeWriter) appending to a shared file.
#[derive(Clone)]
pub struct FileMakeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl FileMakeWriter {
    pub fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileMakeWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter {
            file: Arc::clone(&self.file),
            buf: Vec::with_capacity(256),
        }
    }
}

/// Buffers one event and appends it under the lock on drop.
pub struct FileWriter {
    file: Arc<Mutex<std::fs::File>>,
    buf: Vec<u8>,
}

impl Write for FileWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let mut file = self.file.lock();
        let _ = file.write_all(&self.buf);
        let _ = file.flush();
    }
}

/// Opens `<dir>/relabel.log` for appending.
///
/// Returns `None` (after a warning on stderr) if it cannot be created.
pub fn open_log_file(dir: &Path) -> Option<std::fs::File> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Warning: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    let path = dir.join(LOG_FILE_NAME);
    match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn writes_land_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let file = open_log_file(dir.path()).unwrap();
        let make = FileMakeWriter::new(file);

        {
            let mut w = make.make_writer();
            w.write_all(b"first line\n").unwrap();
            assert_eq!(
                std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap(),
                ""
            );
        }
        make.make_writer().write_all(b"second line\n").unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap(),
            "first line\nsecond line\n"
        );
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        assert!(open_log_file(&nested).is_some());
        assert!(nested.join(LOG_FILE_NAME).exists());
    }
}
