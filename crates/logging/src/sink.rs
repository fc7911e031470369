//! Output sink shared by the fmt layer: console, or an append-only file that
//! rolls over to `<path>.1` once it grows past [`ROTATE_BYTES`].

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// Size at which a log file is rotated.
pub const ROTATE_BYTES: u64 = 1024 * 1024;

enum Target {
    Console,
    File(RotatingFile),
}

struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    limit: u64,
}

impl RotatingFile {
    fn open(path: &Path, limit: u64) -> io::Result<Self> {
        if path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written,
            limit,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let mut backup = self.path.clone().into_os_string();
        backup.push(".1");
        let backup = PathBuf::from(backup);
        if backup.exists() {
            fs::remove_file(&backup)?;
        }
        fs::rename(&self.path, &backup)?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.limit {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }
}

/// Cloneable handle to the active output target.
#[derive(Clone)]
pub struct SharedSink {
    target: Arc<Mutex<Target>>,
}

impl Default for SharedSink {
    fn default() -> Self {
        Self::console()
    }
}

impl SharedSink {
    /// A sink writing to stderr.
    pub fn console() -> Self {
        Self {
            target: Arc::new(Mutex::new(Target::Console)),
        }
    }

    /// Switch output to `path` with the default rotation size.
    ///
    /// On failure the previous target stays active.
    pub fn use_file(&self, path: &Path) -> io::Result<()> {
        self.use_file_with_limit(path, ROTATE_BYTES)
    }

    /// Switch output to `path`, rotating at `limit` bytes.
    pub fn use_file_with_limit(&self, path: &Path, limit: u64) -> io::Result<()> {
        let file = RotatingFile::open(path, limit)?;
        *self.target.lock() = Target::File(file);
        Ok(())
    }

    /// Switch output back to the console.
    pub fn use_console(&self) {
        *self.target.lock() = Target::Console;
    }

    /// Path of the active log file, if any.
    pub fn file_path(&self) -> Option<PathBuf> {
        match &*self.target.lock() {
            Target::File(f) => Some(f.path.clone()),
            Target::Console => None,
        }
    }
}

/// Writer returned by [`SharedSink`] for one formatted event.
pub struct SinkWriter {
    target: Arc<Mutex<Target>>,
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut *self.target.lock() {
            Target::Console => io::stderr().write(buf),
            Target::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.target.lock() {
            Target::Console => io::stderr().flush(),
            Target::File(f) => f.file.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for SharedSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            target: self.target.clone(),
        }
    }
}
