//! @ai:module:intent Run text transforms over pipeline files (null, stream, buffer)
//! @ai:module:layer infrastructure
//! @ai:module:public_api TextTransform, PipelineFile, SourceFile, Contents, FileAdapter, RunReport, discover
//! @ai:module:depends_on error
//! @ai:module:thread_safe true

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent A whole-file text rewrite
pub trait TextTransform: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, text: &str) -> Result<String>;
}

/// @ai:intent File handed over by a host build pipeline
pub trait PipelineFile {
    fn path(&self) -> &Path;
    fn is_null(&self) -> bool;
    fn is_stream(&self) -> bool;
    fn is_buffer(&self) -> bool;
    /// Buffered bytes, `None` unless `is_buffer`.
    fn buffer(&self) -> Option<&[u8]>;
    fn set_buffer(&mut self, bytes: Vec<u8>);
}

/// @ai:intent Content of a SourceFile
pub enum Contents {
    Null,
    Stream(Box<dyn Read + Send>),
    Buffer(Vec<u8>),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Null => f.write_str("Null"),
            Contents::Stream(_) => f.write_str("Stream(..)"),
            Contents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
        }
    }
}

/// @ai:intent Default PipelineFile: a path, the directory it is relative to, and its contents
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub base: PathBuf,
    pub contents: Contents,
}

impl SourceFile {
    pub fn buffer(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_contents(path.into(), Contents::Buffer(bytes.into()))
    }

    pub fn null(path: impl Into<PathBuf>) -> Self {
        Self::with_contents(path.into(), Contents::Null)
    }

    pub fn stream(path: impl Into<PathBuf>, reader: impl Read + Send + 'static) -> Self {
        Self::with_contents(path.into(), Contents::Stream(Box::new(reader)))
    }

    fn with_contents(path: PathBuf, contents: Contents) -> Self {
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            base,
            contents,
        }
    }

    /// @ai:intent Load a file from disk as a buffer
    /// @ai:effects fs:read
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::buffer(path, bytes))
    }

    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// @ai:intent Path relative to `base`, falling back to the file name
    pub fn relative(&self) -> PathBuf {
        match self.path.strip_prefix(&self.base) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => self
                .path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| self.path.clone()),
        }
    }

    /// @ai:intent Write buffered contents to `out_dir/relative` or back in place
    /// @ai:post returns the written path, or None for non-buffer files
    /// @ai:effects fs:write
    pub fn write(&self, out_dir: Option<&Path>) -> Result<Option<PathBuf>> {
        let Contents::Buffer(bytes) = &self.contents else {
            return Ok(None);
        };

        let destination = match out_dir {
            Some(dir) => dir.join(self.relative()),
            None => self.path.clone(),
        };

        let write_err = |source| Error::FileWrite {
            path: destination.clone(),
            source,
        };
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&destination, bytes).map_err(write_err)?;

        Ok(Some(destination))
    }
}

impl PipelineFile for SourceFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    fn is_buffer(&self) -> bool {
        matches!(self.contents, Contents::Buffer(_))
    }

    fn buffer(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    fn set_buffer(&mut self, bytes: Vec<u8>) {
        self.contents = Contents::Buffer(bytes);
    }
}

/// @ai:intent A file dropped from the output because its transform failed
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// @ai:intent Outcome of running the adapter over a batch of files
#[derive(Debug)]
pub struct RunReport<F> {
    pub transform: String,
    pub files: Vec<F>,
    pub failures: Vec<FileFailure>,
}

impl<F> RunReport<F> {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// @ai:intent Serializable view of a run, used for CLI output
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub transform: String,
    pub written: Vec<PathBuf>,
    pub failures: Vec<FailureRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub path: PathBuf,
    pub code: String,
    pub message: String,
}

impl RunSummary {
    pub fn new(transform: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self, path: &Path, error: &Error) {
        self.failures.push(FailureRecord {
            path: path.to_path_buf(),
            code: error.code().to_string(),
            message: error.to_string(),
        });
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// @ai:intent Applies a chain of text transforms to pipeline files
pub struct FileAdapter {
    transforms: Vec<Box<dyn TextTransform>>,
}

impl FileAdapter {
    pub fn new<T: TextTransform + 'static>(transform: T) -> Self {
        Self {
            transforms: vec![Box::new(transform)],
        }
    }

    /// @ai:intent Append a transform that runs on the output of the previous ones
    pub fn then<T: TextTransform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn name(&self) -> String {
        self.transforms
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// @ai:intent Transform one file according to its content mode
    /// @ai:post null files and files that are neither stream nor buffer come back untouched
    /// @ai:effects fs:read
    /// @ai:edge_cases stream files fail with UnsupportedStream
    pub fn process<F: PipelineFile>(&self, mut file: F) -> Result<F> {
        if file.is_null() {
            return Ok(file);
        }

        if file.is_stream() {
            return Err(Error::UnsupportedStream);
        }

        if !file.is_buffer() {
            return Ok(file);
        }

        let mut text = {
            let bytes = file.buffer().unwrap_or_default();
            String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidUtf8 {
                path: file.path().to_path_buf(),
            })?
        };

        for transform in &self.transforms {
            text = transform.apply(&text)?;
            tracing::debug!("{}: applied {}", file.path().display(), transform.name());
        }

        file.set_buffer(text.into_bytes());
        Ok(file)
    }

    /// @ai:intent Process a batch; a failing file is reported and dropped, the rest continue
    /// @ai:effects fs:read
    pub fn run<F, I>(&self, files: I) -> RunReport<F>
    where
        F: PipelineFile,
        I: IntoIterator<Item = F>,
    {
        let mut report = RunReport {
            transform: self.name(),
            files: Vec::new(),
            failures: Vec::new(),
        };

        for file in files {
            let path = file.path().to_path_buf();
            match self.process(file) {
                Ok(file) => report.files.push(file),
                Err(error) => {
                    tracing::warn!("{}: {}", path.display(), error);
                    report.failures.push(FileFailure { path, error });
                }
            }
        }

        report
    }
}

/// @ai:intent List files to process under a path, filtered by extension
/// @ai:post a file path is returned as is, whatever its extension
/// @ai:effects fs:read
pub fn discover(path: &Path, extensions: &[String]) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_extension(p, extensions))
        .collect();

    files.sort();
    files
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.trim_start_matches('.') == ext))
}
