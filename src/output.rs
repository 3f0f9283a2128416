use crate::error::PersistenceError;
use crate::script::SqlScript;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Writes scripts as `<table>.sql` files, never overwriting an existing file
pub struct ScriptWriter {
    output_dir: PathBuf,
}

impl ScriptWriter {
    /// Create a writer for `output_dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, PersistenceError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).map_err(|source| PersistenceError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        Ok(ScriptWriter { output_dir })
    }

    /// Candidate path for attempt `n`: `<table>.sql`, then `<table>_1.sql`, `<table>_2.sql`, ...
    fn candidate(&self, table: &str, n: usize) -> PathBuf {
        let filename = if n == 0 {
            format!("{}.sql", table)
        } else {
            format!("{}_{}.sql", table, n)
        };
        self.output_dir.join(filename)
    }

    /// Write the rendered script to the first free filename and return its path
    pub fn write(&self, table: &str, script: &SqlScript) -> Result<PathBuf, PersistenceError> {
        let content = script.render();

        let mut attempt = 0;
        loop {
            let path = self.candidate(table, attempt);
            attempt += 1;
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "file exists, trying next suffix");
                    continue;
                }
                Err(source) => return Err(PersistenceError::Write { path, source }),
            };

            file.write_all(content.as_bytes())
                .and_then(|_| file.flush())
                .map_err(|source| PersistenceError::Write {
                    path: path.clone(),
                    source,
                })?;

            tracing::info!(path = %path.display(), bytes = content.len(), "wrote SQL script");
            return Ok(path);
        }
    }
}

/// Write a rendered script to any writer (stdout, a buffer)
pub fn write_script<W: Write>(mut writer: W, script: &SqlScript) -> std::io::Result<()> {
    writer.write_all(script.render().as_bytes())?;
    writer.flush()
}
