//! Writes formatted values into a shared LaTeX definitions file.
//!
//! Each value becomes a `\newcommand` line keyed by name, so a document can
//! `\input` the file and reference computed results without manual edits.
//! An update replaces the payload of an existing definition in place,
//! keeping first-appearance order; the whole read-modify-write runs under
//! an exclusive lock on the destination.

use std::{
    fs::{ File, OpenOptions },
    io::{ Read, Seek, SeekFrom, Write },
    path::{ Path, PathBuf },
};
use fs2::FileExt;
use thiserror::Error;
use crate::{
    display::{ self, format_entries, Style, DEFAULT_SIG_FIGS },
    value::Value,
};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output: couldn't open file '{0}': {1}")]
    FileOpen(String, String),

    #[error("output: couldn't lock file '{0}': {1}")]
    FileLock(String, String),

    #[error("output: couldn't read file '{0}': {1}")]
    FileRead(String, String),

    #[error("output: couldn't write to file '{0}': {1}")]
    FileWrite(String, String),

    #[error(transparent)]
    Display(#[from] display::DisplayError),
}
pub type OutputResult<T> = Result<T, OutputError>;

// holds the destination open under an exclusive advisory lock; unlocking on
// drop covers every exit path, including early error returns
struct Locked {
    file: File,
}

impl Locked {
    fn open(path: &Path, path_str: &str) -> OutputResult<Self> {
        let file: File = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(|e| {
                OutputError::FileOpen(path_str.to_string(), e.to_string())
            })?;
        file.lock_exclusive()
            .map_err(|e| {
                OutputError::FileLock(path_str.to_string(), e.to_string())
            })?;
        Ok(Self { file })
    }
}

impl Drop for Locked {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Create or update `\newcommand{\<name>}{<value>}` in the file at `path`.
///
/// The file is created if missing. An existing definition keeps its
/// position and has only its payload replaced; a new one is appended on its
/// own line. The entire operation holds an exclusive lock on the
/// destination, so concurrent writers serialize rather than clobber each
/// other.
pub fn upsert_definition<P>(path: P, name: &str, value: &str)
    -> OutputResult<()>
where P: AsRef<Path>
{
    let path_str: String = path.as_ref().display().to_string();
    let lock: Locked = Locked::open(path.as_ref(), &path_str)?;
    let mut handle: &File = &lock.file;

    let mut contents: String = String::new();
    handle.read_to_string(&mut contents)
        .map_err(|e| OutputError::FileRead(path_str.clone(), e.to_string()))?;

    let header: String = format!(r"\newcommand{{\{}}}", name);
    match contents.find(&header) {
        Some(start) => {
            let payload_start: usize = start + header.len() + 1;
            let payload_end: usize = contents[payload_start..]
                .find("}\n")
                .map(|k| payload_start + k)
                .unwrap_or_else(|| contents.len().saturating_sub(1));
            contents.replace_range(payload_start..payload_end, value);
        },
        None => {
            contents.push_str(&format!("{}{{{}}}\n", header, value));
        },
    }

    handle.seek(SeekFrom::Start(0))
        .map_err(|e| OutputError::FileWrite(path_str.clone(), e.to_string()))?;
    lock.file.set_len(0)
        .map_err(|e| OutputError::FileWrite(path_str.clone(), e.to_string()))?;
    handle.write_all(contents.as_bytes())
        .map_err(|e| OutputError::FileWrite(path_str.clone(), e.to_string()))?;
    Ok(())
}

/// Caller-owned handle on a definitions file.
///
/// Carries the destination path together with the name prefix and the
/// precision applied to every value written through it; there is no
/// process-wide state.
///
/// ```no_run
/// # use texval::output::ValueFile;
/// let defs = ValueFile::new("values.tex")
///     .with_prefix("run")
///     .with_sig_figs(4);
/// defs.set("TrialCount", 128)?;
/// # Ok::<(), texval::output::OutputError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ValueFile {
    path: PathBuf,
    prefix: String,
    sig_figs: usize,
    max_dp: Option<usize>,
}

impl ValueFile {
    /// Create a handle with an empty prefix, the default significant-figure
    /// count, and unbounded decimal places.
    pub fn new<P>(path: P) -> Self
    where P: AsRef<Path>
    {
        return Self {
            path: path.as_ref().to_path_buf(),
            prefix: String::new(),
            sig_figs: DEFAULT_SIG_FIGS,
            max_dp: None,
        };
    }

    /// Prepend `prefix` to every definition name written through this
    /// handle.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Set the significant-figure count used for rounding.
    pub fn with_sig_figs(mut self, sig_figs: usize) -> Self {
        self.sig_figs = sig_figs;
        self
    }

    /// Cap the number of decimal places shown.
    pub fn with_max_dp(mut self, max_dp: usize) -> Self {
        self.max_dp = Some(max_dp);
        self
    }

    /// The destination path.
    pub fn path(&self) -> &Path { &self.path }

    /// Format `value` with the default style and upsert the result, along
    /// with any auxiliary entries it fans out to.
    pub fn set<V>(&self, name: &str, value: V) -> OutputResult<()>
    where V: Into<Value>
    {
        self.set_styled(name, value, Style::Default)
    }

    /// Format `value` with an explicit style and upsert the result.
    ///
    /// Every entry is formatted before anything is written, so a formatting
    /// failure leaves the file untouched.
    pub fn set_styled<V>(&self, name: &str, value: V, style: Style)
        -> OutputResult<()>
    where V: Into<Value>
    {
        let value: Value = value.into();
        let entries: Vec<(String, String)> =
            format_entries(name, &value, style, self.sig_figs, self.max_dp)?;
        for (entry_name, rendered) in entries.iter() {
            upsert_definition(
                &self.path,
                &format!("{}{}", self.prefix, entry_name),
                rendered,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::value::Measured;
    use tempfile::TempDir;

    fn defs_path(dir: &TempDir) -> PathBuf {
        dir.path().join("defs.tex")
    }

    #[test]
    fn creates_the_file_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        upsert_definition(&path, "alpha", "1").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "\\newcommand{\\alpha}{1}\n");
    }

    #[test]
    fn updates_in_place_keeping_order() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        upsert_definition(&path, "alpha", "1").unwrap();
        upsert_definition(&path, "beta", "2").unwrap();
        upsert_definition(&path, "alpha", "3").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "\\newcommand{\\alpha}{3}\n\\newcommand{\\beta}{2}\n",
        );
    }

    #[test]
    fn longer_payloads_replace_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        upsert_definition(&path, "alpha", "1").unwrap();
        upsert_definition(&path, "beta", "2").unwrap();
        upsert_definition(&path, "alpha", r"1\,230\,000").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "\\newcommand{\\alpha}{1\\,230\\,000}\n\\newcommand{\\beta}{2}\n",
        );
    }

    #[test]
    fn braces_inside_payloads_survive_updates() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        upsert_definition(&path, "eps", r"\num{1.23e-05}").unwrap();
        upsert_definition(&path, "eps", r"\num{4.56e-07}").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "\\newcommand{\\eps}{\\num{4.56e-07}}\n");
    }

    #[test]
    fn similar_names_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        upsert_definition(&path, "rate", "1").unwrap();
        upsert_definition(&path, "rateMax", "2").unwrap();
        upsert_definition(&path, "rate", "9").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "\\newcommand{\\rate}{9}\n\\newcommand{\\rateMax}{2}\n",
        );
    }

    #[test]
    fn writer_applies_prefix_and_fans_out() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        let defs = ValueFile::new(&path).with_prefix("run");
        defs.set("Count", 1234).unwrap();
        defs.set("Eff", Measured::new(10.0, 0.1)).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            concat!(
                "\\newcommand{\\runCount}{1\\,230}\n",
                "\\newcommand{\\runEffNominal}{10.0}\n",
                "\\newcommand{\\runEff}{$10.0 \\pm 0.1$}\n",
            ),
        );
    }

    #[test]
    fn days_style_writes_the_years_entry_first() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        let defs = ValueFile::new(&path);
        defs.set_styled("Age", 730, Style::Days).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "\\newcommand{\\AgeYears}{2.0}\n\\newcommand{\\Age}{730}\n",
        );
    }

    #[test]
    fn formatting_failures_write_nothing() {
        let dir = TempDir::new().unwrap();
        let path = defs_path(&dir);
        let defs = ValueFile::new(&path);
        let res = defs.set_styled("Bad", "not a number", Style::Percent);
        assert!(res.is_err());
        assert!(!path.exists());
    }
}
