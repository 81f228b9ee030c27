//! The collection store.
//!
//! Layout on disk:
//!
//! ```text
//! <root>/
//!   <collection>/
//!     <resource>.json
//! ```
//!
//! Writes and deletes of one collection are serialized through that
//! collection's lock. Reads take no lock; they rely on writes landing via
//! temp file + rename, so a reader sees either the old or the new document.
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError};

use serde::{de::DeserializeOwned, Serialize};

use anyhow::{Context, Result};

use crate::codec;
use crate::error::StoreError;
use crate::locks::{LockRegistry, RootLock};
use crate::logger::{FacadeLogger, Logger};

const DOC_EXT: &str = ".json";
const TMP_EXT: &str = ".tmp";

/// Construction-time settings of a [`Driver`].
#[derive(Default)]
pub struct Options {
    /// Where diagnostics go. `None` means `FacadeLogger` at `Info`, which
    /// hands records to the `log` facade: nothing reaches the console
    /// unless the application installs a `log` backend such as
    /// `pretty_env_logger`.
    pub logger: Option<Arc<dyn Logger>>,
    /// Hold an advisory lock on the root for the driver's lifetime.
    pub exclusive: bool,
}

pub struct Driver {
    dir: PathBuf,
    locks: LockRegistry,
    log: Arc<dyn Logger>,
    _root_lock: Option<RootLock>,
}

/// What a `<collection>[/<resource>]` path points at.
enum Target {
    Directory(PathBuf),
    Document(PathBuf),
    Missing,
}

fn resolve(path: &Path) -> Target {
    if path.is_dir() {
        return Target::Directory(path.to_path_buf());
    }
    let doc = with_suffix(path, DOC_EXT);
    if doc.is_file() {
        Target::Document(doc)
    } else {
        Target::Missing
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

/// Lexically normalize a path: drop `.`, fold `..` into the preceding
/// segment when there is one.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

fn check_names(collection: &str, resource: &str, op: Op) -> Result<()> {
    if collection.is_empty() {
        return Err(StoreError::MissingCollection(op.no_collection()).into());
    }
    if resource.is_empty() {
        return Err(StoreError::MissingResource(op.no_resource()).into());
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Op {
    Save,
    Read,
}

impl Op {
    fn no_collection(self) -> &'static str {
        match self {
            Op::Save => "no place to save record",
            Op::Read => "no place to read record",
        }
    }

    fn no_resource(self) -> &'static str {
        match self {
            Op::Save => "unable to save record (no name)",
            Op::Read => "unable to read record (no name)",
        }
    }
}

impl Driver {
    /// Open (or create) a store rooted at `dir` with default options.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::with_options(dir, Options::default())
    }

    /// Open (or create) a store rooted at `dir`.
    ///
    /// Only the last path segment is created; missing parents are an error.
    pub fn with_options<P: AsRef<Path>>(dir: P, options: Options) -> Result<Self> {
        let dir = clean(dir.as_ref());
        let log = options
            .logger
            .unwrap_or_else(|| Arc::new(FacadeLogger::default()));

        if dir.is_dir() {
            log.debug(format_args!("Using {:?} (database already exists)", dir));
        } else {
            log.debug(format_args!("Creating the database at {:?}...", dir));
            fs::create_dir(&dir).with_context(|| format!("can't create database dir {:?}", dir))?;
        }

        let root_lock = if options.exclusive {
            Some(RootLock::acquire(&dir)?)
        } else {
            None
        };

        Ok(Driver {
            dir,
            locks: LockRegistry::new(),
            log,
            _root_lock: root_lock,
        })
    }

    /// Root directory of the store, normalized.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `value` as `<collection>/<resource>.json`, replacing any
    /// previous document atomically.
    pub fn write<T>(&self, collection: &str, resource: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        check_names(collection, resource, Op::Save)?;

        let lock = self.locks.get_or_create(collection);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let dir = self.dir.join(collection);
        let final_path = with_suffix(&dir.join(resource), DOC_EXT);
        let tmp_path = with_suffix(&final_path, TMP_EXT);

        let bytes = codec::encode(value)
            .with_context(|| format!("can't encode {}/{}", collection, resource))?;

        fs::create_dir_all(&dir).with_context(|| format!("can't create collection dir {:?}", dir))?;

        if let Err(e) = write_file(&tmp_path, &bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("can't move {:?} to {:?}", tmp_path, final_path));
        }

        self.log.trace(format_args!("[write] {}/{} ({} bytes)", collection, resource, bytes.len()));
        Ok(())
    }

    /// Decode `<collection>/<resource>.json` into `out`.
    ///
    /// A resource that doesn't exist is not an error: `out` is left as it
    /// was and `Ok(())` is returned. Use [`Driver::get`] to tell the cases
    /// apart.
    pub fn read<T>(&self, collection: &str, resource: &str, out: &mut T) -> Result<()>
    where
        T: DeserializeOwned,
    {
        if let Some(value) = self.get(collection, resource)? {
            *out = value;
        }
        Ok(())
    }

    /// Decode `<collection>/<resource>.json`, or `None` if it doesn't exist.
    pub fn get<T>(&self, collection: &str, resource: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        check_names(collection, resource, Op::Read)?;

        // only a name absent in both forms is a miss; anything else must
        // decode from `<resource>.json`
        let record = self.dir.join(collection).join(resource);
        let path = with_suffix(&record, DOC_EXT);
        if !record.exists() && !path.exists() {
            self.log.debug(format_args!("[read] {}/{} not found", collection, resource));
            return Ok(None);
        }

        let bytes = fs::read(&path).with_context(|| format!("can't read {:?}", path))?;
        let value = codec::decode(&bytes).with_context(|| format!("can't decode {:?}", path))?;
        Ok(Some(value))
    }

    /// Raw contents of every document in `collection`, in directory-listing
    /// order. Each entry still has to be decoded by the caller.
    pub fn read_all(&self, collection: &str) -> Result<Vec<String>> {
        if collection.is_empty() {
            return Err(StoreError::MissingCollection("no place to read records").into());
        }

        let dir = self.dir.join(collection);
        if !dir.is_dir() {
            return Err(StoreError::NotFound(PathBuf::from(collection)).into());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("can't list {:?}", dir))? {
            let entry = entry.with_context(|| format!("can't list {:?}", dir))?;
            let path = entry.path();
            if !entry.file_type()?.is_file() || path.to_string_lossy().ends_with(TMP_EXT) {
                continue;
            }
            let content = fs::read_to_string(&path).with_context(|| format!("can't read {:?}", path))?;
            records.push(content);
        }
        Ok(records)
    }

    /// Remove one document, or the whole collection when `resource` is empty.
    pub fn delete(&self, collection: &str, resource: &str) -> Result<()> {
        if collection.is_empty() {
            return Err(StoreError::MissingCollection("nothing to delete").into());
        }

        let lock = self.locks.get_or_create(collection);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let relative = if resource.is_empty() {
            PathBuf::from(collection)
        } else {
            Path::new(collection).join(resource)
        };
        match resolve(&self.dir.join(&relative)) {
            Target::Directory(dir) => {
                self.log.debug(format_args!("[delete] directory {:?}", relative));
                fs::remove_dir_all(&dir).with_context(|| format!("can't remove {:?}", dir))
            }
            Target::Document(path) => {
                self.log.debug(format_args!("[delete] document {:?}", relative));
                fs::remove_file(&path).with_context(|| format!("can't remove {:?}", path))
            }
            Target::Missing => Err(StoreError::NotFound(relative).into()),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("can't create {:?}", path))?;
    file.write_all(bytes)
        .and_then(|_| file.sync_all())
        .with_context(|| format!("can't write {:?}", path))
}
