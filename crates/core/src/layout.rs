//! Content root layout.
//!
//! Everything the service reads or writes lives under one directory:
//!
//! ```text
//! <content_root>/keys/                  public keys (*.public.asc)
//! <content_root>/drop/<session_id>/     upload targets
//! <content_root>/serve/<session_id>/    download sources (*.gpg)
//! ```
//!
//! Session directories are provisioned by an external process. Nothing here
//! creates them, and session IDs are joined verbatim without sanitisation.

use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque client-supplied token naming a drop/serve directory pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which tree of the content root a path is resolved in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Keys,
    Drop,
    Serve,
}

impl Area {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Keys => "keys",
            Self::Drop => "drop",
            Self::Serve => "serve",
        }
    }
}

/// Resolves session IDs to directories under a content root.
#[derive(Clone, Debug)]
pub struct ContentLayout {
    root: PathBuf,
}

impl ContentLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<area>[/<session>]`
    pub fn resolve(&self, area: Area, session: Option<&SessionId>) -> PathBuf {
        let base = self.root.join(area.dir_name());
        match session {
            Some(session) => base.join(session.as_str()),
            None => base,
        }
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.resolve(Area::Keys, None)
    }

    pub fn drop_dir(&self, session: &SessionId) -> PathBuf {
        self.resolve(Area::Drop, Some(session))
    }

    pub fn serve_dir(&self, session: &SessionId) -> PathBuf {
        self.resolve(Area::Serve, Some(session))
    }

    pub fn serve_file(&self, session: &SessionId, file_name: &str) -> PathBuf {
        self.serve_dir(session).join(file_name)
    }
}
