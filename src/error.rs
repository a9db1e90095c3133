// src/error.rs

use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything the chart/store pipeline can fail with.
///
/// Per-row problems (bad field counts, unparseable durations, footnote
/// fetch failures) never surface here; they degrade the affected row and
/// are logged instead. A value of this type always aborts the whole query.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error for {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("malformed url {href:?}")]
    MalformedUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no such developer: {0:?}")]
    NoSuchDeveloper(String),

    #[error("cache error at {}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A cache blob exists but does not deserialize. Deliberately a hard
    /// error rather than a silent refetch: a corrupt file on disk is worth
    /// a human look before it gets papered over.
    #[error("corrupt cache entry at {}, delete it to refetch", path.display())]
    CorruptCache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("alias file error at {}", path.display())]
    AliasFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad alias entry: {0}")]
    Alias(String),
}

impl Error {
    pub fn transport<E>(url: &url::Url, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport { url: url.to_string(), source: Box::new(source) }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
