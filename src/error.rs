use std::fmt;
use std::io;
use std::path::PathBuf;

/// Every failure that aborts a link run.
#[derive(Debug)]
pub enum LinkError {
    /// The root directory could not be made absolute.
    InvalidRoot { path: PathBuf, source: io::Error },
    Io { path: PathBuf, source: io::Error },
    Walk(walkdir::Error),
    Glob(globset::Error),
    /// Only raised under `ParsePolicy::Strict`.
    ConfigParse { path: PathBuf, source: serde_json::Error },
    InvalidRule(&'static str),
    Template { name: &'static str, source: minijinja::Error },
    UnknownVariable { name: &'static str, variable: String },
}

impl LinkError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoot { path, source } => {
                write!(f, "cannot resolve root directory {}: {source}", path.display())
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Walk(err) => write!(f, "walk failed: {err}"),
            Self::Glob(err) => write!(f, "invalid exclude pattern: {err}"),
            Self::ConfigParse { path, source } => {
                write!(f, "cannot parse {}: {source}", path.display())
            }
            Self::InvalidRule(msg) => f.write_str(msg),
            Self::Template { name, source } => write!(f, "{name} template: {source}"),
            Self::UnknownVariable { name, variable } => {
                write!(f, "{name} template: undefined variable `{variable}`")
            }
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRoot { source, .. } | Self::Io { source, .. } => Some(source),
            Self::Walk(err) => Some(err),
            Self::Glob(err) => Some(err),
            Self::ConfigParse { source, .. } => Some(source),
            Self::Template { source, .. } => Some(source),
            Self::InvalidRule(_) | Self::UnknownVariable { .. } => None,
        }
    }
}

impl From<walkdir::Error> for LinkError {
    fn from(err: walkdir::Error) -> Self {
        Self::Walk(err)
    }
}

impl From<globset::Error> for LinkError {
    fn from(err: globset::Error) -> Self {
        Self::Glob(err)
    }
}
