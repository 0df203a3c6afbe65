//! Breakpoint locations and their resolution to source positions

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// What kind of place a breakpoint request points at
///
/// Only `FileLine` can ever be bound; every other kind stays pending for the
/// life of the breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Source file and line
    FileLine,
    /// Function name plus offset
    FunctionOffset,
    /// Code context supplied by the front-end
    CodeContext,
    /// Raw code address
    CodeAddress,
    /// Data breakpoint expression
    DataString,
}

impl LocationKind {
    /// Whether a breakpoint of this kind can be placed in a session
    pub fn is_bindable(self) -> bool {
        self == Self::FileLine
    }

    /// Guess the kind of a user-typed location like `"main.r:42"` or `"main"`
    ///
    /// A trailing `:<digits>` means file and line; Windows drive prefixes
    /// such as `C:\src\main.r:10` are handled by looking at the last colon.
    pub fn classify(spec: &str) -> Self {
        match spec.rsplit_once(':') {
            Some((file, line))
                if !file.is_empty() && !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) =>
            {
                Self::FileLine
            }
            _ => Self::FunctionOffset,
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileLine => write!(f, "file-line"),
            Self::FunctionOffset => write!(f, "function-offset"),
            Self::CodeContext => write!(f, "code-context"),
            Self::CodeAddress => write!(f, "code-address"),
            Self::DataString => write!(f, "data-string"),
        }
    }
}

/// Opaque reference to a document position, owned by the front-end
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved source position with zero-based lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPosition {
    pub file: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
}

impl DocumentPosition {
    pub fn new(file: impl Into<PathBuf>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

/// Turns a front-end document reference into a file and line range
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, document: &DocumentRef) -> Result<DocumentPosition>;
}

/// Where a pending breakpoint wants to go, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationDescriptor {
    kind: LocationKind,
    position: Option<DocumentPosition>,
}

impl LocationDescriptor {
    /// Descriptor for a kind that carries no source position
    pub fn unpositioned(kind: LocationKind) -> Self {
        Self { kind, position: None }
    }

    /// Descriptor for a resolved file and line range
    pub fn file_line(position: DocumentPosition) -> Result<Self> {
        if position.end_line < position.start_line {
            return Err(Error::InvalidLocation(format!(
                "{}: range ends on line {} before it starts on line {}",
                position.file.display(),
                position.end_line,
                position.start_line
            )));
        }
        if position.start_line == u32::MAX {
            return Err(Error::InvalidLocation(format!(
                "{}: line {} has no one-based equivalent",
                position.file.display(),
                position.start_line
            )));
        }
        Ok(Self {
            kind: LocationKind::FileLine,
            position: Some(position),
        })
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    pub fn position(&self) -> Option<&DocumentPosition> {
        self.position.as_ref()
    }

    pub fn file(&self) -> Option<&Path> {
        self.position.as_ref().map(|p| p.file.as_path())
    }

    /// One-based line as shown to users and sent to the session
    pub fn line(&self) -> Option<u32> {
        self.position.as_ref().and_then(|p| p.start_line.checked_add(1))
    }

    /// File and one-based line, present only for bindable locations
    pub fn file_and_line(&self) -> Option<(&Path, u32)> {
        if !self.kind.is_bindable() {
            return None;
        }
        Some((self.file()?, self.line()?))
    }
}

impl fmt::Display for LocationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.file(), self.line()) {
            (Some(file), Some(line)) => write!(f, "{}:{}", file.display(), line),
            _ => write!(f, "<{}>", self.kind),
        }
    }
}

/// Resolves `path:line` references against the local filesystem
///
/// The line in the reference is one-based, as typed by a user. The file must
/// exist and contain that line.
#[derive(Debug, Default, Clone)]
pub struct PathResolver {
    base: Option<PathBuf>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base` instead of the working directory
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl LocationResolver for PathResolver {
    fn resolve(&self, document: &DocumentRef) -> Result<DocumentPosition> {
        let reference = document.as_str();
        let (file_part, line_part) = reference
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidLocation(format!("expected file:line, got '{}'", reference)))?;

        let line: u32 = line_part
            .parse()
            .map_err(|_| Error::InvalidLocation(format!("invalid line number: {}", line_part)))?;
        if line == 0 {
            return Err(Error::InvalidLocation(format!(
                "line numbers start at 1: {}",
                reference
            )));
        }

        let path = match &self.base {
            Some(base) => base.join(file_part),
            None => PathBuf::from(file_part),
        };
        let file = path
            .canonicalize()
            .map_err(|e| Error::unresolved(reference, e.to_string()))?;

        let content = std::fs::read_to_string(&file).map_err(|e| Error::FileRead {
            path: file.display().to_string(),
            error: e.to_string(),
        })?;
        let line_count = content.lines().count() as u32;
        if line > line_count {
            return Err(Error::unresolved(
                reference,
                format!("file has only {} lines", line_count),
            ));
        }

        Ok(DocumentPosition::new(file, line - 1, line - 1))
    }
}
