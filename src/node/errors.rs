use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structural problems found while parsing config text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("closing brace without a matching open block")]
    UnbalancedClose,

    #[error("end of input inside block '{name}' opened on line {opened}")]
    UnclosedNode { name: String, opened: usize },

    #[error("unparseable line: {text}")]
    UnparseableLine { text: String },

    #[error("assignment with an empty key")]
    EmptyKey,

    #[error("block header '{name}' is not followed by an opening brace")]
    DanglingHeader { name: String },

    #[error("opening brace without a block header")]
    MissingHeader,

    #[error("'{text}' contains text that cannot be written unquoted ('//', braces or a line break)")]
    ReservedText { text: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}line {line}: {kind}", location(.path))]
    Syntax {
        path: Option<PathBuf>,
        line: usize,
        kind: SyntaxError,
    },
}

fn location(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!("{}, ", path.display()),
        None => String::new(),
    }
}

impl ParseError {
    pub(crate) fn syntax(line: usize, kind: SyntaxError) -> Self {
        ParseError::Syntax {
            path: None,
            line,
            kind,
        }
    }

    pub(crate) fn with_path(self, path: &Path) -> Self {
        match self {
            ParseError::Syntax {
                path: None,
                line,
                kind,
            } => ParseError::Syntax {
                path: Some(path.to_path_buf()),
                line,
                kind,
            },
            other => other,
        }
    }

    /// The structural error, if this is not an I/O failure.
    pub fn syntax_kind(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax { kind, .. } => Some(kind),
            ParseError::Io { .. } => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Io { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path_when_known() {
        let err = ParseError::syntax(3, SyntaxError::UnbalancedClose)
            .with_path(Path::new("Parts/tank.cfg"));
        assert_eq!(
            err.to_string(),
            "Parts/tank.cfg, line 3: closing brace without a matching open block"
        );
    }

    #[test]
    fn display_without_path() {
        let err = ParseError::syntax(1, SyntaxError::EmptyKey);
        assert_eq!(err.to_string(), "line 1: assignment with an empty key");
    }
}
