use serde::Serialize;
use thiserror::Error;

/// Errors that abort a resolver operation.
///
/// Per-sheet authoring problems are not errors; they are reported as
/// [`Defect`]s and the sheet simply contributes nothing.
#[derive(Error, Debug)]
pub enum CrypticError {
    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("parse error: {message} (path: {path})")]
    Parse { message: String, path: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid term: {message}")]
    InvalidTerm { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `CrypticError`.
pub type Result<T> = std::result::Result<T, CrypticError>;

/// Why a synonym jump could not be followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RedirectFault {
    /// The bucket file the target should live in does not exist.
    MissingFile,
    /// The target term is not in its bucket.
    MissingTarget,
    /// The target has several meanings and the redirect names none of them.
    Ambiguous { categories: Vec<String> },
    /// The redirect names a category the target does not have.
    MissingCategory { category: String },
    /// The target is itself a redirect; only one hop is followed.
    Chained { next: String },
    /// The target exists but carries no usable meaning.
    EmptyTarget,
}

impl std::fmt::Display for RedirectFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedirectFault::MissingFile => write!(f, "target file does not exist"),
            RedirectFault::MissingTarget => write!(f, "target term does not exist"),
            RedirectFault::Ambiguous { categories } => write!(
                f,
                "target has multiple meanings ({}), specify one as TERM.CATEGORY",
                categories.join(", ")
            ),
            RedirectFault::MissingCategory { category } => {
                write!(f, "target has no category '{category}'")
            }
            RedirectFault::Chained { next } => {
                write!(f, "target redirects again to '{next}'")
            }
            RedirectFault::EmptyTarget => write!(f, "target has no meaning"),
        }
    }
}

/// A data-authoring or loading problem confined to a single sheet.
///
/// Defects never abort a query: the affected sheet counts as "not found" and
/// the remaining sheets are still searched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "defect")]
pub enum Defect {
    #[error("malformed entry `{term}` in `{file}.toml` of sheet `{sheet}`")]
    MalformedEntry {
        sheet: String,
        file: String,
        term: String,
    },

    #[error(
        "synonym jumps to a wrong place at `{target}` (from `{term}`): {reason}; \
         please consider fixing this in `{file}.toml` of the sheet `{sheet}`"
    )]
    BrokenRedirect {
        sheet: String,
        file: String,
        term: String,
        target: String,
        reason: RedirectFault,
    },

    #[error(
        "category `{term}` in `{file}.toml` of sheet `{sheet}` redirects to `{target}`; \
         a category must define its meaning directly"
    )]
    RedirectingCategory {
        sheet: String,
        file: String,
        term: String,
        target: String,
    },

    #[error("failed to load `{file}.toml` of sheet `{sheet}`: {message}")]
    LoaderFailure {
        sheet: String,
        file: String,
        message: String,
    },
}

impl Defect {
    /// Name of the sheet the defect was found in.
    pub fn sheet(&self) -> &str {
        match self {
            Defect::MalformedEntry { sheet, .. }
            | Defect::BrokenRedirect { sheet, .. }
            | Defect::RedirectingCategory { sheet, .. }
            | Defect::LoaderFailure { sheet, .. } => sheet,
        }
    }
}
