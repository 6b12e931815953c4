use std::fmt;

/// Which structural marker the locator failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    SceneHeader,
    GroupColumn,
    SectionBoundary,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::SceneHeader => write!(f, "scene header row"),
            Marker::GroupColumn => write!(f, "group column"),
            Marker::SectionBoundary => write!(f, "cabinet boundary row"),
        }
    }
}

/// Fatal parse failures. Any of these aborts the whole pipeline before output;
/// per-row anomalies (bad brightness tokens, malformed addresses) are
/// defaulted in the row extractor and never reach this type.
#[derive(Debug)]
pub enum ParseError {
    /// Fewer than the minimum viable 5 rows of input.
    EmptyOrTooShortInput,
    /// A required structural marker was absent. `section` names the cabinet
    /// being processed in multi-section mode.
    StructureNotFound {
        marker: Marker,
        section: Option<String>,
    },
    /// The scene-name row held no usable scene names.
    NoNamedScenesFound { section: Option<String> },
    /// The row grid loader could not decode the input.
    Csv(csv::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyOrTooShortInput => {
                write!(f, "CSV input is too short or empty (need at least 5 rows)")
            }
            ParseError::StructureNotFound { marker, section } => match section {
                Some(name) => write!(f, "could not find {marker} in cabinet \"{name}\""),
                None => write!(f, "could not find {marker} in CSV"),
            },
            ParseError::NoNamedScenesFound { section } => match section {
                Some(name) => write!(f, "no scene names found in cabinet \"{name}\""),
                None => write!(f, "no scene names found in CSV"),
            },
            ParseError::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        ParseError::Csv(e)
    }
}

impl ParseError {
    /// Attach the cabinet name to a structural error raised while processing
    /// one section, so the caller can tell which cabinet was malformed.
    pub fn in_section(self, name: &str) -> Self {
        match self {
            ParseError::StructureNotFound { marker, .. } => ParseError::StructureNotFound {
                marker,
                section: Some(name.to_string()),
            },
            ParseError::NoNamedScenesFound { .. } => ParseError::NoNamedScenesFound {
                section: Some(name.to_string()),
            },
            other => other,
        }
    }
}
