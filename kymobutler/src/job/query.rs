//! Kinds of request the service understands.

use std::fmt;

use crate::response::fields;

/// The three queries of the service protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Usage statistics and API version.
    Stats,
    /// Kymograph analysis.
    Analysis,
    /// Upload of a kymograph with corrected tracks.
    Upload,
}

impl Query {
    /// Value of the `query` form field.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Stats => fields::QUERY_STATS,
            Self::Analysis => fields::QUERY_ANALYSIS,
            Self::Upload => fields::QUERY_UPLOAD,
        }
    }

    /// Status text shown once the query completes, followed by the elapsed time.
    pub fn completion_label(&self) -> &'static str {
        match self {
            Self::Stats => "Information retrieved in",
            Self::Analysis => "Analysis performed in",
            Self::Upload => "Upload performed in",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_protocol() {
        assert_eq!(Query::Stats.tag(), "stats");
        assert_eq!(Query::Analysis.tag(), "analysis");
        assert_eq!(Query::Upload.tag(), "upload");
        assert_eq!(Query::Analysis.to_string(), "analysis");
    }
}
