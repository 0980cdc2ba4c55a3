//! Source locations carried by parsed plans.

use std::fmt;

/// Where a plan came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    /// Source name, usually a file path
    pub source: Option<String>,
    /// 1-based line of the plan's first token
    pub line: usize,
}

impl SourceInfo {
    pub fn new(source: Option<String>, line: usize) -> Self {
        Self { source, line }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}:{}", source, self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}
