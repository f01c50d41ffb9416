//! Field paths for reaching into nested configuration.
//!
//! A path is a delimiter-separated list of segments. Plain segments name a
//! text key, bracketed integers (`[0]`, `[-1]`) are either a sequence index
//! or an integer map key.

use std::fmt;

use crate::key::Key;

/// Represents a path to a value in a configuration tree
///
/// # Examples
///
/// - `server.port` - key `port` of map `server`
/// - `hosts.[0]` - first element of sequence `hosts`
/// - `[1].x` - key `x` under the integer key `1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// The raw path string
    pub raw: String,
    /// Parsed path segments
    pub segments: Vec<PathSegment>,
}

/// A segment in a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named key (e.g., "server", "port")
    Field(String),
    /// An integer index or key (e.g., [0], [-1])
    Index(i64),
}

impl PathSegment {
    pub fn to_key(&self) -> Key {
        match self {
            PathSegment::Field(name) => Key::Text(name.clone()),
            PathSegment::Index(i) => Key::Int(*i),
        }
    }
}

impl FieldPath {
    /// Parse a field path with a given delimiter
    ///
    /// # Example
    ///
    /// ```
    /// use configmap::FieldPath;
    ///
    /// let path = FieldPath::parse("server/hosts/[0]", "/");
    /// assert_eq!(path.segments.len(), 3);
    /// ```
    pub fn parse(path: &str, delimiter: &str) -> Self {
        let segments = path
            .split(delimiter)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('[') && s.ends_with(']') && s.len() > 2 {
                    if let Ok(index) = s[1..s.len() - 1].parse::<i64>() {
                        return PathSegment::Index(index);
                    }
                }
                PathSegment::Field(s.to_string())
            })
            .collect();

        Self {
            raw: path.to_string(),
            segments,
        }
    }

    /// Create a field path from a dotted string (common format)
    pub fn from_dotted(path: &str) -> Self {
        Self::parse(path, ".")
    }

    /// Keys to follow, in order.
    pub fn keys(&self) -> Vec<Key> {
        self.segments.iter().map(PathSegment::to_key).collect()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_parse() {
        let path = FieldPath::parse("server.tls.cert", ".");

        assert_eq!(path.segments.len(), 3);
        assert_eq!(path.segments[0], PathSegment::Field("server".to_string()));
        assert_eq!(path.segments[1], PathSegment::Field("tls".to_string()));
        assert_eq!(path.segments[2], PathSegment::Field("cert".to_string()));
    }

    #[test]
    fn test_field_path_with_index() {
        let path = FieldPath::parse("hosts.[0].name", ".");

        assert_eq!(path.segments[1], PathSegment::Index(0));
        assert_eq!(
            path.keys(),
            vec![Key::from("hosts"), Key::Int(0), Key::from("name")]
        );
    }

    #[test]
    fn test_negative_index_and_literal_brackets() {
        let path = FieldPath::from_dotted("a.[-1].[x].[]");

        assert_eq!(path.segments[1], PathSegment::Index(-1));
        assert_eq!(path.segments[2], PathSegment::Field("[x]".to_string()));
        assert_eq!(path.segments[3], PathSegment::Field("[]".to_string()));
        assert_eq!(path.to_string(), "a.[-1].[x].[]");
    }
}
