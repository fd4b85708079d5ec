use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A location inside a [`super::Document`], written as dotted keys with
/// optional `[n]` index suffixes: `regions.region_the_abyss.entities.vec_wall[0].PosX`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        for part in text.split('.').filter(|p| !p.is_empty()) {
            let (key, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            while let Some((index, consumed)) = parse_index_marker_prefix(rest) {
                segments.push(PathSegment::Index(index));
                rest = &rest[consumed..];
            }
            if !rest.is_empty() {
                // Malformed bracket text stays a literal key.
                segments.push(PathSegment::Key(rest.to_string()));
            }
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn split_last(&self) -> Option<(NodePath, &PathSegment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            NodePath {
                segments: parent.to_vec(),
            },
            last,
        ))
    }
}

impl From<&str> for NodePath {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<&String> for NodePath {
    fn from(text: &String) -> Self {
        Self::parse(text)
    }
}

impl From<&NodePath> for NodePath {
    fn from(path: &NodePath) -> Self {
        path.clone()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Parses an `[n]` marker, the key convention for sequence elements in a tree view.
pub fn parse_index_marker(text: &str) -> Option<usize> {
    match parse_index_marker_prefix(text) {
        Some((index, len)) if len == text.len() => Some(index),
        _ => None,
    }
}

fn parse_index_marker_prefix(text: &str) -> Option<(usize, usize)> {
    let inner = text.strip_prefix('[')?;
    let close = inner.find(']')?;
    let digits = &inner[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((index, close + 2))
}
