use std::fmt;

/// Opaque tournament identifier handed over by the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameCode(String);

impl GameCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `games/{code}`
    pub fn doc(&self) -> DocPath {
        DocPath(format!("games/{}", self.0))
    }

    /// `games/{code}/players`
    pub fn players(&self) -> CollectionPath {
        CollectionPath(format!("games/{}/players", self.0))
    }

    /// `games/{code}/tables`
    pub fn tables(&self) -> CollectionPath {
        CollectionPath(format!("games/{}/tables", self.0))
    }

    pub fn player(&self, player_id: &str) -> DocPath {
        self.players().child(player_id)
    }

    pub fn table(&self, table_id: u32) -> DocPath {
        self.tables().child(&table_id.to_string())
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

impl DocPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The collection this document lives in, if it is not top-level.
    pub fn collection(&self) -> Option<CollectionPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| CollectionPath(parent.to_string()))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn child(&self, id: &str) -> DocPath {
        DocPath(format!("{}/{}", self.0, id))
    }

    /// Whether `path` is a direct child of this collection.
    pub fn contains(&self, path: &str) -> bool {
        path.strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|id| !id.is_empty() && !id.contains('/'))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
