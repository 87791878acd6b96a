/// Identifier for a derived node within a [`DependencyGraph`](crate::DependencyGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena slot of the node.
    pub fn index(&self) -> usize {
        self.0
    }
}
