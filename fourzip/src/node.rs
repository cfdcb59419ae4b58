use std::fmt;

use crate::coordinate::Quadrant;

/// A node of the quadtree.
///
/// A leaf covers a block where every pixel has the same value. A split
/// covers a block that is not uniform, and holds one child per [Quadrant]
/// in [Quadrant::ALL] order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuadNode {
    /// A uniform block of a single grayscale value.
    Leaf(u8),

    /// A block divided into four equal sub-blocks.
    Split(Box<[QuadNode; 4]>),
}

impl QuadNode {
    pub fn leaf(value: u8) -> Self {
        QuadNode::Leaf(value)
    }

    /// Create a split node. The argument order is the storage order and
    /// must not be changed.
    pub fn split(ul: QuadNode, ur: QuadNode, ll: QuadNode, lr: QuadNode) -> Self {
        QuadNode::Split(Box::new([ul, ur, ll, lr]))
    }

    /// Create a split node from children already in [Quadrant::ALL] order.
    pub fn from_children(children: [QuadNode; 4]) -> Self {
        QuadNode::Split(Box::new(children))
    }

    pub fn is_split(&self) -> bool {
        matches!(self, QuadNode::Split(_))
    }

    /// The grayscale value of a leaf, or `None` for a split node.
    pub fn leaf_value(&self) -> Option<u8> {
        match self {
            QuadNode::Leaf(value) => Some(*value),
            QuadNode::Split(_) => None,
        }
    }

    /// The children of a split node, or `None` for a leaf.
    pub fn children(&self) -> Option<&[QuadNode; 4]> {
        match self {
            QuadNode::Leaf(_) => None,
            QuadNode::Split(children) => Some(children),
        }
    }

    /// Get one child of a split node.
    ///
    /// # Panics
    /// Panics if this node is a leaf.
    pub fn child(&self, quadrant: Quadrant) -> &QuadNode {
        match self {
            QuadNode::Split(children) => &children[quadrant.index()],
            QuadNode::Leaf(value) => panic!("leaf node ({value}) has no {quadrant:?} child"),
        }
    }

    /// Number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        match self {
            QuadNode::Leaf(_) => 1,
            QuadNode::Split(children) => 1 + children.iter().map(QuadNode::node_count).sum::<usize>(),
        }
    }

    /// Height of this subtree. A leaf has depth 0.
    pub fn depth(&self) -> u32 {
        match self {
            QuadNode::Leaf(_) => 0,
            QuadNode::Split(children) => {
                1 + children.iter().map(QuadNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Preorder rendering: `7` for a leaf, `(a b c d)` for a split.
impl fmt::Display for QuadNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadNode::Leaf(value) => write!(f, "{value}"),
            QuadNode::Split(children) => {
                let [ul, ur, ll, lr] = &**children;
                write!(f, "({ul} {ur} {ll} {lr})")
            }
        }
    }
}
