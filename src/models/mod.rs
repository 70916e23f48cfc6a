//! 数据模型层

pub mod render_tree;

pub use render_tree::{NodeId, NodeKind, RenderTree, RenderTreeError};
