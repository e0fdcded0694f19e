pub mod search_graph;

pub use search_graph::{Node, NodeId, NodeValue, SearchDag};

#[cfg(test)]
mod tests;
