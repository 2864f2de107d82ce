//! Pan-genome graph for a single contig.
//!
//! A [`PanGraph`] bundles the node set, the edge list, and the base labels of one contig.
//! Nodes are identified by integers starting from 1.
//! The first `reference_len` nodes form the reference backbone, so the node identifier of a backbone node is also its 1-based reference coordinate.
//! Nodes created later for inserted bases receive the next unused identifiers from a [`NodeAllocator`] owned by the graph.
//! Identifiers are never reused or renumbered, including when the graph is stored and loaded again.
//!
//! All mutations go through methods that check that both endpoints of an edge exist.

use crate::utils;

use std::ops::Range;


//-----------------------------------------------------------------------------

/// Allocator for node identifiers.
///
/// Identifiers are allocated in increasing order starting from [`NodeAllocator::FIRST`].
///
/// # Examples
///
/// ```
/// use pgg_base::graph::NodeAllocator;
///
/// let mut allocator = NodeAllocator::new();
/// assert_eq!(allocator.allocate(), 1);
/// assert_eq!(allocator.allocate(), 2);
///
/// // Continue after a graph with 10 nodes.
/// let mut allocator = NodeAllocator::resume(10);
/// assert_eq!(allocator.allocate(), 11);
/// assert_eq!(allocator.allocated(), 11);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeAllocator {
    next: usize,
}

impl NodeAllocator {
    /// The first node identifier.
    pub const FIRST: usize = 1;

    /// Creates an allocator that has not allocated anything.
    pub fn new() -> Self {
        NodeAllocator { next: Self::FIRST }
    }

    /// Creates an allocator that has already allocated identifiers `1..=allocated`.
    pub fn resume(allocated: usize) -> Self {
        NodeAllocator { next: Self::FIRST + allocated }
    }

    /// Allocates the next identifier.
    pub fn allocate(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Returns the number of identifiers allocated so far.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.next - Self::FIRST
    }

    /// Returns the identifier the next call to [`NodeAllocator::allocate`] will return.
    #[inline]
    pub fn peek(&self) -> usize {
        self.next
    }
}

impl Default for NodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

//-----------------------------------------------------------------------------

/// A directed edge between two nodes.
pub type Edge = (usize, usize);

/// A pan-genome graph for a single contig.
///
/// # Examples
///
/// ```
/// use pgg_base::PanGraph;
///
/// let mut graph = PanGraph::from_reference("chr1", b"ACGT");
/// assert_eq!(graph.nodes(), 4);
/// assert_eq!(graph.edges(), &[(1, 2), (2, 3), (3, 4)]);
/// assert_eq!(graph.label(2), Some(b'C'));
///
/// // Delete the base at position 2.
/// graph.add_deletion(2, 1).unwrap();
/// // Insert two bases before position 3.
/// let inserted = graph.add_insertion(3, b"TT").unwrap();
/// assert_eq!(inserted, 5..7);
/// assert!(graph.has_edge(1, 3));
/// assert!(graph.has_edge(2, 5) && graph.has_edge(5, 6) && graph.has_edge(6, 3));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanGraph {
    contig: String,
    reference_len: usize,
    allocator: NodeAllocator,
    // Label of node `id` is at `labels[id - 1]`.
    labels: Vec<u8>,
    edges: Vec<Edge>,
}

/// Construction and loading.
impl PanGraph {
    /// Builds the initial graph for a contig from its reference sequence.
    ///
    /// The graph is a chain with one node per base and an edge between consecutive nodes.
    /// Node `i` is labeled with the `i`-th base of the sequence, normalized to `ACGTN`.
    pub fn from_reference(contig: &str, sequence: &[u8]) -> Self {
        let mut allocator = NodeAllocator::new();
        let mut labels = Vec::with_capacity(sequence.len());
        for base in sequence.iter() {
            allocator.allocate();
            labels.push(utils::normalize_base(*base));
        }
        let edges: Vec<Edge> = (NodeAllocator::FIRST..NodeAllocator::FIRST + sequence.len())
            .skip(1)
            .map(|to| (to - 1, to))
            .collect();

        PanGraph {
            contig: contig.to_string(),
            reference_len: sequence.len(),
            allocator,
            labels,
            edges,
        }
    }

    /// Creates a graph from stored parts.
    ///
    /// Node `i` gets label `labels[i - 1]`, and the next allocated identifier will be `labels.len() + 1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is longer than the node set, a label is not in `ACGTN`, or an edge refers to a missing node.
    pub fn from_parts(contig: &str, reference_len: usize, labels: Vec<u8>, edges: Vec<Edge>) -> Result<Self, String> {
        if reference_len > labels.len() {
            return Err(format!(
                "Contig {}: reference length {} exceeds node count {}", contig, reference_len, labels.len()
            ));
        }
        if let Some(offset) = labels.iter().position(|&base| utils::normalize_base(base) != base) {
            return Err(format!(
                "Contig {}: invalid label {} for node {}", contig, labels[offset] as char, offset + NodeAllocator::FIRST
            ));
        }

        let graph = PanGraph {
            contig: contig.to_string(),
            reference_len,
            allocator: NodeAllocator::resume(labels.len()),
            labels,
            edges,
        };
        for (from, to) in graph.edges.iter() {
            if !graph.has_node(*from) || !graph.has_node(*to) {
                return Err(format!("Contig {}: edge ({}, {}) refers to a missing node", contig, from, to));
            }
        }

        Ok(graph)
    }
}

//-----------------------------------------------------------------------------

/// Graph statistics and access.
impl PanGraph {
    /// Returns the name of the contig.
    #[inline]
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// Returns the length of the reference backbone.
    #[inline]
    pub fn reference_len(&self) -> usize {
        self.reference_len
    }

    /// Returns the number of nodes in the graph.
    #[inline]
    pub fn nodes(&self) -> usize {
        self.allocator.allocated()
    }

    /// Returns the number of edges in the graph, including possible duplicates.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns an iterator over node identifiers in creation order.
    pub fn node_iter(&self) -> Range<usize> {
        NodeAllocator::FIRST..self.allocator.peek()
    }

    /// Returns `true` if the graph contains the node.
    #[inline]
    pub fn has_node(&self, id: usize) -> bool {
        id >= NodeAllocator::FIRST && id < self.allocator.peek()
    }

    /// Returns `true` if the node is on the reference backbone.
    #[inline]
    pub fn is_reference_node(&self, id: usize) -> bool {
        id >= NodeAllocator::FIRST && id < NodeAllocator::FIRST + self.reference_len
    }

    /// Returns the label of the node, or [`None`] if there is no such node.
    #[inline]
    pub fn label(&self, id: usize) -> Option<u8> {
        if self.has_node(id) {
            Some(self.labels[id - NodeAllocator::FIRST])
        } else {
            None
        }
    }

    /// Returns the labels of all nodes in creation order.
    #[inline]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Returns the edges in the order they were added or, after deduplication, in sorted order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns `true` if the graph contains the edge.
    ///
    /// This is a linear scan over the edges.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Returns the identifier the next new node will get.
    #[inline]
    pub fn next_id(&self) -> usize {
        self.allocator.peek()
    }
}

//-----------------------------------------------------------------------------

/// Mutations.
impl PanGraph {
    /// Adds a new node with the given label and returns its identifier.
    ///
    /// The label is normalized to `ACGTN`.
    pub fn add_node(&mut self, base: u8) -> usize {
        let id = self.allocator.allocate();
        self.labels.push(utils::normalize_base(base));
        id
    }

    /// Adds an edge between two existing nodes.
    ///
    /// Duplicate edges are allowed until [`PanGraph::remove_duplicate_edges`] is called.
    /// Returns an error if either node does not exist.
    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<(), String> {
        if !self.has_node(from) || !self.has_node(to) {
            return Err(format!("Contig {}: cannot add edge ({}, {}) with {} nodes", self.contig, from, to, self.nodes()));
        }
        self.edges.push((from, to));
        Ok(())
    }

    /// Returns an error if `position` is not a backbone coordinate.
    fn check_position(&self, position: usize) -> Result<(), String> {
        if !self.is_reference_node(position) {
            return Err(format!(
                "Contig {}: position {} is outside the reference 1..={}", self.contig, position, self.reference_len
            ));
        }
        Ok(())
    }

    /// Adds an edge that skips `len` reference bases starting from `position`.
    ///
    /// The edge goes from node `position - 1` to node `position + len`.
    /// The deleted nodes are not removed.
    /// Returns an error if either endpoint is outside the reference backbone.
    pub fn add_deletion(&mut self, position: usize, len: usize) -> Result<(), String> {
        let from = position.saturating_sub(1);
        let to = position.checked_add(len).ok_or(format!("Contig {}: deletion length {} overflows", self.contig, len))?;
        self.check_position(from)?;
        self.check_position(to)?;
        self.add_edge(from, to)
    }

    /// Adds a chain of new nodes for bases inserted before reference `position`.
    ///
    /// The chain starts with an edge from node `position - 1` and ends with an edge to node `position`.
    /// The labels of the new nodes are the inserted bases normalized to `ACGTN`, so lower-case bases become upper-case and other symbols become `N`.
    /// Returns the range of identifiers given to the new nodes.
    /// An empty insertion changes nothing and returns an empty range.
    ///
    /// Returns an error if either anchor is outside the reference backbone.
    /// The graph is not modified in that case.
    pub fn add_insertion(&mut self, position: usize, bases: &[u8]) -> Result<Range<usize>, String> {
        let first = self.next_id();
        if bases.is_empty() {
            return Ok(first..first);
        }
        let anchor = position.saturating_sub(1);
        self.check_position(anchor)?;
        self.check_position(position)?;

        let mut prev = anchor;
        for base in bases.iter() {
            let id = self.add_node(*base);
            self.add_edge(prev, id)?;
            prev = id;
        }
        self.add_edge(prev, position)?;

        Ok(first..self.next_id())
    }

    /// Replaces the edge list with the set of distinct edges, sorted by source and then by destination.
    ///
    /// Nodes and labels are not changed.
    /// Returns the number of removed edges.
    pub fn remove_duplicate_edges(&mut self) -> usize {
        let before = self.edges.len();
        self.edges.sort_unstable();
        self.edges.dedup();
        before - self.edges.len()
    }

    /// Returns `true` if the edge list contains no duplicates.
    pub fn is_deduplicated(&self) -> bool {
        let mut edges = self.edges.clone();
        edges.sort_unstable();
        edges.windows(2).all(|pair| pair[0] != pair[1])
    }
}

//-----------------------------------------------------------------------------
