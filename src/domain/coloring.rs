use std::mem;

/// Elements whose node lists are pairwise disjoint.
///
/// A node may repeat within the list of a single element, but never appears in the lists of two
/// different elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisjointColor {
    elements: Vec<usize>,
    offsets: Vec<usize>,
    nodes: Vec<usize>,
    max_node: Option<usize>,
}

impl DisjointColor {
    fn empty() -> Self {
        Self {
            elements: Vec::new(),
            offsets: vec![0],
            nodes: Vec::new(),
            max_node: None,
        }
    }

    fn push_unchecked(&mut self, ispec: usize, nodes: &[usize]) {
        self.elements.push(ispec);
        self.nodes.extend_from_slice(nodes);
        self.offsets.push(self.nodes.len());
        self.max_node = self.max_node.max(nodes.iter().copied().max());
    }

    /// Collects the node lists of `elements`, or returns `None` if two elements share a node.
    pub fn try_from_elements<F, S>(elements: &[usize], mut element_nodes: F) -> Option<Self>
    where
        F: FnMut(usize) -> S,
        S: AsRef<[usize]>,
    {
        let mut owner: Vec<Option<usize>> = Vec::new();
        let mut color = Self::empty();
        for (local, &ispec) in elements.iter().enumerate() {
            let nodes = element_nodes(ispec);
            for &node in nodes.as_ref() {
                if node >= owner.len() {
                    owner.resize(node + 1, None);
                }
                match owner[node] {
                    Some(other) if other != local => return None,
                    _ => owner[node] = Some(local),
                }
            }
            color.push_unchecked(ispec, nodes.as_ref());
        }
        Some(color)
    }

    pub fn elements(&self) -> &[usize] {
        &self.elements
    }

    /// The nodes of the `local`-th element of the color.
    pub fn nodes(&self, local: usize) -> &[usize] {
        &self.nodes[self.offsets[local]..self.offsets[local + 1]]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn max_node(&self) -> Option<usize> {
        self.max_node
    }
}

/// Partitions `elements` into colors such that no two elements of one color share a node.
///
/// `element_nodes` returns the global nodes touched by an element. Elements keep their relative
/// order within each color.
pub(crate) fn sequential_greedy_coloring<F, S>(elements: &[usize], mut element_nodes: F) -> Vec<DisjointColor>
where
    F: FnMut(usize) -> S,
    S: AsRef<[usize]>,
{
    let mut colors = Vec::new();
    let mut postponed = Vec::new();
    let mut current = elements.to_vec();

    // The index of the last color to claim each node, grown on demand
    let mut last_visited_color: Vec<Option<usize>> = Vec::new();

    let mut color_idx = 0;
    while !current.is_empty() {
        let mut color = DisjointColor::empty();
        for &ispec in &current {
            let nodes = element_nodes(ispec);
            let nodes = nodes.as_ref();
            let is_blocked = nodes
                .iter()
                .any(|&node| last_visited_color.get(node).copied().flatten() == Some(color_idx));
            if is_blocked {
                postponed.push(ispec);
            } else {
                for &node in nodes {
                    if node >= last_visited_color.len() {
                        // Amortize resizes
                        last_visited_color.resize(2 * node + 1, None);
                    }
                    last_visited_color[node] = Some(color_idx);
                }
                color.push_unchecked(ispec, nodes);
            }
        }

        debug_assert_eq!(
            DisjointColor::try_from_elements(color.elements(), |ispec| element_nodes(ispec)).as_ref(),
            Some(&color)
        );
        colors.push(color);
        mem::swap(&mut postponed, &mut current);
        postponed.clear();
        color_idx += 1;
    }

    colors
}
