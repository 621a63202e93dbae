use crate::core::error::PipelineError;
use crate::core::structure::{axis_name, Stencil};
use crate::voxel::grid::LabelGrid;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::BTreeSet;

/// One kMC lattice site, corresponding to one occupied grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// 0-based, contiguous, assigned in canonical traversal order.
    pub id: usize,
    /// Raw cell coordinates (never wrapped).
    pub cell: [usize; 3],
    /// Phase label of the underlying cell.
    pub label: String,
}

/// Undirected neighbor edge between two sites.
///
/// `shift` is the periodic image vector taken when walking from `a` to `b`:
/// the neighbor's image sits at `b.cell + shift * dims` component-wise. The
/// reverse direction is not stored; it is `(b, a, -shift)`. An edge with a
/// non-zero shift crosses a periodic boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NeighborEdge {
    pub a: usize,
    pub b: usize,
    pub shift: [i8; 3],
}

impl NeighborEdge {
    pub fn is_wrapped(&self) -> bool {
        self.shift != [0, 0, 0]
    }
}

/// The periodic site graph derived from a labeled grid.
///
/// Sites cover exactly the occupied cells; edges connect stencil neighbors,
/// with per-axis periodic wraparound recorded as explicit shift vectors so
/// the structure has no reference cycles and serializes trivially. Built
/// once per grid; any grid change requires a full rebuild.
#[derive(Debug, Clone)]
pub struct SiteLattice {
    pub sites: Vec<Site>,
    pub edges: Vec<NeighborEdge>,
    pub dims: [usize; 3],
    pub periodic: [bool; 3],
    pub stencil: Stencil,
    /// Same topology as `edges`, for graph traversals. Node `i` carries
    /// site id `i`; edge weights carry the shift vector.
    pub graph: UnGraph<usize, [i8; 3]>,
}

impl SiteLattice {
    /// Builds the site graph for a grid.
    ///
    /// Fails with `DegenerateLattice` if any periodic axis has fewer than 2
    /// cells: the stencil would connect a site to its own image.
    pub fn build(
        grid: &LabelGrid,
        periodic: [bool; 3],
        stencil: Stencil,
    ) -> Result<Self, PipelineError> {
        let dims = grid.dims();

        for axis in 0..3 {
            if periodic[axis] && dims[axis] < 2 {
                return Err(PipelineError::DegenerateLattice {
                    axis: axis_name(axis),
                    dimension: dims[axis],
                    required: 2,
                });
            }
        }

        // 1. Sites, in canonical traversal order. site_of maps a linear cell
        //    index to its site id.
        let mut sites = Vec::new();
        let mut site_of: Vec<Option<usize>> = vec![None; grid.cell_count()];
        for (cell, label) in grid.iter_occupied() {
            let id = sites.len();
            site_of[grid.linear_index(cell)] = Some(id);
            sites.push(Site {
                id,
                cell,
                label: label.to_string(),
            });
        }

        // 2. Edges. Enumerate stencil candidates from every site, wrap each
        //    axis independently, and canonicalize so each undirected edge is
        //    recorded once. Two sites may share several edges with distinct
        //    shifts (rings of length 2), which is intentional.
        let offsets = stencil.offsets();
        let mut edge_set: BTreeSet<NeighborEdge> = BTreeSet::new();

        for site in &sites {
            'candidates: for off in &offsets {
                let mut neighbor = [0usize; 3];
                let mut shift = [0i8; 3];
                for axis in 0..3 {
                    let n = dims[axis] as i64;
                    let raw = site.cell[axis] as i64 + off[axis];
                    if periodic[axis] {
                        let wrapped = raw.rem_euclid(n);
                        // Image count crossed: raw = wrapped + shift * n.
                        shift[axis] = ((raw - wrapped) / n) as i8;
                        neighbor[axis] = wrapped as usize;
                    } else {
                        if raw < 0 || raw >= n {
                            continue 'candidates;
                        }
                        neighbor[axis] = raw as usize;
                    }
                }

                let Some(other) = site_of[grid.linear_index(neighbor)] else {
                    continue; // empty cell, no edge
                };

                edge_set.insert(canonical_edge(site.id, other, shift));
            }
        }

        let edges: Vec<NeighborEdge> = edge_set.into_iter().collect();

        // 3. Graph mirror of the edge list.
        let mut graph = UnGraph::with_capacity(sites.len(), edges.len());
        for site in &sites {
            graph.add_node(site.id);
        }
        for edge in &edges {
            graph.add_edge(NodeIndex::new(edge.a), NodeIndex::new(edge.b), edge.shift);
        }

        Ok(Self {
            sites,
            edges,
            dims,
            periodic,
            stencil,
            graph,
        })
    }

    /// Neighbor site ids per site, sorted and including multiplicity (a
    /// double edge lists the partner twice). Index = site id.
    pub fn neighbor_lists(&self) -> Vec<Vec<usize>> {
        let mut lists: Vec<Vec<usize>> = vec![Vec::new(); self.sites.len()];
        for edge in &self.edges {
            lists[edge.a].push(edge.b);
            lists[edge.b].push(edge.a);
        }
        for list in &mut lists {
            list.sort_unstable();
        }
        lists
    }

    /// Number of edges crossing a periodic boundary.
    pub fn wrapped_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_wrapped()).count()
    }
}

/// Canonical form of an undirected edge: smaller site id first, shift
/// oriented from it. Self-pairs cannot occur (periodic dims < 2 are rejected
/// before edge enumeration).
fn canonical_edge(a: usize, b: usize, shift: [i8; 3]) -> NeighborEdge {
    debug_assert_ne!(a, b, "degenerate lattice produced a self-edge");
    if a <= b {
        NeighborEdge { a, b, shift }
    } else {
        NeighborEdge {
            a: b,
            b: a,
            shift: [-shift[0], -shift[1], -shift[2]],
        }
    }
}
