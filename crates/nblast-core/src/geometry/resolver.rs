//! Object resolution and the geometry adapter.
//!
//! The surrounding persistence layer resolves an [`ObjectRef`] to raw
//! geometry; the adapter normalizes it into the uniform representation the
//! scoring algorithms consume: an ordered point list plus a unit tangent per
//! point ([`DotProps`]). Skeletons are resampled along their connectivity at
//! the configured step; point clouds and point sets are used as given.

use crate::error::{GeometryError, Result};
use crate::types::{ConfigTuning, ObjectRef, Point3};

use super::tangent::estimate_tangents;

/// Raw geometry an [`ObjectRef`] resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedObject {
    /// A skeleton: node positions plus undirected connectivity edges.
    Skeleton {
        /// Node positions.
        nodes: Vec<Point3>,
        /// Edges as node index pairs.
        edges: Vec<(usize, usize)>,
    },
    /// An unordered point list, with optional precomputed tangent hints.
    Points {
        /// Point positions.
        points: Vec<Point3>,
        /// Per-point tangent hints; used only when one is supplied per point
        /// and all normalize to unit length.
        tangents: Option<Vec<Point3>>,
    },
}

/// External lookup from object reference to raw geometry.
///
/// Implemented by the surrounding persistence layer; the in-memory
/// [`Registry`](crate::registry::Registry) implements it for tests and batch
/// runs. Must be shareable across the worker pool.
pub trait ObjectResolver: Send + Sync {
    /// Resolve `object` to raw geometry.
    fn resolve(&self, object: &ObjectRef) -> Result<ResolvedObject>;
}

/// Normalized representation: resampled points plus a unit tangent per point.
#[derive(Debug, Clone, PartialEq)]
pub struct DotProps {
    /// Points, ordered along the structure's connectivity for skeletons.
    pub points: Vec<Point3>,
    /// Unit tangent per point.
    pub tangents: Vec<Point3>,
}

impl DotProps {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the object carries no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Normalize resolved geometry into [`DotProps`] under `tuning`.
///
/// Skeletons are resampled at `tuning.resample_step` first. Tangents come
/// from usable per-point hints when present, otherwise from neighborhood
/// estimation over `tuning.tangent_neighbors` neighbors, which fails with
/// [`GeometryError::TooFewPoints`] for objects smaller than the neighborhood.
pub fn build_dotprops(resolved: ResolvedObject, tuning: &ConfigTuning) -> Result<DotProps> {
    let (points, hints) = match resolved {
        ResolvedObject::Skeleton { nodes, edges } => {
            (resample_skeleton(&nodes, &edges, tuning.resample_step)?, None)
        }
        ResolvedObject::Points { points, tangents } => (points, tangents),
    };

    if let Some(hints) = hints {
        if hints.len() == points.len() {
            let mut tangents = Vec::with_capacity(hints.len());
            for h in &hints {
                match h.normalized() {
                    Some(t) => tangents.push(t),
                    None => {
                        tangents.clear();
                        break;
                    }
                }
            }
            if tangents.len() == points.len() {
                return Ok(DotProps { points, tangents });
            }
        }
    }

    let tangents = estimate_tangents(&points, tuning.tangent_neighbors)?;
    Ok(DotProps { points, tangents })
}

/// Walk the skeleton graph and emit points spaced approximately `step` apart
/// along its edges.
///
/// The graph is decomposed into maximal chains between branch points, leaves
/// and isolated nodes; each chain is walked from its lower-indexed end so the
/// output order is independent of edge order in the input. Chain endpoints
/// are always emitted (once, even where chains share a junction).
pub fn resample_skeleton(
    nodes: &[Point3],
    edges: &[(usize, usize)],
    step: f64,
) -> Result<Vec<Point3>> {
    if !(step > 0.0) || !step.is_finite() {
        return Err(crate::error::ValidationError::InvalidTuning {
            name: "resample_step",
            reason: format!("must be a positive finite number, got {}", step),
        }
        .into());
    }
    for &(a, b) in edges {
        for index in [a, b] {
            if index >= nodes.len() {
                return Err(GeometryError::InvalidEdge { index, nodes: nodes.len() }.into());
            }
        }
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for &(a, b) in edges {
        if a == b {
            continue;
        }
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    for list in &mut adjacency {
        list.sort_unstable();
        list.dedup();
    }

    let mut visited_edges = std::collections::HashSet::new();
    let mut emitted_nodes = vec![false; nodes.len()];
    let mut output = Vec::new();

    let walk_chain = |start: usize,
                          first: usize,
                          adjacency: &[Vec<usize>],
                          visited: &mut std::collections::HashSet<(usize, usize)>,
                          emitted: &mut [bool],
                          output: &mut Vec<Point3>| {
        // Collect the node path of this chain.
        let mut path = vec![start, first];
        visited.insert(edge_key(start, first));
        let (mut prev, mut current) = (start, first);
        while adjacency[current].len() == 2 {
            let next = if adjacency[current][0] == prev {
                adjacency[current][1]
            } else {
                adjacency[current][0]
            };
            if !visited.insert(edge_key(current, next)) {
                break; // closed a cycle
            }
            path.push(next);
            prev = current;
            current = next;
        }
        emit_resampled(nodes, &path, step, emitted, output);
    };

    // Chains from every non-pass-through node (leaf, branch point, isolated).
    for start in 0..nodes.len() {
        if adjacency[start].len() == 2 {
            continue;
        }
        if adjacency[start].is_empty() {
            if !emitted_nodes[start] {
                emitted_nodes[start] = true;
                output.push(nodes[start]);
            }
            continue;
        }
        for i in 0..adjacency[start].len() {
            let first = adjacency[start][i];
            if visited_edges.contains(&edge_key(start, first)) {
                continue;
            }
            walk_chain(start, first, &adjacency, &mut visited_edges, &mut emitted_nodes, &mut output);
        }
    }

    // Pure cycles have no endpoint; start each at its lowest-indexed node.
    for start in 0..nodes.len() {
        if adjacency[start].len() != 2 {
            continue;
        }
        for i in 0..adjacency[start].len() {
            let first = adjacency[start][i];
            if visited_edges.contains(&edge_key(start, first)) {
                continue;
            }
            walk_chain(start, first, &adjacency, &mut visited_edges, &mut emitted_nodes, &mut output);
        }
    }

    Ok(output)
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Emit interpolated points every `step` of arc length along `path`, plus the
/// path's final node. Endpoint nodes shared between chains are emitted once.
fn emit_resampled(
    nodes: &[Point3],
    path: &[usize],
    step: f64,
    emitted: &mut [bool],
    output: &mut Vec<Point3>,
) {
    let first = path[0];
    if !emitted[first] {
        emitted[first] = true;
        output.push(nodes[first]);
    }

    let mut next_mark = step;
    let mut walked = 0.0;
    for w in path.windows(2) {
        let (a, b) = (nodes[w[0]], nodes[w[1]]);
        let segment = a.dist(&b);
        while segment > 0.0 && next_mark <= walked + segment {
            let t = (next_mark - walked) / segment;
            output.push(a.add(&b.sub(&a).scale(t)));
            next_mark += step;
        }
        walked += segment;
    }

    let last = path[path.len() - 1];
    if !emitted[last] {
        emitted[last] = true;
        // Skip when the final interpolated mark already landed on the node.
        let duplicate = output
            .last()
            .is_some_and(|p| p.dist2(&nodes[last]) < 1e-18);
        if !duplicate {
            output.push(nodes[last]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigTuning;

    #[test]
    fn straight_line_resamples_at_step() {
        let nodes = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let points = resample_skeleton(&nodes, &[(0, 1)], 2.5).unwrap();
        // 0, 2.5, 5, 7.5, 10 — the final node coincides with the last mark.
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(points[2], Point3::new(5.0, 0.0, 0.0));
        assert_eq!(points[4], Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn resampling_spans_consecutive_edges() {
        // Two 1.0-long edges, step 1.5: marks at 0.0, 1.5, endpoint 2.0.
        let nodes = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let points = resample_skeleton(&nodes, &[(0, 1), (1, 2)], 1.5).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point3::new(1.5, 0.0, 0.0));
        assert_eq!(points[2], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn branch_point_emitted_once() {
        // Y shape: 0 is the junction of three leaves.
        let nodes = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let points = resample_skeleton(&nodes, &[(0, 1), (0, 2), (0, 3)], 10.0).unwrap();
        let junctions = points
            .iter()
            .filter(|p| p.dist2(&nodes[0]) < 1e-18)
            .count();
        assert_eq!(junctions, 1);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn isolated_node_and_cycle_are_covered() {
        let nodes = vec![
            Point3::new(5.0, 5.0, 5.0), // isolated
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let edges = [(1, 2), (2, 3), (3, 1)];
        let points = resample_skeleton(&nodes, &edges, 100.0).unwrap();
        assert!(points.contains(&nodes[0]));
        assert!(points.contains(&nodes[1]));
    }

    #[test]
    fn invalid_edge_index_is_rejected() {
        let nodes = vec![Point3::ZERO];
        let err = resample_skeleton(&nodes, &[(0, 3)], 1.0).unwrap_err();
        assert!(matches!(
            err,
            crate::error::NblastError::Geometry(GeometryError::InvalidEdge { index: 3, nodes: 1 })
        ));
    }

    #[test]
    fn usable_tangent_hints_bypass_estimation() {
        let tuning = ConfigTuning { tangent_neighbors: 5, ..Default::default() };
        // Too few points for estimation, but hints are provided.
        let resolved = ResolvedObject::Points {
            points: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            tangents: Some(vec![Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 3.0, 0.0)]),
        };
        let props = build_dotprops(resolved, &tuning).unwrap();
        assert_eq!(props.tangents[0], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(props.tangents[1], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn too_few_points_without_hints_is_geometry_error() {
        let tuning = ConfigTuning { tangent_neighbors: 5, ..Default::default() };
        let resolved = ResolvedObject::Points {
            points: vec![Point3::ZERO, Point3::new(1.0, 0.0, 0.0)],
            tangents: None,
        };
        let err = build_dotprops(resolved, &tuning).unwrap_err();
        assert!(matches!(
            err,
            crate::error::NblastError::Geometry(GeometryError::TooFewPoints {
                points: 2,
                required: 6
            })
        ));
    }
}
