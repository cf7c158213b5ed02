//! Augmented routing graph: real nodes plus virtual reload stops.
//!
//! A reload node stands for "return to the depot, empty or refill, and carry
//! on". It shares the depot's physical location but is a vertex of its own,
//! so a route can include or skip each one independently. Every node carries
//! a [`NodeKind`] tag; downstream code never infers kinds from id ranges.

use crate::instance::{Instance, TimeWindow};

/// Index of a node in the augmented graph.
///
/// Real nodes keep their input index; reload nodes follow them.
pub type NodeId = usize;

/// Role of a node in the augmented graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum NodeKind {
    /// Start and end point of every route.
    Depot,
    /// A location with demand that must be served exactly once.
    Customer,
    /// Optional mid-route visit to the depot that resets carried load.
    ReloadVirtual,
}

/// A vertex of the augmented graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Position in the augmented graph.
    pub id: NodeId,
    /// Role of the node.
    pub kind: NodeKind,
    /// Real node whose matrix row and column stand in for this vertex.
    pub location: NodeId,
    /// Demand served at the node; zero for the depot and reload nodes.
    pub demand: i64,
    /// Service time charged when leaving the node.
    pub service_time: i64,
    /// Enforced window, present for customers only.
    pub time_window: Option<TimeWindow>,
}

impl Node {
    /// Return whether the node is a virtual reload stop.
    #[must_use]
    pub fn is_reload(&self) -> bool {
        self.kind == NodeKind::ReloadVirtual
    }

    /// Return whether the node is a customer.
    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.kind == NodeKind::Customer
    }
}

/// Number of reload nodes needed for `total_demand` at `capacity`.
///
/// This is `ceil(total_demand / capacity)`: enough for the whole fleet to
/// empty out once per full load. Unused reload nodes cost nothing, so the
/// bound is generous rather than tight.
///
/// # Examples
/// ```
/// use replenish_core::reload_count;
///
/// assert_eq!(reload_count(15, 10), 2);
/// assert_eq!(reload_count(20, 10), 2);
/// assert_eq!(reload_count(0, 10), 0);
/// ```
#[must_use]
pub fn reload_count(total_demand: i64, capacity: i64) -> usize {
    let (Ok(total), Ok(per_vehicle)) = (u64::try_from(total_demand), u64::try_from(capacity))
    else {
        return 0;
    };
    if per_vehicle == 0 {
        return 0;
    }
    usize::try_from(total.div_ceil(per_vehicle)).unwrap_or(usize::MAX)
}

/// The node set a single solve operates on.
///
/// Built once per solve from a validated [`Instance`]; the constraint model
/// and solving service only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedGraph {
    nodes: Vec<Node>,
    depot: NodeId,
    real_nodes: usize,
    vehicle_count: usize,
}

impl AugmentedGraph {
    /// Extend the instance's nodes with virtual reload nodes.
    ///
    /// The vehicle count equals the number of non-depot nodes, a loose upper
    /// bound that the fixed vehicle cost keeps mostly unused.
    ///
    /// # Examples
    /// ```
    /// use replenish_core::{AugmentedGraph, Instance, NodeKind, TimeWindow};
    ///
    /// let instance = Instance {
    ///     demands: vec![0, 5, 6, 4],
    ///     depot_idx: 0,
    ///     time_matrix: vec![vec![1; 4]; 4],
    ///     time_windows: vec![TimeWindow::new(0, 100); 4],
    ///     service_time: vec![0; 4],
    ///     capacity: 10,
    ///     travel_time: 100,
    ///     timeout: 1.0,
    /// };
    /// let graph = AugmentedGraph::build(&instance);
    /// assert_eq!(graph.reload_count(), 2);
    /// assert_eq!(graph.vehicle_count(), 3);
    /// assert_eq!(graph.node(4).map(|node| node.kind), Some(NodeKind::ReloadVirtual));
    /// assert_eq!(graph.node(4).map(|node| node.location), Some(0));
    /// ```
    #[must_use]
    pub fn build(instance: &Instance) -> Self {
        let real_nodes = instance.node_count();
        let depot = instance.depot_idx;
        let depot_service = instance.service_time.get(depot).copied().unwrap_or(0);
        let reloads = reload_count(instance.total_demand(), instance.vehicle_capacity());

        let mut nodes = Vec::with_capacity(real_nodes.saturating_add(reloads));
        for (id, demand) in instance.demands.iter().copied().enumerate() {
            let kind = if id == depot {
                NodeKind::Depot
            } else {
                NodeKind::Customer
            };
            let time_window = match kind {
                NodeKind::Customer => instance.time_windows.get(id).copied(),
                NodeKind::Depot | NodeKind::ReloadVirtual => None,
            };
            nodes.push(Node {
                id,
                kind,
                location: id,
                demand,
                service_time: instance.service_time.get(id).copied().unwrap_or(0),
                time_window,
            });
        }
        nodes.extend((real_nodes..real_nodes.saturating_add(reloads)).map(|id| Node {
            id,
            kind: NodeKind::ReloadVirtual,
            location: depot,
            demand: 0,
            service_time: depot_service,
            time_window: None,
        }));

        let graph = Self {
            nodes,
            depot,
            real_nodes,
            vehicle_count: real_nodes.saturating_sub(1),
        };
        log::debug!(
            "augmented graph: {} customers, {} reload nodes, {} vehicle slots",
            graph.customers().count(),
            reloads,
            graph.vehicle_count
        );
        graph
    }

    /// All nodes, real ones first, then reload nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Id of the depot node.
    #[must_use]
    pub const fn depot(&self) -> NodeId {
        self.depot
    }

    /// Number of real nodes, depot included.
    #[must_use]
    pub const fn real_node_count(&self) -> usize {
        self.real_nodes
    }

    /// Number of vertices in the augmented graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return whether the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of vehicle slots available to the solving service.
    #[must_use]
    pub const fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    /// Number of virtual reload nodes.
    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.nodes.len().saturating_sub(self.real_nodes)
    }

    /// Customer nodes in id order.
    pub fn customers(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|node| node.is_customer())
    }

    /// Reload nodes in id order.
    pub fn reloads(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|node| node.is_reload())
    }
}
