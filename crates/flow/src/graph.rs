// Copyright 2025-2026 CEMAXECUTER LLC

use std::collections::HashSet;
use std::fmt;

use crate::FlowError;

/// Opaque handle to a processing node. The handle is only an identity for
/// wiring purposes; the runtime that minted it owns the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Directed data connection from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: NodeId,
    pub src_port: u32,
    pub dst: NodeId,
    pub dst_port: u32,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.src, self.src_port, self.dst, self.dst_port
        )
    }
}

/// Edge set of the signal-flow graph. Scheduling and buffer management
/// belong to the execution engine; this only tracks which ports are wired.
#[derive(Debug, Default)]
pub struct FlowGraph {
    edges: HashSet<Edge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(
        &mut self,
        src: NodeId,
        src_port: u32,
        dst: NodeId,
        dst_port: u32,
    ) -> Result<(), FlowError> {
        let edge = Edge {
            src,
            src_port,
            dst,
            dst_port,
        };
        if !self.edges.insert(edge) {
            return Err(FlowError::DuplicateEdge(edge));
        }
        Ok(())
    }

    pub fn disconnect(
        &mut self,
        src: NodeId,
        src_port: u32,
        dst: NodeId,
        dst_port: u32,
    ) -> Result<(), FlowError> {
        let edge = Edge {
            src,
            src_port,
            dst,
            dst_port,
        };
        if !self.edges.remove(&edge) {
            return Err(FlowError::EdgeNotFound(edge));
        }
        Ok(())
    }

    pub fn is_connected(&self, src: NodeId, src_port: u32, dst: NodeId, dst_port: u32) -> bool {
        self.edges.contains(&Edge {
            src,
            src_port,
            dst,
            dst_port,
        })
    }

    /// Edges leaving `src`, in deterministic order.
    pub fn edges_from(&self, src: NodeId) -> Vec<Edge> {
        let mut out: Vec<Edge> = self.edges.iter().filter(|e| e.src == src).copied().collect();
        out.sort_by_key(|e| (e.src_port, e.dst, e.dst_port));
        out
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
