//! Flow-graph boundary for the receiver front end: opaque node handles,
//! port-to-port edges, the node-construction facility, configuration
//! lookup, and the event sink injected into pipeline stages.

pub mod config;
pub mod graph;
pub mod report;
pub mod runtime;

pub use config::{ConfigSource, KvConfig};
pub use graph::{Edge, FlowGraph, NodeId};
pub use report::{EventSink, LogSink};
pub use runtime::{NodeFactory, Runtime};

use std::io;

use thiserror::Error;

/// Errors surfaced by the flow boundary. Node-construction failures reach
/// the pipeline builder unchanged; graph misuse is reported per edge.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("edge {0} already present")]
    DuplicateEdge(Edge),

    #[error("edge {0} not present")]
    EdgeNotFound(Edge),

    #[error("no node {0} in this runtime")]
    UnknownNode(NodeId),

    #[error("unsupported resampler rates: {rate_in} Hz in, {rate_out} Hz out")]
    BadRates { rate_in: f64, rate_out: f64 },

    #[error("failed to open dump file {path}: {source}")]
    Sink {
        path: String,
        #[source]
        source: io::Error,
    },
}
