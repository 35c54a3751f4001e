// Copyright 2025-2026 CEMAXECUTER LLC

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nv_dsp::resampler::DirectResampler;
use nv_output::dump::SampleDump;

use crate::{FlowError, NodeId};

/// Node-construction facility of the execution engine. Pipeline stages ask
/// for nodes by kind and hold only the returned handle; the facility owns
/// the node itself.
pub trait NodeFactory {
    /// Resampler for complex-float items.
    fn make_complex_resampler(&mut self, rate_in: f64, rate_out: f64)
        -> Result<NodeId, FlowError>;

    /// Resampler for short items.
    fn make_short_resampler(&mut self, rate_in: f64, rate_out: f64) -> Result<NodeId, FlowError>;

    /// File sink recording `item_size`-byte items to `path`.
    fn make_file_sink(&mut self, item_size: usize, path: &Path) -> Result<NodeId, FlowError>;
}

enum Node {
    ComplexResampler(DirectResampler),
    ShortResampler(DirectResampler),
    FileSink {
        dump: SampleDump<BufWriter<File>>,
        path: String,
    },
}

/// Concrete node owner backing `NodeFactory`. Nodes live as long as the
/// runtime; handles held by stages never outlive or free them.
#[derive(Default)]
pub struct Runtime {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn check_rates(rate_in: f64, rate_out: f64) -> Result<(), FlowError> {
        // The direct resampler only decimates
        if !(rate_in > 0.0) || !(rate_out > 0.0) || rate_out > rate_in {
            return Err(FlowError::BadRates { rate_in, rate_out });
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mutable access to a resampler node of either item kind.
    pub fn resampler_mut(&mut self, id: NodeId) -> Option<&mut DirectResampler> {
        match self.nodes.get_mut(&id) {
            Some(Node::ComplexResampler(rs)) | Some(Node::ShortResampler(rs)) => Some(rs),
            _ => None,
        }
    }

    /// Mutable access to a file-sink node.
    pub fn file_sink_mut(&mut self, id: NodeId) -> Option<&mut SampleDump<BufWriter<File>>> {
        match self.nodes.get_mut(&id) {
            Some(Node::FileSink { dump, .. }) => Some(dump),
            _ => None,
        }
    }

    pub fn is_complex_resampler(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(&id), Some(Node::ComplexResampler(_)))
    }

    pub fn is_short_resampler(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(&id), Some(Node::ShortResampler(_)))
    }

    /// Flush every file sink. Called at pipeline teardown.
    pub fn flush_sinks(&mut self) -> Result<(), FlowError> {
        for node in self.nodes.values_mut() {
            if let Node::FileSink { dump, path } = node {
                dump.flush().map_err(|e| FlowError::Sink {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }
        Ok(())
    }
}

impl NodeFactory for Runtime {
    fn make_complex_resampler(
        &mut self,
        rate_in: f64,
        rate_out: f64,
    ) -> Result<NodeId, FlowError> {
        Self::check_rates(rate_in, rate_out)?;
        Ok(self.insert(Node::ComplexResampler(DirectResampler::new(rate_in, rate_out))))
    }

    fn make_short_resampler(&mut self, rate_in: f64, rate_out: f64) -> Result<NodeId, FlowError> {
        Self::check_rates(rate_in, rate_out)?;
        Ok(self.insert(Node::ShortResampler(DirectResampler::new(rate_in, rate_out))))
    }

    fn make_file_sink(&mut self, item_size: usize, path: &Path) -> Result<NodeId, FlowError> {
        let file = File::create(path).map_err(|e| FlowError::Sink {
            path: path.display().to_string(),
            source: e,
        })?;
        let dump = SampleDump::new(BufWriter::new(file), item_size);
        Ok(self.insert(Node::FileSink {
            dump,
            path: path.display().to_string(),
        }))
    }
}
