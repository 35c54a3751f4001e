// Copyright 2025-2026 CEMAXECUTER LLC

//! Signal-conditioning stage of the receiver front end.
//!
//! Reads its settings from the receiver configuration under a role prefix,
//! selects the sample-rate-conversion engine matching the configured item
//! representation, and exposes graph endpoints so the pipeline builder can
//! splice it between the signal source and the processing channels. When
//! dumping is enabled the conditioned stream is also recorded to a file
//! sink for offline inspection.

use std::path::Path;

use nv_flow::{ConfigSource, EventSink, FlowError, FlowGraph, NodeFactory, NodeId};

/// Dump location used when `<role>.dump_filename` is not configured.
const DEFAULT_DUMP_FILENAME: &str = "./data/signal_conditioner.dat";

/// Numeric representation of one stream item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    /// Interleaved I/Q pair of f32, 8 bytes (config token "gr_complex")
    ComplexFloat,
    /// Signed 16-bit integer, 2 bytes (config token "short")
    Short,
}

impl ItemType {
    /// Parse a configuration token. `None` for an unrecognized token; the
    /// conditioner falls back to `Short` in that case.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gr_complex" => Some(ItemType::ComplexFloat),
            "short" => Some(ItemType::Short),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            ItemType::ComplexFloat => "gr_complex",
            ItemType::Short => "short",
        }
    }

    /// Native size of one item in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            ItemType::ComplexFloat => 8,
            ItemType::Short => 2,
        }
    }
}

/// Sample-rate conditioning stage.
///
/// Holds the handle of exactly one resampler node, plus a file-sink handle
/// when dumping is enabled. Both nodes belong to the execution engine; this
/// stage only wires them. Settings are immutable after construction; the
/// only mutable state is whether the internal edge is currently wired.
pub struct ResamplerConditioner {
    role: String,
    in_stream: u32,
    out_stream: u32,
    sample_freq_in: f64,
    sample_freq_out: f64,
    item_type: ItemType,
    item_size: usize,
    dump: bool,
    dump_filename: String,
    resampler: NodeId,
    file_sink: Option<NodeId>,
    wired: bool,
}

impl ResamplerConditioner {
    /// Build the stage from configuration keys under `<role>.`.
    ///
    /// Missing keys fall back to defaults (4 MHz in, 2.048 MHz out, short
    /// items, no dump) and an unrecognized item type falls back to short
    /// with a warning, so construction only fails when the execution
    /// engine cannot build a requested node; that failure is returned
    /// unchanged.
    pub fn from_config<C: ConfigSource>(
        config: &C,
        role: &str,
        in_stream: u32,
        out_stream: u32,
        factory: &mut dyn NodeFactory,
        events: &dyn EventSink,
    ) -> Result<Self, FlowError> {
        let sample_freq_in = config.property(&format!("{}.sample_freq_in", role), 4_000_000.0);
        let sample_freq_out = config.property(&format!("{}.sample_freq_out", role), 2_048_000.0);
        let token = config.property(&format!("{}.item_type", role), String::from("short"));
        let dump = config.property(&format!("{}.dump", role), false);
        let dump_filename = config.property(
            &format!("{}.dump_filename", role),
            String::from(DEFAULT_DUMP_FILENAME),
        );

        let item_type = match ItemType::from_token(&token) {
            Some(item_type) => item_type,
            None => {
                events.warn(
                    role,
                    &format!("{} unrecognized item type. Using short", token),
                );
                ItemType::Short
            }
        };
        let item_size = item_type.size_bytes();

        let resampler = match item_type {
            ItemType::ComplexFloat => {
                factory.make_complex_resampler(sample_freq_in, sample_freq_out)?
            }
            ItemType::Short => factory.make_short_resampler(sample_freq_in, sample_freq_out)?,
        };

        let file_sink = if dump {
            events.info(
                role,
                &format!("dumping conditioned stream into {}", dump_filename),
            );
            Some(factory.make_file_sink(item_size, Path::new(&dump_filename))?)
        } else {
            None
        };

        events.info(
            role,
            &format!(
                "resampling {} Hz -> {} Hz, {} items ({} bytes), resampler {}",
                sample_freq_in,
                sample_freq_out,
                item_type.token(),
                item_size,
                resampler
            ),
        );

        Ok(Self {
            role: role.to_string(),
            in_stream,
            out_stream,
            sample_freq_in,
            sample_freq_out,
            item_type,
            item_size,
            dump,
            dump_filename,
            resampler,
            file_sink,
            wired: false,
        })
    }

    /// Wire the stage's internal edge: resampler output port 0 to the
    /// file-sink input port 0, when dumping is enabled. Without a sink
    /// there is nothing internal to wire. Safe to call repeatedly.
    ///
    /// The stage only tracks whether it is wired, not into which graph;
    /// connecting an already-connected stage into a different graph is a
    /// caller error.
    pub fn connect(&mut self, graph: &mut FlowGraph) -> Result<(), FlowError> {
        if self.wired {
            return Ok(());
        }
        if let Some(sink) = self.file_sink {
            graph.connect(self.resampler, 0, sink, 0)?;
        }
        self.wired = true;
        Ok(())
    }

    /// Remove the edge `connect` created. Safe to call when not connected.
    pub fn disconnect(&mut self, graph: &mut FlowGraph) -> Result<(), FlowError> {
        if !self.wired {
            return Ok(());
        }
        if let Some(sink) = self.file_sink {
            graph.disconnect(self.resampler, 0, sink, 0)?;
        }
        self.wired = false;
        Ok(())
    }

    /// Node an upstream stage connects to. The file sink is a terminal
    /// leaf, so both edges are the resampler and the pipeline builder can
    /// splice any conditioning stage the same way.
    pub fn left_edge(&self) -> NodeId {
        self.resampler
    }

    /// Node a downstream stage connects from.
    pub fn right_edge(&self) -> NodeId {
        self.resampler
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn in_stream(&self) -> u32 {
        self.in_stream
    }

    pub fn out_stream(&self) -> u32 {
        self.out_stream
    }

    pub fn sample_freq_in(&self) -> f64 {
        self.sample_freq_in
    }

    pub fn sample_freq_out(&self) -> f64 {
        self.sample_freq_out
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    pub fn dump(&self) -> bool {
        self.dump
    }

    pub fn dump_filename(&self) -> &str {
        &self.dump_filename
    }

    pub fn wired(&self) -> bool {
        self.wired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    use nv_flow::KvConfig;

    /// Factory stub recording every construction request.
    #[derive(Default)]
    struct StubFactory {
        next: u64,
        complex_calls: Vec<(f64, f64)>,
        short_calls: Vec<(f64, f64)>,
        sink_calls: Vec<(usize, String)>,
        fail: bool,
    }

    impl StubFactory {
        fn mint(&mut self) -> Result<NodeId, FlowError> {
            if self.fail {
                return Err(FlowError::BadRates {
                    rate_in: 0.0,
                    rate_out: 0.0,
                });
            }
            let id = NodeId::new(self.next);
            self.next += 1;
            Ok(id)
        }
    }

    impl NodeFactory for StubFactory {
        fn make_complex_resampler(
            &mut self,
            rate_in: f64,
            rate_out: f64,
        ) -> Result<NodeId, FlowError> {
            self.complex_calls.push((rate_in, rate_out));
            self.mint()
        }

        fn make_short_resampler(
            &mut self,
            rate_in: f64,
            rate_out: f64,
        ) -> Result<NodeId, FlowError> {
            self.short_calls.push((rate_in, rate_out));
            self.mint()
        }

        fn make_file_sink(&mut self, item_size: usize, path: &Path) -> Result<NodeId, FlowError> {
            self.sink_calls
                .push((item_size, path.display().to_string()));
            self.mint()
        }
    }

    #[derive(Default)]
    struct CaptureSink {
        warnings: RefCell<Vec<String>>,
    }

    impl EventSink for CaptureSink {
        fn warn(&self, _source: &str, message: &str) {
            self.warnings.borrow_mut().push(message.to_string());
        }

        fn info(&self, _source: &str, _message: &str) {}
    }

    fn build(
        config: &KvConfig,
        role: &str,
    ) -> (ResamplerConditioner, StubFactory, CaptureSink) {
        let mut factory = StubFactory::default();
        let events = CaptureSink::default();
        let cond =
            ResamplerConditioner::from_config(config, role, 0, 0, &mut factory, &events).unwrap();
        (cond, factory, events)
    }

    #[test]
    fn test_defaults_with_empty_config() {
        let config = KvConfig::new();
        let (cond, factory, events) = build(&config, "Tracking");

        assert_eq!(cond.sample_freq_in(), 4_000_000.0);
        assert_eq!(cond.sample_freq_out(), 2_048_000.0);
        assert_eq!(cond.item_type(), ItemType::Short);
        assert_eq!(cond.item_size(), 2);
        assert!(!cond.dump());
        assert_eq!(cond.dump_filename(), "./data/signal_conditioner.dat");
        assert_eq!(cond.left_edge(), cond.right_edge());

        assert_eq!(factory.short_calls, vec![(4_000_000.0, 2_048_000.0)]);
        assert!(factory.complex_calls.is_empty());
        assert!(factory.sink_calls.is_empty());
        assert!(events.warnings.borrow().is_empty());
    }

    #[test]
    fn test_connect_is_noop_without_dump() {
        let config = KvConfig::new();
        let (mut cond, _, _) = build(&config, "Tracking");

        let mut graph = FlowGraph::new();
        cond.connect(&mut graph).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(cond.wired());
        cond.disconnect(&mut graph).unwrap();
        assert!(!cond.wired());
    }

    #[test]
    fn test_complex_with_dump_wires_one_edge() {
        let mut config = KvConfig::new();
        config.set("SignalConditioner.item_type", "gr_complex");
        config.set("SignalConditioner.dump", "true");
        config.set("SignalConditioner.dump_filename", "./x.dat");
        let (mut cond, factory, _) = build(&config, "SignalConditioner");

        assert_eq!(cond.item_type(), ItemType::ComplexFloat);
        assert_eq!(cond.item_size(), 8);
        assert_eq!(factory.complex_calls.len(), 1);
        assert!(factory.short_calls.is_empty());
        assert_eq!(factory.sink_calls, vec![(8, String::from("./x.dat"))]);

        let mut graph = FlowGraph::new();
        cond.connect(&mut graph).unwrap();
        assert_eq!(graph.edge_count(), 1);
        let sink = cond.file_sink.unwrap();
        assert!(graph.is_connected(cond.left_edge(), 0, sink, 0));

        cond.disconnect(&mut graph).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_unrecognized_item_type_warns_and_uses_short() {
        let mut config = KvConfig::new();
        config.set("SignalConditioner.item_type", "byte");
        let (cond, factory, events) = build(&config, "SignalConditioner");

        assert_eq!(cond.item_type(), ItemType::Short);
        assert_eq!(cond.item_size(), 2);
        assert_eq!(factory.short_calls.len(), 1);
        assert!(factory.complex_calls.is_empty());

        let warnings = events.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(
            warnings[0].contains("byte"),
            "warning should name the bad token: {}",
            warnings[0]
        );
    }

    #[test]
    fn test_connect_and_disconnect_are_idempotent() {
        let mut config = KvConfig::new();
        config.set("SignalConditioner.dump", "true");
        config.set("SignalConditioner.dump_filename", "./x.dat");
        let (mut cond, _, _) = build(&config, "SignalConditioner");

        let mut graph = FlowGraph::new();
        // Disconnect before any connect is a no-op
        cond.disconnect(&mut graph).unwrap();
        assert_eq!(graph.edge_count(), 0);

        cond.connect(&mut graph).unwrap();
        cond.connect(&mut graph).unwrap();
        assert_eq!(graph.edge_count(), 1);

        cond.disconnect(&mut graph).unwrap();
        cond.disconnect(&mut graph).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_configured_rates_reach_the_engine() {
        let mut config = KvConfig::new();
        config.set("SignalConditioner.sample_freq_in", "8000000.0");
        config.set("SignalConditioner.sample_freq_out", "4000000.0");
        let (cond, factory, _) = build(&config, "SignalConditioner");

        assert_eq!(cond.sample_freq_in(), 8_000_000.0);
        assert_eq!(cond.sample_freq_out(), 4_000_000.0);
        assert_eq!(factory.short_calls, vec![(8_000_000.0, 4_000_000.0)]);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let config = KvConfig::new();
        let mut factory = StubFactory {
            fail: true,
            ..StubFactory::default()
        };
        let events = CaptureSink::default();
        let result =
            ResamplerConditioner::from_config(&config, "Tracking", 0, 0, &mut factory, &events);
        assert!(
            matches!(result, Err(FlowError::BadRates { .. })),
            "engine failure must surface unchanged"
        );
    }

    #[test]
    fn test_role_prefix_namespaces_lookups() {
        let mut config = KvConfig::new();
        config.set("SignalConditioner.item_type", "gr_complex");
        // A different role must not see SignalConditioner's keys
        let (cond, _, _) = build(&config, "Tracking");
        assert_eq!(cond.item_type(), ItemType::Short);
    }
}
