use std::fs::File;
use std::path::PathBuf;

use hashbrown::HashMap;
use log::debug;
use serde::Deserialize;
use typed_builder::TypedBuilder;

use ratsel_core::agent::NodeId;
use ratsel_core::bucket::TimeMS;
use ratsel_models::mobility::{MapState, Point3};

pub type TraceMap = HashMap<TimeMS, HashMap<NodeId, MapState>>;

#[derive(Deserialize, Debug)]
struct TraceRow {
    time_step: u64,
    node_id: u64,
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default)]
    velocity: f64,
    #[serde(default)]
    lane: u8,
}

/// Reads a vehicle trace from a CSV file with one row per node per time step.
/// Missing z, velocity and lane columns default to zero. A malformed trace is a
/// fatal input error.
#[derive(Clone, Debug, TypedBuilder)]
pub struct TraceReader {
    trace_file: PathBuf,
}

impl TraceReader {
    pub fn fetch_traces(&self) -> TraceMap {
        debug!("Reading vehicle traces from {}", self.trace_file.display());
        let file = match File::open(&self.trace_file) {
            Ok(file) => file,
            Err(e) => panic!(
                "Error opening trace file {}: {}",
                self.trace_file.display(),
                e
            ),
        };
        let mut reader = csv::Reader::from_reader(file);
        let mut trace_map: TraceMap = HashMap::new();
        for row in reader.deserialize() {
            let row: TraceRow = match row {
                Ok(row) => row,
                Err(e) => panic!("Error reading trace row: {}", e),
            };
            let map_state = MapState::builder()
                .pos(Point3::new(row.x, row.y, row.z))
                .velocity(row.velocity)
                .lane(row.lane)
                .build();
            trace_map
                .entry(TimeMS::from(row.time_step))
                .or_default()
                .insert(NodeId::from(row.node_id), map_state);
        }
        trace_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_trace(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).expect("temp trace file");
        file.write_all(contents.as_bytes()).expect("trace contents");
        path
    }

    #[test]
    fn full_rows_are_grouped_by_step() {
        let path = write_trace(
            "ratsel_trace_full.csv",
            "time_step,node_id,x,y,z,velocity,lane\n\
             0,1,10.0,5.0,0.0,12.5,1\n\
             0,2,40.0,5.0,0.0,20.0,2\n\
             1000,1,22.5,5.0,0.0,12.5,1\n",
        );
        let traces = TraceReader::builder().trace_file(path).build().fetch_traces();
        assert_eq!(traces.len(), 2);
        let first = &traces[&TimeMS::from(0)];
        assert_eq!(first.len(), 2);
        assert_eq!(first[&NodeId::from(1)].velocity, 12.5);
        assert_eq!(first[&NodeId::from(2)].lane, 2);
        let second = &traces[&TimeMS::from(1000)];
        assert_eq!(second[&NodeId::from(1)].pos.x, 22.5);
    }

    #[test]
    fn sparse_rows_default_the_optional_columns() {
        let path = write_trace(
            "ratsel_trace_sparse.csv",
            "time_step,node_id,x,y\n0,7,3.0,4.0\n",
        );
        let traces = TraceReader::builder().trace_file(path).build().fetch_traces();
        let state = traces[&TimeMS::from(0)][&NodeId::from(7)];
        assert_eq!(state.pos.z, 0.0);
        assert_eq!(state.velocity, 0.0);
        assert_eq!(state.lane, 0);
    }

    #[test]
    #[should_panic(expected = "Error opening trace file")]
    fn missing_trace_file_is_fatal() {
        TraceReader::builder()
            .trace_file(PathBuf::from("/nonexistent/trace.csv"))
            .build()
            .fetch_traces();
    }
}
