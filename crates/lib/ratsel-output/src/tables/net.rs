use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};

use ratsel_core::bucket::TimeMS;
use ratsel_models::stats::NetStats;

use crate::results::{ResultWriter, WriterType};

/// One row per output interval with the window's network-level aggregates.
#[derive(Debug)]
pub struct NetStatWriter {
    time_step: Vec<u64>,
    sent: Vec<u64>,
    received: Vec<u64>,
    lost: Vec<u64>,
    delivery_ratio: Vec<f64>,
    avg_latency_ms: Vec<f64>,
    bytes_transferred: Vec<u64>,
    handovers: Vec<u64>,
    blackouts: Vec<u64>,
    to_output: WriterType,
}

impl NetStatWriter {
    pub fn new(output_file: &PathBuf) -> Self {
        Self {
            to_output: WriterType::new(output_file, Self::schema()),
            time_step: Vec::new(),
            sent: Vec::new(),
            received: Vec::new(),
            lost: Vec::new(),
            delivery_ratio: Vec::new(),
            avg_latency_ms: Vec::new(),
            bytes_transferred: Vec::new(),
            handovers: Vec::new(),
            blackouts: Vec::new(),
        }
    }

    pub fn add_data(&mut self, time_step: TimeMS, stats: &NetStats) {
        self.time_step.push(time_step.as_u64());
        self.sent.push(stats.totals.sent);
        self.received.push(stats.totals.received);
        self.lost.push(stats.totals.lost);
        self.delivery_ratio.push(stats.totals.delivery_ratio());
        self.avg_latency_ms.push(stats.avg_latency_ms());
        self.bytes_transferred.push(stats.bytes_transferred.as_u64());
        self.handovers.push(stats.handovers);
        self.blackouts.push(stats.blackouts);
    }
}

impl ResultWriter for NetStatWriter {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("time_step", DataType::UInt64, false),
            Field::new("sent", DataType::UInt64, false),
            Field::new("received", DataType::UInt64, false),
            Field::new("lost", DataType::UInt64, false),
            Field::new("delivery_ratio", DataType::Float64, false),
            Field::new("avg_latency_ms", DataType::Float64, false),
            Field::new("bytes_transferred", DataType::UInt64, false),
            Field::new("handovers", DataType::UInt64, false),
            Field::new("blackouts", DataType::UInt64, false),
        ])
    }

    fn write_to_file(&mut self) {
        let record_batch = RecordBatch::try_from_iter(vec![
            (
                "time_step",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.time_step))) as ArrayRef,
            ),
            (
                "sent",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.sent))) as ArrayRef,
            ),
            (
                "received",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.received))) as ArrayRef,
            ),
            (
                "lost",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.lost))) as ArrayRef,
            ),
            (
                "delivery_ratio",
                Arc::new(Float64Array::from(std::mem::take(&mut self.delivery_ratio)))
                    as ArrayRef,
            ),
            (
                "avg_latency_ms",
                Arc::new(Float64Array::from(std::mem::take(&mut self.avg_latency_ms)))
                    as ArrayRef,
            ),
            (
                "bytes_transferred",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.bytes_transferred)))
                    as ArrayRef,
            ),
            (
                "handovers",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.handovers))) as ArrayRef,
            ),
            (
                "blackouts",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.blackouts))) as ArrayRef,
            ),
        ])
        .expect("Failed to convert results to record batch");
        self.to_output.record_batch(&record_batch);
    }

    fn close_file(self) {
        self.to_output.close();
    }
}
