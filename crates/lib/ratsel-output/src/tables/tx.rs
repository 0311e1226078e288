use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, RecordBatch, StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};

use ratsel_models::stats::TxRecord;

use crate::results::{ResultWriter, WriterType};

/// One row per transmission attempt. RAT, access kind and message kind are written
/// as their display names so the table reads without a code book.
#[derive(Debug)]
pub struct TxRecordWriter {
    time_step: Vec<u64>,
    node_id: Vec<u64>,
    message: Vec<String>,
    priority: Vec<u32>,
    rat: Vec<String>,
    access: Vec<String>,
    target: Vec<u64>,
    distance: Vec<f64>,
    snr: Vec<f64>,
    loss_rate: Vec<f64>,
    latency_ms: Vec<f64>,
    size_bytes: Vec<u64>,
    success: Vec<bool>,
    handover: Vec<bool>,
    reward: Vec<f64>,
    to_output: WriterType,
}

impl TxRecordWriter {
    pub fn new(output_file: &PathBuf) -> Self {
        Self {
            to_output: WriterType::new(output_file, Self::schema()),
            time_step: Vec::new(),
            node_id: Vec::new(),
            message: Vec::new(),
            priority: Vec::new(),
            rat: Vec::new(),
            access: Vec::new(),
            target: Vec::new(),
            distance: Vec::new(),
            snr: Vec::new(),
            loss_rate: Vec::new(),
            latency_ms: Vec::new(),
            size_bytes: Vec::new(),
            success: Vec::new(),
            handover: Vec::new(),
            reward: Vec::new(),
        }
    }

    pub fn add_data(&mut self, record: &TxRecord) {
        self.time_step.push(record.time_step.as_u64());
        self.node_id.push(record.node_id.as_u64());
        self.message.push(record.message.to_string());
        self.priority.push(u32::from(record.priority));
        self.rat.push(record.rat.to_string());
        self.access.push(record.access.to_string());
        self.target.push(record.target.as_u64());
        self.distance.push(record.distance);
        self.snr.push(record.snr);
        self.loss_rate.push(record.loss_rate);
        self.latency_ms.push(record.latency_ms);
        self.size_bytes.push(record.size_bytes.as_u64());
        self.success.push(record.success);
        self.handover.push(record.handover);
        self.reward.push(record.reward);
    }
}

impl ResultWriter for TxRecordWriter {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("time_step", DataType::UInt64, false),
            Field::new("node_id", DataType::UInt64, false),
            Field::new("message", DataType::Utf8, false),
            Field::new("priority", DataType::UInt32, false),
            Field::new("rat", DataType::Utf8, false),
            Field::new("access", DataType::Utf8, false),
            Field::new("target", DataType::UInt64, false),
            Field::new("distance", DataType::Float64, false),
            Field::new("snr", DataType::Float64, false),
            Field::new("loss_rate", DataType::Float64, false),
            Field::new("latency_ms", DataType::Float64, false),
            Field::new("size_bytes", DataType::UInt64, false),
            Field::new("success", DataType::Boolean, false),
            Field::new("handover", DataType::Boolean, false),
            Field::new("reward", DataType::Float64, false),
        ])
    }

    fn write_to_file(&mut self) {
        let record_batch = RecordBatch::try_from_iter(vec![
            (
                "time_step",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.time_step))) as ArrayRef,
            ),
            (
                "node_id",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.node_id))) as ArrayRef,
            ),
            (
                "message",
                Arc::new(StringArray::from(std::mem::take(&mut self.message))) as ArrayRef,
            ),
            (
                "priority",
                Arc::new(UInt32Array::from(std::mem::take(&mut self.priority))) as ArrayRef,
            ),
            (
                "rat",
                Arc::new(StringArray::from(std::mem::take(&mut self.rat))) as ArrayRef,
            ),
            (
                "access",
                Arc::new(StringArray::from(std::mem::take(&mut self.access))) as ArrayRef,
            ),
            (
                "target",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.target))) as ArrayRef,
            ),
            (
                "distance",
                Arc::new(Float64Array::from(std::mem::take(&mut self.distance))) as ArrayRef,
            ),
            (
                "snr",
                Arc::new(Float64Array::from(std::mem::take(&mut self.snr))) as ArrayRef,
            ),
            (
                "loss_rate",
                Arc::new(Float64Array::from(std::mem::take(&mut self.loss_rate))) as ArrayRef,
            ),
            (
                "latency_ms",
                Arc::new(Float64Array::from(std::mem::take(&mut self.latency_ms))) as ArrayRef,
            ),
            (
                "size_bytes",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.size_bytes))) as ArrayRef,
            ),
            (
                "success",
                Arc::new(BooleanArray::from(std::mem::take(&mut self.success))) as ArrayRef,
            ),
            (
                "handover",
                Arc::new(BooleanArray::from(std::mem::take(&mut self.handover))) as ArrayRef,
            ),
            (
                "reward",
                Arc::new(Float64Array::from(std::mem::take(&mut self.reward))) as ArrayRef,
            ),
        ])
        .expect("Failed to convert results to record batch");
        self.to_output.record_batch(&record_batch);
    }

    fn close_file(self) {
        self.to_output.close();
    }
}
