use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};

use ratsel_core::bucket::TimeMS;
use ratsel_models::stats::LearningStats;

use crate::results::{ResultWriter, WriterType};

/// One row per output interval with learner aggregates across all vehicles.
#[derive(Debug)]
pub struct LearningWriter {
    time_step: Vec<u64>,
    decisions: Vec<u64>,
    explorations: Vec<u64>,
    table_entries: Vec<u64>,
    exploration_ratio: Vec<f64>,
    avg_epsilon: Vec<f64>,
    avg_reward: Vec<f64>,
    to_output: WriterType,
}

impl LearningWriter {
    pub fn new(output_file: &PathBuf) -> Self {
        Self {
            to_output: WriterType::new(output_file, Self::schema()),
            time_step: Vec::new(),
            decisions: Vec::new(),
            explorations: Vec::new(),
            table_entries: Vec::new(),
            exploration_ratio: Vec::new(),
            avg_epsilon: Vec::new(),
            avg_reward: Vec::new(),
        }
    }

    pub fn add_data(&mut self, time_step: TimeMS, stats: &LearningStats) {
        self.time_step.push(time_step.as_u64());
        self.decisions.push(stats.decisions);
        self.explorations.push(stats.explorations);
        self.table_entries.push(stats.table_entries);
        self.exploration_ratio.push(stats.exploration_ratio());
        self.avg_epsilon.push(stats.avg_epsilon);
        self.avg_reward.push(stats.avg_reward);
    }
}

impl ResultWriter for LearningWriter {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("time_step", DataType::UInt64, false),
            Field::new("decisions", DataType::UInt64, false),
            Field::new("explorations", DataType::UInt64, false),
            Field::new("table_entries", DataType::UInt64, false),
            Field::new("exploration_ratio", DataType::Float64, false),
            Field::new("avg_epsilon", DataType::Float64, false),
            Field::new("avg_reward", DataType::Float64, false),
        ])
    }

    fn write_to_file(&mut self) {
        let record_batch = RecordBatch::try_from_iter(vec![
            (
                "time_step",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.time_step))) as ArrayRef,
            ),
            (
                "decisions",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.decisions))) as ArrayRef,
            ),
            (
                "explorations",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.explorations))) as ArrayRef,
            ),
            (
                "table_entries",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.table_entries))) as ArrayRef,
            ),
            (
                "exploration_ratio",
                Arc::new(Float64Array::from(std::mem::take(&mut self.exploration_ratio)))
                    as ArrayRef,
            ),
            (
                "avg_epsilon",
                Arc::new(Float64Array::from(std::mem::take(&mut self.avg_epsilon))) as ArrayRef,
            ),
            (
                "avg_reward",
                Arc::new(Float64Array::from(std::mem::take(&mut self.avg_reward))) as ArrayRef,
            ),
        ])
        .expect("Failed to convert results to record batch");
        self.to_output.record_batch(&record_batch);
    }

    fn close_file(self) {
        self.to_output.close();
    }
}
