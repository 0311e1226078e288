use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::csv::Writer as CsvWriter;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchWriter};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Deserialize;

use ratsel_core::bucket::TimeMS;

use crate::tables::learn::LearningWriter;
use crate::tables::net::NetStatWriter;
use crate::tables::tx::TxRecordWriter;

#[derive(Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputType {
    TxRecords,
    NetStats,
    Learning,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OutputSettings {
    pub output_interval: TimeMS,
    pub output_path: String,
    pub outputs: Vec<Outputs>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Outputs {
    pub output_type: OutputType,
    pub output_filename: String,
}

/// A buffered table writer. Rows accumulate in column vectors and are flushed as
/// one record batch per output interval.
pub trait ResultWriter {
    fn schema() -> Schema;
    fn write_to_file(&mut self);
    fn close_file(self);
}

/// The file format is picked from the output file extension.
#[derive(Debug)]
pub enum WriterType {
    Parquet(ArrowWriter<File>),
    Csv(CsvWriter<File>),
}

impl WriterType {
    pub fn new(file_name: &PathBuf, schema: Schema) -> Self {
        if file_name.exists() {
            if let Err(e) = fs::remove_file(file_name) {
                panic!("Error deleting the old output file: {}", e);
            }
        }
        let extension = file_name
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let output_file = match File::create(file_name) {
            Ok(file) => file,
            Err(e) => panic!("Failed to create output file: {}", e),
        };
        match extension {
            "parquet" => {
                let props = WriterProperties::builder()
                    .set_compression(Compression::SNAPPY)
                    .build();
                let writer =
                    match ArrowWriter::try_new(output_file, SchemaRef::from(schema), Some(props)) {
                        Ok(writer) => writer,
                        Err(e) => panic!("Failed to create parquet writer: {}", e),
                    };
                WriterType::Parquet(writer)
            }
            "csv" => WriterType::Csv(CsvWriter::new(output_file)),
            _ => panic!("Invalid output file extension: {:?}", file_name),
        }
    }

    pub fn record_batch(&mut self, batch: &RecordBatch) {
        match self {
            WriterType::Parquet(writer) => {
                writer.write(batch).expect("Failed to write parquet batch")
            }
            WriterType::Csv(writer) => writer.write(batch).expect("Failed to write csv batch"),
        }
    }

    pub fn close(self) {
        match self {
            WriterType::Parquet(writer) => {
                writer.close().expect("Failed to close parquet file");
            }
            WriterType::Csv(writer) => {
                writer.close().expect("Failed to close csv file");
            }
        }
    }
}

/// The set of writers requested by the scenario, flushed together on the output
/// interval.
#[derive(Debug)]
pub struct Results {
    pub tx_records: Option<TxRecordWriter>,
    pub net_stats: Option<NetStatWriter>,
    pub learning: Option<LearningWriter>,
}

impl Results {
    pub fn new(output_settings: &OutputSettings) -> Self {
        let output_path = Path::new(&output_settings.output_path).join("files");
        if !output_path.exists() {
            fs::create_dir_all(&output_path).expect("Failed to create output directory");
        }
        let file_for = |wanted: OutputType| {
            output_settings
                .outputs
                .iter()
                .filter(|output| output.output_type == wanted)
                .last()
                .map(|settings| output_path.join(&settings.output_filename))
        };
        Self {
            tx_records: file_for(OutputType::TxRecords).map(|f| TxRecordWriter::new(&f)),
            net_stats: file_for(OutputType::NetStats).map(|f| NetStatWriter::new(&f)),
            learning: file_for(OutputType::Learning).map(|f| LearningWriter::new(&f)),
        }
    }

    pub fn write_to_file(&mut self) {
        if let Some(writer) = &mut self.tx_records {
            writer.write_to_file();
        }
        if let Some(writer) = &mut self.net_stats {
            writer.write_to_file();
        }
        if let Some(writer) = &mut self.learning {
            writer.write_to_file();
        }
    }

    pub fn close_files(self) {
        if let Some(writer) = self.tx_records {
            writer.close_file();
        }
        if let Some(writer) = self.net_stats {
            writer.close_file();
        }
        if let Some(writer) = self.learning {
            writer.close_file();
        }
    }
}
