//! Newline-delimited corpus writer.

use crate::error::PopulateError;
use corpus_generator::{GenState, Generator};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default buffer size for corpus writing.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Records between progress log lines.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Metrics from a populate operation.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    /// Number of records written.
    pub records_written: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent generating records.
    pub generation_duration: Duration,
    /// Time spent writing records.
    pub write_duration: Duration,
    /// Output size in bytes (summed over files in sharded mode).
    pub file_size_bytes: u64,
}

impl PopulateMetrics {
    /// Calculate records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.records_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.file_size_bytes as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fold a shard's counters into this one. Durations other than the total
    /// are summed across workers.
    fn absorb(&mut self, shard: &PopulateMetrics) {
        self.records_written += shard.records_written;
        self.file_size_bytes += shard.file_size_bytes;
        self.generation_duration += shard.generation_duration;
        self.write_duration += shard.write_duration;
    }
}

/// File name of one shard in sharded mode.
pub fn shard_file_name(shard: usize) -> String {
    format!("part-{shard:05}.ndjson")
}

/// Writes records from a generator to files, one record per line.
pub struct CorpusPopulator<G> {
    generator: G,
    seed: u64,
    state: GenState,
}

impl<G: Generator> CorpusPopulator<G> {
    /// Create a populator whose sequential writes draw from `seed`.
    pub fn new(generator: G, seed: u64) -> Self {
        Self {
            generator,
            seed,
            state: GenState::with_seed(seed),
        }
    }

    /// Get a reference to the generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Records generated so far by sequential writes.
    pub fn records_generated(&self) -> u64 {
        self.state.counter()
    }

    /// Start over from the construction seed.
    pub fn reset(&mut self) {
        self.state = GenState::with_seed(self.seed);
    }

    /// Write `count` records to a new file, replacing any existing one.
    pub fn populate<P: AsRef<Path>>(
        &mut self,
        output_path: P,
        count: u64,
    ) -> Result<PopulateMetrics, PopulateError> {
        let output_path = output_path.as_ref();
        info!(
            "Generating corpus file '{}' with {} records",
            output_path.display(),
            count
        );

        let file = File::create(output_path)?;
        let metrics = write_file(&self.generator, &mut self.state, file, output_path, count)?;

        info!(
            "Corpus generation complete: {} records, {} bytes in {:?} ({:.2} records/sec)",
            metrics.records_written,
            metrics.file_size_bytes,
            metrics.total_duration,
            metrics.records_per_second()
        );
        Ok(metrics)
    }

    /// Append `count` records to a file, continuing the current state.
    pub fn populate_append<P: AsRef<Path>>(
        &mut self,
        output_path: P,
        count: u64,
    ) -> Result<PopulateMetrics, PopulateError> {
        let output_path = output_path.as_ref();
        info!(
            "Appending {} records to corpus file '{}' after record {}",
            count,
            output_path.display(),
            self.state.counter()
        );

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_path)?;
        let metrics = write_file(&self.generator, &mut self.state, file, output_path, count)?;

        info!(
            "Corpus append complete: {} records, total {} bytes in {:?} ({:.2} records/sec)",
            metrics.records_written,
            metrics.file_size_bytes,
            metrics.total_duration,
            metrics.records_per_second()
        );
        Ok(metrics)
    }

    /// Write `count_per_shard` records to each of `shards` files under
    /// `output_dir`, one worker thread per shard.
    ///
    /// Every worker owns its own state seeded with `seed + shard`, so shard 0
    /// matches what [`populate`](Self::populate) writes from a fresh
    /// populator. Sequential state is left untouched.
    pub fn populate_sharded<P: AsRef<Path>>(
        &self,
        output_dir: P,
        shards: usize,
        count_per_shard: u64,
    ) -> Result<PopulateMetrics, PopulateError> {
        if shards == 0 {
            return Err(PopulateError::InvalidShardCount(shards));
        }

        let start_time = Instant::now();
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;
        info!(
            "Generating {} corpus shards in '{}' with {} records each",
            shards,
            output_dir.display(),
            count_per_shard
        );

        let results: Vec<Result<PopulateMetrics, PopulateError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..shards)
                .map(|shard| {
                    let generator = &self.generator;
                    let path = output_dir.join(shard_file_name(shard));
                    let seed = self.seed.wrapping_add(shard as u64);
                    scope.spawn(move || -> Result<PopulateMetrics, PopulateError> {
                        let mut state = GenState::with_seed(seed);
                        let file = File::create(&path)?;
                        let metrics =
                            write_file(generator, &mut state, file, &path, count_per_shard)?;
                        debug!(
                            "Shard {} complete: {} records in {:?}",
                            shard, metrics.records_written, metrics.total_duration
                        );
                        Ok(metrics)
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(shard, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(PopulateError::WorkerPanicked(shard)))
                })
                .collect()
        });

        let mut metrics = PopulateMetrics::default();
        for result in results {
            metrics.absorb(&result?);
        }
        metrics.total_duration = start_time.elapsed();

        info!(
            "Sharded corpus generation complete: {} records, {} bytes in {:?} ({:.2} records/sec)",
            metrics.records_written,
            metrics.file_size_bytes,
            metrics.total_duration,
            metrics.records_per_second()
        );
        Ok(metrics)
    }
}

/// Write `count` records to an open file and measure the run.
fn write_file<G: Generator + ?Sized>(
    generator: &G,
    state: &mut GenState,
    file: File,
    path: &Path,
    count: u64,
) -> Result<PopulateMetrics, PopulateError> {
    let start_time = Instant::now();
    let mut metrics = PopulateMetrics::default();
    let mut writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
    let mut record = Vec::new();

    for _ in 0..count {
        record.clear();

        let gen_start = Instant::now();
        generator.emit(state, &mut record)?;
        record.push(b'\n');
        metrics.generation_duration += gen_start.elapsed();

        let write_start = Instant::now();
        writer.write_all(&record)?;
        metrics.write_duration += write_start.elapsed();

        metrics.records_written += 1;
        if metrics.records_written % PROGRESS_INTERVAL == 0 {
            debug!("Written {} records", metrics.records_written);
        }
    }

    writer.flush()?;
    drop(writer);

    metrics.file_size_bytes = std::fs::metadata(path)?.len();
    metrics.total_duration = start_time.elapsed();
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::{Config, Fields};
    use corpus_generator::{JsonGenerator, TemplateGenerator};
    use tempfile::TempDir;

    const FIELDS: &str = r#"
- name: Version
  type: long
- name: AccountID
  type: long
- name: SrcAddr
  type: ip
- name: Bytes
  type: long
- name: Action
  type: keyword
"#;

    const CONFIG: &str = r#"
- name: Version
  value: 2
- name: AccountID
  value: 627286350134
- name: Bytes
  range: 100000
  fuzziness: 5
- name: Action
  enum: ["ACCEPT", "REJECT", "-"]
"#;

    fn json_generator() -> JsonGenerator {
        let fields = Fields::from_yaml(FIELDS).unwrap();
        let config = Config::from_yaml(CONFIG).unwrap();
        JsonGenerator::new(&config, &fields).unwrap()
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_metrics() {
        let metrics = PopulateMetrics {
            records_written: 1000,
            total_duration: Duration::from_secs(10),
            generation_duration: Duration::from_secs(2),
            write_duration: Duration::from_secs(8),
            file_size_bytes: 100000,
        };

        assert_eq!(metrics.records_per_second(), 100.0);
        assert_eq!(metrics.bytes_per_second(), 10000.0);
        assert_eq!(PopulateMetrics::default().records_per_second(), 0.0);
    }

    #[test]
    fn test_shard_file_name() {
        assert_eq!(shard_file_name(0), "part-00000.ndjson");
        assert_eq!(shard_file_name(42), "part-00042.ndjson");
    }

    #[test]
    fn test_populate_json() {
        let mut populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("corpus.ndjson");

        let metrics = populator.populate(&output_path, 10).unwrap();

        assert_eq!(metrics.records_written, 10);
        assert_eq!(
            metrics.file_size_bytes,
            std::fs::metadata(&output_path).unwrap().len()
        );

        let lines = read_lines(&output_path);
        assert_eq!(lines.len(), 10);
        for line in lines {
            let json: serde_json::Value = serde_json::from_str(&line).unwrap();
            assert_eq!(json["Version"], 2);
            assert_eq!(json["AccountID"], 627286350134u64);
            assert!(json.get("SrcAddr").is_some());
            assert!(json["Bytes"].is_i64());
        }
        assert_eq!(populator.records_generated(), 10);
    }

    #[test]
    fn test_file_matches_direct_emit() {
        let mut populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("corpus.ndjson");

        populator.populate(&output_path, 3).unwrap();

        let mut state = GenState::with_seed(42);
        let expected: Vec<String> = (0..3)
            .map(|_| {
                let mut buf = Vec::new();
                populator.generator().emit(&mut state, &mut buf).unwrap();
                String::from_utf8(buf).unwrap()
            })
            .collect();
        assert_eq!(read_lines(&output_path), expected);
    }

    #[test]
    fn test_populate_replaces_file() {
        let mut populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("corpus.ndjson");

        populator.populate(&output_path, 10).unwrap();
        populator.populate(&output_path, 3).unwrap();

        assert_eq!(read_lines(&output_path).len(), 3);
    }

    #[test]
    fn test_populate_append() {
        let mut populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("corpus.ndjson");

        let metrics1 = populator.populate(&output_path, 5).unwrap();
        assert_eq!(metrics1.records_written, 5);

        let metrics2 = populator.populate_append(&output_path, 5).unwrap();
        assert_eq!(metrics2.records_written, 5);
        assert!(metrics2.file_size_bytes > metrics1.file_size_bytes);

        assert_eq!(read_lines(&output_path).len(), 10);
        assert_eq!(populator.records_generated(), 10);
    }

    #[test]
    fn test_reset_replays_seed() {
        let mut populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.ndjson");
        let second = temp_dir.path().join("second.ndjson");

        populator.populate(&first, 20).unwrap();
        populator.reset();
        populator.populate(&second, 20).unwrap();

        assert_eq!(read_lines(&first), read_lines(&second));
    }

    #[test]
    fn test_populate_template() {
        let fields = Fields::from_yaml(FIELDS).unwrap();
        let config = Config::from_yaml(CONFIG).unwrap();
        let generator = TemplateGenerator::new(
            b"{{.Version}} {{.AccountID}} {{.SrcAddr}} {{.Action}}",
            &config,
            &fields,
        )
        .unwrap();
        let mut populator = CorpusPopulator::new(generator, 42);
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("flow.log");

        populator.populate(&output_path, 25).unwrap();

        for line in read_lines(&output_path) {
            let parts: Vec<&str> = line.split(' ').collect();
            assert_eq!(parts.len(), 4);
            assert_eq!(parts[0], "2");
            assert_eq!(parts[1], "627286350134");
            assert!(parts[3] == "ACCEPT" || parts[3] == "REJECT");
        }
    }

    #[test]
    fn test_populate_sharded() {
        let populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();
        let shard_dir = temp_dir.path().join("shards");

        let metrics = populator.populate_sharded(&shard_dir, 4, 50).unwrap();

        assert_eq!(metrics.records_written, 200);
        let mut total_bytes = 0;
        for shard in 0..4 {
            let path = shard_dir.join(shard_file_name(shard));
            let lines = read_lines(&path);
            assert_eq!(lines.len(), 50);
            for line in &lines {
                serde_json::from_str::<serde_json::Value>(line).unwrap();
            }
            total_bytes += std::fs::metadata(&path).unwrap().len();
        }
        assert_eq!(metrics.file_size_bytes, total_bytes);
        assert_eq!(populator.records_generated(), 0);
    }

    #[test]
    fn test_first_shard_matches_sequential_run() {
        let mut populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();
        let sequential = temp_dir.path().join("sequential.ndjson");

        populator.populate_sharded(temp_dir.path(), 2, 30).unwrap();
        populator.populate(&sequential, 30).unwrap();

        let first_shard = temp_dir.path().join(shard_file_name(0));
        let second_shard = temp_dir.path().join(shard_file_name(1));
        assert_eq!(read_lines(&first_shard), read_lines(&sequential));
        assert_ne!(read_lines(&second_shard), read_lines(&sequential));
    }

    #[test]
    fn test_zero_shards() {
        let populator = CorpusPopulator::new(json_generator(), 42);
        let temp_dir = TempDir::new().unwrap();

        let result = populator.populate_sharded(temp_dir.path(), 0, 10);
        assert!(matches!(result, Err(PopulateError::InvalidShardCount(0))));
    }
}
