//! fieldpack CLI
//!
//! Usage:
//!   fieldpack bench [--iterations N]
//!   fieldpack sample <path>
//!   fieldpack inspect <path>
//!
//! Log level lewat `RUST_LOG` (default: info, `--verbose` = debug).

use std::hint::black_box;
use std::io;
use std::time::Instant;

use fieldpack::protocol::header::{export_standalone, import_standalone, standalone_size};
use fieldpack::{CodecError, MappedBuffer, Reader, Record, Schema, TypeTag, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    #[error("usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Bench,
    Sample,
    Inspect,
    Help,
}

/// CLI configuration
struct Config {
    command: Command,
    path: Option<String>,
    iterations: usize,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: Command::Help,
            path: None,
            iterations: 1_000_000,
            verbose: false,
        }
    }
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "bench" => config.command = Command::Bench,
            "sample" => config.command = Command::Sample,
            "inspect" => config.command = Command::Inspect,
            "--iterations" | "-n" => {
                if i + 1 < args.len() {
                    config.iterations = args[i + 1].parse().unwrap_or(1_000_000);
                    i += 1;
                }
            }
            "--verbose" | "-v" => config.verbose = true,
            "--help" | "-h" => config.command = Command::Help,
            other => config.path = Some(other.to_string()),
        }
        i += 1;
    }

    config
}

fn print_usage() {
    println!("fieldpack - schema-driven fixed-layout binary codec\n");
    println!("USAGE:");
    println!("  fieldpack bench [--iterations N]   Measure field write/read latency");
    println!("  fieldpack sample <path>            Write a sample standalone file");
    println!("  fieldpack inspect <path>           Print schema and values of a standalone file");
    println!("\nOPTIONS:");
    println!("  -n, --iterations N   Benchmark iterations (default 1000000)");
    println!("  -v, --verbose        Debug logging");
}

/// Schema contoh: x, y, z (float32) + id (int32) + label (char[8])
fn sample_schema() -> Result<Schema, CodecError> {
    let mut schema = Schema::new();
    schema.push(TypeTag::Float32, 1)?;
    schema.push(TypeTag::Float32, 1)?;
    schema.push(TypeTag::Float32, 1)?;
    schema.push(TypeTag::Int32, 1)?;
    schema.push(TypeTag::Char, 8)?;
    Ok(schema)
}

fn run_bench(iterations: usize) -> Result<(), CliError> {
    println!("📊 Field Access Benchmark");
    println!("-------------------------");

    let schema = sample_schema()?;
    let mut record = Record::new(&schema)?;

    let start = Instant::now();
    for i in 0..iterations {
        record.write_scalar(3, black_box(i as i32))?;
    }
    let write_duration = start.elapsed();

    let start = Instant::now();
    let mut sum = 0i64;
    for _ in 0..iterations {
        sum += record.read_scalar::<i32>(black_box(3))? as i64;
    }
    let read_duration = start.elapsed();
    black_box(sum);

    let value = Value::from(1.5f32);
    let start = Instant::now();
    for _ in 0..iterations {
        record.write(black_box(1), &value)?;
    }
    let tagged_duration = start.elapsed();

    let per_op = |d: std::time::Duration| d.as_nanos() as f64 / iterations.max(1) as f64;

    println!("  Record size: {} bytes", schema.total_size());
    println!("  Operations: {}", iterations);
    println!("  Scalar write: {:.2} ns/op", per_op(write_duration));
    println!("  Scalar read:  {:.2} ns/op", per_op(read_duration));
    println!("  Tagged write: {:.2} ns/op", per_op(tagged_duration));
    Ok(())
}

fn run_sample(path: &str) -> Result<(), CliError> {
    let schema = sample_schema()?;
    let mut record = Record::new(&schema)?;
    record.write_scalar(0, 1.1f32)?;
    record.write_scalar(1, 2.2f32)?;
    record.write_scalar(2, 3.3f32)?;
    record.write_scalar(3, 123i32)?;
    record.write(4, &Value::chars(*b"sample\0\0"))?;
    let data = record.into_bytes();

    let mut file = MappedBuffer::create(path, standalone_size(&schema)?)?;
    let out = file
        .as_mut_slice()
        .ok_or(CliError::Usage("output file is not writable"))?;
    let written = export_standalone(&schema, &data, out)?;
    file.flush()?;

    info!(path, bytes = written, "sample written");
    println!("✅ Wrote {} bytes to {}", written, path);
    Ok(())
}

fn run_inspect(path: &str) -> Result<(), CliError> {
    let file = MappedBuffer::open_read(path)?;
    debug!(path, bytes = file.len(), "file mapped");

    let (schema, data) = import_standalone(file.as_slice())?;
    println!("📦 {} ({} bytes)", path, file.len());
    println!(
        "   Byte order: {:?}, fields: {}, data: {} bytes\n",
        schema.endian(),
        schema.field_count(),
        schema.total_size()
    );

    let reader = Reader::new(&schema, data);
    for (i, (field, value)) in schema.fields().iter().zip(reader.values()).enumerate() {
        let offset = schema.offset_of(i as u64)?;
        println!(
            "   [{i:>3}] @{offset:<6} {:<8} x{:<4} {}",
            field.tag().to_string(),
            field.repeat(),
            render(&value?)
        );
    }
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::Chars(bytes) => format!("{:?}", String::from_utf8_lossy(bytes)),
        Value::Nested(bytes) => format!("<{} bytes>", bytes.len()),
        Value::Array(array) => format!("{array:?}"),
        scalar => format!("{scalar:?}"),
    }
}

fn main() {
    let config = parse_args();

    let default_level = if config.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match (config.command, config.path.as_deref()) {
        (Command::Bench, _) => run_bench(config.iterations),
        (Command::Sample, Some(path)) => run_sample(path),
        (Command::Inspect, Some(path)) => run_inspect(path),
        (Command::Sample | Command::Inspect, None) => Err(CliError::Usage("missing <path>")),
        (Command::Help, _) => {
            print_usage();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
