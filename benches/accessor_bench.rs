//! Criterion benchmark untuk Buffer Accessor
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fieldpack::{read, read_scalar, write, write_scalar, Endian, Schema, TypeTag, Value};

fn demo_schema(endian: Endian) -> Schema {
    let mut schema = Schema::with_endian(endian);
    schema.push(TypeTag::Float32, 1).unwrap();
    schema.push(TypeTag::Float32, 1).unwrap();
    schema.push(TypeTag::Float32, 1).unwrap();
    schema.push(TypeTag::Int32, 1).unwrap();
    schema.push(TypeTag::Float64, 16).unwrap();
    schema
}

fn bench_scalar(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar");
    group.throughput(Throughput::Elements(1));

    let schema = demo_schema(Endian::native());
    let mut buf = vec![0u8; schema.total_size() as usize];

    group.bench_function("write_scalar", |b| {
        let mut i = 0i32;
        b.iter(|| {
            write_scalar(&schema, &mut buf, black_box(3), black_box(i)).unwrap();
            i = i.wrapping_add(1);
        });
    });

    group.bench_function("read_scalar", |b| {
        b.iter(|| black_box(read_scalar::<i32>(&schema, &buf, black_box(3)).unwrap()));
    });

    let swapped = demo_schema(match Endian::native() {
        Endian::Little => Endian::Big,
        Endian::Big => Endian::Little,
    });
    group.bench_function("write_scalar_swapped", |b| {
        b.iter(|| write_scalar(&swapped, &mut buf, black_box(0), black_box(1.5f32)).unwrap());
    });

    group.finish();
}

fn bench_tagged(c: &mut Criterion) {
    let mut group = c.benchmark_group("tagged");

    let schema = demo_schema(Endian::native());
    let mut buf = vec![0u8; schema.total_size() as usize];
    let scalar = Value::from(42i32);
    let array = Value::array(vec![1.0f64; 16]);

    group.throughput(Throughput::Elements(1));
    group.bench_function("write_value", |b| {
        b.iter(|| write(&schema, &mut buf, black_box(3), black_box(&scalar)).unwrap());
    });

    group.throughput(Throughput::Bytes(128));
    group.bench_function("write_array_16xf64", |b| {
        b.iter(|| write(&schema, &mut buf, black_box(4), black_box(&array)).unwrap());
    });
    group.bench_function("read_array_16xf64", |b| {
        b.iter(|| black_box(read(&schema, &buf, black_box(4)).unwrap()));
    });

    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");

    for fields in [16u64, 256, 4096].iter() {
        group.throughput(Throughput::Elements(*fields));
        group.bench_function(format!("freeze_{}", fields), |b| {
            b.iter(|| {
                let mut schema = Schema::new();
                for i in 0..*fields {
                    schema.push(TypeTag::ALL[(i % 11) as usize], 1).unwrap();
                }
                black_box(schema.total_size())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scalar, bench_tagged, bench_layout);
criterion_main!(benches);
