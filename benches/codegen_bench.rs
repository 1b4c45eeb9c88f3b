use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use prost::Message;
use prost_types::field_descriptor_proto::Type;
use prost_types::{FileDescriptorProto, FileDescriptorSet};

use protocrap_objc::codegen::{self, FileSet, Options};
use protocrap_objc::registry::build_registry;
use protocrap_objc::test_utils::*;

// Each file imports the two before it, so the import graph is full of
// diamonds.
fn make_file_set(count: usize) -> Vec<FileDescriptorProto> {
    (0..count)
        .map(|i| {
            let deps: Vec<String> = (i.saturating_sub(2)..i)
                .map(|d| format!("bench/file{}.proto", d))
                .collect();
            let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
            let mut proto = file(&format!("bench/file{}.proto", i), &deps);
            proto.package = Some("bench".to_string());
            for m in 0..8 {
                let mut msg = message(
                    &format!("Msg{}_{}", i, m),
                    vec![
                        scalar("id", 1, Type::Int64),
                        scalar("label", 2, Type::String),
                        repeated(scalar("samples", 3, Type::Float)),
                    ],
                );
                msg.nested_type
                    .push(message("Part", vec![scalar("weight", 1, Type::Double)]));
                proto.message_type.push(msg);
            }
            proto
                .enum_type
                .push(enum_type(&format!("Mode{}", i), &[("MODE_FAST", 0), ("MODE_SLOW", 1)]));
            proto.extension.push(extension(
                &format!("tag{}", i),
                1000 + i as i32,
                Type::String,
                &format!(".bench.Msg{}_0", i),
            ));
            proto
        })
        .collect()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for count in [10, 100] {
        let bytes = FileDescriptorSet {
            file: make_file_set(count),
        }
        .encode_to_vec();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(format!("{}_files", count), |b| {
            b.iter(|| {
                let outputs =
                    codegen::generate(black_box(&bytes), &[], &Options::default()).unwrap();
                black_box(outputs)
            })
        });
    }

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let files = FileSet::from_protos(&make_file_set(100)).unwrap();
    let last = files.find("bench/file99.proto").unwrap();

    c.bench_function("registry/build", |b| {
        b.iter(|| black_box(build_registry(&files, black_box(last))))
    });
}

criterion_group!(benches, bench_generate, bench_registry);
criterion_main!(benches);
