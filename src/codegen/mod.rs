// protocrap-objc codegen module

use anyhow::{Context, Result, anyhow};
use log::info;
use prost::Message;
use prost_types::FileDescriptorSet;
use prost_types::compiler::code_generator_response::File as ResponseFile;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};

pub mod dependencies;
pub mod descriptor;
pub mod enums;
pub mod extension;
pub mod file;
pub mod generators;
pub mod message;
pub mod names;
pub mod options;
pub mod printer;
pub mod types;

pub use descriptor::{FileId, FileSet};
pub use file::{FileGenerator, GeneratedFile, ManifestEntry, RegistrationPlan, UnitPair};
pub use generators::SubGenerators;
pub use options::{InitGuard, Options};

/// Generated units of one schema file, with its manifest entry.
#[derive(Debug, Clone)]
pub struct FileOutput {
    pub units: UnitPair,
    pub manifest: ManifestEntry,
}

/// Generate Objective-C from protobuf descriptor bytes (FileDescriptorSet
/// binary format, as written by `protoc --include_imports`). An empty
/// `files_to_generate` means every file in the set.
pub fn generate(
    descriptor_bytes: &[u8],
    files_to_generate: &[String],
    options: &Options,
) -> Result<Vec<FileOutput>> {
    let set = FileDescriptorSet::decode(descriptor_bytes)
        .context("failed to decode file descriptor set")?;
    info!("decoded descriptor set with {} files", set.file.len());

    let files = FileSet::from_descriptor_set(&set)?;
    let targets = if files_to_generate.is_empty() {
        files.iter().map(|(id, _)| id).collect()
    } else {
        resolve_targets(&files, files_to_generate)?
    };
    generate_file_set(&files, &targets, options)
}

fn resolve_targets(files: &FileSet, names: &[String]) -> Result<Vec<FileId>> {
    names
        .iter()
        .map(|name| {
            files
                .find(name)
                .ok_or_else(|| anyhow!("{} is not in the descriptor set", name))
        })
        .collect()
}

/// Generate the unit pair of every file in `targets`. Fails before emitting
/// anything if two files of the set would collide on generated names.
pub fn generate_file_set(
    files: &FileSet,
    targets: &[FileId],
    options: &Options,
) -> Result<Vec<FileOutput>> {
    names::check_collisions(files)?;
    let generators = SubGenerators::objc(options);

    targets
        .iter()
        .map(|&id| {
            let generator = FileGenerator::new(files, id, options, &generators);
            let (units, manifest) = generator
                .generate()
                .with_context(|| format!("while generating {}", files.get(id).name))?;
            Ok(FileOutput { units, manifest })
        })
        .collect()
}

/// Run the protoc plugin protocol. Failures are reported in the response's
/// `error` field, as protoc expects.
pub fn generate_response(request: CodeGeneratorRequest) -> CodeGeneratorResponse {
    match plugin_outputs(&request) {
        Ok(outputs) => CodeGeneratorResponse {
            file: outputs
                .into_iter()
                .flat_map(|output| [output.units.header, output.units.source])
                .map(|generated| ResponseFile {
                    name: Some(generated.name),
                    content: Some(generated.content),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        },
        Err(e) => CodeGeneratorResponse {
            error: Some(format!("{:#}", e)),
            ..Default::default()
        },
    }
}

fn plugin_outputs(request: &CodeGeneratorRequest) -> Result<Vec<FileOutput>> {
    let options = Options::from_parameter(request.parameter())?;
    let files = FileSet::from_protos(&request.proto_file)?;
    let targets = resolve_targets(&files, &request.file_to_generate)?;
    generate_file_set(&files, &targets, &options)
}

/// JSON manifest describing every generated file.
pub fn manifest(outputs: &[FileOutput]) -> Result<String> {
    let entries: Vec<&ManifestEntry> = outputs.iter().map(|o| &o.manifest).collect();
    serde_json::to_string_pretty(&entries).context("failed to serialize manifest")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use prost_types::FileDescriptorProto;

    fn request(
        protos: Vec<FileDescriptorProto>,
        targets: &[&str],
        parameter: &str,
    ) -> CodeGeneratorRequest {
        CodeGeneratorRequest {
            file_to_generate: targets.iter().map(|s| s.to_string()).collect(),
            parameter: Some(parameter.to_string()),
            proto_file: protos,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_from_descriptor_bytes() {
        let set = FileDescriptorSet {
            file: vec![file("a.proto", &[]), file("b.proto", &["a.proto"])],
        };
        let bytes = set.encode_to_vec();

        let all = generate(&bytes, &[], &Options::default()).unwrap();
        assert_eq!(all.len(), 2);

        let only_b = generate(&bytes, &["b.proto".to_string()], &Options::default()).unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].units.header.name, "B.pb.h");
        assert_eq!(only_b[0].units.source.name, "B.pb.m");
    }

    #[test]
    fn test_unknown_target_fails() {
        let bytes = FileDescriptorSet { file: vec![file("a.proto", &[])] }.encode_to_vec();
        let err = generate(&bytes, &["zzz.proto".to_string()], &Options::default()).unwrap_err();
        assert!(err.to_string().contains("zzz.proto"));
    }

    #[test]
    fn test_garbage_input_fails() {
        assert!(generate(&[0xff, 0xff, 0xff], &[], &Options::default()).is_err());
    }

    #[test]
    fn test_naming_collision_fails() {
        // Both map to container `FooBarRoot` and header `FooBar.pb.h`.
        let files = FileSet::from_protos(&[file("foo_bar.proto", &[]), file("foo-bar.proto", &[])])
            .unwrap();
        let targets: Vec<_> = files.iter().map(|(id, _)| id).collect();
        assert!(generate_file_set(&files, &targets, &Options::default()).is_err());
    }

    #[test]
    fn test_plugin_response_lists_both_units() {
        let response = generate_response(request(
            vec![file("a.proto", &[]), file("b.proto", &["a.proto"])],
            &["b.proto"],
            "arc",
        ));
        assert_eq!(response.error, None);
        let names: Vec<_> = response.file.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["B.pb.h", "B.pb.m"]);
        assert!(response.file[1].content().contains("extensionRegistry = registry;"));
    }

    #[test]
    fn test_plugin_errors_go_in_response() {
        let response =
            generate_response(request(vec![file("a.proto", &[])], &["a.proto"], "bogus"));
        assert!(response.file.is_empty());
        assert!(response.error.unwrap().contains("bogus"));
    }

    #[test]
    fn test_manifest_json() {
        let files = FileSet::from_protos(&[file("a.proto", &[]), file("b.proto", &["a.proto"])])
            .unwrap();
        let outputs =
            generate_file_set(&files, &[files.find("b.proto").unwrap()], &Options::default())
                .unwrap();
        let json: serde_json::Value = serde_json::from_str(&manifest(&outputs).unwrap()).unwrap();
        assert_eq!(json[0]["file"], "b.proto");
        assert_eq!(json[0]["container"], "BRoot");
        assert_eq!(json[0]["registration"]["dependencies"][0], "ARoot");
    }
}
