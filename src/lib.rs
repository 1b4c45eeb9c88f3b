//! Objective-C code generator for protocol buffers.
//!
//! Reads protoc descriptors and writes a `.pb.h`/`.pb.m` pair per schema
//! file for the ProtocolBuffers Objective-C runtime. Each pair carries a
//! container class whose `+initialize` builds the file's extension registry
//! exactly once.

pub mod codegen;
pub mod registry;
pub mod test_utils;

pub use codegen::{
    FileOutput, GeneratedFile, InitGuard, Options, UnitPair, generate, generate_file_set,
    generate_response, manifest,
};
