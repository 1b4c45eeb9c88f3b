use codegen_tests::*;
use pretty_assertions::assert_eq;
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;

use protocrap_objc::codegen::{self, FileOutput, FileSet, Options};
use protocrap_objc::registry::Program;

fn generate_all(files: Vec<prost_types::FileDescriptorProto>) -> Vec<FileOutput> {
    codegen::generate(&descriptor_set(files), &[], &Options::default()).unwrap()
}

fn output<'a>(outputs: &'a [FileOutput], file: &str) -> &'a FileOutput {
    outputs
        .iter()
        .find(|o| o.manifest.file == file)
        .unwrap_or_else(|| panic!("{} was not generated", file))
}

fn position(text: &str, needle: &str) -> usize {
    text.find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in:\n{}", needle, text))
}

#[test]
fn test_enum_only_file() {
    let outputs = generate_all(vec![status()]);
    let units = &outputs[0].units;

    assert_eq!(units.header.name, "Status.pb.h");
    assert_eq!(
        units.header.content,
        r#"// Generated by the protocol buffer compiler.  DO NOT EDIT!

#import <ProtocolBuffers/ProtocolBuffers.h>

#ifndef __has_feature
  #define __has_feature(x) 0 // Compatibility with non-clang compilers.
#endif // __has_feature

#ifndef NS_RETURNS_NOT_RETAINED
  #if __has_feature(attribute_ns_returns_not_retained)
    #define NS_RETURNS_NOT_RETAINED __attribute__((ns_returns_not_retained))
  #else
    #define NS_RETURNS_NOT_RETAINED
  #endif
#endif

typedef NS_ENUM(SInt32, PBState) {
  PBStateStateOn = 0,
  PBStateStateOff = 1,
};

BOOL PBStateIsValidValue(PBState value);


@interface PBStatusRoot : NSObject {
}
+ (PBExtensionRegistry*) extensionRegistry;
+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry;
@end

"#
    );

    assert_eq!(units.source.name, "Status.pb.m");
    assert_eq!(
        units.source.content,
        r#"// Generated by the protocol buffer compiler.  DO NOT EDIT!

#import "Status.pb.h"

@implementation PBStatusRoot
static PBExtensionRegistry* extensionRegistry = nil;
+ (void) initialize {
  if (self == [PBStatusRoot class]) {
    static dispatch_once_t onceToken;
    dispatch_once(&onceToken, ^{
      PBMutableExtensionRegistry* registry = [PBMutableExtensionRegistry registry];
      [self registerAllExtensions:registry];
      extensionRegistry = [registry retain];
    });
  }
}
+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry {
}
+ (PBExtensionRegistry*) extensionRegistry {
  return extensionRegistry;
}
@end

BOOL PBStateIsValidValue(PBState value) {
  switch (value) {
    case PBStateStateOn:
    case PBStateStateOff:
      return YES;
    default:
      return NO;
  }
}
"#
    );
}

#[test]
fn test_example_a() {
    let outputs = generate_all(vec![example_a()]);
    let a = output(&outputs, "a.proto");
    let header = &a.units.header.content;

    let color = position(header, "typedef NS_ENUM(SInt32, Color)");
    let container = position(header, "@interface ARoot : NSObject");
    let point = position(header, "@interface Point : PBGeneratedMessage");
    assert!(color < container && container < point);

    let source = &a.units.source.content;
    assert_eq!(source.matches("registerAllExtensions:registry];").count(), 1);
    assert_eq!(source.matches("[PBMutableExtensionRegistry registry]").count(), 1);
    assert!(source.contains("defaultPointInstance = [[Point alloc] init];"));
    assert_eq!(a.manifest.registration.calls().collect::<Vec<_>>(), ["ARoot"]);
}

#[test]
fn test_example_b() {
    let outputs = generate_all(vec![example_a(), example_b()]);
    let a = output(&outputs, "a.proto");
    let b = output(&outputs, "b.proto");

    assert!(b.units.header.content.contains(concat!(
        "#import \"A.pb.h\"\n",
        "\n",
        "@class Point;\n",
        "@class Point_Builder;\n",
        "@class Segment;\n",
        "@class Segment_Builder;\n",
        "#ifndef __has_feature\n",
    )));

    let mut union = a.manifest.forward_declarations.clone();
    union.extend(["@class Segment".to_string(), "@class Segment_Builder".to_string()]);
    union.sort();
    union.dedup();
    assert_eq!(b.manifest.forward_declarations, union);

    assert!(b.units.source.content.contains(concat!(
        "      PBMutableExtensionRegistry* registry = [PBMutableExtensionRegistry registry];\n",
        "      [self registerAllExtensions:registry];\n",
        "      [ARoot registerAllExtensions:registry];\n",
        "      extensionRegistry = [registry retain];\n",
    )));
    assert!(b.units.source.content.contains(
        "+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry {\n}\n"
    ));
}

#[test]
fn test_default_instances_do_not_wait_for_containers() {
    let outputs = generate_all(vec![example_a(), example_b()]);

    for (file, class, root) in [("a.proto", "Point", "ARoot"), ("b.proto", "Segment", "BRoot")] {
        let source = &output(&outputs, file).units.source.content;
        let container_init = position(source, "+ (void) initialize {\n  if (self == [");
        assert!(source[container_init..].starts_with(&format!(
            "+ (void) initialize {{\n  if (self == [{} class]) {{\n",
            root
        )));
        assert!(source.contains(&format!(
            concat!(
                "@implementation {0}\n",
                "\n",
                "+ (void) initialize {{\n",
                "  if (self == [{0} class]) {{\n",
                "    default{0}Instance = [[{0} alloc] init];\n",
                "  }}\n",
                "}}\n",
            ),
            class
        )));
        assert_eq!(source.matches(&format!("default{}Instance = ", class)).count(), 1);
    }

    let b = &output(&outputs, "b.proto").units.source.content;
    let extension = position(b, "@interface Segment ()\n");
    let builder = position(b, "@implementation Segment_Builder\n");
    let presence = position(b, "@property BOOL hasStart;\n");
    assert!(extension < presence && presence < builder);
    assert!(b[builder..].contains("  result.hasStart = YES;\n"));
}

#[test]
fn test_import_cycle_terminates() {
    let outputs = generate_all(cycle());
    assert_eq!(outputs.len(), 2);
    for output in &outputs {
        assert_eq!(
            output.manifest.forward_declarations,
            ["@class Ping", "@class Ping_Builder", "@class Pong", "@class Pong_Builder"]
        );
    }
}

#[test]
fn test_registration_layering() {
    let outputs = generate_all(shop());

    let stock = &output(&outputs, "shop/stock.proto").units.source.content;
    assert!(stock.contains("static id<PBExtensionField> Level_onHand = nil;\n"));
    assert!(stock.contains(concat!(
        "+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry {\n",
        "  [registry addExtension:Level_onHand];\n",
        "}\n",
    )));

    let price = output(&outputs, "shop/price.proto");
    assert!(price.units.header.content.contains(concat!(
        "+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry;\n",
        "+ (id<PBExtensionField>) cents;\n",
        "@end\n",
    )));
    assert!(price.units.source.content.contains("  [registry addExtension:PriceRoot_cents];\n"));
    assert!(!price.units.source.content.contains("addExtension:BaseRoot_label"));

    let catalog = output(&outputs, "shop/catalog.proto");
    let source = &catalog.units.source.content;
    assert!(source.contains("#import \"Catalog.pb.h\""));
    assert!(source.contains(
        "+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry {\n}\n"
    ));
    assert!(!source.contains("[BaseRoot registerAllExtensions"));
    assert!(
        position(source, "[PriceRoot registerAllExtensions")
            < position(source, "[StockRoot registerAllExtensions")
    );
    assert_eq!(
        catalog.manifest.registration.calls().collect::<Vec<_>>(),
        ["CatalogRoot", "PriceRoot", "StockRoot"]
    );
}

#[test]
fn test_runtime_registry_follows_plan() {
    let files = FileSet::from_protos(&shop()).unwrap();
    let program = Program::new(&files);
    let catalog = program.extension_registry(files.find("shop/catalog.proto").unwrap());

    let ids: Vec<_> = catalog.iter().map(|(_, id)| id).collect();
    assert_eq!(ids, ["PriceRoot_cents", "Level_onHand"]);
    assert_eq!(catalog.get("Item", 100), None);

    let price = program.extension_registry(files.find("shop/price.proto").unwrap());
    assert_eq!(price.get("Item", 100), Some("BaseRoot_label"));
    assert_eq!(price.get("Item", 101), Some("PriceRoot_cents"));
}

#[test]
fn test_generation_is_deterministic() {
    let first = generate_all(shop());
    let second = generate_all(shop());
    for (x, y) in first.iter().zip(&second) {
        assert_eq!(x.units, y.units);
    }
}

#[test]
fn test_plugin_round_trip() {
    let request = CodeGeneratorRequest {
        file_to_generate: vec!["shop/catalog.proto".to_string()],
        parameter: Some("arc,init_guard=class_initialize".to_string()),
        proto_file: shop(),
        ..Default::default()
    };
    let decoded = CodeGeneratorRequest::decode(request.encode_to_vec().as_slice()).unwrap();
    let response = codegen::generate_response(decoded);

    assert_eq!(response.error, None);
    let names: Vec<_> = response.file.iter().map(|f| f.name()).collect();
    assert_eq!(names, ["shop/Catalog.pb.h", "shop/Catalog.pb.m"]);
    let source = response.file[1].content();
    assert!(!source.contains("dispatch_once"));
    assert!(source.contains("    extensionRegistry = registry;\n"));
}

#[test]
fn test_manifest_lists_every_file() {
    let outputs = generate_all(shop());
    let json: serde_json::Value =
        serde_json::from_str(&codegen::manifest(&outputs).unwrap()).unwrap();
    let files: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["file"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        files,
        ["shop/base.proto", "shop/price.proto", "shop/stock.proto", "shop/catalog.proto"]
    );
    assert_eq!(json[3]["header"], "shop/Catalog.pb.h");
}

#[test]
fn test_long_import_chain() {
    let outputs = generate_all(synthetic_chain(20));
    let last = output(&outputs, "gen/file19.proto");

    // Four messages per file, each with one nested message, two
    // declarations per class, over the whole chain.
    assert_eq!(last.manifest.forward_declarations.len(), 20 * 4 * 2 * 2);
    assert_eq!(
        last.manifest.registration.calls().collect::<Vec<_>>(),
        ["File19Root", "File18Root"]
    );
    assert!(last.units.source.content.contains("[registry addExtension:File19Root_ext19];"));
}
