//! Descriptor fixtures for the end-to-end generator tests.

use prost::Message;
use prost_types::field_descriptor_proto::Type;
use prost_types::{FileDescriptorProto, FileDescriptorSet};

use protocrap_objc::test_utils::*;

/// `a.proto`: enum `Color`, message `Point { x, y }`, no extensions.
pub fn example_a() -> FileDescriptorProto {
    let mut a = file("a.proto", &[]);
    a.enum_type
        .push(enum_type("Color", &[("RED", 0), ("GREEN", 1), ("BLUE", 2)]));
    a.message_type.push(message(
        "Point",
        vec![scalar("x", 1, Type::Int32), scalar("y", 2, Type::Int32)],
    ));
    a
}

/// `b.proto` importing `a.proto`, with a message over `Point` and no
/// extensions of its own.
pub fn example_b() -> FileDescriptorProto {
    let mut b = file("b.proto", &["a.proto"]);
    b.message_type.push(message(
        "Segment",
        vec![
            message_field("start", 1, ".Point"),
            message_field("end", 2, ".Point"),
        ],
    ));
    b
}

/// `status.proto`: prefixed, a single enum.
pub fn status() -> FileDescriptorProto {
    let mut status = file_with_prefix("status.proto", "PB");
    status
        .enum_type
        .push(enum_type("State", &[("STATE_ON", 0), ("STATE_OFF", 1)]));
    status
}

/// A two-file import cycle, `ping.proto` <-> `pong.proto`.
pub fn cycle() -> Vec<FileDescriptorProto> {
    let mut ping = file("ping.proto", &["pong.proto"]);
    ping.message_type.push(message("Ping", vec![]));
    let mut pong = file("pong.proto", &["ping.proto"]);
    pong.message_type.push(message("Pong", vec![]));
    vec![ping, pong]
}

/// `shop/base.proto` declares `Item` and one extension of it;
/// `shop/price.proto` and `shop/stock.proto` both import base and extend
/// `Item` (stock from inside a message); `shop/catalog.proto` imports both.
pub fn shop() -> Vec<FileDescriptorProto> {
    let mut base = file("shop/base.proto", &[]);
    base.package = Some("shop".to_string());
    base.message_type
        .push(message("Item", vec![scalar("sku", 1, Type::String)]));
    base.extension
        .push(extension("label", 100, Type::String, ".shop.Item"));

    let mut price = file("shop/price.proto", &["shop/base.proto"]);
    price.package = Some("shop".to_string());
    price
        .extension
        .push(extension("cents", 101, Type::Int64, ".shop.Item"));

    let mut stock = file("shop/stock.proto", &["shop/base.proto"]);
    stock.package = Some("shop".to_string());
    let mut level = message("Level", vec![scalar("count", 1, Type::Uint32)]);
    level
        .extension
        .push(extension("on_hand", 102, Type::Uint32, ".shop.Item"));
    stock.message_type.push(level);

    let mut catalog = file("shop/catalog.proto", &["shop/price.proto", "shop/stock.proto"]);
    catalog.package = Some("shop".to_string());
    catalog.message_type.push(message(
        "Entry",
        vec![
            message_field("item", 1, ".shop.Item"),
            repeated(scalar("tags", 2, Type::String)),
        ],
    ));

    vec![base, price, stock, catalog]
}

pub fn descriptor_set(files: Vec<FileDescriptorProto>) -> Vec<u8> {
    FileDescriptorSet { file: files }.encode_to_vec()
}

/// `count` files, each importing its predecessor and declaring a handful of
/// messages, enums and extensions.
pub fn synthetic_chain(count: usize) -> Vec<FileDescriptorProto> {
    (0..count)
        .map(|i| {
            let name = format!("gen/file{}.proto", i);
            let previous = (i > 0).then(|| format!("gen/file{}.proto", i - 1));
            let deps: Vec<&str> = previous.as_deref().into_iter().collect();
            let mut proto = file(&name, &deps);
            proto.package = Some("gen".to_string());
            for m in 0..4 {
                let mut msg = message(
                    &format!("Msg{}_{}", i, m),
                    vec![
                        scalar("id", 1, Type::Int64),
                        scalar("name", 2, Type::String),
                        repeated(scalar("values", 3, Type::Double)),
                    ],
                );
                msg.nested_type.push(message("Inner", vec![scalar("flag", 1, Type::Bool)]));
                proto.message_type.push(msg);
            }
            proto
                .enum_type
                .push(enum_type(&format!("Kind{}", i), &[("KIND_A", 0), ("KIND_B", 1)]));
            proto.extension.push(extension(
                &format!("ext{}", i),
                1000 + i as i32,
                Type::Int32,
                &format!(".gen.Msg{}_0", i),
            ));
            proto
        })
        .collect()
}
