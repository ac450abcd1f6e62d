//! Encode and Decode commands.

use crate::name::{LogicalName, codec};

/// Print the folder name `name` is stored under.
pub fn run_encode(name: &str) {
    println!("{}", codec::encode(&LogicalName::new(name)));
}

/// Print the node name `filename` decodes to, and its reduced key.
pub fn run_decode(filename: &str) {
    let name = codec::decode(filename);
    if name.is_empty() {
        println!("{name}\t(no letters or digits: never hosted)");
    } else {
        println!("{name}\t(key: {})", name.reduced());
    }
}
