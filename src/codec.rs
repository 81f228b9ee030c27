//! On-disk document format.
//!
//! A document is the pretty-printed JSON form of a value, indented with one
//! tab per level and terminated by a single newline:
//!
//! ```text
//! {
//! 	"name": "alice",
//! 	"age": 42
//! }
//! ```
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use anyhow::{Context, Result};

const INDENT: &[u8] = b"\t";

/// Serialize `value` into the bytes of a document.
///
/// Fields come out in the order the value's `Serialize` impl emits them,
/// so structs and `BTreeMap`s give the same bytes for the same value.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .context("value can't be encoded as a json document")?;
    buf.push(b'\n');
    Ok(buf)
}

/// Deserialize a document. Surrounding whitespace, including the trailing
/// newline, is accepted.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let t = serde_json::from_slice(bytes).context("document doesn't match the requested shape")?;
    Ok(t)
}
