//! Default JSON body encoding and decoding.
//!
//! # Design
//! Encoders and decoders report failures as a [`CodingError`]: a structural
//! kind plus the coding path that was being processed. The service wraps
//! these into [`EndpointError::Encoding`](crate::EndpointError::Encoding) or
//! [`EndpointError::Decoding`](crate::EndpointError::Decoding) together with
//! the offending type's name, so callers never see a raw parser error.
//!
//! Paths are tracked with `serde_path_to_error`; serde_json alone only
//! reports line and column.

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::error::Category;

/// Structural failure class of an encode or decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingErrorKind {
    /// A value could not be represented in the output format.
    InvalidValue,
    /// The input was not well-formed.
    DataCorrupted,
    /// A value had a different type than expected.
    TypeMismatch,
    /// A required key was absent.
    KeyNotFound,
    /// A required value was null.
    ValueNotFound,
}

/// Where a coding failure happened and why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodingContext {
    pub coding_path: Vec<String>,
    pub description: String,
}

impl CodingContext {
    /// Dot-joined coding path, empty at the root.
    pub fn path(&self) -> String {
        self.coding_path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?} at '{path}': {description}", path = .context.path(), description = .context.description)]
pub struct CodingError {
    pub kind: CodingErrorKind,
    pub context: CodingContext,
}

impl CodingError {
    pub fn new(kind: CodingErrorKind, description: impl fmt::Display) -> Self {
        Self {
            kind,
            context: CodingContext {
                coding_path: Vec::new(),
                description: description.to_string(),
            },
        }
    }
}

/// Serialize `value` as a JSON body.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodingError> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::new(&mut buffer);
    serde_path_to_error::serialize(value, &mut serializer).map_err(|e| CodingError {
        kind: CodingErrorKind::InvalidValue,
        context: CodingContext {
            coding_path: segments(e.path()),
            description: e.inner().to_string(),
        },
    })?;
    Ok(buffer)
}

/// Deserialize a JSON body into `T`.
pub fn decode_json<T: DeserializeOwned>(data: &[u8]) -> Result<T, CodingError> {
    let mut deserializer = serde_json::Deserializer::from_slice(data);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| CodingError {
        kind: classify(e.inner()),
        context: CodingContext {
            coding_path: segments(e.path()),
            description: e.inner().to_string(),
        },
    })?;
    deserializer.end().map_err(|e| CodingError::new(CodingErrorKind::DataCorrupted, e))?;
    Ok(value)
}

/// Hands `data` back as `T` when `T` is the raw byte buffer itself.
///
/// Raw-bytes output is never run through a decoder. Any other `T` gets the
/// bytes back in `Err` for decoding.
pub fn raw_body<T: 'static>(data: Vec<u8>) -> Result<T, Vec<u8>> {
    let boxed: Box<dyn Any> = Box::new(data);
    boxed
        .downcast::<T>()
        .map(|raw| *raw)
        .map_err(|boxed| boxed.downcast::<Vec<u8>>().map(|data| *data).unwrap_or_default())
}

/// `type_name` output without module paths: `alloc::vec::Vec<my::Gist>`
/// becomes `Vec<Gist>`.
pub fn short_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut start = 0;
    for (i, c) in name.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' | '*') {
            out.push_str(last_segment(&name[start..i]));
            out.push(c);
            start = i + c.len_utf8();
        }
    }
    out.push_str(last_segment(&name[start..]));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn classify(error: &serde_json::Error) -> CodingErrorKind {
    match error.classify() {
        Category::Syntax | Category::Eof | Category::Io => CodingErrorKind::DataCorrupted,
        Category::Data => {
            let message = error.to_string();
            if message.starts_with("missing field") {
                CodingErrorKind::KeyNotFound
            } else if message.starts_with("invalid type: null") {
                CodingErrorKind::ValueNotFound
            } else {
                CodingErrorKind::TypeMismatch
            }
        }
    }
}

fn segments(path: &serde_path_to_error::Path) -> Vec<String> {
    use serde_path_to_error::Segment;

    path.iter()
        .map(|segment| match segment {
            Segment::Seq { index } => index.to_string(),
            Segment::Map { key } => key.clone(),
            Segment::Enum { variant } => variant.clone(),
            Segment::Unknown => "?".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Gist {
        id: String,
        files: Vec<File>,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct File {
        name: String,
        size: u64,
    }

    #[test]
    fn decodes_well_formed_json() {
        let gist: Gist =
            decode_json(br#"{"id":"1","files":[{"name":"a.rs","size":3}]}"#).unwrap();
        assert_eq!(gist.files[0].name, "a.rs");
    }

    #[test]
    fn corrupt_json_is_data_corrupted() {
        let err = decode_json::<Gist>(b"{\"id\": ").unwrap_err();
        assert_eq!(err.kind, CodingErrorKind::DataCorrupted);
    }

    #[test]
    fn trailing_garbage_is_data_corrupted() {
        let err = decode_json::<File>(br#"{"name":"a","size":1} trailing"#).unwrap_err();
        assert_eq!(err.kind, CodingErrorKind::DataCorrupted);
    }

    #[test]
    fn mistyped_field_reports_its_path() {
        let err = decode_json::<Gist>(br#"{"id":"1","files":[{"name":"a.rs","size":"big"}]}"#)
            .unwrap_err();
        assert_eq!(err.kind, CodingErrorKind::TypeMismatch);
        assert_eq!(err.context.coding_path, ["files", "0", "size"]);
        assert_eq!(err.context.path(), "files.0.size");
    }

    #[test]
    fn missing_field_is_key_not_found() {
        let err = decode_json::<File>(br#"{"name":"a"}"#).unwrap_err();
        assert_eq!(err.kind, CodingErrorKind::KeyNotFound);
        assert!(err.context.description.contains("size"));
    }

    #[test]
    fn null_field_is_value_not_found() {
        let err = decode_json::<File>(br#"{"name":null,"size":1}"#).unwrap_err();
        assert_eq!(err.kind, CodingErrorKind::ValueNotFound);
        assert_eq!(err.context.path(), "name");
    }

    #[test]
    fn non_string_map_keys_fail_to_encode() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "value");
        let err = encode_json(&map).unwrap_err();
        assert_eq!(err.kind, CodingErrorKind::InvalidValue);
    }

    #[test]
    fn raw_body_passes_bytes_through() {
        let raw: Vec<u8> = raw_body(b"not json".to_vec()).unwrap();
        assert_eq!(raw, b"not json");

        let back = raw_body::<Gist>(b"{}".to_vec()).unwrap_err();
        assert_eq!(back, b"{}");
    }

    #[test]
    fn short_type_names_drop_module_paths() {
        assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec<u8>");
        assert_eq!(short_type_name("gists::api::Gist"), "Gist");
        assert_eq!(
            short_type_name("std::collections::hash::map::HashMap<alloc::vec::Vec<u8>, u8>"),
            "HashMap<Vec<u8>, u8>"
        );
        assert_eq!(short_type_name("(a::A, [b::c::C; 3], &str)"), "(A, [C; 3], &str)");
        assert_eq!(short_type_name(std::any::type_name::<Gist>()), "Gist");
    }

    #[test]
    fn encodes_as_compact_json() {
        let file = File {
            name: "a.rs".to_string(),
            size: 3,
        };
        assert_eq!(encode_json(&file).unwrap(), br#"{"name":"a.rs","size":3}"#);
    }
}
