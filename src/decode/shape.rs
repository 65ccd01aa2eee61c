use std::fmt;
use std::sync::Arc;

use crate::decode::{DecodeCtx, DecodeError, NumKind, RecordId, Result, Token, Value};

/// Classified description of one value's shape.
///
/// Built once when a registry is constructed and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TypeDesc {
	/// Handler category.
	pub kind: Kind,
	/// Value is wrapped in an extra layer of quotes on the wire.
	pub quoted: bool,
	/// Value is reached through an optional slot owned by a pointer.
	pub by_address: bool,
}

/// Value handler categories.
#[derive(Debug, Clone)]
pub enum Kind {
	/// Integer or float with an explicit bit width.
	Numeric(NumKind),
	/// Text.
	String,
	/// Boolean literal.
	Bool,
	/// Fixed capacity array; extra input elements are dropped.
	FixedArray {
		/// Element shape.
		element: Box<TypeDesc>,
		/// Declared capacity.
		length: usize,
	},
	/// Growable list; `null` stays distinct from empty.
	List(Box<TypeDesc>),
	/// Key/value map.
	Map {
		/// Key shape (read from object keys).
		key: Box<TypeDesc>,
		/// Value shape.
		value: Box<TypeDesc>,
	},
	/// Base64 binary payload.
	ByteList,
	/// Optional indirection.
	Pointer(Box<TypeDesc>),
	/// Nested record decoded by re-entering the record state machine.
	Record(RecordId),
	/// Type that supplies its own decode entry point.
	SelfDecoding(Hook),
	/// Generic decode of the captured sub-document.
	Fallback,
}

impl TypeDesc {
	/// Descriptor with default flags.
	pub fn new(kind: Kind) -> Self {
		Self {
			kind,
			quoted: false,
			by_address: false,
		}
	}
}

/// Decode hook that reads directly from the shared token stream.
pub trait StreamDecode: Send + Sync {
	/// Type name used in diagnostics.
	fn name(&self) -> &str;

	/// Decode the value started by `tok` into `slot`.
	///
	/// `tok` has already been scanned and is never `Token::Null`. Further
	/// tokens come from `ctx.stream()`.
	fn decode_stream(&self, tok: Token, ctx: &mut DecodeCtx<'_, '_>, slot: &mut Value) -> Result<()>;

	/// Value used for fresh and reset slots.
	fn zero(&self) -> Value {
		Value::Null
	}

	/// Whether the encoded form is a JSON string.
	fn is_textual(&self) -> bool {
		false
	}

	/// Encoded form of a value this hook produced.
	fn encode(&self, value: &Value) -> serde_json::Value {
		plain_json(value)
	}
}

/// Decode hook that only accepts the raw bytes of a captured sub-document.
pub trait BytesDecode: Send + Sync {
	/// Type name used in diagnostics.
	fn name(&self) -> &str;

	/// Decode `raw` (exact encoded bytes, quotes included for strings) into `slot`.
	fn decode_bytes(&self, raw: &[u8], slot: &mut Value) -> Result<()>;

	/// Value used for fresh and reset slots.
	fn zero(&self) -> Value {
		Value::Null
	}

	/// Whether the encoded form is a JSON string.
	fn is_textual(&self) -> bool {
		false
	}

	/// Encoded form of a value this hook produced.
	fn encode(&self, value: &Value) -> serde_json::Value {
		plain_json(value)
	}
}

/// Self-decoding capability, resolved once at classification.
#[derive(Clone)]
pub enum Hook {
	/// Consumes tokens from the shared stream.
	Stream(Arc<dyn StreamDecode>),
	/// Consumes a verbatim copy of the sub-document.
	Bytes(Arc<dyn BytesDecode>),
}

impl Hook {
	/// Wrap a token-stream-aware decoder.
	pub fn stream(decoder: impl StreamDecode + 'static) -> Self {
		Hook::Stream(Arc::new(decoder))
	}

	/// Wrap a byte-oriented decoder.
	pub fn bytes(decoder: impl BytesDecode + 'static) -> Self {
		Hook::Bytes(Arc::new(decoder))
	}

	/// Built-in hook keeping the raw sub-document text.
	pub fn raw_json() -> Self {
		Hook::bytes(RawJson)
	}

	/// Type name used in diagnostics.
	pub fn name(&self) -> &str {
		match self {
			Hook::Stream(decoder) => decoder.name(),
			Hook::Bytes(decoder) => decoder.name(),
		}
	}

	/// Value used for fresh and reset slots.
	pub fn zero(&self) -> Value {
		match self {
			Hook::Stream(decoder) => decoder.zero(),
			Hook::Bytes(decoder) => decoder.zero(),
		}
	}

	/// Whether the encoded form is a JSON string.
	pub fn is_textual(&self) -> bool {
		match self {
			Hook::Stream(decoder) => decoder.is_textual(),
			Hook::Bytes(decoder) => decoder.is_textual(),
		}
	}

	/// Encoded form of `value`.
	pub fn encode(&self, value: &Value) -> serde_json::Value {
		match self {
			Hook::Stream(decoder) => decoder.encode(value),
			Hook::Bytes(decoder) => decoder.encode(value),
		}
	}
}

/// Best-effort JSON for values outside any record context.
pub(crate) fn plain_json(value: &Value) -> serde_json::Value {
	use serde_json::Value as Json;
	match value {
		Value::Null => Json::Null,
		Value::Bool(value) => Json::Bool(*value),
		Value::I64(value) => Json::from(*value),
		Value::U64(value) => Json::from(*value),
		Value::F32(value) => serde_json::Number::from_f64(f64::from(*value)).map_or(Json::Null, Json::Number),
		Value::F64(value) => serde_json::Number::from_f64(*value).map_or(Json::Null, Json::Number),
		Value::String(text) => Json::String(text.to_string()),
		Value::Bytes(bytes) => Json::String(crate::decode::base64::encode(bytes)),
		Value::Array(items) | Value::List(items) => Json::Array(items.iter().map(plain_json).collect()),
		Value::Map(entries) => Json::Object(entries.iter().map(|(key, value)| (key_text(key), plain_json(value))).collect()),
		Value::Ptr(inner) => plain_json(inner),
		Value::Record(record) => Json::Array(record.fields.iter().map(plain_json).collect()),
		Value::Json(json) => json.clone(),
	}
}

/// Object key text for a scalar map key.
pub(crate) fn key_text(key: &Value) -> String {
	match key {
		Value::String(text) => text.to_string(),
		Value::Ptr(inner) => key_text(inner),
		Value::F32(value) => value.to_string(),
		other => plain_json(other).to_string(),
	}
}

impl fmt::Debug for Hook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mode = match self {
			Hook::Stream(_) => "stream",
			Hook::Bytes(_) => "bytes",
		};
		write!(f, "Hook({} via {mode})", self.name())
	}
}

/// Keeps a value's encoded text verbatim.
#[derive(Debug, Clone, Copy)]
pub struct RawJson;

impl BytesDecode for RawJson {
	fn name(&self) -> &str {
		"raw"
	}

	fn decode_bytes(&self, raw: &[u8], slot: &mut Value) -> Result<()> {
		let text = std::str::from_utf8(raw).map_err(|err| DecodeError::format("raw", err.to_string()))?;
		*slot = Value::String(text.into());
		Ok(())
	}

	fn encode(&self, value: &Value) -> serde_json::Value {
		match value {
			Value::String(text) => serde_json::from_str(text).unwrap_or(serde_json::Value::Null),
			other => plain_json(other),
		}
	}
}
