use thiserror::Error;

use crate::decode::{LexError, Token};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors produced while building schemas and decoding records.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Schema file was not valid JSON or did not match the expected layout.
	#[error("schema file: {0}")]
	SchemaFile(#[from] serde_json::Error),
	/// Structural token mismatch: a delimiter, comma or colon was expected.
	#[error("wanted token {wanted}, got {got} at offset {offset}")]
	WrongToken {
		/// Token the state machine required.
		wanted: Token,
		/// Token actually scanned.
		got: Token,
		/// Stream offset after the offending token.
		offset: usize,
	},
	/// A value was required but the scanned token cannot start one.
	#[error("field {field:?}: wanted value token, got {got} at offset {offset}")]
	WantedValue {
		/// Wire-name of the field being decoded (empty for unknown keys).
		field: Box<str>,
		/// Token actually scanned.
		got: Token,
		/// Stream offset after the offending token.
		offset: usize,
	},
	/// Field bytes failed shape-specific parsing.
	#[error("field {field:?}: invalid format: {detail}")]
	FieldFormat {
		/// Wire-name of the offending field.
		field: Box<str>,
		/// Human-readable cause.
		detail: String,
	},
	/// Fatal error reported by the token stream.
	#[error(transparent)]
	Lexer(#[from] LexError),
	/// Nested values exceeded the configured depth.
	#[error("decode depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Two fields of one record share a wire-name.
	#[error("record {record}: duplicate wire name {wire_name:?}")]
	DuplicateWireName {
		/// Record being built.
		record: String,
		/// Repeated wire-name.
		wire_name: String,
	},
	/// Two records were registered under the same name.
	#[error("duplicate record {name}")]
	DuplicateRecord {
		/// Repeated record name.
		name: String,
	},
	/// A field referenced a record that was never registered.
	#[error("unknown record {name}")]
	UnknownRecord {
		/// Requested record name.
		name: String,
	},
	/// Record embeds itself by value and has no finite zero value.
	#[error("record {name} embeds itself by value")]
	RecursiveRecord {
		/// Record type name.
		name: String,
	},
	/// Map key shape cannot be read from a JSON object key.
	#[error("record {record}: field {field} has unsupported map key type {key}")]
	UnsupportedMapKey {
		/// Record being built.
		record: String,
		/// Field declaring the map.
		field: String,
		/// Rendered key type.
		key: String,
	},
	/// Type declarator text could not be parsed.
	#[error("invalid type spec: {spec:?}")]
	InvalidTypeSpec {
		/// Original declarator text.
		spec: String,
	},
	/// Schema file has no usable root record.
	#[error("schema has no root record")]
	MissingRoot,
	/// Requested field is not declared by the record.
	#[error("record {record} has no field {field}")]
	UnknownField {
		/// Record type name.
		record: String,
		/// Requested field name.
		field: String,
	},
	/// CLI assignment argument was not `name=value`.
	#[error("invalid assignment: {text}")]
	InvalidAssignment {
		/// User-provided argument.
		text: String,
	},
}

impl DecodeError {
	/// Build a format error for `field`.
	pub fn format(field: &str, detail: impl Into<String>) -> Self {
		Self::FieldFormat {
			field: field.into(),
			detail: detail.into(),
		}
	}

	/// Wrap an error raised inside a nested value so it names the outer field.
	///
	/// Lexer failures and `DepthExceeded` pass through unchanged.
	pub fn nested(self, field: &str) -> Self {
		match self {
			Self::Lexer(_) | Self::DepthExceeded { .. } => self,
			other => Self::format(field, other.to_string()),
		}
	}

	/// Wire-name of the field the error is attributed to, when known.
	pub fn field(&self) -> Option<&str> {
		match self {
			Self::WantedValue { field, .. } | Self::FieldFormat { field, .. } => Some(field),
			_ => None,
		}
	}
}
