use std::fmt;

use crate::decode::{DecodeError, Hook, Result};

/// Declared numeric type and its bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumKind {
	/// Signed 8-bit integer.
	I8,
	/// Signed 16-bit integer.
	I16,
	/// Signed 32-bit integer.
	I32,
	/// Signed 64-bit integer.
	I64,
	/// Unsigned 8-bit integer.
	U8,
	/// Unsigned 16-bit integer.
	U16,
	/// Unsigned 32-bit integer.
	U32,
	/// Unsigned 64-bit integer.
	U64,
	/// 32-bit float.
	F32,
	/// 64-bit float.
	F64,
}

impl NumKind {
	/// Bit width used when parsing.
	pub fn bits(self) -> u32 {
		match self {
			NumKind::I8 | NumKind::U8 => 8,
			NumKind::I16 | NumKind::U16 => 16,
			NumKind::I32 | NumKind::U32 | NumKind::F32 => 32,
			NumKind::I64 | NumKind::U64 | NumKind::F64 => 64,
		}
	}

	/// Whether the type is a float.
	pub fn is_float(self) -> bool {
		matches!(self, NumKind::F32 | NumKind::F64)
	}

	/// Canonical short name.
	pub fn name(self) -> &'static str {
		match self {
			NumKind::I8 => "i8",
			NumKind::I16 => "i16",
			NumKind::I32 => "i32",
			NumKind::I64 => "i64",
			NumKind::U8 => "u8",
			NumKind::U16 => "u16",
			NumKind::U32 => "u32",
			NumKind::U64 => "u64",
			NumKind::F32 => "f32",
			NumKind::F64 => "f64",
		}
	}

	fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"i8" | "int8" => NumKind::I8,
			"i16" | "int16" => NumKind::I16,
			"i32" | "int32" => NumKind::I32,
			"i64" | "int64" | "int" => NumKind::I64,
			"u8" | "uint8" | "byte" => NumKind::U8,
			"u16" | "uint16" => NumKind::U16,
			"u32" | "uint32" => NumKind::U32,
			"u64" | "uint64" | "uint" => NumKind::U64,
			"f32" | "float32" => NumKind::F32,
			"f64" | "float64" => NumKind::F64,
			_ => return None,
		})
	}
}

/// Declared shape of a field or element, before classification.
#[derive(Debug, Clone)]
pub enum TypeSpec {
	/// Integer or float.
	Numeric(NumKind),
	/// Text.
	String,
	/// Boolean.
	Bool,
	/// Fixed-length array.
	Array(Box<TypeSpec>, usize),
	/// Growable list.
	Slice(Box<TypeSpec>),
	/// Key/value map.
	Map(Box<TypeSpec>, Box<TypeSpec>),
	/// Optional indirection.
	Ptr(Box<TypeSpec>),
	/// Registered record, by name.
	Record(String),
	/// Type carrying its own decode hook.
	Custom(Hook),
	/// Untyped value.
	Any,
	/// Named type with no specialized handler.
	Opaque(String),
}

impl TypeSpec {
	/// Byte list shorthand (`[]u8`).
	pub fn bytes() -> Self {
		TypeSpec::Slice(Box::new(TypeSpec::Numeric(NumKind::U8)))
	}

	/// Wrap in a list.
	pub fn slice_of(elem: TypeSpec) -> Self {
		TypeSpec::Slice(Box::new(elem))
	}

	/// Wrap in a fixed-length array.
	pub fn array_of(elem: TypeSpec, len: usize) -> Self {
		TypeSpec::Array(Box::new(elem), len)
	}

	/// Wrap in a pointer.
	pub fn ptr_to(elem: TypeSpec) -> Self {
		TypeSpec::Ptr(Box::new(elem))
	}

	/// Map from `key` to `value`.
	pub fn map_of(key: TypeSpec, value: TypeSpec) -> Self {
		TypeSpec::Map(Box::new(key), Box::new(value))
	}

	/// Reference a record by name.
	pub fn record(name: &str) -> Self {
		TypeSpec::Record(name.to_owned())
	}

	/// Parse a declarator such as `[]string`, `map[string]*Node` or `[4]u8`.
	pub fn parse(input: &str) -> Result<Self> {
		let text = input.trim();
		parse_type(text).ok_or_else(|| DecodeError::InvalidTypeSpec { spec: input.to_owned() })
	}
}

fn parse_type(text: &str) -> Option<TypeSpec> {
	if let Some(rest) = text.strip_prefix('*') {
		return Some(TypeSpec::ptr_to(parse_type(rest)?));
	}
	if let Some(rest) = text.strip_prefix("[]") {
		return Some(TypeSpec::slice_of(parse_type(rest)?));
	}
	if let Some(rest) = text.strip_prefix('[') {
		let close = rest.find(']')?;
		let len = rest[..close].trim().parse::<usize>().ok()?;
		return Some(TypeSpec::array_of(parse_type(&rest[close + 1..])?, len));
	}
	if let Some(rest) = text.strip_prefix("map[") {
		let close = matching_bracket(rest)?;
		let key = parse_type(&rest[..close])?;
		let value = parse_type(&rest[close + 1..])?;
		return Some(TypeSpec::map_of(key, value));
	}

	if let Some(kind) = NumKind::from_name(text) {
		return Some(TypeSpec::Numeric(kind));
	}
	match text {
		"string" => Some(TypeSpec::String),
		"bool" => Some(TypeSpec::Bool),
		"bytes" => Some(TypeSpec::bytes()),
		"any" | "interface{}" => Some(TypeSpec::Any),
		"raw" => Some(TypeSpec::Custom(Hook::raw_json())),
		_ if is_ident(text) => {
			if text.starts_with(|ch: char| ch.is_ascii_uppercase()) {
				Some(TypeSpec::Record(text.to_owned()))
			} else {
				Some(TypeSpec::Opaque(text.to_owned()))
			}
		}
		_ => None,
	}
}

/// Index of the `]` closing a `map[` key, allowing nested brackets.
fn matching_bracket(text: &str) -> Option<usize> {
	let mut depth = 0_usize;
	for (idx, byte) in text.bytes().enumerate() {
		match byte {
			b'[' => depth += 1,
			b']' if depth == 0 => return Some(idx),
			b']' => depth -= 1,
			_ => {}
		}
	}
	None
}

fn is_ident(text: &str) -> bool {
	let mut chars = text.chars();
	matches!(chars.next(), Some(ch) if ch.is_ascii_alphabetic() || ch == '_') && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.')
}

impl fmt::Display for TypeSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TypeSpec::Numeric(kind) => f.write_str(kind.name()),
			TypeSpec::String => f.write_str("string"),
			TypeSpec::Bool => f.write_str("bool"),
			TypeSpec::Array(elem, len) => write!(f, "[{len}]{elem}"),
			TypeSpec::Slice(elem) => write!(f, "[]{elem}"),
			TypeSpec::Map(key, value) => write!(f, "map[{key}]{value}"),
			TypeSpec::Ptr(elem) => write!(f, "*{elem}"),
			TypeSpec::Record(name) | TypeSpec::Opaque(name) => f.write_str(name),
			TypeSpec::Custom(hook) => f.write_str(hook.name()),
			TypeSpec::Any => f.write_str("any"),
		}
	}
}

/// One declared record field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
	/// Host-side field name.
	pub name: String,
	/// Key used in the encoded form.
	pub wire_name: String,
	/// Declared shape.
	pub ty: TypeSpec,
	/// Numeric/boolean/string value is wrapped in an extra layer of quotes.
	pub quoted: bool,
}

impl FieldSpec {
	/// Field whose wire-name equals its name.
	pub fn new(name: &str, ty: TypeSpec) -> Self {
		Self {
			name: name.to_owned(),
			wire_name: name.to_owned(),
			ty,
			quoted: false,
		}
	}

	/// Override the wire-name.
	pub fn wire(mut self, wire_name: &str) -> Self {
		self.wire_name = wire_name.to_owned();
		self
	}

	/// Mark the value as quoted on the wire.
	pub fn quoted(mut self) -> Self {
		self.quoted = true;
		self
	}
}

/// Declared record: a name and its ordered fields.
#[derive(Debug, Clone)]
pub struct RecordSpec {
	/// Record type name.
	pub name: String,
	/// Fields in declaration order.
	pub fields: Vec<FieldSpec>,
}

impl RecordSpec {
	/// Empty record declaration.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			fields: Vec::new(),
		}
	}

	/// Append a field.
	pub fn field(mut self, field: FieldSpec) -> Self {
		self.fields.push(field);
		self
	}
}
