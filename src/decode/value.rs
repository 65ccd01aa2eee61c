use crate::decode::{FieldSet, RecordId};

/// Decoded runtime value held by a record field slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absent pointer, list, map, byte list or hook value.
	Null,
	/// Boolean.
	Bool(bool),
	/// Signed integer of any declared width.
	I64(i64),
	/// Unsigned integer of any declared width.
	U64(u64),
	/// 32-bit float.
	F32(f32),
	/// 64-bit float.
	F64(f64),
	/// Text.
	String(Box<str>),
	/// Binary payload.
	Bytes(Vec<u8>),
	/// Fixed-length array.
	Array(Vec<Value>),
	/// Present (possibly empty) list.
	List(Vec<Value>),
	/// Map entries in first-insertion order.
	Map(Vec<(Value, Value)>),
	/// Present pointer.
	Ptr(Box<Value>),
	/// Nested record.
	Record(RecordValue),
	/// Generic fallback value.
	Json(serde_json::Value),
}

impl Value {
	/// Whether the value is the absent representation.
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Signed integer payload.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::I64(value) => Some(*value),
			_ => None,
		}
	}

	/// Unsigned integer payload.
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Value::U64(value) => Some(*value),
			_ => None,
		}
	}

	/// Float payload, widened to `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::F32(value) => Some(f64::from(*value)),
			Value::F64(value) => Some(*value),
			_ => None,
		}
	}

	/// Text payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(value) => Some(value),
			_ => None,
		}
	}

	/// Elements of an array or a present list.
	pub fn as_items(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) | Value::List(items) => Some(items),
			_ => None,
		}
	}

	/// Nested record, looking through a present pointer.
	pub fn as_record(&self) -> Option<&RecordValue> {
		match self {
			Value::Record(record) => Some(record),
			Value::Ptr(inner) => inner.as_record(),
			_ => None,
		}
	}

	/// Map value for `key`.
	pub fn map_get(&self, key: &Value) -> Option<&Value> {
		match self {
			Value::Map(entries) => entries.iter().find(|(candidate, _)| candidate == key).map(|(_, value)| value),
			_ => None,
		}
	}

	/// Pointee of a present pointer.
	pub fn deref_ptr(&self) -> Option<&Value> {
		match self {
			Value::Ptr(inner) => Some(inner),
			_ => None,
		}
	}
}

/// One record instance: a slot per declared field plus presence flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
	/// Record type this instance belongs to.
	pub record: RecordId,
	/// Field slots indexed by declaration order.
	pub fields: Vec<Value>,
	/// Fields assigned during the most recent decode.
	pub presence: FieldSet,
}

impl RecordValue {
	/// Slot for field index `idx`.
	pub fn slot(&self, idx: usize) -> Option<&Value> {
		self.fields.get(idx)
	}

	/// Whether field index `idx` was assigned by the most recent decode.
	pub fn is_present(&self, idx: usize) -> bool {
		self.presence.contains(idx)
	}
}
