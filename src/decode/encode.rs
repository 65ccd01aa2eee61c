use serde_json::{Map, Value as Json};

use crate::decode::shape::{key_text, plain_json};
use crate::decode::{Kind, RecordValue, Registry, Result, TypeDesc, Value, base64};

impl Registry {
	/// Encode `inst` as a JSON object keyed by wire-name.
	///
	/// Absent lists, maps, byte lists and pointers become `null`; quoted
	/// fields are written as strings.
	pub fn encode(&self, inst: &RecordValue) -> Json {
		let schema = self.schema(inst.record);
		let mut out = Map::with_capacity(schema.fields.len());
		for (field, value) in schema.fields.iter().zip(&inst.fields) {
			out.insert(field.wire_name.to_string(), self.encode_value(&field.desc, value));
		}
		Json::Object(out)
	}

	/// Encode `inst` as compact JSON text.
	pub fn encode_to_string(&self, inst: &RecordValue) -> Result<String> {
		Ok(serde_json::to_string(&self.encode(inst))?)
	}

	fn encode_value(&self, desc: &TypeDesc, value: &Value) -> Json {
		if value.is_null() {
			return Json::Null;
		}
		match (&desc.kind, value) {
			(Kind::Numeric(_) | Kind::Bool, _) if desc.quoted => Json::String(scalar_text(value)),
			(Kind::String, Value::String(text)) if desc.quoted => Json::String(Json::String(text.to_string()).to_string()),
			(Kind::FixedArray { element, .. } | Kind::List(element), Value::Array(items) | Value::List(items)) => {
				Json::Array(items.iter().map(|item| self.encode_value(element, item)).collect())
			}
			(Kind::Map { value: value_desc, .. }, Value::Map(entries)) => Json::Object(
				entries
					.iter()
					.map(|(key, value)| (key_text(key), self.encode_value(value_desc, value)))
					.collect(),
			),
			(Kind::ByteList, Value::Bytes(bytes)) => Json::String(base64::encode(bytes)),
			(Kind::Pointer(inner), Value::Ptr(target)) => self.encode_value(inner, target),
			(Kind::Record(_), Value::Record(inst)) => self.encode(inst),
			(Kind::SelfDecoding(hook), _) => hook.encode(value),
			_ => plain_json(value),
		}
	}
}

/// Text of a scalar as it appears inside a quoted field.
fn scalar_text(value: &Value) -> String {
	match value {
		Value::F32(value) => value.to_string(),
		Value::F64(value) => value.to_string(),
		other => plain_json(other).to_string(),
	}
}

#[cfg(test)]
mod tests;
