use tracing::debug;

use crate::decode::{DecodeError, Kind, RecordValue, Registry, Resolved, Result, TypeDesc, Value};

impl Registry {
	/// Patch `inst` from textual `field -> value` pairs.
	///
	/// Keys are wire-names, matched exactly first and then case-insensitively.
	/// Unknown keys are ignored. String-like fields take the text as their
	/// content; every other field takes it as encoded JSON. The synthesized
	/// document then goes through [`Registry::decode_slice`], so presence
	/// afterwards reflects only the patched fields.
	pub fn apply_partial_update<K, V>(&self, inst: &mut RecordValue, pairs: impl IntoIterator<Item = (K, V)>) -> Result<()>
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let schema = self.schema(inst.record);
		let mut doc = String::from("{");
		let mut count = 0_usize;
		for (key, text) in pairs {
			let Resolved::Field(idx) = schema.resolve(key.as_ref().as_bytes()) else {
				continue;
			};
			let field = &schema.fields[idx];
			if count > 0 {
				doc.push(',');
			}
			doc.push_str(&serde_json::to_string(field.wire_name.as_ref())?);
			doc.push(':');
			doc.push_str(&wire_text(&field.desc, text.as_ref())?);
			count += 1;
		}
		if count == 0 {
			return Ok(());
		}
		doc.push('}');

		debug!(record = %schema.name, fields = count, "applying partial update");
		self.decode_slice(inst, doc.as_bytes())
	}

	/// Assign `value` to field `name` and mark it present.
	pub fn set_field(&self, inst: &mut RecordValue, name: &str, value: Value) -> Result<()> {
		let idx = self.field_slot(inst, name)?;
		inst.fields[idx] = value;
		inst.presence.insert(idx);
		Ok(())
	}

	/// Force the presence flag of field `name` without touching its value.
	pub fn mark_field(&self, inst: &mut RecordValue, name: &str, present: bool) -> Result<()> {
		let idx = self.field_slot(inst, name)?;
		if present {
			inst.presence.insert(idx);
		} else {
			inst.presence.remove(idx);
		}
		Ok(())
	}

	fn field_slot(&self, inst: &RecordValue, name: &str) -> Result<usize> {
		let schema = self.schema(inst.record);
		schema.field_index(name).ok_or_else(|| DecodeError::UnknownField {
			record: schema.name.to_string(),
			field: name.to_owned(),
		})
	}
}

/// Encoded form of `text` for a field described by `desc`.
fn wire_text(desc: &TypeDesc, text: &str) -> Result<String> {
	let mut out = text.to_owned();
	for _ in 0..quote_depth(desc) {
		out = serde_json::to_string(&out)?;
	}
	Ok(out)
}

/// Number of string layers wrapped around the textual value on the wire.
fn quote_depth(desc: &TypeDesc) -> usize {
	match &desc.kind {
		Kind::String if desc.quoted => 2,
		Kind::String => 1,
		Kind::Numeric(_) | Kind::Bool if desc.quoted => 1,
		Kind::Pointer(inner) => quote_depth(inner),
		Kind::SelfDecoding(hook) if hook.is_textual() => 1,
		_ => 0,
	}
}
