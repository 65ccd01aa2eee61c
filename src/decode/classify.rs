use std::collections::HashMap;

use crate::decode::{DecodeError, Kind, NumKind, RecordId, Result, TypeDesc, TypeSpec};

/// Resolves declared shapes into handler descriptors for one field.
pub(crate) struct Classifier<'a> {
	/// Record owning the field, for diagnostics.
	pub record: &'a str,
	/// Field being classified, for diagnostics.
	pub field: &'a str,
	/// Registered record names.
	pub records: &'a HashMap<Box<str>, RecordId>,
}

impl Classifier<'_> {
	/// Classify a field's declared shape, applying the wire quoting flag.
	pub fn classify_field(&self, spec: &TypeSpec, quoted: bool) -> Result<TypeDesc> {
		let mut desc = self.classify(spec)?;
		if quoted {
			mark_quoted(&mut desc);
		}
		Ok(desc)
	}

	/// Select exactly one handler category for `spec`.
	///
	/// Hooks win over structure, byte lists win over lists, unrecognized
	/// shapes fall back to generic decoding.
	pub fn classify(&self, spec: &TypeSpec) -> Result<TypeDesc> {
		let kind = match spec {
			TypeSpec::Custom(hook) => Kind::SelfDecoding(hook.clone()),
			TypeSpec::Slice(elem) if matches!(**elem, TypeSpec::Numeric(NumKind::U8)) => Kind::ByteList,
			TypeSpec::Numeric(kind) => Kind::Numeric(*kind),
			TypeSpec::String => Kind::String,
			TypeSpec::Bool => Kind::Bool,
			TypeSpec::Array(elem, length) => Kind::FixedArray {
				element: Box::new(self.classify(elem)?),
				length: *length,
			},
			TypeSpec::Slice(elem) => Kind::List(Box::new(self.classify(elem)?)),
			TypeSpec::Map(key, value) => {
				let key_desc = self.classify(key)?;
				if !is_valid_map_key(&key_desc) {
					return Err(DecodeError::UnsupportedMapKey {
						record: self.record.to_owned(),
						field: self.field.to_owned(),
						key: key.to_string(),
					});
				}
				Kind::Map {
					key: Box::new(key_desc),
					value: Box::new(self.classify(value)?),
				}
			}
			TypeSpec::Ptr(elem) => {
				let mut pointee = self.classify(elem)?;
				pointee.by_address = true;
				Kind::Pointer(Box::new(pointee))
			}
			TypeSpec::Record(name) => {
				let id = self
					.records
					.get(name.as_str())
					.copied()
					.ok_or_else(|| DecodeError::UnknownRecord { name: name.clone() })?;
				Kind::Record(id)
			}
			TypeSpec::Any | TypeSpec::Opaque(_) => Kind::Fallback,
		};
		Ok(TypeDesc::new(kind))
	}
}

/// Quoting applies to scalars, looking through pointers.
fn mark_quoted(desc: &mut TypeDesc) {
	match &mut desc.kind {
		Kind::Numeric(_) | Kind::Bool | Kind::String => desc.quoted = true,
		Kind::Pointer(inner) => mark_quoted(inner),
		_ => {}
	}
}

fn is_valid_map_key(desc: &TypeDesc) -> bool {
	match &desc.kind {
		Kind::String | Kind::Numeric(_) | Kind::Bool => true,
		Kind::Pointer(inner) => is_valid_map_key(inner),
		_ => false,
	}
}
