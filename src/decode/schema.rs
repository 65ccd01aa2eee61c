use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::decode::classify::Classifier;
use crate::decode::{DecodeError, DecodeOptions, FieldSet, FieldTable, Kind, NumKind, RecordSpec, RecordValue, Resolved, Result, TypeDesc, Value};

/// Stable handle of a record type inside a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u32);

impl RecordId {
	pub(crate) fn new(idx: u32) -> Self {
		Self(idx)
	}

	/// Position of the record in its registry.
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// One classified field.
#[derive(Debug, Clone)]
pub struct FieldDesc {
	/// Host-side field name.
	pub name: Box<str>,
	/// Key used in the encoded form.
	pub wire_name: Box<str>,
	/// Handler descriptor.
	pub desc: TypeDesc,
}

/// Immutable decode plan for one record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
	/// Handle of this record.
	pub id: RecordId,
	/// Record type name.
	pub name: Box<str>,
	/// Fields in declaration order; indices are the field slots.
	pub fields: Vec<FieldDesc>,
	table: FieldTable,
}

impl RecordSchema {
	/// Resolve a wire key through the field dispatch table.
	pub fn resolve(&self, key: &[u8]) -> Resolved {
		self.table.resolve(key)
	}

	/// Slot index of the field named `name` (host-side name).
	pub fn field_index(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|field| field.name.as_ref() == name)
	}

	/// Value of field `name` in `instance`.
	pub fn get<'v>(&self, instance: &'v RecordValue, name: &str) -> Option<&'v Value> {
		self.field_index(name).and_then(|idx| instance.fields.get(idx))
	}

	/// Names of the fields assigned by the most recent decode, in declaration order.
	pub fn present_fields<'s>(&'s self, instance: &RecordValue) -> Vec<&'s str> {
		instance
			.presence
			.iter()
			.filter_map(|idx| self.fields.get(idx))
			.map(|field| field.name.as_ref())
			.collect()
	}
}

/// All record schemas known to one decoder, plus their decode options.
///
/// Read-only once built, and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Registry {
	records: Vec<RecordSchema>,
	by_name: HashMap<Box<str>, RecordId>,
	options: DecodeOptions,
}

impl Registry {
	/// Start building a registry.
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::default()
	}

	/// Look up a record by name.
	pub fn record(&self, name: &str) -> Option<RecordId> {
		self.by_name.get(name).copied()
	}

	/// Look up a record by name, failing with `UnknownRecord`.
	pub fn require(&self, name: &str) -> Result<RecordId> {
		self.record(name).ok_or_else(|| DecodeError::UnknownRecord { name: name.to_owned() })
	}

	/// Schema for `id`.
	///
	/// Ids are only minted by the registry itself, so the lookup is infallible
	/// for ids obtained from this registry.
	pub fn schema(&self, id: RecordId) -> &RecordSchema {
		&self.records[id.index()]
	}

	/// All schemas in registration order.
	pub fn schemas(&self) -> &[RecordSchema] {
		&self.records
	}

	/// Options fixed at construction.
	pub fn options(&self) -> &DecodeOptions {
		&self.options
	}

	/// Fresh instance with every field at its zero value and no presence marks.
	pub fn new_instance(&self, id: RecordId) -> RecordValue {
		let schema = self.schema(id);
		RecordValue {
			record: id,
			fields: schema.fields.iter().map(|field| self.zero_value(&field.desc)).collect(),
			presence: FieldSet::new(schema.fields.len()),
		}
	}

	/// Shape-appropriate zero value.
	pub fn zero_value(&self, desc: &TypeDesc) -> Value {
		match &desc.kind {
			Kind::Numeric(kind) => match kind {
				NumKind::I8 | NumKind::I16 | NumKind::I32 | NumKind::I64 => Value::I64(0),
				NumKind::U8 | NumKind::U16 | NumKind::U32 | NumKind::U64 => Value::U64(0),
				NumKind::F32 => Value::F32(0.0),
				NumKind::F64 => Value::F64(0.0),
			},
			Kind::String => Value::String("".into()),
			Kind::Bool => Value::Bool(false),
			Kind::FixedArray { element, length } => Value::Array((0..*length).map(|_| self.zero_value(element)).collect()),
			Kind::List(_) | Kind::Map { .. } | Kind::ByteList | Kind::Pointer(_) | Kind::Fallback => Value::Null,
			Kind::Record(id) => Value::Record(self.new_instance(*id)),
			Kind::SelfDecoding(hook) => hook.zero(),
		}
	}

	/// Value of field `name` in `instance`.
	pub fn field<'v>(&self, instance: &'v RecordValue, name: &str) -> Option<&'v Value> {
		self.schema(instance.record).get(instance, name)
	}

	/// Names of the fields assigned by the most recent decode of `instance`.
	pub fn field_presence(&self, instance: &RecordValue) -> Vec<&str> {
		self.schema(instance.record).present_fields(instance)
	}

	/// Render a descriptor as a compact type string.
	pub fn describe(&self, desc: &TypeDesc) -> String {
		let body = match &desc.kind {
			Kind::Numeric(kind) => kind.name().to_owned(),
			Kind::String => "string".to_owned(),
			Kind::Bool => "bool".to_owned(),
			Kind::FixedArray { element, length } => format!("[{length}]{}", self.describe(element)),
			Kind::List(element) => format!("[]{}", self.describe(element)),
			Kind::Map { key, value } => format!("map[{}]{}", self.describe(key), self.describe(value)),
			Kind::ByteList => "bytes".to_owned(),
			Kind::Pointer(element) => format!("*{}", self.describe(element)),
			Kind::Record(id) => self.schema(*id).name.to_string(),
			Kind::SelfDecoding(hook) => format!("{hook:?}"),
			Kind::Fallback => "any".to_owned(),
		};
		if desc.quoted { format!("{body},string") } else { body }
	}
}

/// Collects record declarations and builds a validated [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
	specs: Vec<RecordSpec>,
	options: DecodeOptions,
}

impl RegistryBuilder {
	/// Replace decode options.
	pub fn options(mut self, options: DecodeOptions) -> Self {
		self.options = options;
		self
	}

	/// Add a record declaration.
	pub fn record(mut self, spec: RecordSpec) -> Self {
		self.specs.push(spec);
		self
	}

	/// Validate and classify every record.
	pub fn build(self) -> Result<Registry> {
		let mut by_name = HashMap::with_capacity(self.specs.len());
		for (idx, spec) in self.specs.iter().enumerate() {
			let id = RecordId::new(idx as u32);
			if by_name.insert(Box::<str>::from(spec.name.as_str()), id).is_some() {
				return Err(DecodeError::DuplicateRecord { name: spec.name.clone() });
			}
		}

		let mut records = Vec::with_capacity(self.specs.len());
		for (idx, spec) in self.specs.iter().enumerate() {
			let mut seen = HashSet::with_capacity(spec.fields.len());
			let mut fields = Vec::with_capacity(spec.fields.len());
			for field in &spec.fields {
				if !seen.insert(field.wire_name.as_str()) {
					return Err(DecodeError::DuplicateWireName {
						record: spec.name.clone(),
						wire_name: field.wire_name.clone(),
					});
				}
				let classifier = Classifier {
					record: &spec.name,
					field: &field.name,
					records: &by_name,
				};
				fields.push(FieldDesc {
					name: field.name.as_str().into(),
					wire_name: field.wire_name.as_str().into(),
					desc: classifier.classify_field(&field.ty, field.quoted)?,
				});
			}

			let table = FieldTable::new(fields.iter().map(|field| field.wire_name.as_ref()));
			debug!(record = %spec.name, fields = fields.len(), "record schema built");
			records.push(RecordSchema {
				id: RecordId::new(idx as u32),
				name: spec.name.as_str().into(),
				fields,
				table,
			});
		}

		let registry = Registry {
			records,
			by_name,
			options: self.options,
		};
		registry.check_embedding()?;
		Ok(registry)
	}
}

impl Registry {
	/// Reject records that embed themselves by value.
	///
	/// Such a record would need an infinite zero value.
	fn check_embedding(&self) -> Result<()> {
		for schema in &self.records {
			let mut stack: Vec<RecordId> = schema.fields.iter().filter_map(|field| embedded_record(&field.desc)).collect();
			let mut visited = HashSet::new();
			while let Some(id) = stack.pop() {
				if id == schema.id {
					return Err(DecodeError::RecursiveRecord { name: schema.name.to_string() });
				}
				if visited.insert(id) {
					stack.extend(self.schema(id).fields.iter().filter_map(|field| embedded_record(&field.desc)));
				}
			}
		}
		Ok(())
	}
}

fn embedded_record(desc: &TypeDesc) -> Option<RecordId> {
	match &desc.kind {
		Kind::Record(id) => Some(*id),
		Kind::FixedArray { element, length } if *length > 0 => embedded_record(element),
		_ => None,
	}
}
