use std::path::Path;

use serde::Deserialize;

use crate::decode::{DecodeError, DecodeOptions, FieldSpec, NullPolicy, RecordId, RecordSpec, Registry, Result, TypeSpec};

/// On-disk schema: record declarations plus decode options.
///
/// ```json
/// {
///   "root": "User",
///   "records": [
///     { "name": "User", "fields": [
///       { "name": "id", "type": "u32" },
///       { "name": "Parent", "type": "*User", "tag": "parent" }
///     ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
	/// Record decoded by default; the first record when omitted.
	#[serde(default)]
	pub root: Option<String>,
	/// Decode switches.
	#[serde(default)]
	pub options: OptionsEntry,
	/// Record declarations.
	pub records: Vec<RecordEntry>,
}

/// Decode switches as written in a schema file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsEntry {
	/// Zero fields the input did not assign.
	pub reset_unset_fields: bool,
	/// Ignore `null` for scalar and record fields instead of failing.
	pub allow_null: bool,
	/// Override the nested record depth limit.
	pub max_depth: Option<u32>,
}

/// One record declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordEntry {
	/// Record type name.
	pub name: String,
	/// Fields in declaration order.
	#[serde(default)]
	pub fields: Vec<FieldEntry>,
}

/// One field declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
	/// Host-side field name.
	pub name: String,
	/// Type declarator, e.g. `[]string` or `*Node`.
	#[serde(rename = "type")]
	pub ty: String,
	/// Struct-tag style `wire[,string]`; `-` drops the field.
	#[serde(default)]
	pub tag: Option<String>,
	/// Explicit wire-name; wins over the tag.
	#[serde(default)]
	pub wire: Option<String>,
	/// Value is wrapped in an extra layer of quotes.
	#[serde(default)]
	pub quoted: bool,
}

impl SchemaFile {
	/// Read and parse a schema file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let text = std::fs::read_to_string(path)?;
		Self::parse(&text)
	}

	/// Parse schema JSON text.
	pub fn parse(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Decode options described by the file.
	pub fn decode_options(&self) -> DecodeOptions {
		let mut options = DecodeOptions {
			reset_unset_fields: self.options.reset_unset_fields,
			..DecodeOptions::default()
		};
		if self.options.allow_null {
			options.null_scalars = NullPolicy::Ignore;
		}
		if let Some(max_depth) = self.options.max_depth {
			options.max_depth = max_depth;
		}
		options
	}

	/// Record declarations with tags applied.
	pub fn record_specs(&self) -> Result<Vec<RecordSpec>> {
		self.records.iter().map(RecordEntry::to_spec).collect()
	}

	/// Build a registry with the file's options.
	pub fn build(&self) -> Result<Registry> {
		self.build_with(self.decode_options())
	}

	/// Build a registry with explicit options.
	pub fn build_with(&self, options: DecodeOptions) -> Result<Registry> {
		self.record_specs()?.into_iter().fold(Registry::builder().options(options), |builder, spec| builder.record(spec)).build()
	}

	/// Resolve the root record inside `registry`.
	pub fn root(&self, registry: &Registry) -> Result<RecordId> {
		match (&self.root, self.records.first()) {
			(Some(name), _) => registry.require(name),
			(None, Some(first)) => registry.require(&first.name),
			(None, None) => Err(DecodeError::MissingRoot),
		}
	}
}

impl RecordEntry {
	fn to_spec(&self) -> Result<RecordSpec> {
		let mut spec = RecordSpec::new(&self.name);
		for entry in &self.fields {
			let (tag_wire, tag_quoted) = match entry.tag.as_deref() {
				Some("-") => continue,
				Some(tag) => parse_tag(tag),
				None => (None, false),
			};
			let mut field = FieldSpec::new(&entry.name, TypeSpec::parse(&entry.ty)?);
			if let Some(wire) = entry.wire.as_deref().or(tag_wire) {
				field = field.wire(wire);
			}
			if entry.quoted || tag_quoted {
				field = field.quoted();
			}
			spec = spec.field(field);
		}
		Ok(spec)
	}
}

/// Split `wire,opt,opt` into the wire-name and the `string` option.
fn parse_tag(tag: &str) -> (Option<&str>, bool) {
	let mut parts = tag.split(',');
	let wire = parts.next().filter(|name| !name.is_empty());
	let quoted = parts.any(|opt| opt.trim() == "string");
	(wire, quoted)
}
