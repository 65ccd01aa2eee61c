use std::io::Read;
use std::path::Path;

use serde::Serialize;
use shapedec::decode::{DecodeOptions, NullPolicy, RecordId, RecordValue, Registry, Result, SchemaFile};

/// Command-line overrides applied on top of a schema file's options.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OptionFlags {
	/// Zero fields the input did not assign.
	#[arg(long)]
	pub reset_unset: bool,
	/// Ignore `null` for scalar and record fields.
	#[arg(long)]
	pub allow_null: bool,
	/// Maximum nested record depth.
	#[arg(long)]
	pub max_depth: Option<u32>,
}

impl OptionFlags {
	fn apply(&self, mut options: DecodeOptions) -> DecodeOptions {
		if self.reset_unset {
			options.reset_unset_fields = true;
		}
		if self.allow_null {
			options.null_scalars = NullPolicy::Ignore;
		}
		if let Some(max_depth) = self.max_depth {
			options.max_depth = max_depth;
		}
		options
	}
}

/// Load a schema file and resolve the record to decode.
pub(crate) fn load_registry(path: &Path, record: Option<&str>, flags: &OptionFlags) -> Result<(Registry, RecordId)> {
	let file = SchemaFile::load(path)?;
	let registry = file.build_with(flags.apply(file.decode_options()))?;
	let root = match record {
		Some(name) => registry.require(name)?,
		None => file.root(&registry)?,
	};
	Ok((registry, root))
}

/// Read a document from a path, or stdin for `-`.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
	if path.as_os_str() == "-" {
		let mut buf = Vec::new();
		std::io::stdin().read_to_end(&mut buf)?;
		return Ok(buf);
	}
	Ok(std::fs::read(path)?)
}

/// Print a serializable payload as pretty JSON.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}

#[derive(Serialize)]
struct DecodedJson<'a> {
	record: &'a str,
	present: Vec<&'a str>,
	value: serde_json::Value,
}

/// Print a decoded instance, as JSON or as `field = value` lines.
pub(crate) fn print_instance(registry: &Registry, inst: &RecordValue, json: bool) -> Result<()> {
	let schema = registry.schema(inst.record);
	let encoded = registry.encode(inst);
	if json {
		return emit_json(&DecodedJson {
			record: &schema.name,
			present: registry.field_presence(inst),
			value: encoded,
		});
	}

	println!("record: {}", schema.name);
	println!("present: {}", registry.field_presence(inst).join(","));
	for (idx, field) in schema.fields.iter().enumerate() {
		let marker = if inst.is_present(idx) { '*' } else { ' ' };
		let rendered = encoded.get(field.wire_name.as_ref()).map_or_else(|| "null".to_owned(), |value| value.to_string());
		println!("{marker} {} = {rendered}", field.name);
	}
	Ok(())
}
