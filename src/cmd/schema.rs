use std::path::PathBuf;

use serde::Serialize;
use shapedec::decode::{Result, SchemaFile};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct FieldJson {
	name: String,
	wire: String,
	#[serde(rename = "type")]
	ty: String,
}

#[derive(Serialize)]
struct RecordJson {
	name: String,
	root: bool,
	fields: Vec<FieldJson>,
}

/// Print every record with its classified field types.
pub fn run(args: Args) -> Result<()> {
	let Args { schema, json } = args;
	let file = SchemaFile::load(&schema)?;
	let registry = file.build()?;
	let root = file.root(&registry).ok();

	let records: Vec<RecordJson> = registry
		.schemas()
		.iter()
		.map(|record| RecordJson {
			name: record.name.to_string(),
			root: Some(record.id) == root,
			fields: record
				.fields
				.iter()
				.map(|field| FieldJson {
					name: field.name.to_string(),
					wire: field.wire_name.to_string(),
					ty: registry.describe(&field.desc),
				})
				.collect(),
		})
		.collect();

	if json {
		return emit_json(&records);
	}

	println!("schema: {}", schema.display());
	for record in records {
		println!("record {}{}", record.name, if record.root { " (root)" } else { "" });
		for field in record.fields {
			println!("  {}\t{}\twire={}", field.name, field.ty, field.wire);
		}
	}
	Ok(())
}
