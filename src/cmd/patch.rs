use std::path::PathBuf;

use shapedec::decode::{DecodeError, Result};

use crate::cmd::util::{OptionFlags, load_registry, print_instance, read_input};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	/// Base document path, or `-` for stdin.
	pub input: PathBuf,
	/// Field assignment `name=value`; repeatable.
	#[arg(long = "set", value_name = "FIELD=VALUE")]
	pub assignments: Vec<String>,
	#[arg(long)]
	pub record: Option<String>,
	#[command(flatten)]
	pub options: OptionFlags,
	#[arg(long)]
	pub json: bool,
}

/// Decode a base document, then apply textual field assignments on top.
pub fn run(args: Args) -> Result<()> {
	let Args {
		schema,
		input,
		assignments,
		record,
		options,
		json,
	} = args;

	let pairs = assignments.iter().map(|text| parse_assignment(text)).collect::<Result<Vec<_>>>()?;
	let (registry, root) = load_registry(&schema, record.as_deref(), &options)?;
	let mut inst = registry.decode_new(root, &read_input(&input)?)?;
	registry.apply_partial_update(&mut inst, pairs)?;
	print_instance(&registry, &inst, json)
}

fn parse_assignment(text: &str) -> Result<(&str, &str)> {
	match text.split_once('=') {
		Some((name, value)) if !name.is_empty() => Ok((name, value)),
		_ => Err(DecodeError::InvalidAssignment { text: text.to_owned() }),
	}
}
