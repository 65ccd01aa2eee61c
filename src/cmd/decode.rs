use std::path::PathBuf;

use shapedec::decode::Result;
use tracing::debug;

use crate::cmd::util::{OptionFlags, load_registry, print_instance, read_input};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	/// Document path, or `-` for stdin.
	pub input: PathBuf,
	/// Record to decode instead of the schema root.
	#[arg(long)]
	pub record: Option<String>,
	#[command(flatten)]
	pub options: OptionFlags,
	#[arg(long)]
	pub json: bool,
}

/// Decode one document and print the populated record.
pub fn run(args: Args) -> Result<()> {
	let Args {
		schema,
		input,
		record,
		options,
		json,
	} = args;

	let (registry, root) = load_registry(&schema, record.as_deref(), &options)?;
	let bytes = read_input(&input)?;
	debug!(input = %input.display(), len = bytes.len(), "decoding document");
	let inst = registry.decode_new(root, &bytes)?;
	print_instance(&registry, &inst, json)
}
