use tracing::trace;

use crate::decode::handler::{Assign, decode_value};
use crate::decode::{DecodeError, Lexer, ParseState, RecordId, RecordValue, Registry, Resolved, Result, Token, TokenStream};

/// Handling of `null` for scalar and nested-record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPolicy {
	/// `null` is a format error for the field.
	#[default]
	Reject,
	/// `null` leaves the slot untouched and the field unmarked.
	Ignore,
}

/// Behavior switches fixed when a registry is built.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// After each record decode, zero every field the input did not assign.
	pub reset_unset_fields: bool,
	/// What `null` means for numbers, strings, booleans and nested records.
	pub null_scalars: NullPolicy,
	/// Maximum nested record depth.
	pub max_depth: u32,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			reset_unset_fields: false,
			null_scalars: NullPolicy::Reject,
			max_depth: 128,
		}
	}
}

impl DecodeOptions {
	/// Preset for documents that always carry the full record: unassigned fields are zeroed.
	pub fn for_snapshots() -> Self {
		Self {
			reset_unset_fields: true,
			..Self::default()
		}
	}

	/// Preset tolerating `null` anywhere.
	pub fn lenient() -> Self {
		Self {
			null_scalars: NullPolicy::Ignore,
			..Self::default()
		}
	}
}

/// State of one in-flight decode.
///
/// Self-decoding hooks receive it to read tokens and to decode nested records
/// under the same depth limit as the surrounding document.
pub struct DecodeCtx<'r, 's> {
	pub(crate) registry: &'r Registry,
	pub(crate) stream: &'s mut dyn TokenStream,
	depth: u32,
}

impl<'r, 's> DecodeCtx<'r, 's> {
	pub(crate) fn new(registry: &'r Registry, stream: &'s mut dyn TokenStream) -> Self {
		Self { registry, stream, depth: 0 }
	}

	/// Registry driving this decode.
	pub fn registry(&self) -> &'r Registry {
		self.registry
	}

	/// Shared token stream.
	pub fn stream(&mut self) -> &mut dyn TokenStream {
		&mut *self.stream
	}

	/// Nested records currently open.
	pub fn depth(&self) -> u32 {
		self.depth
	}

	/// Scan one token, turning `Token::Error` into the stream's error.
	pub fn next_token(&mut self) -> Result<Token> {
		match self.stream.scan() {
			Token::Error => Err(self.lexer_error()),
			tok => Ok(tok),
		}
	}

	pub(crate) fn lexer_error(&self) -> DecodeError {
		match self.stream.error() {
			Some(err) => DecodeError::Lexer(err),
			None => unreachable!("token stream reported an error token without a cause"),
		}
	}

	/// Decode a record of `registry` from the shared stream at the current depth.
	///
	/// `registry` may differ from the one driving this decode; its own
	/// `max_depth` applies to the combined nesting.
	pub fn decode_with(&mut self, registry: &Registry, inst: &mut RecordValue, start: ParseState) -> Result<()> {
		let mut nested = DecodeCtx {
			registry,
			stream: &mut *self.stream,
			depth: self.depth,
		};
		nested.decode_record(inst, start)
	}

	fn wrong_token(&self, wanted: Token, got: Token) -> DecodeError {
		DecodeError::WrongToken {
			wanted,
			got,
			offset: self.stream.offset(),
		}
	}

	/// Decode one record body into `inst`, starting at `start`.
	pub(crate) fn decode_record(&mut self, inst: &mut RecordValue, start: ParseState) -> Result<()> {
		let max_depth = self.registry.options().max_depth;
		if self.depth >= max_depth {
			return Err(DecodeError::DepthExceeded { max_depth });
		}
		self.depth += 1;
		let result = self.record_body(inst, start);
		self.depth -= 1;
		result
	}

	fn record_body(&mut self, inst: &mut RecordValue, start: ParseState) -> Result<()> {
		let registry = self.registry;
		let schema = registry.schema(inst.record);
		if inst.fields.len() != schema.fields.len() {
			*inst = registry.new_instance(inst.record);
		}
		inst.presence.clear();

		let mut state = start;
		let mut current = Resolved::NoSuchKey;
		loop {
			let tok = self.next_token()?;
			trace!(record = %schema.name, ?state, %tok, "record token");
			state = match state {
				ParseState::ExpectOpen => {
					if tok != Token::ObjectOpen {
						return Err(self.wrong_token(Token::ObjectOpen, tok));
					}
					ParseState::WantKey
				}
				ParseState::WantKey => match tok {
					Token::ObjectClose => break,
					Token::String => {
						current = schema.resolve(self.stream.value_bytes());
						ParseState::WantColon
					}
					_ => return Err(self.wrong_token(Token::String, tok)),
				},
				ParseState::WantColon => {
					if tok != Token::Colon {
						return Err(self.wrong_token(Token::Colon, tok));
					}
					ParseState::WantValue
				}
				ParseState::WantValue => {
					if !tok.starts_value() {
						let field = match current {
							Resolved::Field(idx) => schema.fields[idx].wire_name.clone(),
							Resolved::NoSuchKey => "".into(),
						};
						return Err(DecodeError::WantedValue {
							field,
							got: tok,
							offset: self.stream.offset(),
						});
					}
					match current {
						Resolved::Field(idx) => {
							let field = &schema.fields[idx];
							if decode_value(self, &field.desc, &field.wire_name, tok, &mut inst.fields[idx])? == Assign::Set {
								inst.presence.insert(idx);
							}
						}
						Resolved::NoSuchKey => {
							trace!(record = %schema.name, "skipping unknown key");
							self.stream.skip(tok)?;
						}
					}
					ParseState::AfterValue
				}
				ParseState::AfterValue => match tok {
					Token::Comma => ParseState::WantKey,
					Token::ObjectClose => break,
					_ => return Err(self.wrong_token(Token::Comma, tok)),
				},
			};
		}

		if registry.options().reset_unset_fields {
			reset_unset(registry, inst);
		}
		Ok(())
	}
}

/// Zero every field not marked present. Presence is left as seen on the wire.
fn reset_unset(registry: &Registry, inst: &mut RecordValue) {
	let schema = registry.schema(inst.record);
	for (idx, field) in schema.fields.iter().enumerate() {
		if !inst.presence.contains(idx) {
			inst.fields[idx] = registry.zero_value(&field.desc);
		}
	}
}

impl Registry {
	/// Decode one encoded record from `stream` into `inst`.
	///
	/// Presence flags are reset first; on error, fields assigned before the
	/// failure keep their new values.
	pub fn decode(&self, inst: &mut RecordValue, stream: &mut dyn TokenStream) -> Result<()> {
		self.decode_from(inst, stream, ParseState::ExpectOpen)
	}

	/// Decode starting at an arbitrary state, with no records open.
	///
	/// Inside a self-decoding hook use [`DecodeCtx::decode_with`] instead so
	/// the depth limit spans the hook.
	pub fn decode_from(&self, inst: &mut RecordValue, stream: &mut dyn TokenStream, start: ParseState) -> Result<()> {
		DecodeCtx::new(self, stream).decode_record(inst, start)
	}

	/// Decode a complete document; anything after the record is an error.
	pub fn decode_slice(&self, inst: &mut RecordValue, input: &[u8]) -> Result<()> {
		let mut lexer = Lexer::new(input);
		let mut ctx = DecodeCtx::new(self, &mut lexer);
		ctx.decode_record(inst, ParseState::ExpectOpen)?;
		match ctx.next_token()? {
			Token::End => Ok(()),
			got => Err(ctx.wrong_token(Token::End, got)),
		}
	}

	/// Decode a complete document into a fresh instance of `id`.
	pub fn decode_new(&self, id: RecordId, input: &[u8]) -> Result<RecordValue> {
		let mut inst = self.new_instance(id);
		self.decode_slice(&mut inst, input)?;
		Ok(inst)
	}
}
