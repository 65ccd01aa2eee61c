use crate::decode::{DecodeOptions, FieldSpec, LexError, RecordSpec, Registry, Token, TokenStream, TypeSpec};

/// `Node { id: u32, name: string, tags: []string, parent: *Node }`.
pub(crate) fn node_registry(options: DecodeOptions) -> Registry {
	Registry::builder()
		.options(options)
		.record(
			RecordSpec::new("Node")
				.field(FieldSpec::new("id", TypeSpec::parse("u32").expect("declarator parses")))
				.field(FieldSpec::new("name", TypeSpec::String))
				.field(FieldSpec::new("tags", TypeSpec::slice_of(TypeSpec::String)))
				.field(FieldSpec::new("parent", TypeSpec::ptr_to(TypeSpec::record("Node")))),
		)
		.build()
		.expect("node registry builds")
}

/// Registry with a single record `Holder` holding one field `v` of type `ty`.
pub(crate) fn holder_registry(ty: &str, quoted: bool, options: DecodeOptions) -> Registry {
	let mut field = FieldSpec::new("v", TypeSpec::parse(ty).expect("declarator parses"));
	if quoted {
		field = field.quoted();
	}
	Registry::builder()
		.options(options)
		.record(RecordSpec::new("Inner").field(FieldSpec::new("n", TypeSpec::parse("i32").expect("declarator parses"))))
		.record(RecordSpec::new("Holder").field(field))
		.build()
		.expect("held registry builds")
}

/// Token stream replaying a fixed token list.
///
/// `capture` only supports scalar tokens.
pub(crate) struct ScriptedStream {
	tokens: Vec<(Token, &'static [u8])>,
	pos: usize,
	error: Option<LexError>,
}

impl ScriptedStream {
	pub(crate) fn new(tokens: Vec<(Token, &'static [u8])>) -> Self {
		Self { tokens, pos: 0, error: None }
	}

	pub(crate) fn failing_with(mut self, error: LexError) -> Self {
		self.error = Some(error);
		self
	}
}

impl TokenStream for ScriptedStream {
	fn scan(&mut self) -> Token {
		let tok = self.tokens.get(self.pos).map_or(Token::End, |(tok, _)| *tok);
		self.pos += 1;
		tok
	}

	fn value_bytes(&self) -> &[u8] {
		self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx)).map(|(_, bytes)| *bytes).unwrap_or_default()
	}

	fn capture(&mut self, _tok: Token) -> Result<&[u8], LexError> {
		Ok(self.value_bytes())
	}

	fn error(&self) -> Option<LexError> {
		self.error
	}

	fn offset(&self) -> usize {
		self.pos
	}
}
