use crate::decode::{LexError, LexErrorKind, Token, TokenStream};

#[derive(Debug, Clone, Copy)]
enum ValueRef {
	/// Bytes live in the input at `start..end`.
	Input(usize, usize),
	/// Bytes live in the unescape buffer.
	Buffer,
}

/// In-memory JSON token stream over a byte slice.
pub struct Lexer<'a> {
	input: &'a [u8],
	pos: usize,
	token_start: usize,
	value: ValueRef,
	buffer: Vec<u8>,
	error: Option<LexError>,
}

impl<'a> Lexer<'a> {
	/// Create a lexer positioned at the start of `input`.
	pub fn new(input: &'a [u8]) -> Self {
		Self {
			input,
			pos: 0,
			token_start: 0,
			value: ValueRef::Input(0, 0),
			buffer: Vec::new(),
			error: None,
		}
	}

	/// Byte offset where the current token started.
	pub fn token_start(&self) -> usize {
		self.token_start
	}

	fn fail(&mut self, kind: LexErrorKind, offset: usize) -> Token {
		self.error = Some(LexError { kind, offset });
		Token::Error
	}

	fn current_error(&self) -> LexError {
		self.error.unwrap_or(LexError {
			kind: LexErrorKind::UnexpectedEof,
			offset: self.pos,
		})
	}

	fn skip_whitespace(&mut self) {
		while let Some(byte) = self.input.get(self.pos) {
			if !matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
				break;
			}
			self.pos += 1;
		}
	}

	fn lex_string(&mut self) -> Token {
		self.pos += 1;
		let start = self.pos;

		loop {
			let Some(&byte) = self.input.get(self.pos) else {
				return self.fail(LexErrorKind::UnexpectedEof, self.pos);
			};
			match byte {
				b'"' => {
					let content = &self.input[start..self.pos];
					if std::str::from_utf8(content).is_err() {
						return self.fail(LexErrorKind::InvalidUtf8, start);
					}
					self.value = ValueRef::Input(start, self.pos);
					self.pos += 1;
					return Token::String;
				}
				b'\\' => {
					self.buffer.clear();
					self.buffer.extend_from_slice(&self.input[start..self.pos]);
					return self.lex_escaped_string(start);
				}
				0x00..=0x1f => return self.fail(LexErrorKind::ControlCharacter, self.pos),
				_ => self.pos += 1,
			}
		}
	}

	fn lex_escaped_string(&mut self, start: usize) -> Token {
		loop {
			let Some(&byte) = self.input.get(self.pos) else {
				return self.fail(LexErrorKind::UnexpectedEof, self.pos);
			};
			match byte {
				b'"' => {
					self.pos += 1;
					if std::str::from_utf8(&self.buffer).is_err() {
						return self.fail(LexErrorKind::InvalidUtf8, start);
					}
					self.value = ValueRef::Buffer;
					return Token::String;
				}
				b'\\' => {
					let at = self.pos;
					let Some(&escape) = self.input.get(self.pos + 1) else {
						return self.fail(LexErrorKind::UnexpectedEof, self.pos + 1);
					};
					self.pos += 2;
					let decoded = match escape {
						b'"' => b'"',
						b'\\' => b'\\',
						b'/' => b'/',
						b'b' => 0x08,
						b'f' => 0x0c,
						b'n' => b'\n',
						b'r' => b'\r',
						b't' => b'\t',
						b'u' => {
							let Some(ch) = self.read_unicode_escape() else {
								return self.fail(LexErrorKind::InvalidEscape, at);
							};
							let mut utf8 = [0_u8; 4];
							self.buffer.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
							continue;
						}
						_ => return self.fail(LexErrorKind::InvalidEscape, at),
					};
					self.buffer.push(decoded);
				}
				0x00..=0x1f => return self.fail(LexErrorKind::ControlCharacter, self.pos),
				_ => {
					self.buffer.push(byte);
					self.pos += 1;
				}
			}
		}
	}

	/// Read the four hex digits after `\u`, joining surrogate pairs.
	///
	/// Lone surrogates decode to U+FFFD.
	fn read_unicode_escape(&mut self) -> Option<char> {
		let first = self.read_hex4()?;
		if !(0xd800..0xdc00).contains(&first) {
			return Some(char::from_u32(first).unwrap_or(char::REPLACEMENT_CHARACTER));
		}

		if self.input.get(self.pos..self.pos + 2) != Some(b"\\u".as_slice()) {
			return Some(char::REPLACEMENT_CHARACTER);
		}
		let save = self.pos;
		self.pos += 2;
		let second = self.read_hex4()?;
		if !(0xdc00..0xe000).contains(&second) {
			self.pos = save;
			return Some(char::REPLACEMENT_CHARACTER);
		}
		let combined = 0x10000 + ((first - 0xd800) << 10) + (second - 0xdc00);
		Some(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER))
	}

	fn read_hex4(&mut self) -> Option<u32> {
		let digits = self.input.get(self.pos..self.pos + 4)?;
		let mut value = 0_u32;
		for byte in digits {
			value = value * 16 + char::from(*byte).to_digit(16)?;
		}
		self.pos += 4;
		Some(value)
	}

	fn lex_number(&mut self) -> Token {
		let start = self.pos;
		if self.peek() == Some(b'-') {
			self.pos += 1;
		}

		match self.peek() {
			Some(b'0') => self.pos += 1,
			Some(b'1'..=b'9') => self.eat_digits(),
			_ => return self.fail(LexErrorKind::InvalidNumber, start),
		}

		if self.peek() == Some(b'.') {
			self.pos += 1;
			if !matches!(self.peek(), Some(b'0'..=b'9')) {
				return self.fail(LexErrorKind::InvalidNumber, start);
			}
			self.eat_digits();
		}

		if matches!(self.peek(), Some(b'e' | b'E')) {
			self.pos += 1;
			if matches!(self.peek(), Some(b'+' | b'-')) {
				self.pos += 1;
			}
			if !matches!(self.peek(), Some(b'0'..=b'9')) {
				return self.fail(LexErrorKind::InvalidNumber, start);
			}
			self.eat_digits();
		}

		self.value = ValueRef::Input(start, self.pos);
		Token::Number
	}

	fn lex_word(&mut self) -> Token {
		let start = self.pos;
		while matches!(self.peek(), Some(byte) if byte.is_ascii_alphanumeric() || byte == b'_') {
			self.pos += 1;
		}

		self.value = ValueRef::Input(start, self.pos);
		match &self.input[start..self.pos] {
			b"true" | b"false" => Token::Bool,
			b"null" => Token::Null,
			_ => self.fail(LexErrorKind::InvalidLiteral, start),
		}
	}

	fn eat_digits(&mut self) {
		while matches!(self.peek(), Some(b'0'..=b'9')) {
			self.pos += 1;
		}
	}

	fn peek(&self) -> Option<u8> {
		self.input.get(self.pos).copied()
	}
}

impl TokenStream for Lexer<'_> {
	fn scan(&mut self) -> Token {
		if self.error.is_some() {
			return Token::Error;
		}

		self.skip_whitespace();
		self.token_start = self.pos;
		let Some(byte) = self.peek() else {
			return Token::End;
		};

		let simple = match byte {
			b'{' => Some(Token::ObjectOpen),
			b'}' => Some(Token::ObjectClose),
			b'[' => Some(Token::ArrayOpen),
			b']' => Some(Token::ArrayClose),
			b',' => Some(Token::Comma),
			b':' => Some(Token::Colon),
			_ => None,
		};
		if let Some(tok) = simple {
			self.pos += 1;
			return tok;
		}

		match byte {
			b'"' => self.lex_string(),
			b'-' | b'0'..=b'9' => self.lex_number(),
			b'a'..=b'z' | b'A'..=b'Z' => self.lex_word(),
			other => self.fail(LexErrorKind::UnexpectedByte(other), self.pos),
		}
	}

	fn value_bytes(&self) -> &[u8] {
		match self.value {
			ValueRef::Input(start, end) => &self.input[start..end],
			ValueRef::Buffer => &self.buffer,
		}
	}

	fn capture(&mut self, tok: Token) -> Result<&[u8], LexError> {
		let start = self.token_start;
		match tok {
			Token::String | Token::Number | Token::Bool | Token::Null => {}
			Token::ObjectOpen | Token::ArrayOpen => {
				let mut open = vec![tok];
				while let Some(&innermost) = open.last() {
					match self.scan() {
						next @ (Token::ObjectOpen | Token::ArrayOpen) => open.push(next),
						Token::ObjectClose if innermost == Token::ObjectOpen => {
							open.pop();
						}
						Token::ArrayClose if innermost == Token::ArrayOpen => {
							open.pop();
						}
						Token::ObjectClose | Token::ArrayClose => {
							self.fail(LexErrorKind::Unbalanced, self.token_start);
							return Err(self.current_error());
						}
						Token::End => {
							self.fail(LexErrorKind::UnexpectedEof, self.pos);
							return Err(self.current_error());
						}
						Token::Error => return Err(self.current_error()),
						_ => {}
					}
				}
			}
			Token::Error => return Err(self.current_error()),
			Token::End => {
				self.fail(LexErrorKind::UnexpectedEof, self.pos);
				return Err(self.current_error());
			}
			Token::ObjectClose | Token::ArrayClose | Token::Comma | Token::Colon => {
				self.fail(LexErrorKind::UnexpectedByte(self.input[start]), start);
				return Err(self.current_error());
			}
		}

		Ok(&self.input[start..self.pos])
	}

	fn error(&self) -> Option<LexError> {
		self.error
	}

	fn offset(&self) -> usize {
		self.pos
	}
}
