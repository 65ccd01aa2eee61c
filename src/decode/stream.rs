use thiserror::Error;

use crate::decode::Token;

/// Cause of a fatal token stream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
	/// Input ended inside a token or structure.
	UnexpectedEof,
	/// Byte cannot start or continue a token.
	UnexpectedByte(u8),
	/// Unknown or malformed backslash escape.
	InvalidEscape,
	/// Number does not follow the JSON number grammar.
	InvalidNumber,
	/// Bare word other than `true`, `false` or `null`.
	InvalidLiteral,
	/// String content is not valid UTF-8.
	InvalidUtf8,
	/// Unescaped control character inside a string.
	ControlCharacter,
	/// Closing delimiter does not match the open structure.
	Unbalanced,
}

/// Fatal token stream error with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("lexer error at offset {offset}: {kind:?}")]
pub struct LexError {
	/// What went wrong.
	pub kind: LexErrorKind,
	/// Byte offset where the failure was detected.
	pub offset: usize,
}

/// Supplier of lexical tokens over one encoded document.
///
/// Implementations keep the current token's bytes available until the next
/// call to `scan`, `capture` or `skip`.
pub trait TokenStream {
	/// Advance and return the next token.
	fn scan(&mut self) -> Token;

	/// Bytes backing the current scalar token.
	///
	/// Strings are already unescaped; numbers and literals are raw text.
	fn value_bytes(&self) -> &[u8];

	/// Consume the rest of the value started by `tok` and return its exact bytes.
	///
	/// `tok` is the token most recently returned by `scan`.
	fn capture(&mut self, tok: Token) -> Result<&[u8], LexError>;

	/// Consume and discard the value started by `tok`.
	fn skip(&mut self, tok: Token) -> Result<(), LexError> {
		self.capture(tok).map(|_| ())
	}

	/// Error behind the last `Token::Error`, if any.
	fn error(&self) -> Option<LexError>;

	/// Current byte offset into the document.
	fn offset(&self) -> usize;
}
