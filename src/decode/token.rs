use std::fmt;

/// Lexical token kinds produced by a token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
	/// String literal; content available through `value_bytes`.
	String,
	/// Number literal; raw text available through `value_bytes`.
	Number,
	/// `true` or `false`; raw text available through `value_bytes`.
	Bool,
	/// `null`.
	Null,
	/// `{`
	ObjectOpen,
	/// `}`
	ObjectClose,
	/// `[`
	ArrayOpen,
	/// `]`
	ArrayClose,
	/// `,`
	Comma,
	/// `:`
	Colon,
	/// Fatal lexer error; details come from `TokenStream::error`.
	Error,
	/// End of input.
	End,
}

impl Token {
	/// Whether this token can begin a value.
	pub fn starts_value(self) -> bool {
		matches!(
			self,
			Token::String | Token::Number | Token::Bool | Token::Null | Token::ObjectOpen | Token::ArrayOpen
		)
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = match self {
			Token::String => "string",
			Token::Number => "number",
			Token::Bool => "bool",
			Token::Null => "null",
			Token::ObjectOpen => "'{'",
			Token::ObjectClose => "'}'",
			Token::ArrayOpen => "'['",
			Token::ArrayClose => "']'",
			Token::Comma => "','",
			Token::Colon => "':'",
			Token::Error => "error",
			Token::End => "end of input",
		};
		f.write_str(text)
	}
}

/// Record decode state machine positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
	/// Expect the record-open delimiter.
	ExpectOpen,
	/// Expect a key or the record-close delimiter.
	WantKey,
	/// Expect the key/value separator.
	WantColon,
	/// Expect a value for the current key.
	WantValue,
	/// Expect a comma or the record-close delimiter.
	AfterValue,
}
