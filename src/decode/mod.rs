mod base64;
mod classify;
mod dispatch;
mod encode;
mod error;
mod handler;
mod lexer;
mod machine;
mod presence;
mod schema;
mod schema_file;
mod shape;
mod spec;
mod stream;
mod token;
mod update;
mod value;

/// Field dispatch table and key resolution outcome.
pub use dispatch::{FieldTable, Resolved};
/// Error and result aliases.
pub use error::{DecodeError, Result};
/// In-memory JSON token stream.
pub use lexer::Lexer;
/// Decode options, the `null` policy and the in-flight decode context.
pub use machine::{DecodeCtx, DecodeOptions, NullPolicy};
/// Field presence bitset.
pub use presence::FieldSet;
/// Record schemas and the registry that owns them.
pub use schema::{FieldDesc, RecordId, RecordSchema, Registry, RegistryBuilder};
/// Schema file layout.
pub use schema_file::{FieldEntry, OptionsEntry, RecordEntry, SchemaFile};
/// Classified type descriptors and self-decoding hooks.
pub use shape::{BytesDecode, Hook, Kind, RawJson, StreamDecode, TypeDesc};
/// Declared shapes fed to the classifier.
pub use spec::{FieldSpec, NumKind, RecordSpec, TypeSpec};
/// Token stream contract.
pub use stream::{LexError, LexErrorKind, TokenStream};
/// Token and parser state enums.
pub use token::{ParseState, Token};
/// Decoded runtime values.
pub use value::{RecordValue, Value};

#[cfg(test)]
mod test_support;
