//! Schema-directed decoding of JSON records into typed runtime values.

/// Record schemas, the token stream, and the record decode state machine.
pub mod decode;
