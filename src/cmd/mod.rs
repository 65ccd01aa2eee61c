/// Record decode command.
pub mod decode;
/// Decode-then-patch command.
pub mod patch;
/// Schema inspection command.
pub mod schema;
/// Shared loading and rendering helpers.
pub mod util;
