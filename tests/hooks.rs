#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use shapedec::decode::{
	BytesDecode, DecodeCtx, DecodeError, DecodeOptions, FieldSpec, Hook, ParseState, RecordSpec, Registry, Result, StreamDecode, Token, TypeSpec, Value,
};

/// Dotted version text, or an array of numbers, read straight off the stream.
struct Version;

impl StreamDecode for Version {
	fn name(&self) -> &str {
		"Version"
	}

	fn decode_stream(&self, tok: Token, ctx: &mut DecodeCtx<'_, '_>, slot: &mut Value) -> Result<()> {
		let stream = ctx.stream();
		let parts = match tok {
			Token::String => std::str::from_utf8(stream.value_bytes())
				.map_err(|err| DecodeError::format("version", err.to_string()))?
				.split('.')
				.map(|part| part.parse::<u64>().map(Value::U64).map_err(|err| DecodeError::format("version", err.to_string())))
				.collect::<Result<Vec<_>>>()?,
			Token::ArrayOpen => {
				let mut parts = Vec::new();
				loop {
					match stream.scan() {
						Token::Number => {
							let text = String::from_utf8_lossy(stream.value_bytes()).into_owned();
							parts.push(Value::U64(text.parse().map_err(|_| DecodeError::format("version", text.clone()))?));
						}
						Token::Comma => {}
						Token::ArrayClose => break,
						other => return Err(DecodeError::format("version", format!("unexpected {other}"))),
					}
				}
				parts
			}
			other => return Err(DecodeError::format("version", format!("unexpected {other}"))),
		};
		*slot = Value::List(parts);
		Ok(())
	}

	fn is_textual(&self) -> bool {
		true
	}
}

/// Object hook that hands its body to another registry's record decoder.
struct Envelope {
	inner: Arc<Registry>,
}

impl StreamDecode for Envelope {
	fn name(&self) -> &str {
		"Envelope"
	}

	fn decode_stream(&self, tok: Token, ctx: &mut DecodeCtx<'_, '_>, slot: &mut Value) -> Result<()> {
		if tok != Token::ObjectOpen {
			return Err(DecodeError::format("envelope", format!("unexpected {tok}")));
		}
		let meta = self.inner.record("Meta").ok_or_else(|| DecodeError::UnknownRecord { name: "Meta".to_owned() })?;
		let mut inst = self.inner.new_instance(meta);
		ctx.decode_with(&self.inner, &mut inst, ParseState::WantKey)?;
		*slot = Value::Record(inst);
		Ok(())
	}
}

/// Byte hook recording the exact captured text.
struct Verbatim {
	calls: Arc<AtomicUsize>,
}

impl BytesDecode for Verbatim {
	fn name(&self) -> &str {
		"Verbatim"
	}

	fn decode_bytes(&self, raw: &[u8], slot: &mut Value) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		*slot = Value::Bytes(raw.to_vec());
		Ok(())
	}

	fn zero(&self) -> Value {
		Value::Bytes(Vec::new())
	}
}

fn meta_registry(options: DecodeOptions) -> Arc<Registry> {
	Arc::new(
		Registry::builder()
			.options(options)
			.record(RecordSpec::new("Meta").field(FieldSpec::new("owner", TypeSpec::String)))
			.build()
			.expect("meta registry builds"),
	)
}

fn registry(calls: Arc<AtomicUsize>) -> Registry {
	Registry::builder()
		.record(
			RecordSpec::new("Package")
				.field(FieldSpec::new("version", TypeSpec::Custom(Hook::stream(Version))))
				.field(FieldSpec::new("meta", TypeSpec::Custom(Hook::stream(Envelope { inner: meta_registry(DecodeOptions::default()) }))))
				.field(FieldSpec::new("raw", TypeSpec::Custom(Hook::bytes(Verbatim { calls }))))
				.field(FieldSpec::new("after", TypeSpec::parse("i32").expect("parses"))),
		)
		.build()
		.expect("registry builds")
}

fn versions(parts: &[u64]) -> Value {
	Value::List(parts.iter().map(|part| Value::U64(*part)).collect())
}

#[test]
fn stream_hooks_consume_tokens_in_place() {
	let registry = registry(Arc::new(AtomicUsize::new(0)));
	let package = registry.record("Package").expect("registered");

	let inst = registry.decode_new(package, br#"{"version":"1.20.3","after":1}"#).expect("decodes");
	assert_eq!(registry.field(&inst, "version"), Some(&versions(&[1, 20, 3])));

	let inst = registry.decode_new(package, br#"{"version":[2,0],"after":2}"#).expect("decodes");
	assert_eq!(registry.field(&inst, "version"), Some(&versions(&[2, 0])));
	assert_eq!(registry.field(&inst, "after"), Some(&Value::I64(2)));
}

#[test]
fn stream_hooks_can_reenter_a_record_decoder() {
	let registry = registry(Arc::new(AtomicUsize::new(0)));
	let package = registry.record("Package").expect("registered");
	let inst = registry
		.decode_new(package, br#"{"meta":{"owner":"ops","skip":[1,{"x":2}]},"after":3}"#)
		.expect("decodes");

	let meta = registry.field(&inst, "meta").and_then(Value::as_record).expect("meta decoded");
	assert_eq!(meta.fields[0], Value::String("ops".into()));
	assert_eq!(registry.field(&inst, "after"), Some(&Value::I64(3)));
}

#[test]
fn depth_limit_spans_hook_reentry() {
	let shallow = DecodeOptions {
		max_depth: 1,
		..DecodeOptions::default()
	};
	let registry = Registry::builder()
		.record(RecordSpec::new("Wrapper").field(FieldSpec::new("meta", TypeSpec::Custom(Hook::stream(Envelope { inner: meta_registry(shallow) })))))
		.build()
		.expect("registry builds");
	let wrapper = registry.record("Wrapper").expect("registered");

	let err = registry.decode_new(wrapper, br#"{"meta":{"owner":"ops"}}"#).expect_err("hook record exceeds depth");
	assert!(matches!(err, DecodeError::DepthExceeded { max_depth: 1 }), "unexpected error: {err}");
}

#[test]
fn bytes_hooks_receive_the_exact_sub_document() {
	let calls = Arc::new(AtomicUsize::new(0));
	let registry = registry(calls.clone());
	let package = registry.record("Package").expect("registered");

	let inst = registry
		.decode_new(package, br#"{"raw": { "a" : [1, "A"] } ,"after":4}"#)
		.expect("decodes");
	assert_eq!(registry.field(&inst, "raw"), Some(&Value::Bytes(br#"{ "a" : [1, "A"] }"#.to_vec())));

	let inst = registry.decode_new(package, br#"{"raw":"q\"uote"}"#).expect("decodes");
	assert_eq!(registry.field(&inst, "raw"), Some(&Value::Bytes(br#""q\"uote""#.to_vec())));
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn null_short_circuits_before_the_hook() {
	let calls = Arc::new(AtomicUsize::new(0));
	let registry = registry(calls.clone());
	let package = registry.record("Package").expect("registered");
	let inst = registry
		.decode_new(package, br#"{"raw":null,"version":null,"meta":null}"#)
		.expect("decodes");

	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(registry.field(&inst, "raw"), Some(&Value::Null));
	assert_eq!(registry.field(&inst, "version"), Some(&Value::Null));
	assert_eq!(registry.field_presence(&inst), ["version", "meta", "raw"]);
}

#[test]
fn hook_failures_name_the_outer_field() {
	let registry = registry(Arc::new(AtomicUsize::new(0)));
	let package = registry.record("Package").expect("registered");

	let err = registry.decode_new(package, br#"{"version":"1.x"}"#).expect_err("bad version fails");
	assert_eq!(err.field(), Some("version"));

	let err = registry.decode_new(package, br#"{"meta":{"owner":5}}"#).expect_err("bad nested record fails");
	assert_eq!(err.field(), Some("meta"));
}

#[test]
fn hook_zero_values_seed_new_instances() {
	let registry = registry(Arc::new(AtomicUsize::new(0)));
	let inst = registry.new_instance(registry.record("Package").expect("registered"));
	assert_eq!(registry.field(&inst, "raw"), Some(&Value::Bytes(Vec::new())));
	assert_eq!(registry.field(&inst, "version"), Some(&Value::Null));
}

#[test]
fn textual_hooks_are_quoted_by_partial_updates() {
	let registry = registry(Arc::new(AtomicUsize::new(0)));
	let mut inst = registry.new_instance(registry.record("Package").expect("registered"));
	registry
		.apply_partial_update(&mut inst, [("version", "3.1"), ("after", "-7")])
		.expect("update applies");
	assert_eq!(registry.field(&inst, "version"), Some(&versions(&[3, 1])));
	assert_eq!(registry.field(&inst, "after"), Some(&Value::I64(-7)));
}

#[test]
fn registries_are_shared_across_threads() {
	let registry = Arc::new(registry(Arc::new(AtomicUsize::new(0))));
	let package = registry.record("Package").expect("registered");

	let handles: Vec<_> = (0..4)
		.map(|worker| {
			let registry = Arc::clone(&registry);
			std::thread::spawn(move || {
				let input = format!(r#"{{"version":"{worker}.0","after":{worker}}}"#);
				let inst = registry.decode_new(package, input.as_bytes()).expect("decodes");
				registry.field(&inst, "after").cloned()
			})
		})
		.collect();

	for (worker, handle) in handles.into_iter().enumerate() {
		let after = handle.join().expect("worker finishes");
		assert_eq!(after, Some(Value::I64(worker as i64)));
	}
}
