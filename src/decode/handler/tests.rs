use crate::decode::test_support::holder_registry;
use crate::decode::{DecodeError, DecodeOptions, Registry, Result, Value};

fn decode_held(registry: &Registry, input: &str) -> Result<Value> {
	let id = registry.record("Holder").expect("holder registered");
	let inst = registry.decode_new(id, input.as_bytes())?;
	Ok(inst.fields[0].clone())
}

fn held(ty: &str, input: &str) -> Result<Value> {
	decode_held(&holder_registry(ty, false, DecodeOptions::default()), input)
}

fn quoted_held(ty: &str, input: &str) -> Result<Value> {
	decode_held(&holder_registry(ty, true, DecodeOptions::default()), input)
}

fn assert_format_error(result: Result<Value>) {
	match result {
		Err(DecodeError::FieldFormat { field, .. }) => assert_eq!(field.as_ref(), "v"),
		other => panic!("expected format error on v, got {other:?}"),
	}
}

mod numeric {
	use super::{assert_format_error, held, quoted_held};
	use crate::decode::Value;

	#[test]
	fn integers_respect_bit_width() {
		assert_eq!(held("i8", r#"{"v":-128}"#).expect("fits"), Value::I64(-128));
		assert_format_error(held("i8", r#"{"v":128}"#));
		assert_eq!(held("u16", r#"{"v":65535}"#).expect("fits"), Value::U64(65535));
		assert_format_error(held("u16", r#"{"v":65536}"#));
		assert_format_error(held("u32", r#"{"v":-1}"#));
		assert_eq!(held("u64", r#"{"v":18446744073709551615}"#).expect("fits"), Value::U64(u64::MAX));
		assert_format_error(held("i64", r#"{"v":9223372036854775808}"#));
	}

	#[test]
	fn fractional_text_is_not_an_integer() {
		assert_format_error(held("i32", r#"{"v":1.5}"#));
		assert_format_error(held("i32", r#"{"v":1e3}"#));
	}

	#[test]
	fn floats_reject_overflow() {
		assert_eq!(held("f64", r#"{"v":-2.5e3}"#).expect("parses"), Value::F64(-2500.0));
		assert_eq!(held("f32", r#"{"v":0.5}"#).expect("parses"), Value::F32(0.5));
		assert_format_error(held("f32", r#"{"v":1e39}"#));
		assert_format_error(held("f64", r#"{"v":1e309}"#));
	}

	#[test]
	fn quoted_numbers_come_from_strings() {
		assert_eq!(quoted_held("u8", r#"{"v":"200"}"#).expect("parses"), Value::U64(200));
		assert_eq!(quoted_held("u8", r#"{"v":200}"#).expect("bare number still decodes"), Value::U64(200));
		assert_format_error(quoted_held("u8", r#"{"v":"2x"}"#));
		assert_format_error(held("u8", r#"{"v":"200"}"#));
	}
}

mod scalars {
	use super::{assert_format_error, held, quoted_held};
	use crate::decode::test_support::{ScriptedStream, holder_registry};
	use crate::decode::{DecodeError, DecodeOptions, Token, Value};

	#[test]
	fn strings_are_unescaped() {
		assert_eq!(held("string", r#"{"v":"a\"bé"}"#).expect("decodes"), Value::String("a\"b\u{e9}".into()));
		assert_format_error(held("string", r#"{"v":5}"#));
	}

	#[test]
	fn quoted_strings_strip_one_layer() {
		assert_eq!(quoted_held("string", r#"{"v":"\"inner\""}"#).expect("decodes"), Value::String("inner".into()));
		assert_format_error(quoted_held("string", r#"{"v":"inner"}"#));
	}

	#[test]
	fn booleans_accept_only_canonical_literals() {
		assert_eq!(held("bool", r#"{"v":false}"#).expect("decodes"), Value::Bool(false));
		assert_eq!(quoted_held("bool", r#"{"v":"true"}"#).expect("decodes"), Value::Bool(true));
		assert_format_error(quoted_held("bool", r#"{"v":"tru"}"#));
		assert_format_error(held("bool", r#"{"v":"true"}"#));
		assert_format_error(held("bool", r#"{"v":1}"#));
	}

	#[test]
	fn malformed_boolean_bytes_from_the_stream_are_format_errors() {
		let registry = holder_registry("bool", false, DecodeOptions::default());
		let mut inst = registry.new_instance(registry.record("Holder").expect("registered"));
		let mut stream = ScriptedStream::new(vec![
			(Token::ObjectOpen, b"{"),
			(Token::String, b"v"),
			(Token::Colon, b":"),
			(Token::Bool, b"tru"),
			(Token::ObjectClose, b"}"),
		]);
		let err = registry.decode(&mut inst, &mut stream).expect_err("bad literal fails");
		assert!(matches!(err, DecodeError::FieldFormat { ref field, .. } if &**field == "v"));
	}

	#[test]
	fn null_scalars_follow_policy() {
		assert_format_error(held("i32", r#"{"v":null}"#));
		assert_format_error(held("string", r#"{"v":null}"#));
		assert_format_error(held("Inner", r#"{"v":null}"#));

		let registry = holder_registry("i32", false, DecodeOptions::lenient());
		let holder_id = registry.record("Holder").expect("registered");
		let mut inst = registry.decode_new(holder_id, br#"{"v":4}"#).expect("decodes");
		registry.decode_slice(&mut inst, br#"{"v":null}"#).expect("null ignored");
		assert_eq!(inst.fields[0], Value::I64(4));
		assert!(inst.presence.is_empty());
	}
}

mod sequences {
	use super::{assert_format_error, held};
	use crate::decode::Value;

	fn ints(values: &[i64]) -> Vec<Value> {
		values.iter().map(|value| Value::I64(*value)).collect()
	}

	#[test]
	fn fixed_arrays_drop_excess_and_zero_missing() {
		assert_eq!(held("[3]i32", r#"{"v":[1,2,3,4,5]}"#).expect("decodes"), Value::Array(ints(&[1, 2, 3])));
		assert_eq!(held("[3]i32", r#"{"v":[7]}"#).expect("decodes"), Value::Array(ints(&[7, 0, 0])));
		assert_eq!(held("[2]i32", r#"{"v":null}"#).expect("decodes"), Value::Array(ints(&[0, 0])));
		assert_eq!(held("[0]i32", r#"{"v":[1]}"#).expect("decodes"), Value::Array(Vec::new()));
	}

	#[test]
	fn excess_elements_are_still_validated() {
		assert_format_error(held("[1]i32", r#"{"v":[1,"x"]}"#));
	}

	#[test]
	fn lists_keep_null_distinct_from_empty() {
		assert_eq!(held("[]i32", r#"{"v":null}"#).expect("decodes"), Value::Null);
		assert_eq!(held("[]i32", r#"{"v":[]}"#).expect("decodes"), Value::List(Vec::new()));
		assert_eq!(held("[][]i32", r#"{"v":[[1],[],null]}"#).expect("decodes"), Value::List(vec![Value::List(ints(&[1])), Value::List(Vec::new()), Value::Null]));
	}

	#[test]
	fn stray_commas_are_format_errors() {
		for input in [r#"{"v":[,1]}"#, r#"{"v":[1,,2]}"#, r#"{"v":[1,]}"#, r#"{"v":[1 2]}"#] {
			assert_format_error(held("[]i32", input));
			assert_format_error(held("[2]i32", input));
		}
	}

	#[test]
	fn lists_require_arrays() {
		assert_format_error(held("[]i32", r#"{"v":{}}"#));
		assert_format_error(held("[]i32", r#"{"v":"1,2"}"#));
	}
}

mod maps {
	use super::{assert_format_error, held};
	use crate::decode::Value;

	#[test]
	fn keys_parse_per_key_shape() {
		let value = held("map[u8]string", r#"{"v":{"1":"a","20":"b"}}"#).expect("decodes");
		assert_eq!(value.map_get(&Value::U64(20)), Some(&Value::String("b".into())));

		let value = held("map[*bool]i32", r#"{"v":{"true":1}}"#).expect("decodes");
		assert_eq!(value.map_get(&Value::Ptr(Box::new(Value::Bool(true)))), Some(&Value::I64(1)));

		assert_format_error(held("map[u8]string", r#"{"v":{"300":"a"}}"#));
	}

	#[test]
	fn later_duplicate_keys_win() {
		let value = held("map[string]i32", r#"{"v":{"a":1,"b":2,"a":3}}"#).expect("decodes");
		assert_eq!(
			value,
			Value::Map(vec![(Value::String("a".into()), Value::I64(3)), (Value::String("b".into()), Value::I64(2))])
		);
	}

	#[test]
	fn equal_parsed_keys_collapse() {
		let value = held("map[i32]string", r#"{"v":{"1":"a","2":"b","01":"c"}}"#).expect("decodes");
		assert_eq!(
			value,
			Value::Map(vec![(Value::I64(1), Value::String("c".into())), (Value::I64(2), Value::String("b".into()))])
		);
	}

	#[test]
	fn large_maps_keep_first_position_and_last_value() {
		const KEYS: usize = 40_000;
		let mut body: Vec<String> = (0..KEYS).map(|idx| format!(r#""k{idx}":{idx}"#)).collect();
		body.push(r#""k0":-1"#.to_owned());
		body.push(r#""k17":-17"#.to_owned());
		let input = format!(r#"{{"v":{{{}}}}}"#, body.join(","));

		let Value::Map(entries) = held("map[string]i64", &input).expect("decodes") else {
			panic!("expected a map value");
		};
		assert_eq!(entries.len(), KEYS);
		assert_eq!(entries[0], (Value::String("k0".into()), Value::I64(-1)));
		assert_eq!(entries[17], (Value::String("k17".into()), Value::I64(-17)));
		assert_eq!(entries[KEYS - 1], (Value::String(format!("k{}", KEYS - 1).into()), Value::I64(KEYS as i64 - 1)));
	}

	#[test]
	fn null_and_malformed_maps() {
		assert_eq!(held("map[string]i32", r#"{"v":null}"#).expect("decodes"), Value::Null);
		assert_eq!(held("map[string]i32", r#"{"v":{}}"#).expect("decodes"), Value::Map(Vec::new()));
		assert_format_error(held("map[string]i32", r#"{"v":{"a" 1}}"#));
		assert_format_error(held("map[string]i32", r#"{"v":{"a":1,}}"#));
		assert_format_error(held("map[string]i32", r#"{"v":{"a":}}"#));
	}

	#[test]
	fn map_values_may_be_records() {
		let value = held("map[string]Inner", r#"{"v":{"x":{"n":5}}}"#).expect("decodes");
		let inner = value.map_get(&Value::String("x".into())).and_then(Value::as_record).expect("record value");
		assert_eq!(inner.fields[0], Value::I64(5));
	}
}

mod indirection {
	use super::{assert_format_error, decode_held, held};
	use crate::decode::test_support::holder_registry;
	use crate::decode::{DecodeOptions, Value};

	#[test]
	fn byte_lists_are_base64() {
		assert_eq!(held("[]u8", r#"{"v":"aGk="}"#).expect("decodes"), Value::Bytes(b"hi".to_vec()));
		assert_eq!(held("bytes", r#"{"v":null}"#).expect("decodes"), Value::Null);
		assert_format_error(held("[]u8", r#"{"v":"aGk"}"#));
		assert_format_error(held("[]u8", r#"{"v":"a$k="}"#));
		assert_format_error(held("[]u8", r#"{"v":[104,105]}"#));
	}

	#[test]
	fn pointers_allocate_once_and_write_through() {
		assert_eq!(held("*i32", r#"{"v":null}"#).expect("decodes"), Value::Null);
		assert_eq!(held("*i32", r#"{"v":3}"#).expect("decodes"), Value::Ptr(Box::new(Value::I64(3))));
		assert_eq!(held("**string", r#"{"v":"s"}"#).expect("decodes"), Value::Ptr(Box::new(Value::Ptr(Box::new(Value::String("s".into()))))));
		assert_format_error(held("*i32", r#"{"v":"x"}"#));
	}

	#[test]
	fn nested_records_reuse_the_existing_instance() {
		let registry = holder_registry("*Inner", false, DecodeOptions::default());
		let holder_id = registry.record("Holder").expect("registered");
		let mut inst = registry.decode_new(holder_id, br#"{"v":{"n":1}}"#).expect("decodes");
		registry.decode_slice(&mut inst, br#"{"v":{}}"#).expect("decodes");

		let inner = inst.fields[0].as_record().expect("pointer still allocated");
		assert_eq!(inner.fields[0], Value::I64(1));
		assert!(inner.presence.is_empty());
	}

	#[test]
	fn nested_record_errors_name_the_outer_field() {
		let err = decode_held(&holder_registry("Inner", false, DecodeOptions::default()), r#"{"v":{"n":"bad"}}"#).expect_err("nested failure");
		assert_eq!(err.field(), Some("v"));
		assert!(err.to_string().contains("\"n\""), "inner field is kept in the detail: {err}");
	}

	#[test]
	fn fallback_captures_any_value() {
		let value = held("any", r#"{"v":{"a":[1,true,null]}}"#).expect("decodes");
		assert_eq!(value, Value::Json(serde_json::json!({"a": [1, true, null]})));
		assert_eq!(held("complex128", r#"{"v":null}"#).expect("decodes"), Value::Json(serde_json::Value::Null));
	}
}
