use serde_json::json;

use crate::decode::test_support::node_registry;
use crate::decode::{DecodeOptions, FieldSpec, RecordSpec, Registry, TypeSpec, Value};

fn wide_registry() -> Registry {
	let parse = |text: &str| TypeSpec::parse(text).expect("declarator parses");
	Registry::builder()
		.record(RecordSpec::new("Leaf").field(FieldSpec::new("n", parse("i8"))))
		.record(
			RecordSpec::new("Wide")
				.field(FieldSpec::new("id", parse("u64")).wire("ID").quoted())
				.field(FieldSpec::new("ratio", parse("f32")))
				.field(FieldSpec::new("title", parse("string")).quoted())
				.field(FieldSpec::new("blob", parse("bytes")))
				.field(FieldSpec::new("grid", parse("[2][2]i16")))
				.field(FieldSpec::new("index", parse("map[i32]*Leaf")))
				.field(FieldSpec::new("extra", parse("any")))
				.field(FieldSpec::new("raw", parse("raw")))
				.field(FieldSpec::new("maybe", parse("[]bool"))),
		)
		.build()
		.expect("registry builds")
}

#[test]
fn encode_honours_wire_names_and_quoting() {
	let registry = wide_registry();
	let wide = registry.record("Wide").expect("registered");
	let inst = registry
		.decode_new(
			wide,
			br#"{"ID":"9","ratio":0.25,"title":"\"t\"","blob":"AAE=","grid":[[1,2],[3]],"index":{"-4":{"n":1},"5":null},"extra":[1,"x"],"raw":{"k":[1]},"maybe":null}"#,
		)
		.expect("decodes");

	let encoded = registry.encode(&inst);
	assert_eq!(
		encoded,
		json!({
			"ID": "9",
			"ratio": 0.25,
			"title": "\"t\"",
			"blob": "AAE=",
			"grid": [[1, 2], [3, 0]],
			"index": {"-4": {"n": 1}, "5": null},
			"extra": [1, "x"],
			"raw": {"k": [1]},
			"maybe": null
		})
	);

	let text = registry.encode_to_string(&inst).expect("encodes");
	let again = registry.decode_new(wide, text.as_bytes()).expect("re-decodes");
	assert_eq!(again.fields, inst.fields);
}

#[test]
fn absent_and_empty_lists_encode_differently() {
	let registry = node_registry(DecodeOptions::default());
	let node = registry.record("Node").expect("registered");
	let absent = registry.decode_new(node, br#"{"tags":null}"#).expect("decodes");
	let empty = registry.decode_new(node, br#"{"tags":[]}"#).expect("decodes");

	assert_eq!(registry.encode(&absent)["tags"], json!(null));
	assert_eq!(registry.encode(&empty)["tags"], json!([]));
	assert_eq!(registry.field(&empty, "tags"), Some(&Value::List(Vec::new())));
}
