use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::trace;

use crate::decode::machine::DecodeCtx;
use crate::decode::shape::key_text;
use crate::decode::{DecodeError, Hook, Kind, NullPolicy, NumKind, ParseState, RecordId, RecordValue, Result, Token, TypeDesc, Value, base64};

/// Whether a handler wrote the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assign {
	/// Slot written; the field counts as present.
	Set,
	/// `null` ignored by policy; slot untouched.
	Skipped,
}

/// Decode the value started by `tok` into `slot` according to `desc`.
///
/// `field` is the wire-name used in error messages.
pub(crate) fn decode_value(ctx: &mut DecodeCtx<'_, '_>, desc: &TypeDesc, field: &str, tok: Token, slot: &mut Value) -> Result<Assign> {
	if tok == Token::Null {
		return decode_null(ctx, desc, field, slot);
	}

	match &desc.kind {
		Kind::Numeric(kind) => {
			expect(ctx, desc, field, tok, tok == Token::Number || (desc.quoted && tok == Token::String))?;
			*slot = parse_numeric(*kind, ctx.stream.value_bytes()).map_err(|detail| DecodeError::format(field, detail))?;
		}
		Kind::String => {
			expect(ctx, desc, field, tok, tok == Token::String)?;
			let bytes = ctx.stream.value_bytes();
			let text = if desc.quoted {
				serde_json::from_slice::<String>(bytes).map_err(|err| DecodeError::format(field, format!("invalid quoted string: {err}")))?
			} else {
				std::str::from_utf8(bytes).map_err(|err| DecodeError::format(field, err.to_string()))?.to_owned()
			};
			*slot = Value::String(text.into());
		}
		Kind::Bool => {
			expect(ctx, desc, field, tok, tok == Token::Bool || (desc.quoted && tok == Token::String))?;
			*slot = Value::Bool(parse_bool(ctx.stream.value_bytes()).map_err(|detail| DecodeError::format(field, detail))?);
		}
		Kind::FixedArray { element, length } => {
			expect(ctx, desc, field, tok, tok == Token::ArrayOpen)?;
			let mut items: Vec<Value> = (0..*length).map(|_| ctx.registry.zero_value(element)).collect();
			let mut idx = 0;
			for_each_element(ctx, field, |ctx, tok| {
				if let Some(item) = items.get_mut(idx) {
					decode_value(ctx, element, field, tok, item)?;
				} else {
					let mut excess = ctx.registry.zero_value(element);
					decode_value(ctx, element, field, tok, &mut excess)?;
				}
				idx += 1;
				Ok(())
			})?;
			if idx > *length {
				trace!(field, length, elements = idx, "dropped excess array elements");
			}
			*slot = Value::Array(items);
		}
		Kind::List(element) => {
			expect(ctx, desc, field, tok, tok == Token::ArrayOpen)?;
			let mut items = Vec::new();
			for_each_element(ctx, field, |ctx, tok| {
				let mut item = ctx.registry.zero_value(element);
				decode_value(ctx, element, field, tok, &mut item)?;
				items.push(item);
				Ok(())
			})?;
			*slot = Value::List(items);
		}
		Kind::Map { key, value } => {
			expect(ctx, desc, field, tok, tok == Token::ObjectOpen)?;
			*slot = Value::Map(decode_map(ctx, key, value, field)?);
		}
		Kind::ByteList => {
			expect(ctx, desc, field, tok, tok == Token::String)?;
			let bytes = base64::decode(ctx.stream.value_bytes()).map_err(|err| DecodeError::format(field, err.to_string()))?;
			*slot = Value::Bytes(bytes);
		}
		Kind::Pointer(inner) => {
			if !matches!(slot, Value::Ptr(_)) {
				*slot = Value::Ptr(Box::new(ctx.registry.zero_value(inner)));
			}
			if let Value::Ptr(target) = slot {
				return decode_value(ctx, inner, field, tok, target);
			}
		}
		Kind::Record(id) => {
			expect(ctx, desc, field, tok, tok == Token::ObjectOpen)?;
			let inst = record_slot(ctx, *id, slot);
			ctx.decode_record(inst, ParseState::WantKey).map_err(|err| err.nested(field))?;
		}
		Kind::SelfDecoding(hook) => {
			trace!(field, hook = hook.name(), "delegating to hook");
			match hook {
				Hook::Stream(decoder) => decoder.decode_stream(tok, ctx, slot).map_err(|err| err.nested(field))?,
				Hook::Bytes(decoder) => {
					let raw = ctx.stream.capture(tok)?;
					decoder.decode_bytes(raw, slot).map_err(|err| err.nested(field))?;
				}
			}
		}
		Kind::Fallback => {
			let raw = ctx.stream.capture(tok)?;
			let value = serde_json::from_slice(raw).map_err(|err| DecodeError::format(field, err.to_string()))?;
			*slot = Value::Json(value);
		}
	}
	Ok(Assign::Set)
}

fn decode_null(ctx: &DecodeCtx<'_, '_>, desc: &TypeDesc, field: &str, slot: &mut Value) -> Result<Assign> {
	match &desc.kind {
		Kind::Numeric(_) | Kind::String | Kind::Bool | Kind::Record(_) => {
			return match ctx.registry.options().null_scalars {
				NullPolicy::Reject => Err(DecodeError::format(field, format!("cannot decode null into {}", ctx.registry.describe(desc)))),
				NullPolicy::Ignore => Ok(Assign::Skipped),
			};
		}
		Kind::FixedArray { .. } => *slot = ctx.registry.zero_value(desc),
		Kind::Fallback => *slot = Value::Json(serde_json::Value::Null),
		Kind::List(_) | Kind::Map { .. } | Kind::ByteList | Kind::Pointer(_) | Kind::SelfDecoding(_) => *slot = Value::Null,
	}
	Ok(Assign::Set)
}

fn expect(ctx: &DecodeCtx<'_, '_>, desc: &TypeDesc, field: &str, tok: Token, legal: bool) -> Result<()> {
	if legal {
		return Ok(());
	}
	Err(DecodeError::format(field, format!("cannot decode {tok} into {}", ctx.registry.describe(desc))))
}

/// Existing nested instance of `id` in `slot`, replacing anything else.
fn record_slot<'v>(ctx: &DecodeCtx<'_, '_>, id: RecordId, slot: &'v mut Value) -> &'v mut RecordValue {
	if !matches!(slot, Value::Record(inst) if inst.record == id) {
		*slot = Value::Record(ctx.registry.new_instance(id));
	}
	match slot {
		Value::Record(inst) => inst,
		_ => unreachable!("slot was just replaced with a record"),
	}
}

/// Walk a bracketed, comma-separated sequence whose `[` was already consumed.
///
/// Leading, doubled and trailing commas are rejected.
fn for_each_element<'r, 's>(
	ctx: &mut DecodeCtx<'r, 's>,
	field: &str,
	mut element: impl FnMut(&mut DecodeCtx<'r, 's>, Token) -> Result<()>,
) -> Result<()> {
	let mut tok = ctx.next_token()?;
	if tok == Token::ArrayClose {
		return Ok(());
	}
	loop {
		if !tok.starts_value() {
			return Err(DecodeError::format(field, format!("expected array element, got {tok}")));
		}
		element(ctx, tok)?;
		match ctx.next_token()? {
			Token::Comma => tok = ctx.next_token()?,
			Token::ArrayClose => return Ok(()),
			other => return Err(DecodeError::format(field, format!("expected ',' or ']' in array, got {other}"))),
		}
	}
}

/// Read map entries after the consumed `{`. A repeated key replaces the earlier value.
fn decode_map(ctx: &mut DecodeCtx<'_, '_>, key: &TypeDesc, value: &TypeDesc, field: &str) -> Result<Vec<(Value, Value)>> {
	let mut entries: Vec<(Value, Value)> = Vec::new();
	let mut positions: HashMap<String, usize> = HashMap::new();
	let mut tok = ctx.next_token()?;
	if tok == Token::ObjectClose {
		return Ok(entries);
	}
	loop {
		if tok != Token::String {
			return Err(DecodeError::format(field, format!("expected map key, got {tok}")));
		}
		let entry_key = decode_key(key, ctx.stream.value_bytes()).map_err(|detail| DecodeError::format(field, detail))?;

		let colon = ctx.next_token()?;
		if colon != Token::Colon {
			return Err(DecodeError::format(field, format!("expected ':' after map key, got {colon}")));
		}
		let value_tok = ctx.next_token()?;
		if !value_tok.starts_value() {
			return Err(DecodeError::format(field, format!("expected map value, got {value_tok}")));
		}
		let mut entry_value = ctx.registry.zero_value(value);
		decode_value(ctx, value, field, value_tok, &mut entry_value)?;

		match positions.entry(key_text(&entry_key)) {
			Entry::Occupied(slot) => entries[*slot.get()].1 = entry_value,
			Entry::Vacant(slot) => {
				slot.insert(entries.len());
				entries.push((entry_key, entry_value));
			}
		}

		match ctx.next_token()? {
			Token::Comma => tok = ctx.next_token()?,
			Token::ObjectClose => return Ok(entries),
			other => return Err(DecodeError::format(field, format!("expected ',' or '}}' in map, got {other}"))),
		}
	}
}

/// Parse an object key (already unescaped) per the key descriptor.
fn decode_key(desc: &TypeDesc, bytes: &[u8]) -> std::result::Result<Value, String> {
	match &desc.kind {
		Kind::String => std::str::from_utf8(bytes).map(|text| Value::String(text.into())).map_err(|err| err.to_string()),
		Kind::Numeric(kind) => parse_numeric(*kind, bytes),
		Kind::Bool => parse_bool(bytes).map(Value::Bool),
		Kind::Pointer(inner) => decode_key(inner, bytes).map(|value| Value::Ptr(Box::new(value))),
		_ => Err("map key shape is not scalar".to_owned()),
	}
}

/// Parse number text with the declared bit width.
pub(crate) fn parse_numeric(kind: NumKind, bytes: &[u8]) -> std::result::Result<Value, String> {
	let text = std::str::from_utf8(bytes).map_err(|_| "number is not valid UTF-8".to_owned())?;
	let invalid = |err: &dyn std::fmt::Display| format!("invalid {} {text:?}: {err}", kind.name());
	let out_of_range = || format!("{text} is out of range for {}", kind.name());

	match kind {
		NumKind::I8 | NumKind::I16 | NumKind::I32 | NumKind::I64 => {
			let value = text.parse::<i64>().map_err(|err| invalid(&err))?;
			let bits = kind.bits();
			if bits < 64 {
				let max = (1_i64 << (bits - 1)) - 1;
				if value < -max - 1 || value > max {
					return Err(out_of_range());
				}
			}
			Ok(Value::I64(value))
		}
		NumKind::U8 | NumKind::U16 | NumKind::U32 | NumKind::U64 => {
			let value = text.parse::<u64>().map_err(|err| invalid(&err))?;
			let bits = kind.bits();
			if bits < 64 && value > (1_u64 << bits) - 1 {
				return Err(out_of_range());
			}
			Ok(Value::U64(value))
		}
		NumKind::F32 => {
			let value = text.parse::<f32>().map_err(|err| invalid(&err))?;
			if !value.is_finite() {
				return Err(out_of_range());
			}
			Ok(Value::F32(value))
		}
		NumKind::F64 => {
			let value = text.parse::<f64>().map_err(|err| invalid(&err))?;
			if !value.is_finite() {
				return Err(out_of_range());
			}
			Ok(Value::F64(value))
		}
	}
}

/// Accept exactly `true` or `false`.
pub(crate) fn parse_bool(bytes: &[u8]) -> std::result::Result<bool, String> {
	match bytes {
		b"true" => Ok(true),
		b"false" => Ok(false),
		other => Err(format!("invalid boolean {:?}", String::from_utf8_lossy(other))),
	}
}

#[cfg(test)]
mod tests;
