use std::collections::HashMap;

/// Outcome of resolving a wire key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
	/// Field at this declaration index.
	Field(usize),
	/// Key is not part of the record; its value must be skipped.
	NoSuchKey,
}

/// Maps wire keys to field indices.
///
/// Exact byte matches win; otherwise the first case-folded match in
/// declaration order; otherwise `NoSuchKey`.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
	exact: HashMap<Box<[u8]>, usize>,
	ordered: Vec<Box<[u8]>>,
}

impl FieldTable {
	/// Build from wire-names in declaration order.
	///
	/// Callers guarantee the names are unique.
	pub fn new<'a>(wire_names: impl IntoIterator<Item = &'a str>) -> Self {
		let mut table = Self::default();
		for (idx, name) in wire_names.into_iter().enumerate() {
			let key: Box<[u8]> = name.as_bytes().into();
			table.exact.insert(key.clone(), idx);
			table.ordered.push(key);
		}
		table
	}

	/// Resolve `key` to a field.
	pub fn resolve(&self, key: &[u8]) -> Resolved {
		if key.is_empty() {
			return Resolved::NoSuchKey;
		}
		if let Some(idx) = self.exact.get(key) {
			return Resolved::Field(*idx);
		}
		self.ordered
			.iter()
			.position(|candidate| fold_eq(candidate, key))
			.map_or(Resolved::NoSuchKey, Resolved::Field)
	}
}

/// Case-insensitive comparison using simple case folding.
///
/// Pure ASCII inputs take a byte-wise path; anything else is compared per
/// `char` after folding.
pub(crate) fn fold_eq(left: &[u8], right: &[u8]) -> bool {
	if left.is_ascii() && right.is_ascii() {
		return left.eq_ignore_ascii_case(right);
	}

	let (Ok(left), Ok(right)) = (std::str::from_utf8(left), std::str::from_utf8(right)) else {
		return false;
	};
	let mut left = left.chars().map(fold_char);
	let mut right = right.chars().map(fold_char);
	loop {
		match (left.next(), right.next()) {
			(None, None) => return true,
			(Some(a), Some(b)) if a == b => {}
			_ => return false,
		}
	}
}

fn fold_char(ch: char) -> char {
	match ch {
		// Kelvin sign and long s fold into ASCII letters.
		'\u{212a}' => 'k',
		'\u{17f}' => 's',
		_ => {
			let mut lower = ch.to_lowercase();
			match (lower.next(), lower.next()) {
				(Some(single), None) => single,
				_ => ch,
			}
		}
	}
}
