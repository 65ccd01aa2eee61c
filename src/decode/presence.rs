const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-size set of field indices, sized when the schema is built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSet {
	words: Vec<u64>,
	len: usize,
}

impl FieldSet {
	/// Empty set able to hold indices `0..len`.
	pub fn new(len: usize) -> Self {
		Self {
			words: vec![0; len.div_ceil(WORD_BITS)],
			len,
		}
	}

	/// Capacity in fields.
	pub fn capacity(&self) -> usize {
		self.len
	}

	/// Number of marked fields.
	pub fn count(&self) -> usize {
		self.words.iter().map(|word| word.count_ones() as usize).sum()
	}

	/// Whether no field is marked.
	pub fn is_empty(&self) -> bool {
		self.words.iter().all(|word| *word == 0)
	}

	/// Unmark every field.
	pub fn clear(&mut self) {
		self.words.fill(0);
	}

	/// Mark field `idx`. Out-of-range indices are ignored.
	pub fn insert(&mut self, idx: usize) {
		if idx < self.len {
			self.words[idx / WORD_BITS] |= 1_u64 << (idx % WORD_BITS);
		}
	}

	/// Unmark field `idx`.
	pub fn remove(&mut self, idx: usize) {
		if idx < self.len {
			self.words[idx / WORD_BITS] &= !(1_u64 << (idx % WORD_BITS));
		}
	}

	/// Whether field `idx` is marked.
	pub fn contains(&self, idx: usize) -> bool {
		idx < self.len && self.words[idx / WORD_BITS] & (1_u64 << (idx % WORD_BITS)) != 0
	}

	/// Marked indices in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
		(0..self.len).filter(|idx| self.contains(*idx))
	}
}
