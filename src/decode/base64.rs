//! Standard base64 alphabet with `=` padding.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Why a base64 payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Base64Error {
	/// Length is not a multiple of four.
	Length(usize),
	/// Byte outside the alphabet at this offset.
	Byte(usize),
	/// Padding in the wrong place, or non-zero bits before it.
	Padding,
}

impl std::fmt::Display for Base64Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Base64Error::Length(len) => write!(f, "base64 length {len} is not a multiple of 4"),
			Base64Error::Byte(at) => write!(f, "illegal base64 data at input byte {at}"),
			Base64Error::Padding => f.write_str("malformed base64 padding"),
		}
	}
}

/// Decode padded standard base64.
pub(crate) fn decode(input: &[u8]) -> Result<Vec<u8>, Base64Error> {
	if input.len() % 4 != 0 {
		return Err(Base64Error::Length(input.len()));
	}

	let mut out = Vec::with_capacity(input.len() / 4 * 3);
	let chunks = input.len() / 4;
	for (chunk_idx, chunk) in input.chunks_exact(4).enumerate() {
		let last = chunk_idx + 1 == chunks;
		let pad = chunk.iter().rev().take_while(|byte| **byte == b'=').count();
		if pad > 2 || (pad > 0 && !last) {
			return Err(Base64Error::Padding);
		}

		let mut acc = 0_u32;
		for (idx, byte) in chunk[..4 - pad].iter().enumerate() {
			let value = sextet(*byte).ok_or(Base64Error::Byte(chunk_idx * 4 + idx))?;
			acc |= u32::from(value) << (18 - 6 * idx);
		}

		let bytes = acc.to_be_bytes();
		match pad {
			0 => out.extend_from_slice(&bytes[1..4]),
			1 => {
				if bytes[3] != 0 {
					return Err(Base64Error::Padding);
				}
				out.extend_from_slice(&bytes[1..3]);
			}
			_ => {
				if bytes[2] != 0 || bytes[3] != 0 {
					return Err(Base64Error::Padding);
				}
				out.push(bytes[1]);
			}
		}
	}

	Ok(out)
}

/// Encode as padded standard base64.
pub(crate) fn encode(input: &[u8]) -> String {
	let mut out = String::with_capacity(input.len().div_ceil(3) * 4);
	for chunk in input.chunks(3) {
		let mut buf = [0_u8; 3];
		buf[..chunk.len()].copy_from_slice(chunk);
		let acc = (u32::from(buf[0]) << 16) | (u32::from(buf[1]) << 8) | u32::from(buf[2]);
		for idx in 0..4 {
			if idx <= chunk.len() {
				let sextet = (acc >> (18 - 6 * idx)) & 0x3f;
				out.push(char::from(ALPHABET[sextet as usize]));
			} else {
				out.push('=');
			}
		}
	}
	out
}

fn sextet(byte: u8) -> Option<u8> {
	match byte {
		b'A'..=b'Z' => Some(byte - b'A'),
		b'a'..=b'z' => Some(byte - b'a' + 26),
		b'0'..=b'9' => Some(byte - b'0' + 52),
		b'+' => Some(62),
		b'/' => Some(63),
		_ => None,
	}
}
