//! Primitive field and vector codecs.
//!
//! Every integer on the wire is big-endian and unsigned. The odd widths are
//! split pairs, high part first: a 24-bit value is `(u8, u16)` and a 48-bit
//! value is `(u16, u32)`.
//!
//! Length-prefixed vectors come in two shapes:
//!
//! ```text
//! opaque blob<0..2^L-1>;          // read_opaque* / put_opaque*
//! Item   list<0..2^L-1>;          // read_list* / put_list*, L counts bytes
//! ```
//!
//! The vector header always counts bytes, never items.

use rand::Rng;

use crate::error::{CodecError, Result};

/// A value with a wire representation.
///
/// `read` either consumes one complete unit and returns the remaining input,
/// or fails with `NotEnoughData` without consuming anything, so the caller
/// can retry once more bytes arrive. `write` appends the wire form to `out`
/// and fails only on encoder-side errors such as a body that does not fit
/// its length header.
pub trait Codec: Sized {
    fn write(&self, out: &mut Vec<u8>) -> Result<()>;

    fn read(data: &[u8]) -> Result<(Self, &[u8])>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

/// Split `n` bytes off the front of `data`.
pub fn take<'a>(data: &'a [u8], n: usize, field: &'static str) -> Result<(&'a [u8], &'a [u8])> {
    if data.len() < n {
        return Err(CodecError::NotEnoughData(field));
    }
    Ok(data.split_at(n))
}

/// Fail with `MalformedVector` when an inner grammar left bytes behind.
pub fn expect_empty(rest: &[u8], field: &'static str) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CodecError::MalformedVector {
            field,
            reason: "trailing bytes after payload",
        })
    }
}

// Fixed width integers

pub fn read_u8<'a>(data: &'a [u8], field: &'static str) -> Result<(u8, &'a [u8])> {
    let (head, rest) = take(data, 1, field)?;
    Ok((head[0], rest))
}

pub fn read_u16<'a>(data: &'a [u8], field: &'static str) -> Result<(u16, &'a [u8])> {
    let (head, rest) = take(data, 2, field)?;
    Ok((u16::from_be_bytes([head[0], head[1]]), rest))
}

pub fn read_u24<'a>(data: &'a [u8], field: &'static str) -> Result<(u32, &'a [u8])> {
    let (head, rest) = take(data, 3, field)?;
    let high = head[0] as u32;
    let low = u16::from_be_bytes([head[1], head[2]]) as u32;
    Ok(((high << 16) | low, rest))
}

pub fn read_u48<'a>(data: &'a [u8], field: &'static str) -> Result<(u64, &'a [u8])> {
    let (head, rest) = take(data, 6, field)?;
    let high = u16::from_be_bytes([head[0], head[1]]) as u64;
    let low = u32::from_be_bytes([head[2], head[3], head[4], head[5]]) as u64;
    Ok(((high << 32) | low, rest))
}

pub fn put_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

pub fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn put_u24(out: &mut Vec<u8>, value: u32, field: &'static str) -> Result<()> {
    if value > 0x00ff_ffff {
        return Err(CodecError::OverflowingLengthField {
            field,
            value: value as u64,
            width: 24,
        });
    }
    out.push((value >> 16) as u8);
    out.extend_from_slice(&((value & 0xffff) as u16).to_be_bytes());
    Ok(())
}

pub fn put_u48(out: &mut Vec<u8>, value: u64, field: &'static str) -> Result<()> {
    if value > 0x0000_ffff_ffff_ffff {
        return Err(CodecError::OverflowingLengthField {
            field,
            value,
            width: 48,
        });
    }
    out.extend_from_slice(&((value >> 32) as u16).to_be_bytes());
    out.extend_from_slice(&((value & 0xffff_ffff) as u32).to_be_bytes());
    Ok(())
}

impl Codec for u8 {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(*self);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        read_u8(data, "u8")
    }
}

impl Codec for u16 {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        put_u16(out, *self);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        read_u16(data, "u16")
    }
}

// Opaque length-prefixed blobs

pub fn read_opaque8<'a>(data: &'a [u8], field: &'static str) -> Result<(Vec<u8>, &'a [u8])> {
    let (len, rest) = read_u8(data, field)?;
    let (body, rest) = take(rest, len as usize, field)?;
    Ok((body.to_vec(), rest))
}

pub fn read_opaque16<'a>(data: &'a [u8], field: &'static str) -> Result<(Vec<u8>, &'a [u8])> {
    let (len, rest) = read_u16(data, field)?;
    let (body, rest) = take(rest, len as usize, field)?;
    Ok((body.to_vec(), rest))
}

pub fn read_opaque24<'a>(data: &'a [u8], field: &'static str) -> Result<(Vec<u8>, &'a [u8])> {
    let (len, rest) = read_u24(data, field)?;
    let (body, rest) = take(rest, len as usize, field)?;
    Ok((body.to_vec(), rest))
}

pub fn put_opaque8(out: &mut Vec<u8>, body: &[u8], field: &'static str) -> Result<()> {
    if body.len() > u8::MAX as usize {
        return Err(CodecError::OverflowingLengthField {
            field,
            value: body.len() as u64,
            width: 8,
        });
    }
    out.push(body.len() as u8);
    out.extend_from_slice(body);
    Ok(())
}

pub fn put_opaque16(out: &mut Vec<u8>, body: &[u8], field: &'static str) -> Result<()> {
    if body.len() > u16::MAX as usize {
        return Err(CodecError::OverflowingLengthField {
            field,
            value: body.len() as u64,
            width: 16,
        });
    }
    put_u16(out, body.len() as u16);
    out.extend_from_slice(body);
    Ok(())
}

pub fn put_opaque24(out: &mut Vec<u8>, body: &[u8], field: &'static str) -> Result<()> {
    put_u24(out, body.len() as u32, field)?;
    out.extend_from_slice(body);
    Ok(())
}

// Length-prefixed item lists

fn read_list_body<T: Codec>(slab: &[u8], field: &'static str) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rest = slab;
    while !rest.is_empty() {
        match T::read(rest) {
            Ok((item, remaining)) => {
                items.push(item);
                rest = remaining;
            }
            // A partial item inside a complete slab cannot be fixed by
            // more input.
            Err(CodecError::NotEnoughData(_)) => {
                return Err(CodecError::MalformedVector {
                    field,
                    reason: "trailing partial item",
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(items)
}

fn encode_items<T: Codec>(items: &[T]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    for item in items {
        item.write(&mut body)?;
    }
    Ok(body)
}

pub fn read_list8<'a, T: Codec>(
    data: &'a [u8],
    field: &'static str,
) -> Result<(Vec<T>, &'a [u8])> {
    let (len, rest) = read_u8(data, field)?;
    let (slab, rest) = take(rest, len as usize, field)?;
    Ok((read_list_body(slab, field)?, rest))
}

pub fn read_list16<'a, T: Codec>(
    data: &'a [u8],
    field: &'static str,
) -> Result<(Vec<T>, &'a [u8])> {
    let (len, rest) = read_u16(data, field)?;
    let (slab, rest) = take(rest, len as usize, field)?;
    Ok((read_list_body(slab, field)?, rest))
}

pub fn read_list24<'a, T: Codec>(
    data: &'a [u8],
    field: &'static str,
) -> Result<(Vec<T>, &'a [u8])> {
    let (len, rest) = read_u24(data, field)?;
    let (slab, rest) = take(rest, len as usize, field)?;
    Ok((read_list_body(slab, field)?, rest))
}

pub fn put_list8<T: Codec>(out: &mut Vec<u8>, items: &[T], field: &'static str) -> Result<()> {
    let body = encode_items(items)?;
    put_opaque8(out, &body, field)
}

pub fn put_list16<T: Codec>(out: &mut Vec<u8>, items: &[T], field: &'static str) -> Result<()> {
    let body = encode_items(items)?;
    put_opaque16(out, &body, field)
}

pub fn put_list24<T: Codec>(out: &mut Vec<u8>, items: &[T], field: &'static str) -> Result<()> {
    let body = encode_items(items)?;
    put_opaque24(out, &body, field)
}

/// Fresh random bytes for cookies, challenges and session ids.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes
}

/// The 32-byte random structure carried by ClientHello and ServerHello.
/// Fixed width, no length prefix.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Random(pub [u8; 32]);

impl Random {
    /// Fresh random bytes for an outgoing hello.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes[..]);
        Random(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Random {
    fn default() -> Self {
        Random([0u8; 32])
    }
}

impl Codec for Random {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.0);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (head, rest) = take(data, 32, "random")?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(head);
        Ok((Random(bytes), rest))
    }
}
