use byteorder::{ByteOrder, LittleEndian};

use crate::error::SampQueryError;

/// Get `count` bytes starting at index `offset` in `data`.
///
/// Mutates `offset` to the index after the bytes.
///
/// Fails with [SampQueryError::MalformedPacket] instead of reading past
/// the end of `data`; `offset` is left where the failed read started.
pub fn get_bytes<'a>(
    data: &'a [u8],
    offset: &mut usize,
    count: usize,
) -> Result<&'a [u8], SampQueryError> {
    if data.len() < *offset + count {
        return Err(SampQueryError::MalformedPacket {
            offset: *offset,
            wanted: count,
            len: data.len(),
        });
    }

    let bytes: &[u8] = &data[*offset..*offset + count];
    *offset += count;
    Ok(bytes)
}

/// Get the [u8] at index `offset` from `data`.
///
/// Mutates `offset` to the index after the byte.
pub fn get_u8(data: &[u8], offset: &mut usize) -> Result<u8, SampQueryError> {
    Ok(get_bytes(data, offset, 1)?[0])
}

/// Get 2 bytes (as a [u16], little-endian) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u16(data: &[u8], offset: &mut usize) -> Result<u16, SampQueryError> {
    Ok(LittleEndian::read_u16(get_bytes(data, offset, 2)?))
}

/// Get 2 bytes (as an [i16], little-endian) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_i16(data: &[u8], offset: &mut usize) -> Result<i16, SampQueryError> {
    Ok(LittleEndian::read_i16(get_bytes(data, offset, 2)?))
}

/// Get 4 bytes (as a [u32], little-endian) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u32(data: &[u8], offset: &mut usize) -> Result<u32, SampQueryError> {
    Ok(LittleEndian::read_u32(get_bytes(data, offset, 4)?))
}

/// Step over `count` reserved bytes, bounds-checked like any other read.
pub fn skip(data: &[u8], offset: &mut usize, count: usize) -> Result<(), SampQueryError> {
    get_bytes(data, offset, count).map(|_| ())
}

/// Get a UTF-8 string prefixed by a single length byte.
///
/// Mutates `offset` to the index after the string.
pub fn get_short_string(data: &[u8], offset: &mut usize) -> Result<String, SampQueryError> {
    let len: usize = get_u8(data, offset)? as usize;
    let bytes: &[u8] = get_bytes(data, offset, len)?;
    Ok(std::str::from_utf8(bytes)?.to_string())
}

/// Get a UTF-8 string prefixed by a 4 byte length block of which only the
/// low 16 bits carry the length; the high bits are wire padding and are
/// ignored, not validated.
///
/// Mutates `offset` to the index after the string.
pub fn get_block_string(data: &[u8], offset: &mut usize) -> Result<String, SampQueryError> {
    let len: usize = (get_u32(data, offset)? & 0xFFFF) as usize;
    let bytes: &[u8] = get_bytes(data, offset, len)?;
    Ok(std::str::from_utf8(bytes)?.to_string())
}
