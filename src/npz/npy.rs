//! NPY single-array encoding.
//!
//! ```text
//! \x93NUMPY | major minor | header_len (u16 LE, u32 LE for v2/v3) | dict header | data
//! ```
//!
//! The dict header is an ASCII Python literal such as
//! `{'descr': '<i2', 'fortran_order': False, 'shape': (1000,), }`, padded with
//! spaces and terminated by `\n` so that the data starts on a 64-byte boundary.
//! Data is written little-endian in C order.

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use crate::array::{ArrayData, ElementType, NumericArray};

use super::NpzError;

/// Magic prefix of every `.npy` stream.
pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

const HEADER_ALIGNMENT: usize = 64;

/// Type descriptor written for `element`, e.g. `<f8` or `|u1`.
pub fn descr(element: ElementType) -> String {
    let order = if element.size() == 1 { '|' } else { '<' };
    format!("{}{}", order, element.kind_code())
}

fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({},)", n),
        dims => {
            let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Encode the magic, version and padded dict header for `array`.
pub fn encode_header(array: &NumericArray) -> Vec<u8> {
    let dict = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
        descr(array.element_type()),
        format_shape(array.shape())
    );

    // Version 1.0 unless the header outgrows its u16 length field.
    let (major, prefix_len) = if dict.len() + 1 + 10 + HEADER_ALIGNMENT <= u16::MAX as usize {
        (1u8, 10usize)
    } else {
        (2u8, 12usize)
    };
    let unpadded = prefix_len + dict.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    let header_len = dict.len() + padding + 1;

    let mut out = Vec::with_capacity(prefix_len + header_len);
    out.extend_from_slice(NPY_MAGIC);
    out.push(major);
    out.push(0);
    if major == 1 {
        out.extend_from_slice(&(header_len as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&(header_len as u32).to_le_bytes());
    }
    out.extend_from_slice(dict.as_bytes());
    out.resize(out.len() + padding, b' ');
    out.push(b'\n');
    out
}

fn encode_data(data: &ArrayData) -> Vec<u8> {
    fn encode<T>(values: &[T], width: usize, write_into: fn(&[T], &mut [u8])) -> Vec<u8> {
        let mut buf = vec![0u8; values.len() * width];
        write_into(values, &mut buf);
        buf
    }

    match data {
        ArrayData::Bool(v) => v.iter().map(|&x| u8::from(x)).collect(),
        ArrayData::I8(v) => v.iter().map(|&x| x as u8).collect(),
        ArrayData::U8(v) => v.clone(),
        ArrayData::I16(v) => encode(v, 2, LittleEndian::write_i16_into),
        ArrayData::U16(v) => encode(v, 2, LittleEndian::write_u16_into),
        ArrayData::I32(v) => encode(v, 4, LittleEndian::write_i32_into),
        ArrayData::U32(v) => encode(v, 4, LittleEndian::write_u32_into),
        ArrayData::I64(v) => encode(v, 8, LittleEndian::write_i64_into),
        ArrayData::U64(v) => encode(v, 8, LittleEndian::write_u64_into),
        ArrayData::F32(v) => encode(v, 4, LittleEndian::write_f32_into),
        ArrayData::F64(v) => encode(v, 8, LittleEndian::write_f64_into),
    }
}

/// Encode `array` as a complete `.npy` byte buffer.
pub fn to_npy_bytes(array: &NumericArray) -> Vec<u8> {
    let mut out = encode_header(array);
    out.extend_from_slice(&encode_data(array.data()));
    out
}

/// Write `array` as a complete `.npy` stream.
pub fn write_npy<W: Write>(writer: &mut W, array: &NumericArray) -> Result<(), NpzError> {
    writer.write_all(&encode_header(array))?;
    writer.write_all(&encode_data(array.data()))?;
    Ok(())
}

#[derive(Debug, PartialEq)]
struct NpyHeader {
    element: ElementType,
    big_endian: bool,
    fortran_order: bool,
    shape: Vec<usize>,
}

fn value_after<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let quoted = format!("'{}'", key);
    let start = text.find(&quoted)? + quoted.len();
    let rest = text[start..].trim_start();
    Some(rest.strip_prefix(':')?.trim_start())
}

fn parse_header(text: &str) -> Result<NpyHeader, NpzError> {
    let invalid = |what: &str| NpzError::InvalidHeader(format!("{} in {:?}", what, text.trim_end()));

    let descr_value = value_after(text, "descr").ok_or_else(|| invalid("missing 'descr'"))?;
    let descr_value = descr_value
        .strip_prefix('\'')
        .and_then(|s| s.split('\'').next())
        .ok_or_else(|| invalid("unquoted 'descr'"))?;
    let (big_endian, code) = match descr_value.chars().next() {
        Some('<') | Some('|') | Some('=') => (false, &descr_value[1..]),
        Some('>') => (true, &descr_value[1..]),
        _ => (false, descr_value),
    };
    let element = ElementType::from_kind_code(code)
        .ok_or_else(|| NpzError::UnsupportedDtype(descr_value.to_string()))?;

    let fortran_value =
        value_after(text, "fortran_order").ok_or_else(|| invalid("missing 'fortran_order'"))?;
    let fortran_order = if fortran_value.starts_with("True") {
        true
    } else if fortran_value.starts_with("False") {
        false
    } else {
        return Err(invalid("malformed 'fortran_order'"));
    };

    let shape_value = value_after(text, "shape").ok_or_else(|| invalid("missing 'shape'"))?;
    let inner = shape_value
        .strip_prefix('(')
        .and_then(|s| s.split(')').next())
        .ok_or_else(|| invalid("malformed 'shape'"))?;
    let shape = inner
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.trim_end_matches('L').parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid("non-integer dimension"))?;

    Ok(NpyHeader {
        element,
        big_endian,
        fortran_order,
        shape,
    })
}

fn decode_data<B: ByteOrder>(element: ElementType, bytes: &[u8], count: usize) -> ArrayData {
    fn decode<T: Default + Clone>(bytes: &[u8], count: usize, read_into: fn(&[u8], &mut [T])) -> Vec<T> {
        let mut values = vec![T::default(); count];
        read_into(bytes, &mut values);
        values
    }

    match element {
        ElementType::Bool => ArrayData::Bool(bytes.iter().map(|&b| b != 0).collect()),
        ElementType::I8 => ArrayData::I8(bytes.iter().map(|&b| b as i8).collect()),
        ElementType::U8 => ArrayData::U8(bytes.to_vec()),
        ElementType::I16 => ArrayData::I16(decode(bytes, count, B::read_i16_into)),
        ElementType::U16 => ArrayData::U16(decode(bytes, count, B::read_u16_into)),
        ElementType::I32 => ArrayData::I32(decode(bytes, count, B::read_i32_into)),
        ElementType::U32 => ArrayData::U32(decode(bytes, count, B::read_u32_into)),
        ElementType::I64 => ArrayData::I64(decode(bytes, count, B::read_i64_into)),
        ElementType::U64 => ArrayData::U64(decode(bytes, count, B::read_u64_into)),
        ElementType::F32 => ArrayData::F32(decode(bytes, count, B::read_f32_into)),
        ElementType::F64 => ArrayData::F64(decode(bytes, count, B::read_f64_into)),
    }
}

/// Read one `.npy` stream. `key` is only used in error messages.
pub fn read_npy<R: Read>(reader: &mut R, key: &str) -> Result<NumericArray, NpzError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != NPY_MAGIC {
        return Err(NpzError::InvalidHeader(format!("bad magic in entry {}", key)));
    }

    let major = reader.read_u8()?;
    let _minor = reader.read_u8()?;
    let header_len = match major {
        1 => reader.read_u16::<LittleEndian>()? as usize,
        2 | 3 => reader.read_u32::<LittleEndian>()? as usize,
        other => {
            return Err(NpzError::InvalidHeader(format!(
                "unsupported NPY version {} in entry {}",
                other, key
            )))
        }
    };

    let mut header = Vec::new();
    reader.by_ref().take(header_len as u64).read_to_end(&mut header)?;
    if header.len() < header_len {
        return Err(NpzError::InvalidHeader(format!("truncated header in entry {}", key)));
    }
    let header = String::from_utf8_lossy(&header);
    let parsed = parse_header(&header)?;
    if parsed.fortran_order {
        return Err(NpzError::FortranOrder(key.to_string()));
    }

    let element_size = parsed.element.size();
    let (count, expected) = parsed
        .shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .and_then(|count| Some((count, count.checked_mul(element_size)?)))
        .ok_or_else(|| {
            NpzError::InvalidHeader(format!("shape {:?} too large in entry {}", parsed.shape, key))
        })?;
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.len() < expected {
        return Err(NpzError::Truncated {
            key: key.to_string(),
            expected,
            actual: payload.len(),
        });
    }

    let bytes = &payload[..expected];
    let data = if parsed.big_endian {
        decode_data::<BigEndian>(parsed.element, bytes, count)
    } else {
        decode_data::<LittleEndian>(parsed.element, bytes, count)
    };
    Ok(NumericArray::new(parsed.shape, data)?)
}
