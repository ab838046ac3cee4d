//! Little-endian primitive encoding for the persisted container format.
//!
//! All integers and floats are little-endian. Strings inside element
//! payloads are length-prefixed with a `u32`; attribute names and type tags
//! in the container header are NUL-terminated instead (see
//! [`write_nul_terminated`]).

use std::io::{self, Read, Write};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> io::Result<()> {
    w.write_all(&[v])
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> io::Result<()> {
    let len = u32::try_from(s.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string longer than u32::MAX"))?;
    write_u32_le(w, len)?;
    w.write_all(s.as_bytes())
}

/// Write the bytes of `s` followed by a single NUL byte.
pub fn write_nul_terminated(w: &mut dyn Write, s: &str) -> io::Result<()> {
    w.write_all(s.as_bytes())?;
    write_u8(w, 0)
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> io::Result<String> {
    let len = read_u32_le(r)? as usize;
    // Read through `take` so a corrupt length cannot force the whole
    // allocation up front.
    let mut buf = Vec::new();
    r.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "string payload ended early",
        ));
    }
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Read exactly `len` bytes holding a NUL-terminated string.
///
/// `len` counts the terminator. The final byte must be NUL and the bytes
/// before it must be valid UTF-8 without interior NULs.
pub fn read_nul_terminated(r: &mut dyn Read, len: usize) -> io::Result<String> {
    if len == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "terminated string has zero length",
        ));
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    if buf.pop() != Some(0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "string is missing its NUL terminator",
        ));
    }
    if buf.contains(&0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "string contains an interior NUL byte",
        ));
    }
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_is_little_endian() {
        let mut buf = Vec::new();
        write_u32_le(&mut buf, 0x0403_0201).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(read_u32_le(&mut buf.as_slice()).unwrap(), 0x0403_0201);
    }

    #[test]
    fn nul_terminated_roundtrip() {
        let mut buf = Vec::new();
        write_nul_terminated(&mut buf, "position").unwrap();
        assert_eq!(buf.len(), 9);
        assert_eq!(*buf.last().unwrap(), 0);
        let s = read_nul_terminated(&mut buf.as_slice(), 9).unwrap();
        assert_eq!(s, "position");
    }

    #[test]
    fn nul_terminated_rejects_missing_terminator() {
        let bytes = b"abc";
        let err = read_nul_terminated(&mut &bytes[..], 3).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn nul_terminated_rejects_zero_length() {
        let err = read_nul_terminated(&mut &b""[..], 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_read_is_unexpected_eof() {
        let err = read_u32_le(&mut &[1u8, 2][..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn length_prefixed_str_roundtrip() {
        let mut buf = Vec::new();
        write_length_prefixed_str(&mut buf, "héllo").unwrap();
        assert_eq!(read_length_prefixed_str(&mut buf.as_slice()).unwrap(), "héllo");
    }

    #[test]
    fn oversized_string_length_fails_without_panicking() {
        let mut buf = Vec::new();
        write_u32_le(&mut buf, u32::MAX).unwrap();
        buf.extend_from_slice(b"abc");
        let err = read_length_prefixed_str(&mut buf.as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
