//! Content hashing for cheap container comparison.
//!
//! Uses FNV-1a over the persisted byte stream. Two containers hash equal
//! when their snapshots are byte-identical, so the hash covers names, type
//! tags, slot order, liveness, free list order and every value below the
//! high-water mark. Not cryptographically secure.

use std::io::{self, Write};

use strata_core::PersistError;

use crate::container::AttributeContainer;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// `io::Write` sink folding every byte into an FNV-1a state.
struct Fnv1aWriter {
    hash: u64,
}

impl Write for Fnv1aWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            self.hash = (self.hash ^ b as u64).wrapping_mul(FNV_PRIME);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AttributeContainer {
    /// FNV-1a hash of the container's snapshot.
    ///
    /// Equal to hashing the bytes [`save`](Self::save) would write, without
    /// buffering them. Fails only if an element refuses to encode.
    pub fn content_hash(&self) -> Result<u64, PersistError> {
        let mut sink = Fnv1aWriter { hash: FNV_OFFSET };
        self.save(&mut sink)?;
        Ok(sink.hash)
    }
}
