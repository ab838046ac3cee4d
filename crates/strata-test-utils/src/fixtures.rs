//! Custom element types for registry and persistence tests.
//!
//! - [`Position`]: three `f64` coordinates.
//! - [`Rgb`]: three bytes, tag `"Rgb"`.
//!
//! Neither is in the built-in registry; containers register them on
//! `add_attribute`, and a fresh container must register them explicitly
//! before loading a snapshot that uses them.

use std::io::{self, Read, Write};

use strata_core::Element;

/// A point in space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Element for Position {
    const TYPE_TAG: &'static str = "Position";

    fn encode(&self, w: &mut dyn Write) -> io::Result<()> {
        self.x.encode(w)?;
        self.y.encode(w)?;
        self.z.encode(w)
    }

    fn decode(r: &mut dyn Read) -> io::Result<Self> {
        Ok(Self {
            x: f64::decode(r)?,
            y: f64::decode(r)?,
            z: f64::decode(r)?,
        })
    }
}

/// An 8-bit colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Element for Rgb {
    const TYPE_TAG: &'static str = "Rgb";

    fn encode(&self, w: &mut dyn Write) -> io::Result<()> {
        w.write_all(&self.0)
    }

    fn decode(r: &mut dyn Read) -> io::Result<Self> {
        let mut buf = [0u8; 3];
        r.read_exact(&mut buf)?;
        Ok(Self(buf))
    }
}
