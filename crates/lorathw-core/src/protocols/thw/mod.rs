//! TFA TH/W weather sensor payload decoding.
//!
//! The sensor firmware packs one reading into an 8-byte LoRaWAN uplink:
//! humidity, a 12-bit offset temperature and a 12-bit windspeed sharing the
//! nibbles of byte 2, followed by a little-endian 32-bit device id. The
//! parser is pure and total over any payload of at least 8 bytes; shorter
//! payloads fail with `ThwError::PayloadTooShort` before any field is read.
//!
//! Byte offsets live in `layout`, bounds-checked access and nibble joins in
//! `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{decode, parse_frame};
