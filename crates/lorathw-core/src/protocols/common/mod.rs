pub(crate) mod nibble;
