//! # Additive Checksum
//!
//! Single-byte additive checksum shared by both MC3000 transports.
//!
//! **Algorithm**: sum of all bytes modulo 256
//! **Position**: trailing byte of every frame

/// Calculate the additive checksum over a byte slice
///
/// # Arguments
///
/// * `data` - Bytes to sum (everything before the checksum byte)
///
/// # Returns
///
/// * `u8` - Sum of all bytes modulo 256
///
/// # Examples
///
/// ```
/// use mc3000::protocol::checksum::compute;
///
/// let data = [0x0F, 0x55, 0x02];
/// assert_eq!(compute(&data), 0x66);
/// ```
pub fn compute(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Verify the trailing checksum byte of a complete frame
///
/// Compares the checksum computed over `frame[..len - 1]` against the
/// final byte. Frames failing this check are integrity violations and
/// must not be interpreted as any record.
///
/// # Arguments
///
/// * `frame` - Complete frame including its trailing checksum byte
///
/// # Returns
///
/// * `bool` - `true` iff the last byte matches the computed checksum.
///   An empty frame has no checksum to verify and returns `false`.
pub fn verify(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&expected, body)) => compute(body) == expected,
        None => false,
    }
}
