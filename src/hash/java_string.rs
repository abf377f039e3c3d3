/// Lays out `text` the way a JVM string sits in memory: UTF-16 code units,
/// each emitted low byte first.
///
/// Characters outside the Basic Multilingual Plane become their surrogate
/// pair, so `"😀"` yields the four bytes of `0xD83D 0xDE00`.
pub fn java_string_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}
