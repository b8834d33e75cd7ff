//! Assessment identifiers.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Hyphen positions of the 8-4-4-4-12 layout, as byte offsets.
const GROUP_ENDS: [usize; 4] = [4, 6, 8, 10];

/// Random RFC 4122 version 4 identifier, lowercase hex.
#[must_use]
pub fn new_assessment_id() -> String {
    let mut bytes: [u8; 16] = ChaCha20Rng::from_entropy().gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let mut id = String::with_capacity(36);
    for (i, byte) in bytes.iter().enumerate() {
        if GROUP_ENDS.contains(&i) {
            id.push('-');
        }
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_version() {
        let id = new_assessment_id();
        let groups: Vec<&str> = id.split('-').collect();
        let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();

        assert_eq!(lengths, vec![8, 4, 4, 4, 12]);
        assert!(groups[2].starts_with('4'));
        assert!(matches!(groups[3].as_bytes()[0], b'8' | b'9' | b'a' | b'b'));
        assert!(id.chars().all(|c| c == '-' || (c.is_ascii_hexdigit() && !c.is_ascii_uppercase())));
    }

    #[test]
    fn test_ids_differ() {
        assert_ne!(new_assessment_id(), new_assessment_id());
    }
}
