use crate::Gate;

pub type BlockKey = [u8; 16];

/// Generate a 16-byte key from a block's name, width and gate body
///
/// Two blocks share a key exactly when they would be spliced identically, so
/// the key is used to register each distinct template once per circuit.
pub fn generate_block_key<'a>(
    name: &str,
    width: usize,
    gates: impl IntoIterator<Item = &'a Gate>,
) -> BlockKey {
    let mut hasher = blake3::Hasher::new();

    hasher.update(name.as_bytes());
    hasher.update(&width.to_le_bytes());

    for gate in gates {
        hasher.update(b"|"); // separator to avoid collisions
        hasher.update(gate.gate_type().name().as_bytes());
        for line in gate.lines() {
            hasher.update(b",");
            hasher.update(&line.0.to_le_bytes());
        }
    }

    let hash = hasher.finalize();
    let mut key = [0u8; 16];
    key.copy_from_slice(&hash.as_bytes()[..16]);
    key
}
