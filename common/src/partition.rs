/// Hash FNV-1a de 32 bits, enmascarado a 31 bits.
///
/// No usamos `DefaultHasher`: su algoritmo no está garantizado entre
/// versiones de Rust y cada worker puede ser un binario distinto.
pub fn ihash(key: &str) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let mut h = OFFSET;
    for b in key.as_bytes() {
        h ^= u32::from(*b);
        h = h.wrapping_mul(PRIME);
    }
    h & 0x7fff_ffff
}

/// Partición de reduce a la que va `key`, en `[0, n_reduce)`.
pub fn partition_for(key: &str, n_reduce: usize) -> usize {
    debug_assert!(n_reduce > 0, "n_reduce tiene que ser > 0");
    ihash(key) as usize % n_reduce
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_fnv1a_reference_values() {
        // vectores de referencia de FNV-1a 32 (0x811c9dc5 y 0xe40c292c) sin el bit alto
        assert_eq!(ihash(""), 0x011c_9dc5);
        assert_eq!(ihash("a"), 0x640c_292c);
    }

    #[test]
    fn partition_is_stable_across_calls() {
        for key in ["hola", "mundo", "", "mundo_prueba", "ñandú"] {
            let first = partition_for(key, 7);
            for _ in 0..10 {
                assert_eq!(partition_for(key, 7), first);
            }
            assert!(first < 7);
        }
    }

    #[test]
    fn single_partition_takes_everything() {
        assert_eq!(partition_for("cualquier", 1), 0);
        assert_eq!(partition_for("", 1), 0);
    }

    #[test]
    fn keys_spread_over_partitions() {
        let mut seen = [false; 4];
        for i in 0..200 {
            seen[partition_for(&format!("clave-{i}"), 4)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
