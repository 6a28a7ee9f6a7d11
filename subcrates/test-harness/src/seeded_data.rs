use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Generates `size_in_bytes` bytes of random data.
///
/// The same seed always produces the same bytes, so a failing copy test can be replayed exactly.
///
/// ```rust
/// # use fs_transfer_test_harness::seeded_binary_data;
/// let data = seeded_binary_data(10_000, 2024);
///
/// assert_eq!(data.len(), 10_000);
/// assert_eq!(data, seeded_binary_data(10_000, 2024));
/// ```
pub fn seeded_binary_data(size_in_bytes: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; size_in_bytes];
    ChaCha20Rng::seed_from_u64(seed).fill_bytes(&mut data);

    data
}
