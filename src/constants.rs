/// Shared constants for the secure function evaluation core.
/// Minimum recommended security parameter (wire label bit length): k SHOULD be >= 128.
pub const MIN_SECURITY_BITS: u32 = 128;

/// Minimum RSA modulus bit length required by the oblivious transfer sub-protocol.
pub const MIN_RSA_MODULUS_BITS: u32 = 2048;

/// Public RSA exponent used by TextbookRSA key generation (common choice, per spec).
pub const RSA_PUBLIC_EXPONENT: u64 = 65537;

/// Rounds of Miller-Rabin witness testing used when generating primes.
pub const MILLER_RABIN_ROUNDS: u32 = 40;

/// AES-GCM nonce length in bytes.
pub const AEAD_NONCE_LEN: usize = 12;
