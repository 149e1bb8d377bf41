use rand::RngExt;

/// Length in characters of room ids and team capability keys.
pub const TOKEN_LENGTH: usize = 8;

/// Generate an opaque 8-hex-character token from 4 random bytes.
///
/// Used for both room ids and per-team capability keys; ThreadRng is a CSPRNG
/// so keys are not guessable. Uniqueness of room ids is the registry's job.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    format!("{:08x}", rng.random::<u32>())
}
