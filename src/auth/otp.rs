use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

lazy_static! {
    /// One-time tokens are exactly six decimal digits.
    pub static ref ONE_TIME_TOKEN_REGEX: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
}

/// Generates a six digit one-time token for account confirmation or password reset.
pub fn generate_one_time_token() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
