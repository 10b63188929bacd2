use rand::distributions::Alphanumeric;
use rand::Rng;

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub const SHARE_TOKEN_LENGTH: usize = 16;

pub fn generate_share_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
