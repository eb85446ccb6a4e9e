// Extra request headers for non-production stacks

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use md5::{Digest, Md5};
use rand::seq::SliceRandom;

/// Produces one header added to every outgoing request in test mode
pub trait HeaderGenerator: Send + Sync {
    /// Header name and value
    fn generate(&self) -> (String, String);
}

pub const FIREWALL_HEADER: &str = "x-serato-firewall";
pub const CDN_AUTH_HEADER: &str = "x-serato-cdn-auth";

/// Per-chunk ASCII shifts applied to the four 8-character chunks of the hash
const SHIFTS: [i32; 4] = [-8, 8, -16, 16];

/// Letters the three character prefix is drawn from
const PREFIX_CHARACTERS: &[u8] = b"serato";

/// Header identifying first-party applications to the test stack firewall.
///
/// Value format: `"<prefix>~<shifted md5>"` where the prefix is three letters
/// drawn from `serato` and the MD5 of the current timestamp has each 8-char
/// chunk shifted by -8, 8, -16 and 16 code points.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirewallHeader;

impl FirewallHeader {
    pub fn new() -> Self {
        Self
    }

    /// Build the header value from a timestamp string and a prefix
    fn value_for(timestamp: &str, prefix: &str) -> String {
        let hash = format!("{:x}", Md5::digest(timestamp.as_bytes()));
        let shifted = shift_hash(&hash);
        format!("\"{}~{}\"", prefix, shifted)
    }

    fn random_prefix() -> String {
        let mut rng = rand::thread_rng();
        (0..3)
            .filter_map(|_| PREFIX_CHARACTERS.choose(&mut rng))
            .map(|&b| b as char)
            .collect()
    }
}

impl HeaderGenerator for FirewallHeader {
    fn generate(&self) -> (String, String) {
        let timestamp = Local::now().format("%d-%b-%Y (%H:%M:%S%.6f)").to_string();
        let value = Self::value_for(&timestamp, &Self::random_prefix());
        (FIREWALL_HEADER.to_string(), value)
    }
}

/// Shift each 8-char chunk of a hex digest and replace characters that are
/// not allowed inside a quoted header string
fn shift_hash(hash: &str) -> String {
    hash.chars()
        .enumerate()
        .map(|(i, c)| {
            let shift = SHIFTS[(i / 8) % SHIFTS.len()];
            let shifted = char::from_u32((c as i32 + shift) as u32).unwrap_or(c);
            match shifted {
                '"' => 'x',
                '\\' => 'y',
                other => other,
            }
        })
        .collect()
}

/// `x-serato-cdn-auth` value: base64 of `id:secret`
pub fn cdn_auth_value(id: &str, secret: &str) -> String {
    STANDARD.encode(format!("{}:{}", id, secret))
}
