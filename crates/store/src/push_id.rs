//! Chronologically ordered push keys.
//!
//! Keys are 20 characters: 8 encode the creation time in milliseconds, 12
//! are random. The alphabet is in ASCII order, so lexicographic key order is
//! creation order. Keys generated within the same millisecond increment the
//! random suffix of the previous key to keep that ordering.

use rand::Rng;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

/// Generates push keys. Not shared across threads; each store owns one.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_millis: i64,
    last_random: [u8; RANDOM_CHARS],
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next key for the current wall-clock time.
    pub fn next_id(&mut self) -> String {
        self.next_id_at(chrono::Utc::now().timestamp_millis())
    }

    /// Next key for an explicit timestamp.
    pub fn next_id_at(&mut self, millis: i64) -> String {
        if millis == self.last_millis {
            increment(&mut self.last_random);
        } else {
            let mut rng = rand::rng();
            for slot in self.last_random.iter_mut() {
                *slot = rng.random_range(0..64);
            }
            self.last_millis = millis;
        }

        let mut time_chars = [0u8; TIME_CHARS];
        let mut now = millis.max(0) as u64;
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(now % 64) as usize];
            now /= 64;
        }

        let mut id = String::with_capacity(TIME_CHARS + RANDOM_CHARS);
        id.extend(time_chars.iter().map(|&c| c as char));
        id.extend(
            self.last_random
                .iter()
                .map(|&i| PUSH_CHARS[i as usize] as char),
        );
        id
    }
}

/// Add one to a base-64 digit string, carrying leftward.
fn increment(digits: &mut [u8; RANDOM_CHARS]) {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
}
