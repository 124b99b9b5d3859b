// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Shared kernel of the azubi-prep engine: stable error codes, canonical
//! JSON hashing, and the injected clock.

pub mod canonical;
mod error;
mod time;

pub use error::{EngineError, ErrorKind, MachineError, WriteOutcome};
pub use time::{next_correlation_id, Clock, FixedClock, SystemClock};

pub const CRATE_NAME: &str = "azubi-prep-core";

use sha2::{Digest, Sha256};

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
