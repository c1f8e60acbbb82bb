//! One-Time Codes
//!
//! Issues short numeric codes and verifies them exactly once within their
//! time-to-live, on top of the expiring store.

use std::time::Duration;

use rand::Rng;

use super::expiring::ExpiringStore;
use crate::constants::codes as code_constants;

/// Issues and verifies single-use numeric codes
pub struct CodeIssuer {
    store: ExpiringStore<String>,
}

impl CodeIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: ExpiringStore::new(ttl),
        }
    }

    /// Issue a fresh code for `subject`, replacing any outstanding one
    pub fn issue(&self, subject: &str) -> String {
        let code = generate_code();
        self.store.insert(subject, code.clone());
        code
    }

    /// Verify `code` for `subject`. A correct code is consumed; a wrong code
    /// leaves the outstanding one intact.
    pub fn verify(&self, subject: &str, code: &str) -> bool {
        match self.store.get(subject) {
            Some(expected) if expected == code => {
                self.store.take(subject);
                true
            }
            _ => false,
        }
    }
}

fn generate_code() -> String {
    let max = 10u32.pow(code_constants::CODE_DIGITS as u32);
    let value = rand::rng().random_range(0..max);
    format!("{:0width$}", value, width = code_constants::CODE_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(600);

    #[test]
    fn test_code_has_fixed_width() {
        let code = generate_code();
        assert_eq!(code.len(), code_constants::CODE_DIGITS);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_issue_then_verify_consumes() {
        let issuer = CodeIssuer::new(TTL);

        let code = issuer.issue("alice@example.com");
        assert!(issuer.verify("alice@example.com", &code));
        // Single use
        assert!(!issuer.verify("alice@example.com", &code));
    }

    #[test]
    fn test_wrong_code_does_not_burn_the_real_one() {
        let issuer = CodeIssuer::new(TTL);

        let code = issuer.issue("alice@example.com");
        assert!(!issuer.verify("alice@example.com", "000000x"));
        assert!(issuer.verify("alice@example.com", &code));
    }

    #[test]
    fn test_reissue_invalidates_previous_code() {
        let issuer = CodeIssuer::new(TTL);

        let first = issuer.issue("alice@example.com");
        let second = issuer.issue("alice@example.com");

        if first != second {
            assert!(!issuer.verify("alice@example.com", &first));
        }
        assert!(issuer.verify("alice@example.com", &second));
    }
}
