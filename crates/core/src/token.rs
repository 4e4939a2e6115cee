use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("slash command token did not match the configured verification token")]
pub struct TokenRejected;

/// Checks the shared secret Slack attaches to every slash command.
#[derive(Clone, Debug)]
pub struct TokenVerifier {
    expected: SecretString,
}

impl TokenVerifier {
    pub fn new(expected: SecretString) -> Self {
        Self { expected }
    }

    pub fn verify(&self, provided: &str) -> Result<(), TokenRejected> {
        let expected = self.expected.expose_secret();
        if expected.is_empty() {
            return Err(TokenRejected);
        }

        if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(TokenRejected)
        }
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter().zip(right).fold(0u8, |acc, (l, r)| acc | (l ^ r)) == 0
}

#[cfg(test)]
mod tests {
    use super::{TokenRejected, TokenVerifier};

    fn verifier(secret: &str) -> TokenVerifier {
        TokenVerifier::new(secret.to_owned().into())
    }

    #[test]
    fn exact_token_is_accepted() {
        assert_eq!(verifier("s3cret-token").verify("s3cret-token"), Ok(()));
    }

    #[test]
    fn any_other_token_is_rejected() {
        let verifier = verifier("s3cret-token");
        for candidate in ["", "s3cret", "s3cret-token ", "S3CRET-TOKEN", "s3cret-tokem"] {
            assert_eq!(verifier.verify(candidate), Err(TokenRejected), "`{candidate}`");
        }
    }

    #[test]
    fn empty_configured_secret_never_verifies() {
        assert_eq!(verifier("").verify(""), Err(TokenRejected));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let debug = format!("{:?}", verifier("do-not-print"));
        assert!(!debug.contains("do-not-print"));
    }
}
