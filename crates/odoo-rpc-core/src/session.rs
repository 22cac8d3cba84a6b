//! Authenticated session identity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote user identifier returned by `common.authenticate`.
pub type UserId = i64;

/// Identity obtained from a successful authentication.
///
/// Required as a credential on every data call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: UserId,
}

impl SessionIdentity {
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Interpret an authenticate result.
    ///
    /// The server answers with the uid on success and `false` on bad credentials;
    /// `null`, zero and non-integers are treated as rejection as well.
    #[must_use]
    pub fn from_authenticate_result(result: &Value) -> Option<Self> {
        result
            .as_i64()
            .filter(|uid| *uid != 0)
            .map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_integer_result_is_identity() {
        assert_eq!(
            SessionIdentity::from_authenticate_result(&json!(7)),
            Some(SessionIdentity::new(7))
        );
    }

    #[test]
    fn test_falsy_results_are_rejected() {
        for result in [json!(false), json!(null), json!(0), json!("7"), json!({})] {
            assert_eq!(SessionIdentity::from_authenticate_result(&result), None);
        }
    }
}
