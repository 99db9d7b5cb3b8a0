use serde::{Deserialize, Serialize};

/// Payload of the tokens issued to operators of the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    #[serde(rename = "_id")]
    pub user_id: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_wire_name() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "_id": 12,
            "exp": 4_000_000_000i64
        }))
        .unwrap();

        assert_eq!(claims.user_id, 12);
        assert_eq!(claims.iat, None);
    }
}
