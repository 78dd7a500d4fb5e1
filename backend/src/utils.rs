use crate::error::ApiError;
use uuid::Uuid;

pub fn parse_election_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_election_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_election_id("1712345678901"), Err(ApiError::InvalidId)));
    }
}
