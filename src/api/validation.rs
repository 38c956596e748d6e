use super::{ApiError, PageQuery};

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_limit(limit: i64) -> Result<u64, ApiError> {
    const MIN_LIMIT: i64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
        )));
    }
    Ok(limit.unsigned_abs())
}

pub fn validate_skip(skip: i64) -> Result<u64, ApiError> {
    u64::try_from(skip).map_err(|_| {
        ApiError::validation(format!("Invalid skip: {skip}. Skip cannot be negative"))
    })
}

/// Resolves `skip`/`limit` with their defaults.
pub fn validate_page(page: PageQuery) -> Result<(u64, u64), ApiError> {
    let skip = validate_skip(page.skip.unwrap_or(0))?;
    let limit = validate_limit(page.limit.unwrap_or(DEFAULT_LIMIT))?;
    Ok((skip, limit))
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("event", 1).is_ok());
        assert!(validate_id("event", 9999).is_ok());
        assert!(validate_id("event", 0).is_err());
        assert!(validate_id("event", -1).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(1).unwrap(), 1);
        assert_eq!(validate_limit(1000).unwrap(), 1000);
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1001).is_err());
    }

    #[test]
    fn test_validate_page_defaults() {
        let page = PageQuery {
            skip: None,
            limit: None,
        };
        assert_eq!(validate_page(page).unwrap(), (0, 100));

        let negative = PageQuery {
            skip: Some(-5),
            limit: None,
        };
        assert!(validate_page(negative).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  Concert ").unwrap(), "Concert");
        assert!(validate_search_query("").is_err());
        assert!(validate_search_query("   ").is_err());
    }
}
