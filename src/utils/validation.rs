use crate::error::RecommendError;
use uuid::Uuid;

pub fn validate_recommend_request(
    user_id: Uuid,
    size: usize,
    max_size: usize,
) -> Result<(), RecommendError> {
    if user_id.is_nil() {
        return Err(RecommendError::invalid_input("user id cannot be nil"));
    }

    if size == 0 {
        return Err(RecommendError::invalid_input(
            "requested size must be greater than 0",
        ));
    }

    if size > max_size {
        return Err(RecommendError::invalid_input(format!(
            "requested size too large: {} (max {})",
            size, max_size
        )));
    }

    Ok(())
}

pub fn validate_click_request(
    user_id: Uuid,
    impression_log_id: Uuid,
) -> Result<(), RecommendError> {
    if user_id.is_nil() {
        return Err(RecommendError::invalid_input("user id cannot be nil"));
    }

    if impression_log_id.is_nil() {
        return Err(RecommendError::invalid_input(
            "impression log id cannot be nil",
        ));
    }

    Ok(())
}

pub fn validate_interaction_request(
    user_id: Uuid,
    content_id: Uuid,
) -> Result<(), RecommendError> {
    if user_id.is_nil() {
        return Err(RecommendError::invalid_input("user id cannot be nil"));
    }

    if content_id.is_nil() {
        return Err(RecommendError::invalid_input("content id cannot be nil"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_recommend_request() {
        let user = Uuid::new_v4();
        assert!(validate_recommend_request(user, 10, 100).is_ok());
        assert!(validate_recommend_request(Uuid::nil(), 10, 100).is_err());
        assert!(validate_recommend_request(user, 0, 100).is_err());
        assert!(validate_recommend_request(user, 101, 100).is_err());
    }

    #[test]
    fn test_validate_click_request() {
        assert!(validate_click_request(Uuid::new_v4(), Uuid::new_v4()).is_ok());
        assert!(validate_click_request(Uuid::new_v4(), Uuid::nil()).is_err());
        assert!(validate_click_request(Uuid::nil(), Uuid::new_v4()).is_err());
    }
}
