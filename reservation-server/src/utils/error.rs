//! 统一错误处理
//!
//! Re-exports the shared error system and bridges the crate-local error
//! sources into [`AppError`].
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::reservation_not_found(id))
//!
//! // 返回成功响应
//! Ok(ApiResponse::created(reservation))
//! ```

pub use shared::error::{ApiResponse, AppError, ErrorCategory, ErrorCode, ErrorResponse};

use crate::db::repository::RepoError;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Conflict(code, msg) => AppError::with_message(code, msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_mapping() {
        let err: AppError = RepoError::Database("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let err: AppError = RepoError::NotFound("Reservation 3 not found".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Reservation 3 not found");

        let err: AppError =
            RepoError::Conflict(ErrorCode::TableOccupied, "Table 1 is occupied".into()).into();
        assert_eq!(err.code, ErrorCode::TableOccupied);
    }
}
