pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// A response body that could not be turned into typed domain values.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
	#[error("Malformed response body: {0}")]
	Json(#[from] serde_json::Error),
	#[error("Field {field} is not a finite number: {raw:?}.")]
	InvalidNumber { field: &'static str, raw: String },
	#[error("Field {field} must be a non-negative integer, got {raw}.")]
	InvalidCount { field: &'static str, raw: String },
	#[error("Record {id} has a system record but no variance.")]
	MissingVariance { id: String },
}
