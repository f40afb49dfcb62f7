//! Numeric fields as the reconciliation service actually sends them.
//!
//! Decimal columns come back from the service as JSON strings ("123.45") on some endpoints and
//! as JSON numbers on others. Everything in this module accepts both and hands out `f64`/`u64`.

use serde::{Deserialize, Serialize};

use crate::{DecodeError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
	Number(f64),
	Text(String),
}
impl WireNumber {
	pub fn to_f64(&self, field: &'static str) -> Result<f64> {
		let value = match self {
			Self::Number(value) => *value,
			Self::Text(raw) => raw
				.trim()
				.parse::<f64>()
				.map_err(|_| DecodeError::InvalidNumber { field, raw: raw.clone() })?,
		};

		if !value.is_finite() {
			return Err(DecodeError::InvalidNumber { field, raw: self.raw() });
		}

		Ok(value)
	}

	pub fn to_count(&self, field: &'static str) -> Result<u64> {
		let value = self.to_f64(field)?;

		if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
			return Err(DecodeError::InvalidCount { field, raw: self.raw() });
		}

		Ok(value as u64)
	}

	fn raw(&self) -> String {
		match self {
			Self::Number(value) => value.to_string(),
			Self::Text(raw) => raw.clone(),
		}
	}
}
impl From<f64> for WireNumber {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

pub(crate) fn count_u32(value: &WireNumber, field: &'static str) -> Result<u32> {
	let count = value.to_count(field)?;

	u32::try_from(count).map_err(|_| DecodeError::InvalidCount { field, raw: count.to_string() })
}
