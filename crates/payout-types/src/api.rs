//! API types for the payout signer HTTP API.
//!
//! This module defines the request and response bodies of the signing
//! endpoint and the structured error type returned for failed requests.

use crate::utils::{parse_nonzero_address, ParseError};
use crate::{AmountError, DecimalAmount, PermitRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Raw JSON body of a signing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
	/// Beneficiary address as a hex string.
	pub beneficiary: String,
	/// Token amount as a decimal string (integers are accepted too).
	pub amount: DecimalAmount,
	#[serde(rename = "userId")]
	pub user_id: String,
	#[serde(rename = "issueId")]
	pub issue_id: String,
}

/// Errors from turning a [`SignRequest`] into a [`PermitRequest`].
#[derive(Debug, Error)]
pub enum RequestError {
	#[error("Invalid beneficiary: {0}")]
	Beneficiary(#[from] ParseError),
	#[error("Invalid amount: {0}")]
	Amount(#[from] AmountError),
}

impl SignRequest {
	/// Validates the wire fields that can be checked without token metadata.
	pub fn into_permit_request(self) -> Result<PermitRequest, RequestError> {
		let beneficiary = parse_nonzero_address(&self.beneficiary)?;
		if self.amount.is_negative() {
			return Err(RequestError::Amount(AmountError::Negative));
		}
		Ok(PermitRequest {
			beneficiary,
			amount: self.amount,
			user_id: self.user_id,
			issue_id: self.issue_id,
		})
	}
}

/// Successful signing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
	/// `0x`-prefixed packed signature (r || s || v).
	pub signature: String,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Bad request with validation errors (400)
	BadRequest { error_type: String, message: String },
	/// Request body over the configured limit (413)
	PayloadTooLarge { error_type: String, message: String },
	/// Service unavailable, signer not configured for the request (503)
	ServiceUnavailable { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::PayloadTooLarge { .. } => 413,
			APIError::ServiceUnavailable { .. } => 503,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message) = match self {
			APIError::BadRequest { error_type, message }
			| APIError::PayloadTooLarge { error_type, message }
			| APIError::ServiceUnavailable { error_type, message }
			| APIError::InternalServerError { error_type, message } => (error_type, message),
		};
		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::PayloadTooLarge { message, .. } => {
				write!(f, "Payload Too Large: {}", message)
			},
			APIError::ServiceUnavailable { message, .. } => {
				write!(f, "Service Unavailable: {}", message)
			},
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl From<RequestError> for APIError {
	fn from(err: RequestError) -> Self {
		APIError::BadRequest {
			error_type: "INVALID_REQUEST".to_string(),
			message: err.to_string(),
		}
	}
}

impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}
