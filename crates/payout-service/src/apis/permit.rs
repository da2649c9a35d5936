//! Permit signing API.
//!
//! Turns a JSON [`SignRequest`] into a validated permit request, signs it and
//! returns the packed signature.

use payout_core::PermitService;
use payout_types::{APIError, SignRequest, SignResponse};

/// Processes one signing request against `service`.
pub async fn process_sign_request(
	request: SignRequest,
	service: &PermitService,
) -> Result<SignResponse, APIError> {
	let request = request.into_permit_request()?;
	let signature = service.sign(&request).await?;
	Ok(SignResponse {
		signature: signature.to_hex(),
	})
}
