use super::error::InfrastructureError;

/// Decodes an image payload sent in a JSON body, either plain base64 or a
/// `data:<mime>;base64,<payload>` URL.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, InfrastructureError> {
    let payload = payload.trim();
    let base64_data = if payload.starts_with("data:") {
        let (header, data) = payload
            .split_once(',')
            .ok_or_else(|| InfrastructureError::DecodingError("Invalid data URL: missing comma".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(InfrastructureError::DecodingError(
                "Invalid data URL: only base64 payloads are supported".to_string(),
            ));
        }
        data
    } else {
        payload
    };

    if base64_data.is_empty() {
        return Err(InfrastructureError::DecodingError("Image payload is empty".to_string()));
    }
    Ok(base64::decode(base64_data)?)
}
