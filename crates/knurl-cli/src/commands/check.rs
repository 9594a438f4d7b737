//! `knurl check-response` — validate a saved response against the contract.

use knurl_core::schema::parse_response;
use knurl_core::Response;

use super::read_document;

pub fn validate(response_file: &str) -> Result<Response, String> {
    parse_response(read_document("response", response_file)?).map_err(|e| e.to_string())
}

pub fn run(response_file: &str) -> Result<(), String> {
    let response = validate(response_file)?;
    println!(
        "✅ Valid {} response for request {}",
        response.protocol(),
        response.request_id
    );
    println!("   Time: {} ms", response.response_time);
    println!("   Size: {} bytes", response.response_size);
    println!("   At:   {}", response.timestamp);
    Ok(())
}
