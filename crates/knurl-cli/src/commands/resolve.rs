//! `knurl resolve` — show a request after variable resolution, without sending it.

use knurl_core::resolve::resolve_request;
use knurl_core::Request;

use super::{load_environment, load_request, print_json};

pub fn resolve_file(request_file: &str, env_file: Option<&str>) -> Result<Request, String> {
    let request = load_request(request_file)?;
    let environment = load_environment(env_file)?;
    Ok(resolve_request(request, &environment))
}

pub fn run(request_file: &str, env_file: Option<&str>) -> Result<(), String> {
    let resolved = resolve_file(request_file, env_file)?;
    print_json(&resolved)
}
