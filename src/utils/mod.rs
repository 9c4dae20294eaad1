pub mod url_validation;
pub mod user_agent;

pub use url_validation::{UrlValidationError, build_endpoint_url, validate_ws_base_url};
pub use user_agent::{
    CLIENT_USER_AGENT_HEADER, ClientUserAgent, apply_user_agent_headers, client_user_agent,
    user_agent,
};
