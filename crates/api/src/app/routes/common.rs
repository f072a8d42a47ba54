use std::str::FromStr;

use coalition_core::DomainError;

use crate::app::errors;

/// Parse a path/body id into one of the domain id newtypes, mapping the
/// failure onto a 400 response.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(raw).map_err(errors::domain_error_to_response)
}
