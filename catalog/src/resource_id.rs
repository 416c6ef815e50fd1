//! Turns upstream resource URLs such as `https://swapi.dev/api/films/6/` into the
//! numeric ID carried by their last path segment.
use url::Url;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ResourceIdError {
    #[error("invalid resource URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("resource URL {0} has no path segments")]
    MissingSegment(String),
    #[error("resource URL {url} does not end in a numeric ID: {segment}")]
    NotNumeric { url: String, segment: String },
}

pub fn id_from_url(url: &str) -> Result<u64, ResourceIdError> {
    let parsed = Url::parse(url).map_err(|e| ResourceIdError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let segment = parsed
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .ok_or_else(|| ResourceIdError::MissingSegment(url.to_string()))?;

    segment
        .parse::<u64>()
        .map_err(|_| ResourceIdError::NotNumeric {
            url: url.to_string(),
            segment: segment.to_string(),
        })
}
