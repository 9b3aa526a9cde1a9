pub mod format;

/// Header carrying the id of the user performing the request.
pub const CALLER_ID_HEADER: &str = "X-USER-ID";
