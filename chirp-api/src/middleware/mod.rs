/// API server middleware
///
/// - `headers`: response headers applied to every response (cache control +
///   security headers)

pub mod headers;
