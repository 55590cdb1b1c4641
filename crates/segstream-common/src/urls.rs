//! Origin URL layout.
//!
//! The origin serves every movie under `{base}/movies/{movie}/`: the manifest
//! as `manifest.txt` and each track file under the filename the manifest
//! gives it.

/// Name of the manifest file inside a movie directory.
pub const MANIFEST_FILE: &str = "manifest.txt";

/// Strip trailing slashes so joined paths never contain `//`.
///
/// # Examples
///
/// ```
/// use segstream_common::urls::normalize_base;
///
/// assert_eq!(normalize_base("http://origin/"), "http://origin");
/// assert_eq!(normalize_base("http://origin"), "http://origin");
/// ```
pub fn normalize_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// URL of a movie's directory on the origin.
pub fn movie_url(base: &str, movie: &str) -> String {
    format!("{}/movies/{}", normalize_base(base), movie)
}

/// URL of a movie's manifest.
///
/// # Examples
///
/// ```
/// use segstream_common::urls::manifest_url;
///
/// assert_eq!(
///     manifest_url("http://localhost:8080/", "demo"),
///     "http://localhost:8080/movies/demo/manifest.txt"
/// );
/// ```
pub fn manifest_url(base: &str, movie: &str) -> String {
    format!("{}/{}", movie_url(base, movie), MANIFEST_FILE)
}

/// URL of one track file of a movie.
pub fn track_url(base: &str, movie: &str, filename: &str) -> String {
    format!("{}/{}", movie_url(base, movie), filename)
}
