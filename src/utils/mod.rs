pub mod logging;
pub mod url;

pub use url::normalize_quiz_url;
