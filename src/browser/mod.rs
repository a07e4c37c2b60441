//! chromiumoxide 实现的浏览器驱动

pub mod chrome_driver;
pub mod connection;
pub mod headless;

pub use chrome_driver::{ChromeDriver, ChromeLauncher};
pub use connection::connect_to_browser;
pub use headless::launch_browser;
