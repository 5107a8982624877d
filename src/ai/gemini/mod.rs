pub mod client;
pub mod types;
pub mod video;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::GeminiHttpClient;
pub use video::GeminiVideoClient;
