pub mod github;
pub mod openai;
pub mod paypal;

pub use github::GithubClient;
pub use openai::OpenAiClient;
pub use paypal::PayPalClient;
