pub mod generate;
pub mod library;
pub mod profile;
pub mod prompts;
