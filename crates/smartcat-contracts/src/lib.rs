pub mod completion;
pub mod errors;
pub mod events;
pub mod i18n;
pub mod payload;
pub mod prompts;
pub mod sampling;
pub mod verdict;
