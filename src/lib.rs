pub mod audit;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod i18n;
pub mod locale;
pub mod openai;
pub mod rate_limit;
pub mod retry;
pub mod sync;
pub mod translation;
