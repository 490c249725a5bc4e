pub mod cli;
pub mod config;
pub mod correct;
pub mod error;
pub mod extract;
pub mod interactive;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod scrutinize;
pub mod util;
