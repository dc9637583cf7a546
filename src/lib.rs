pub mod changelog;
pub mod cli;
pub mod contributors;
pub mod error;
pub mod exec;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod report;
pub mod resolve;
pub mod technology;
pub mod util;
pub mod version;
