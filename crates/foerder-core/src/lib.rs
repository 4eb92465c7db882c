pub mod answers;
pub mod bm25;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod filter;
pub mod matcher;
pub mod model;
pub mod rank;
pub mod text;
