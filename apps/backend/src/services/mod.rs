//! Backend services

pub mod llm;
