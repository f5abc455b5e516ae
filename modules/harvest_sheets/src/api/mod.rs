//! API layer - client implementations exposed to consumers

pub mod native;
