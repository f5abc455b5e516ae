//! Infrastructure layer - persistence and HTTP transport

pub mod storage;
pub mod transport;

pub use transport::ReqwestTransport;
