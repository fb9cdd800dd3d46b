//! MCP protocol surface.
//!
//! The server speaks the Model Context Protocol over stdio and routes tool
//! calls to the batch orchestration underneath.

pub mod server;
pub mod tools;

pub use server::BridgeMcpServer;
