pub mod handler;
pub mod mock_server;
