pub mod executor;
pub mod processors;
pub mod wildberries_api_client;
