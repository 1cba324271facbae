pub mod a001_client;
pub mod a002_product;
pub mod a003_order;
pub mod a004_transaction;
