pub mod expense_bucket;
pub mod marketplace_type;
pub mod order_doc_type;
