pub mod finance_report;
pub mod product;
pub mod sales;
