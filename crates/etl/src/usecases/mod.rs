pub mod u501_import_from_ozon;
pub mod u502_import_from_wildberries;
pub mod u503_load_costs;
