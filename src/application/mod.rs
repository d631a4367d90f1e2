pub mod line_items;
pub mod order_service;
pub mod product_service;
pub mod stock_ledger;

pub use order_service::OrderService;
pub use product_service::ProductService;
