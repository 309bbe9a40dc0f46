//! Order ledger handlers.

mod get_order;
mod materialize_order;
mod update_order_status;

pub use get_order::GetOrderHandler;
pub use materialize_order::{
    MaterializeOrderCommand, MaterializeOrderHandler, MaterializeOrderResult,
};
pub use update_order_status::{UpdateOrderStatusCommand, UpdateOrderStatusHandler};
