pub mod order;
pub mod row;

pub use order::{OrderRecord, OrderType, ABSOLUTE_ORDER_TYPE_VAL, RELATIVE_ORDER_TYPE_VAL};
pub use row::{OrderRow, RowKey};
