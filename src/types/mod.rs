pub mod bbox;
pub mod date;
pub mod payload;
pub mod sort_order;
pub mod temporal;
pub mod variables;
