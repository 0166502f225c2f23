pub mod u101_order_subscribe;
