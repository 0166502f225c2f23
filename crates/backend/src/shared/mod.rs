pub mod config;
pub mod data;
pub mod getresponse;
pub mod journal;
pub mod woocommerce;
