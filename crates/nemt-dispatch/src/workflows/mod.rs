pub mod dispatch;
pub mod fulfillment;
pub mod pricing;
