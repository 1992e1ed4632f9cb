pub mod ai;
pub mod crm;
pub mod dispatch;
pub mod nlu;
