pub mod dispatch;
pub mod promise;
