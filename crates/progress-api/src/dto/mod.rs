//! 数据传输对象

mod response;

pub use response::ApiResponse;
