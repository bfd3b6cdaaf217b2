pub mod time;

pub use self::time::now_timestamp;
