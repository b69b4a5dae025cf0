pub mod images;
pub mod logging;
pub mod payments;
pub mod storage;
