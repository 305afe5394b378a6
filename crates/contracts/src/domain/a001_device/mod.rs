pub mod aggregate;

pub use aggregate::DeviceRecord;
