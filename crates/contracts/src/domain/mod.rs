pub mod a001_device;
