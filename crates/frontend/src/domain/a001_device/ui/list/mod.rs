mod widget;

pub use widget::DeviceList;
