mod view;

pub use view::DeviceDetails;
