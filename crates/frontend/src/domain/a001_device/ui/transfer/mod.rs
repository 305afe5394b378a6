mod widget;

pub use widget::TransferWidget;
