//! Concrete widgets built on the [`Widget`](crate::widget::Widget)
//! contract.

pub mod label;

pub use label::Label;
