pub(crate) mod color;
pub(crate) mod device;
pub(crate) mod model;
