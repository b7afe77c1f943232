mod guards;
mod platform;

pub(crate) use guards::*;
pub(crate) use platform::*;
