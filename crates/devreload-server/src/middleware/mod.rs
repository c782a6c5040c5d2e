//! Response middleware.

pub(crate) mod inject;
