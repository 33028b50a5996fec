pub(crate) mod data_uri;
pub(crate) mod decode;
pub(crate) mod resolve;
pub(crate) mod store;
